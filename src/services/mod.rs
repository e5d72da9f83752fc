//! 服务层
//!
//! 模型与外界的接缝：文件系统、配置、消息通知、Save As 选择器

pub mod config;
pub mod file;
pub mod notify;
pub mod picker;

pub use config::ProjectConfig;
pub use file::{FileError, FileMetadata, FileProvider, LocalFileProvider};
pub use notify::{LogNotifier, Notifier, NullNotifier};
pub use picker::{CancelPicker, FixedDestination, SaveAsPicker, SaveDestination};
