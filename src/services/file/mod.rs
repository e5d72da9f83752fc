//! 文件服务模块
//!
//! 提供文件系统抽象，项目模型通过它访问磁盘

pub mod local;
pub mod provider;

pub use local::LocalFileProvider;
pub use provider::{FileError, FileMetadata, FileProvider, Result};
