//! gproj - G-code 编辑器的多文件项目模型
//!
//! 模块结构：
//! - models: 数据模型（Project, Buffer）
//! - services: 服务层（FileProvider, ProjectConfig, Notifier, SaveAsPicker）
//! - effect: 推给前端的刷新指令（Effect, BufferSnapshot）
//! - logging: tracing 初始化

pub mod effect;
pub mod logging;
pub mod models;
pub mod services;

pub use effect::{BufferSnapshot, Effect};
pub use models::{Buffer, NameMode, Project, ProjectError, Switch};
pub use services::{
    FileError, FileProvider, LocalFileProvider, LogNotifier, Notifier, NullNotifier,
    ProjectConfig, SaveAsPicker, SaveDestination,
};
