//! 数据模型层

pub mod buffer;
pub mod project;

pub use buffer::{slice_to_cow, Buffer};
pub use project::{NameMode, Project, ProjectError, Switch};
