//! 文件系统 Provider trait
//!
//! 抽象项目模型用到的文件系统操作，方便替换后端和在测试里打桩

use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

pub type Result<T> = std::result::Result<T, FileError>;

#[derive(Debug)]
pub enum FileError {
    Io(io::Error),
    NotFound(PathBuf),
    NotAFile(PathBuf),
}

impl std::fmt::Display for FileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileError::Io(e) => write!(f, "IO error: {}", e),
            FileError::NotFound(p) => write!(f, "Not found: {}", p.display()),
            FileError::NotAFile(p) => write!(f, "Not a file: {}", p.display()),
        }
    }
}

impl std::error::Error for FileError {}

impl From<io::Error> for FileError {
    fn from(e: io::Error) -> Self {
        FileError::Io(e)
    }
}

pub trait FileProvider: Send + Sync {
    fn read_file(&self, path: &Path) -> Result<String>;

    fn write_file(&self, path: &Path, content: &str) -> Result<()>;

    fn create_dir_all(&self, path: &Path) -> Result<()>;

    fn rename(&self, from: &Path, to: &Path) -> Result<()>;

    fn copy(&self, from: &Path, to: &Path) -> Result<()>;

    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    fn is_file(&self, path: &Path) -> bool;

    fn metadata(&self, path: &Path) -> Result<FileMetadata>;

    fn set_readonly(&self, path: &Path, readonly: bool) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileMetadata {
    pub size: u64,
    pub is_dir: bool,
    pub is_file: bool,
    pub modified: Option<SystemTime>,
    pub readonly: bool,
}

impl FileMetadata {
    pub fn from_std(meta: std::fs::Metadata) -> Self {
        Self {
            size: meta.len(),
            is_dir: meta.is_dir(),
            is_file: meta.is_file(),
            modified: meta.modified().ok(),
            readonly: meta.permissions().readonly(),
        }
    }
}
