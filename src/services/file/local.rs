//! 本地文件系统 Provider
//!
//! 实现 FileProvider trait，操作本地文件系统

use super::provider::{FileError, FileMetadata, FileProvider, Result};
use std::fs;
use std::path::Path;

pub struct LocalFileProvider;

impl LocalFileProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFileProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl FileProvider for LocalFileProvider {
    fn read_file(&self, path: &Path) -> Result<String> {
        if !path.exists() {
            return Err(FileError::NotFound(path.to_path_buf()));
        }
        if !path.is_file() {
            return Err(FileError::NotAFile(path.to_path_buf()));
        }
        Ok(fs::read_to_string(path)?)
    }

    fn write_file(&self, path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(fs::write(path, content)?)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        Ok(fs::create_dir_all(path)?)
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        if !from.exists() {
            return Err(FileError::NotFound(from.to_path_buf()));
        }
        Ok(fs::rename(from, to)?)
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        if !from.exists() {
            return Err(FileError::NotFound(from.to_path_buf()));
        }
        if !from.is_file() {
            return Err(FileError::NotAFile(from.to_path_buf()));
        }
        fs::copy(from, to)?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn metadata(&self, path: &Path) -> Result<FileMetadata> {
        if !path.exists() {
            return Err(FileError::NotFound(path.to_path_buf()));
        }
        Ok(FileMetadata::from_std(fs::metadata(path)?))
    }

    fn set_readonly(&self, path: &Path, readonly: bool) -> Result<()> {
        if !path.exists() {
            return Err(FileError::NotFound(path.to_path_buf()));
        }
        let mut perms = fs::metadata(path)?.permissions();
        perms.set_readonly(readonly);
        Ok(fs::set_permissions(path, perms)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_and_read_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("a.gcode");
        let provider = LocalFileProvider::new();

        provider.write_file(&path, "G28\n").unwrap();
        assert_eq!(provider.read_file(&path).unwrap(), "G28\n");
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("sub").join("deep").join("a.gcode");
        let provider = LocalFileProvider::new();

        provider.write_file(&path, "").unwrap();
        assert!(provider.is_file(&path));
    }

    #[test]
    fn test_read_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let provider = LocalFileProvider::new();

        let err = provider.read_file(&tmp.path().join("nope")).unwrap_err();
        assert!(matches!(err, FileError::NotFound(_)));
    }

    #[test]
    fn test_rename_and_copy() {
        let tmp = tempfile::tempdir().unwrap();
        let provider = LocalFileProvider::new();
        let a = tmp.path().join("a.gcode");
        let b = tmp.path().join("b.gcode");
        let c = tmp.path().join("c.gcode");

        provider.write_file(&a, "x").unwrap();
        provider.rename(&a, &b).unwrap();
        assert!(!provider.exists(&a));
        assert!(provider.exists(&b));

        provider.copy(&b, &c).unwrap();
        assert!(provider.exists(&b));
        assert_eq!(provider.read_file(&c).unwrap(), "x");
    }

    #[test]
    fn test_set_readonly_reflected_in_metadata() {
        let tmp = tempfile::tempdir().unwrap();
        let provider = LocalFileProvider::new();
        let path = tmp.path().join("a.gcode");
        provider.write_file(&path, "x").unwrap();

        provider.set_readonly(&path, true).unwrap();
        assert!(provider.metadata(&path).unwrap().readonly);

        provider.set_readonly(&path, false).unwrap();
        assert!(!provider.metadata(&path).unwrap().readonly);
    }
}
