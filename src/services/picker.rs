//! Save As 目标选择
//!
//! 平台文件选择器在模型之外；模型只依赖这个 trait，
//! 返回 None 表示用户取消

use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveDestination {
    pub dir: PathBuf,
    pub name: String,
}

pub trait SaveAsPicker {
    fn pick_destination(&self, initial_dir: &Path, default_name: &str) -> Option<SaveDestination>;
}

/// 总是返回固定目标（测试和无界面环境用）
pub struct FixedDestination {
    dir: PathBuf,
    name: String,
}

impl FixedDestination {
    pub fn new(dir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            name: name.into(),
        }
    }
}

impl SaveAsPicker for FixedDestination {
    fn pick_destination(&self, _initial_dir: &Path, _default_name: &str) -> Option<SaveDestination> {
        Some(SaveDestination {
            dir: self.dir.clone(),
            name: self.name.clone(),
        })
    }
}

/// 总是取消
pub struct CancelPicker;

impl SaveAsPicker for CancelPicker {
    fn pick_destination(&self, _initial_dir: &Path, _default_name: &str) -> Option<SaveDestination> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_destination() {
        let picker = FixedDestination::new("/dest", "proj");
        let dest = picker
            .pick_destination(Path::new("/initial"), "default")
            .unwrap();
        assert_eq!(dest.dir, PathBuf::from("/dest"));
        assert_eq!(dest.name, "proj");
    }

    #[test]
    fn test_cancel_picker() {
        let picker = CancelPicker;
        assert!(picker
            .pick_destination(Path::new("/initial"), "default")
            .is_none());
    }
}
