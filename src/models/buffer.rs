//! 缓冲区模型
//!
//! 职责：
//! - 一个逻辑文件：显示名（无扩展名）+ 磁盘路径
//! - 文本快照存储（Rope）与脏标记
//! - 每缓冲区的选区 / 滚动位置，切换和重开时回放
//!
//! 活动缓冲区的权威文本在前端手里，只在 flush 时同步进来

use compact_str::CompactString;
use ropey::{Rope, RopeSlice};
use std::borrow::Cow;
use std::path::PathBuf;

use crate::effect::BufferSnapshot;
use crate::services::file::{FileProvider, Result};

/// 从 RopeSlice 获取字符串，优先零拷贝
pub fn slice_to_cow(slice: RopeSlice<'_>) -> Cow<'_, str> {
    match slice.as_str() {
        Some(s) => Cow::Borrowed(s),
        None => Cow::Owned(slice.to_string()),
    }
}

#[derive(Clone)]
pub struct Buffer {
    /// 逻辑名，不含扩展名，项目内大小写不敏感唯一
    pub name: CompactString,
    /// 磁盘绝对路径；成功的 rename/create 之后 stem == name
    pub file: PathBuf,
    content: Rope,
    /// 内存内容与磁盘上次保存的内容不一致
    pub modified: bool,
    pub selection: (usize, usize),
    pub scroll: usize,
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer")
            .field("name", &self.name)
            .field("file", &self.file)
            .field("modified", &self.modified)
            .field("len_chars", &self.content.len_chars())
            .finish()
    }
}

impl Buffer {
    /// 空缓冲区（新建文件的场合，磁盘文件由调用方创建）
    pub fn new(name: CompactString, file: PathBuf) -> Self {
        Self {
            name,
            file,
            content: Rope::new(),
            modified: false,
            selection: (0, 0),
            scroll: 0,
        }
    }

    /// 从磁盘读入；文件不存在时内容为空
    pub fn load(name: CompactString, file: PathBuf, fs: &dyn FileProvider) -> Result<Self> {
        let content = if fs.is_file(&file) {
            Rope::from_str(&fs.read_file(&file)?)
        } else {
            Rope::new()
        };
        Ok(Self {
            name,
            file,
            content,
            modified: false,
            selection: (0, 0),
            scroll: 0,
        })
    }

    pub fn text(&self) -> String {
        self.content.to_string()
    }

    /// 覆盖内容；只有文本真的变了才置脏
    pub fn set_text(&mut self, text: &str) {
        if self.content != text {
            self.content = Rope::from_str(text);
            self.modified = true;
        }
    }

    pub fn snapshot(&self) -> BufferSnapshot {
        BufferSnapshot {
            text: self.text(),
            selection: self.selection,
            scroll: self.scroll,
        }
    }

    pub fn file_name(&self) -> String {
        self.file
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// 写回自己的磁盘路径并清脏
    pub fn save(&mut self, fs: &dyn FileProvider) -> Result<()> {
        fs.write_file(&self.file, &slice_to_cow(self.content.slice(..)))?;
        self.modified = false;
        Ok(())
    }

    /// Save As：把内存内容写到新位置，并把自己重定向过去
    pub fn save_to(&mut self, fs: &dyn FileProvider, dest: PathBuf) -> Result<()> {
        fs.write_file(&dest, &slice_to_cow(self.content.slice(..)))?;
        self.file = dest;
        self.modified = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::file::LocalFileProvider;

    #[test]
    fn test_load_reads_disk_content() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("a.gcode");
        std::fs::write(&path, "G1 X0").unwrap();

        let fs = LocalFileProvider::new();
        let buffer = Buffer::load("a".into(), path, &fs).unwrap();
        assert_eq!(buffer.text(), "G1 X0");
        assert!(!buffer.modified);
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let fs = LocalFileProvider::new();
        let buffer = Buffer::load("a".into(), tmp.path().join("a.gcode"), &fs).unwrap();
        assert_eq!(buffer.text(), "");
        assert!(!buffer.modified);
    }

    #[test]
    fn test_set_text_marks_modified_only_on_change() {
        let mut buffer = Buffer::new("a".into(), PathBuf::from("/p/a.gcode"));
        buffer.set_text("");
        assert!(!buffer.modified);

        buffer.set_text("G28");
        assert!(buffer.modified);

        buffer.modified = false;
        buffer.set_text("G28");
        assert!(!buffer.modified);
    }

    #[test]
    fn test_save_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("a.gcode");
        let fs = LocalFileProvider::new();

        let mut buffer = Buffer::new("a".into(), path.clone());
        buffer.set_text("G1 X10\nG1 Y10\n");
        buffer.save(&fs).unwrap();

        assert!(!buffer.modified);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "G1 X10\nG1 Y10\n");
    }

    #[test]
    fn test_save_to_redirects_without_touching_original() {
        let tmp = tempfile::tempdir().unwrap();
        let original = tmp.path().join("a.gcode");
        let dest = tmp.path().join("copy").join("a.gcode");
        std::fs::write(&original, "old").unwrap();

        let fs = LocalFileProvider::new();
        let mut buffer = Buffer::load("a".into(), original.clone(), &fs).unwrap();
        buffer.set_text("new");
        buffer.save_to(&fs, dest.clone()).unwrap();

        assert_eq!(buffer.file, dest);
        assert!(!buffer.modified);
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "new");
        // 原位置的文件保持原样
        assert_eq!(std::fs::read_to_string(&original).unwrap(), "old");
    }

    #[test]
    fn test_snapshot_carries_view_hints() {
        let mut buffer = Buffer::new("a".into(), PathBuf::from("/p/a.gcode"));
        buffer.set_text("G28");
        buffer.selection = (1, 3);
        buffer.scroll = 7;

        let snapshot = buffer.snapshot();
        assert_eq!(snapshot.text, "G28");
        assert_eq!(snapshot.selection, (1, 3));
        assert_eq!(snapshot.scroll, 7);
    }
}
