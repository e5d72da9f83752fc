//! 项目模型
//!
//! 一个项目 = 一个目录 + 有序的缓冲区列表（0 号永远是主文件）+ 活动索引。
//! 前端在任何读取内容的操作（保存、重命名、切走）之前必须先 flush，
//! 模型里存的只是最近一次 flush 的快照。
//!
//! 错误在操作边界上全部转成用户提示并中止本次操作，不向上传播为致命错误。
//! 主文件重命名是一串不可回滚的步骤：已完成的步骤失败后不恢复。

use compact_str::CompactString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::effect::{BufferSnapshot, Effect};
use crate::models::buffer::Buffer;
use crate::services::config::ProjectConfig;
use crate::services::file::{FileError, FileProvider};
use crate::services::notify::Notifier;
use crate::services::picker::SaveAsPicker;

pub type Result<T> = std::result::Result<T, ProjectError>;

#[derive(Debug)]
pub enum ProjectError {
    /// 空名、纯扩展名等，在任何 IO 之前就被拒绝
    Validation(String),
    /// 目标路径或隐藏标记已存在
    Collision(PathBuf),
    Io(FileError),
    /// 有脏缓冲区落在不可写文件上
    ReadOnly,
    /// 用户取消了选择器
    Cancelled,
}

impl std::fmt::Display for ProjectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectError::Validation(name) => write!(f, "Invalid name: {:?}", name),
            ProjectError::Collision(p) => write!(f, "Already exists: {}", p.display()),
            ProjectError::Io(e) => write!(f, "IO error: {}", e),
            ProjectError::ReadOnly => write!(f, "Project is read-only"),
            ProjectError::Cancelled => write!(f, "Cancelled by user"),
        }
    }
}

impl std::error::Error for ProjectError {}

impl From<FileError> for ProjectError {
    fn from(e: FileError) -> Self {
        ProjectError::Io(e)
    }
}

/// 切换缓冲区的结果；越界 / 找不到不改状态，由调用方决定是否当错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Switch {
    Switched {
        index: usize,
        snapshot: BufferSnapshot,
    },
    AlreadyCurrent,
    OutOfRange,
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameMode {
    Create,
    Rename,
}

pub struct Project {
    /// 主文件的 stem
    name: CompactString,
    folder: PathBuf,
    buffers: Vec<Buffer>,
    active: usize,
    config: ProjectConfig,
    fs: Arc<dyn FileProvider>,
    notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for Project {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Project")
            .field("name", &self.name)
            .field("folder", &self.folder)
            .field("buffers", &self.buffers.len())
            .field("active", &self.active)
            .finish()
    }
}

impl Project {
    /// 从主文件路径打开项目。路径缺扩展名时补上规范扩展名。
    ///
    /// 当前版本只加载主文件本身；目录扫描留作多文件扩展。
    pub fn open(
        fs: Arc<dyn FileProvider>,
        notifier: Arc<dyn Notifier>,
        config: ProjectConfig,
        main_path: &Path,
    ) -> Result<Self> {
        let file_name = main_path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .ok_or_else(|| ProjectError::Validation(main_path.display().to_string()))?;

        let (name, main_file_name) = match config.strip_extension(&file_name) {
            Some(stem) => (stem.to_string(), file_name.clone()),
            None => (file_name.clone(), config.canonical_file_name(&file_name)),
        };

        let folder = main_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let mut project = Self {
            name: name.into(),
            folder,
            buffers: Vec::new(),
            active: 0,
            config,
            fs,
            notifier,
        };
        project.load(&main_file_name)?;
        info!(name = %project.name, folder = %project.folder.display(), "project opened");
        Ok(project)
    }

    fn load(&mut self, main_file_name: &str) -> Result<()> {
        self.buffers.clear();
        let file = self.folder.join(main_file_name);
        let buffer = Buffer::load(self.name.clone(), file, self.fs.as_ref())?;
        self.buffers.push(buffer);
        self.sort_buffers();
        self.active = 0;
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn buffers(&self) -> &[Buffer] {
        &self.buffers
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_buffer(&self) -> &Buffer {
        &self.buffers[self.active]
    }

    pub fn main_file_path(&self) -> PathBuf {
        self.buffers[0].file.clone()
    }

    /// 派生值：任何缓冲区脏则项目脏。每次全扫，不维护增量标记。
    pub fn is_modified(&self) -> bool {
        self.buffers.iter().any(|b| b.modified)
    }

    pub fn active_snapshot(&self) -> BufferSnapshot {
        self.buffers[self.active].snapshot()
    }

    /// 前端在读内容的操作之前必须调用：把活动缓冲区的文本和视图状态推进来
    pub fn flush(&mut self, text: &str, selection: (usize, usize), scroll: usize) {
        let buffer = &mut self.buffers[self.active];
        buffer.set_text(text);
        buffer.selection = selection;
        buffer.scroll = scroll;
    }

    // 排序规则：主文件永远在前，其余按名字典序。每次结构变更后重排。
    fn sort_buffers(&mut self) {
        let main = self.name.clone();
        self.buffers.sort_by(|a, b| {
            (a.name != main)
                .cmp(&(b.name != main))
                .then_with(|| a.name.cmp(&b.name))
        });
    }

    pub fn set_current(&mut self, index: usize) -> Switch {
        if index >= self.buffers.len() {
            return Switch::OutOfRange;
        }
        if index == self.active {
            return Switch::AlreadyCurrent;
        }
        self.active = index;
        Switch::Switched {
            index,
            snapshot: self.buffers[index].snapshot(),
        }
    }

    /// 按名字切换；第一个 `.` 及之后全部剔除，之后精确匹配（大小写敏感）
    pub fn set_current_by_name(&mut self, name: &str) -> Switch {
        let bare = name.split('.').next().unwrap_or(name);
        match self.buffers.iter().position(|b| b.name == bare) {
            Some(index) => self.set_current(index),
            None => Switch::NotFound,
        }
    }

    pub fn prev_buffer(&mut self) -> Switch {
        let prev = if self.active == 0 {
            self.buffers.len() - 1
        } else {
            self.active - 1
        };
        self.set_current(prev)
    }

    pub fn next_buffer(&mut self) -> Switch {
        self.set_current((self.active + 1) % self.buffers.len())
    }

    /// 新建文件的前置门：项目只读时提示并拒绝进入命名流程
    pub fn begin_create(&mut self) -> Result<()> {
        self.begin_naming()
    }

    /// 重命名的前置门，同上
    pub fn begin_rename(&mut self) -> Result<()> {
        self.begin_naming()
    }

    fn begin_naming(&mut self) -> Result<()> {
        self.ensure_existence();

        if self.is_read_only() {
            self.notifier.show_info(
                "Project is read-only",
                "Some files are marked \"read-only\", so you'll need to \
                 re-save the project in another location, and try again.",
            );
            return Err(ProjectError::ReadOnly);
        }
        Ok(())
    }

    /// 命名流程的唯一入口（新建 / 重命名共用，在中间分叉）。
    ///
    /// 失败已经通过 Notifier 报告过；Err 只是给调用方的结果码。
    pub fn name_buffer(&mut self, new_name: &str, mode: NameMode) -> Result<Vec<Effect>> {
        self.ensure_existence();

        let trimmed = new_name.trim();
        if trimmed.is_empty() || trimmed == self.config.extension {
            self.notifier.show_warning(
                "Invalid name",
                &format!("\"{}\" is not a valid buffer name.", new_name),
                None,
            );
            return Err(ProjectError::Validation(new_name.to_string()));
        }

        // 规范化成恰好带一个规范后缀
        let stem = self
            .config
            .strip_extension(trimmed)
            .unwrap_or(trimmed)
            .to_string();
        let file_name = self.config.canonical_file_name(&stem);

        // 重命名成自己现在的名字：静默成功（大小写不敏感，照顾各平台文件系统）
        if mode == NameMode::Rename
            && stem.to_lowercase() == self.buffers[self.active].name.to_lowercase()
        {
            return Ok(Vec::new());
        }

        let target = self.folder.join(&file_name);
        if self.fs.exists(&target) {
            self.notifier.show_warning(
                "Name collision",
                &format!(
                    "A file named \"{}\" already exists in \"{}\".",
                    file_name,
                    self.folder.display()
                ),
                None,
            );
            return Err(ProjectError::Collision(target));
        }

        // 与隐藏的缓冲区同名也不行
        let hidden = self
            .folder
            .join(format!("{}{}", file_name, self.config.hidden_suffix));
        if self.fs.exists(&hidden) {
            self.notifier.show_warning(
                "Name collision",
                "A hidden buffer with the same name already exists.",
                None,
            );
            return Err(ProjectError::Collision(hidden));
        }

        let mut effects = Vec::new();
        match mode {
            NameMode::Rename if self.active == 0 => {
                effects.extend(self.rename_main(&stem, &target)?);
            }
            NameMode::Rename => {
                if let Err(e) = self.fs.rename(&self.buffers[self.active].file, &target) {
                    self.notifier.show_warning(
                        "Error",
                        &format!(
                            "Could not rename \"{}\" to \"{}\".",
                            self.buffers[self.active].file_name(),
                            file_name
                        ),
                        Some(&e),
                    );
                    return Err(ProjectError::Io(e));
                }
                let buffer = &mut self.buffers[self.active];
                buffer.name = stem.as_str().into();
                buffer.file = target;
            }
            NameMode::Create => {
                if let Err(e) = self.fs.write_file(&target, "") {
                    self.notifier.show_warning(
                        "Error",
                        &format!(
                            "Could not create \"{}\" in \"{}\".",
                            file_name,
                            self.folder.display()
                        ),
                        Some(&e),
                    );
                    return Err(ProjectError::Io(e));
                }
                self.insert_buffer(Buffer::new(stem.as_str().into(), target));
            }
        }

        self.sort_buffers();
        if let Switch::Switched { index, snapshot } = self.set_current_by_name(&file_name) {
            effects.push(Effect::LoadBuffer { index, snapshot });
        }
        effects.push(Effect::RebuildTabs);
        Ok(effects)
    }

    /// 主文件重命名意味着重命名项目目录本身。
    ///
    /// 步骤固定：存活动缓冲区 -> 旧目录内改主文件名 -> 存其余脏缓冲区 ->
    /// 改目录名。任何一步失败即中止，已完成的步骤不回滚。
    fn rename_main(&mut self, stem: &str, target: &Path) -> Result<Vec<Effect>> {
        let parent = self
            .folder
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let new_folder = parent.join(stem);
        if self.fs.exists(&new_folder) {
            self.notifier.show_warning(
                "Cannot rename",
                &format!("A project (or folder) named \"{}\" already exists.", stem),
                None,
            );
            return Err(ProjectError::Collision(new_folder));
        }

        if self.buffers[0].modified {
            if let Err(e) = self.buffers[0].save(self.fs.as_ref()) {
                self.notifier
                    .show_warning("Error", "Could not rename the project. (0)", Some(&e));
                return Err(ProjectError::Io(e));
            }
        }

        if let Err(e) = self.fs.rename(&self.buffers[0].file, target) {
            self.notifier.show_warning(
                "Error",
                &format!(
                    "Could not rename \"{}\" to \"{}\".",
                    self.buffers[0].file_name(),
                    target.display()
                ),
                Some(&e),
            );
            return Err(ProjectError::Io(e));
        }
        // 主文件已经在旧目录里改了名，从这里开始失败会留下中间状态
        self.buffers[0].file = target.to_path_buf();

        for buffer in self.buffers.iter_mut().skip(1) {
            if buffer.modified {
                if let Err(e) = buffer.save(self.fs.as_ref()) {
                    self.notifier.show_warning(
                        "Error",
                        "Could not rename the project. (1)",
                        Some(&e),
                    );
                    return Err(ProjectError::Io(e));
                }
            }
        }

        if let Err(e) = self.fs.rename(&self.folder, &new_folder) {
            self.notifier
                .show_warning("Error", "Could not rename the project. (2)", Some(&e));
            return Err(ProjectError::Io(e));
        }

        // 全部成功：迁移模型里的路径，让前端从新位置整体重开
        self.folder = new_folder.clone();
        self.name = stem.into();
        self.buffers[0].name = stem.into();
        for buffer in self.buffers.iter_mut() {
            let file_name = buffer.file_name();
            buffer.file = new_folder.join(file_name);
        }

        info!(folder = %self.folder.display(), "project renamed");
        let main = &self.buffers[0];
        Ok(vec![Effect::ReopenProject {
            main_file: main.file.clone(),
            active_index: self.active,
            selection: main.selection,
            scroll: main.scroll,
        }])
    }

    fn insert_buffer(&mut self, buffer: Buffer) {
        self.ensure_existence();
        self.buffers.push(buffer);
    }

    /// 保存所有脏缓冲区。只读项目先强制走 Save As，
    /// 取消则整个保存放弃（Err(Cancelled)），一个字节都不写。
    pub fn save(&mut self, picker: &dyn SaveAsPicker) -> Result<Vec<Effect>> {
        self.ensure_existence();

        let mut effects = Vec::new();
        if self.is_read_only() {
            self.notifier.show_info(
                "Project is read-only",
                "Some files are marked \"read-only\", so you'll need to \
                 re-save this project to another location.",
            );
            effects.extend(self.save_as(picker)?);
        }

        for buffer in self.buffers.iter_mut() {
            if buffer.modified {
                if let Err(e) = buffer.save(self.fs.as_ref()) {
                    self.notifier.show_warning(
                        "Error saving",
                        &format!("Could not save \"{}\".", buffer.file_name()),
                        Some(&e),
                    );
                    return Err(ProjectError::Io(e));
                }
            }
        }

        effects.push(Effect::RepaintModified);
        Ok(effects)
    }

    /// Save As：把每个缓冲区按现有文件名复制到选中的目录（纯复制重定向，
    /// 不动原目录），然后让前端从新位置重开。取消是无副作用的 Err(Cancelled)。
    pub fn save_as(&mut self, picker: &dyn SaveAsPicker) -> Result<Vec<Effect>> {
        let initial_dir = if self.is_read_only() {
            self.config
                .library_dir
                .clone()
                .unwrap_or_else(|| self.folder.clone())
        } else {
            self.folder
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."))
        };
        let default_name = self
            .folder
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| self.name.to_string());

        let Some(dest) = picker.pick_destination(&initial_dir, &default_name) else {
            return Err(ProjectError::Cancelled);
        };

        // 选中的名字只规范化扩展名；复制沿用每个缓冲区现有的文件名
        let picked = self
            .config
            .canonical_file_name(self.config.strip_extension(&dest.name).unwrap_or(&dest.name));
        info!(dir = %dest.dir.display(), name = %picked, "save as");

        if let Err(e) = self.fs.create_dir_all(&dest.dir) {
            self.notifier.show_warning(
                "Error saving",
                &format!("Could not create \"{}\".", dest.dir.display()),
                Some(&e),
            );
            return Err(ProjectError::Io(e));
        }

        for buffer in self.buffers.iter_mut() {
            let dest_file = dest.dir.join(buffer.file_name());
            if let Err(e) = buffer.save_to(self.fs.as_ref(), dest_file) {
                self.notifier.show_warning(
                    "Error saving",
                    &format!("Could not save \"{}\".", buffer.file_name()),
                    Some(&e),
                );
                return Err(ProjectError::Io(e));
            }
        }
        self.folder = dest.dir;

        let main = &self.buffers[0];
        Ok(vec![Effect::ReopenProject {
            main_file: main.file.clone(),
            active_index: self.active,
            selection: main.selection,
            scroll: main.scroll,
        }])
    }

    /// 把外部文件复制进项目目录并作为新缓冲区加入
    pub fn add_file(&mut self, source: &Path) -> Result<Vec<Effect>> {
        let file_name = source
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .ok_or_else(|| ProjectError::Validation(source.display().to_string()))?;
        let dest = self.folder.join(&file_name);

        // 源和目标相同：提示而不是报错
        if source == dest {
            self.notifier.show_warning(
                "File already added",
                "This file is already in the location you are trying to add it to.",
                None,
            );
            return Ok(Vec::new());
        }

        if let Err(e) = self.fs.copy(source, &dest) {
            self.notifier.show_warning(
                "Error adding file",
                &format!("Could not add \"{}\" to the project.", file_name),
                Some(&e),
            );
            return Err(ProjectError::Io(e));
        }

        let name = self
            .config
            .strip_extension(&file_name)
            .unwrap_or(&file_name)
            .to_string();
        let buffer = match Buffer::load(name.as_str().into(), dest, self.fs.as_ref()) {
            Ok(buffer) => buffer,
            Err(e) => {
                self.notifier.show_warning(
                    "Error adding file",
                    &format!("Could not add \"{}\" to the project.", file_name),
                    Some(&e),
                );
                return Err(ProjectError::Io(e));
            }
        };
        self.insert_buffer(buffer);
        self.sort_buffers();

        info!(name = %name, "file added");
        let mut effects = Vec::new();
        if let Switch::Switched { index, snapshot } = self.set_current_by_name(&name) {
            effects.push(Effect::LoadBuffer { index, snapshot });
        }
        effects.push(Effect::RebuildTabs);
        effects.push(Effect::RepaintModified);
        Ok(effects)
    }

    /// 项目目录被外部删掉时的自救：警告、重建目录、强制保存所有缓冲区。
    /// 之前的磁盘副本已丢失，只有内存内容幸存。恢复失败只报告，不重试。
    pub fn ensure_existence(&mut self) {
        if self.fs.is_dir(&self.folder) {
            return;
        }

        self.notifier.show_warning(
            "Project folder disappeared",
            "The project folder has disappeared. Will attempt to re-save \
             in the same location, but anything besides the buffers will be lost.",
            None,
        );

        if let Err(e) = self.fs.create_dir_all(&self.folder) {
            self.notifier.show_warning(
                "Could not re-save project",
                "Could not properly re-save the project. \
                 It might be time to copy your buffers to another editor.",
                Some(&e),
            );
            return;
        }

        for buffer in self.buffers.iter_mut() {
            buffer.modified = true;
            if let Err(e) = buffer.save(self.fs.as_ref()) {
                self.notifier.show_warning(
                    "Could not re-save project",
                    "Could not properly re-save the project. \
                     It might be time to copy your buffers to another editor.",
                    Some(&e),
                );
                return;
            }
        }
    }

    /// 只读判定：只看“脏且磁盘文件存在但不可写”的缓冲区。
    /// 干净的缓冲区和不存在的文件从不挡路。
    pub fn is_read_only(&self) -> bool {
        self.buffers.iter().any(|b| {
            b.modified
                && self.fs.exists(&b.file)
                && self
                    .fs
                    .metadata(&b.file)
                    .map(|m| m.readonly)
                    .unwrap_or(false)
        })
    }
}
