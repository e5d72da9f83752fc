use std::path::PathBuf;

/// 某个缓冲区最近一次 flush 进来的视图快照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferSnapshot {
    pub text: String,
    pub selection: (usize, usize),
    pub scroll: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    LoadBuffer {
        index: usize,
        snapshot: BufferSnapshot,
    },
    ReopenProject {
        main_file: PathBuf,
        active_index: usize,
        selection: (usize, usize),
        scroll: usize,
    },
    RebuildTabs,
    RepaintModified,
}
