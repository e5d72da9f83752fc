//! 项目配置
//!
//! 规范扩展名、隐藏标记后缀、库目录，持久化为 JSON：
//! - macOS: ~/Library/Application Support/gproj/project.json
//! - Linux: ~/.local/share/gproj/project.json
//! - Windows: %APPDATA%\gproj\project.json

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub(crate) const APP_NAME: &str = "gproj";
const SETTINGS_FILE: &str = "project.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// 属于项目缓冲区集合的规范扩展名（含点）
    #[serde(default = "default_extension")]
    pub extension: String,
    /// 追加在规范文件名后表示“被隐藏”的标记后缀
    #[serde(default = "default_hidden_suffix")]
    pub hidden_suffix: String,
    /// 只读项目 Save As 时的默认起始目录
    #[serde(default)]
    pub library_dir: Option<PathBuf>,
}

fn default_extension() -> String {
    ".gcode".to_string()
}

fn default_hidden_suffix() -> String {
    ".x".to_string()
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            extension: default_extension(),
            hidden_suffix: default_hidden_suffix(),
            library_dir: None,
        }
    }
}

impl ProjectConfig {
    /// `stem` 加上规范扩展名
    pub fn canonical_file_name(&self, stem: &str) -> String {
        format!("{}{}", stem, self.extension)
    }

    /// 去掉规范扩展名（大小写不敏感）；不带扩展名时返回 None
    pub fn strip_extension<'a>(&self, file_name: &'a str) -> Option<&'a str> {
        let n = file_name.len();
        let e = self.extension.len();
        if n >= e
            && file_name.is_char_boundary(n - e)
            && file_name[n - e..].eq_ignore_ascii_case(&self.extension)
        {
            Some(&file_name[..n - e])
        } else {
            None
        }
    }

    pub fn has_extension(&self, file_name: &str) -> bool {
        self.strip_extension(file_name).is_some()
    }
}

/// 获取应用数据目录
pub(crate) fn get_app_data_dir() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        std::env::var("HOME").ok().map(|home| {
            PathBuf::from(home)
                .join("Library/Application Support")
                .join(APP_NAME)
        })
    }

    #[cfg(target_os = "linux")]
    {
        // 优先使用 XDG_DATA_HOME，否则使用 ~/.local/share
        if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
            Some(PathBuf::from(xdg).join(APP_NAME))
        } else {
            std::env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(".local/share").join(APP_NAME))
        }
    }

    #[cfg(target_os = "windows")]
    {
        std::env::var("APPDATA")
            .ok()
            .map(|appdata| PathBuf::from(appdata).join(APP_NAME))
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        None
    }
}

pub fn get_settings_path() -> Option<PathBuf> {
    get_app_data_dir().map(|dir| dir.join(SETTINGS_FILE))
}

pub fn ensure_settings_file() -> std::io::Result<PathBuf> {
    let path = get_settings_path().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Cannot determine settings directory",
        )
    })?;
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    if !path.exists() {
        let content = serde_json::to_string_pretty(&ProjectConfig::default())
            .unwrap_or_else(|_| "{}".to_string());
        std::fs::write(&path, content)?;
    }
    Ok(path)
}

pub fn load_settings() -> Option<ProjectConfig> {
    let path = get_settings_path()?;
    let data = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&data).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ProjectConfig::default();
        assert_eq!(config.extension, ".gcode");
        assert_eq!(config.hidden_suffix, ".x");
        assert!(config.library_dir.is_none());
    }

    #[test]
    fn test_canonical_file_name() {
        let config = ProjectConfig::default();
        assert_eq!(config.canonical_file_name("main"), "main.gcode");
    }

    #[test]
    fn test_strip_extension() {
        let config = ProjectConfig::default();
        assert_eq!(config.strip_extension("main.gcode"), Some("main"));
        assert_eq!(config.strip_extension("MAIN.GCODE"), Some("MAIN"));
        assert_eq!(config.strip_extension("main.txt"), None);
        assert_eq!(config.strip_extension("main"), None);
        assert!(config.has_extension("main.gcode"));
        assert!(!config.has_extension("main"));
        // 退化情形：纯扩展名文件
        assert_eq!(config.strip_extension(".gcode"), Some(""));
    }

    #[test]
    fn test_config_round_trips_as_json() {
        let config = ProjectConfig {
            extension: ".nc".to_string(),
            hidden_suffix: ".hidden".to_string(),
            library_dir: Some(PathBuf::from("/lib")),
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: ProjectConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.extension, ".nc");
        assert_eq!(back.hidden_suffix, ".hidden");
        assert_eq!(back.library_dir, Some(PathBuf::from("/lib")));
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let back: ProjectConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(back.extension, ".gcode");
        assert_eq!(back.hidden_suffix, ".x");
    }
}
