//! 配置服务：解析 / 投影参数与界面文案
//!
//! 配置文件为 JSON，缺失的字段取默认值，文件缺失或无法解析时整体使用默认配置。

use super::paths::get_settings_path;
use crate::projection::{ProjectOptions, DEFAULT_MAX_DEPTH};
use crate::xml::{ParseOptions, TextEncoding, DEFAULT_MAX_NESTING};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// 投影深度上限，根元素深度为 1
    pub max_depth: usize,
    /// 解析时允许的最大嵌套层数
    pub max_nesting: usize,
    /// 没有 BOM 和编码声明时使用的编码
    pub default_encoding: String,
    pub keep_whitespace_text: bool,
    pub app_name: String,
    pub untitled_name: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_nesting: DEFAULT_MAX_NESTING,
            default_encoding: "utf-8".to_string(),
            keep_whitespace_text: false,
            app_name: "XML editor".to_string(),
            untitled_name: "untitled.txt".to_string(),
        }
    }
}

impl EditorConfig {
    pub fn default_encoding(&self) -> TextEncoding {
        TextEncoding::from_label(&self.default_encoding).unwrap_or_else(|| {
            tracing::warn!(
                label = %self.default_encoding,
                "unknown default encoding in settings, using UTF-8"
            );
            TextEncoding::Utf8
        })
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            default_encoding: self.default_encoding(),
            keep_whitespace: self.keep_whitespace_text,
            max_nesting: self.max_nesting.max(1),
        }
    }

    pub fn project_options(&self) -> ProjectOptions {
        ProjectOptions {
            max_depth: self.max_depth.max(1),
        }
    }
}

pub struct ConfigService {
    editor: EditorConfig,
}

impl ConfigService {
    pub fn new() -> Self {
        Self {
            editor: EditorConfig::default(),
        }
    }

    pub fn with_editor_config(editor: EditorConfig) -> Self {
        Self { editor }
    }

    /// 从默认位置加载，失败时使用默认配置
    pub fn load() -> Self {
        let editor = get_settings_path()
            .and_then(|path| load_settings_from(&path))
            .unwrap_or_default();
        Self { editor }
    }

    pub fn editor(&self) -> &EditorConfig {
        &self.editor
    }

    pub fn set_max_depth(&mut self, depth: usize) {
        self.editor.max_depth = depth;
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}

pub fn load_settings_from(path: &Path) -> Option<EditorConfig> {
    let data = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&data) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "invalid settings file");
            None
        }
    }
}

/// 配置文件不存在时写入默认配置，返回其路径
pub fn ensure_settings_file() -> std::io::Result<PathBuf> {
    let path = get_settings_path().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::NotFound, "Cannot determine settings path")
    })?;
    write_default_settings(&path)?;
    Ok(path)
}

pub fn write_default_settings(path: &Path) -> std::io::Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(&EditorConfig::default())?;
    std::fs::write(path, content)
}

#[cfg(test)]
#[path = "../../tests/unit/services/config.rs"]
mod tests;
