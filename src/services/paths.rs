//! 应用目录
//!
//! 日志与配置都放在平台的数据目录下：
//! macOS ~/Library/Application Support/xtree，Linux $XDG_DATA_HOME/xtree
//! （默认 ~/.local/share/xtree），Windows %APPDATA%\xtree

use std::path::PathBuf;

const APP_NAME: &str = "xtree";

fn data_dir() -> Option<PathBuf> {
    let home = || std::env::var_os("HOME").map(PathBuf::from);
    let base = if cfg!(target_os = "windows") {
        std::env::var_os("APPDATA").map(PathBuf::from)
    } else if cfg!(target_os = "macos") {
        home().map(|h| h.join("Library/Application Support"))
    } else {
        std::env::var_os("XDG_DATA_HOME")
            .map(PathBuf::from)
            .or_else(|| home().map(|h| h.join(".local/share")))
    };
    base.map(|dir| dir.join(APP_NAME))
}

/// 确保日志目录存在
pub fn ensure_log_dir() -> std::io::Result<PathBuf> {
    let dir = data_dir()
        .map(|dir| dir.join("logs"))
        .ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Cannot determine log directory",
            )
        })?;
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

pub fn get_settings_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("settings.json"))
}
