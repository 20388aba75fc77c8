//! 服务层模块
//!
//! - FileProvider: 文件系统抽象
//! - ConfigService: 配置服务
//! - SyncController: 加载 / 保存 / 重新解析的状态机

pub mod config;
pub mod file;
pub mod paths;
pub mod sync;

pub use config::{ConfigService, EditorConfig};
pub use file::{FileError, FileProvider, LocalFileProvider};
pub use sync::{SaveDecision, SaveReport, SyncController, SyncError, SyncState};
