//! 文件服务模块
//!
//! 提供文件系统抽象，控制器不直接调用 std::fs

pub mod local;
pub mod provider;

pub use local::LocalFileProvider;
pub use provider::{FileError, FileProvider};
