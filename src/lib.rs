//! xtree - XML 文档编辑核心
//!
//! 同时维护两种表示：可编辑的平面文本，以及镜像文档结构的树视图。
//!
//! 模块结构：
//! - xml: 解码与解析（字节 → 文档树）
//! - projection: 文档树 → 树视图节点
//! - models: 数据模型（Document, ProjectedNode, TextBuffer, DocumentStore）
//! - services: 服务层（FileProvider, ConfigService, SyncController）

pub mod models;
pub mod projection;
pub mod services;
pub mod xml;
