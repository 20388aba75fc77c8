//! 数据模型层

pub mod document;
pub mod document_store;
pub mod projected;
pub mod text_buffer;

pub use document::{Attribute, DocNode, Document, Element};
pub use document_store::DocumentStore;
pub use projected::{ProjectedNode, TreeRow};
pub use text_buffer::TextBuffer;
