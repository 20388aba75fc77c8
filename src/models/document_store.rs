//! 文档存储：可编辑文本 + 最近一次成功解析的文档

use super::document::Document;
use super::text_buffer::TextBuffer;
use crate::xml::decode::encoding_for_save;
use crate::xml::{decode, encode, TextEncoding};

#[derive(Default)]
pub struct DocumentStore {
    buffer: TextBuffer,
    document: Option<Document>,
    /// 最近一次 `load_text` 采用的编码
    encoding: TextEncoding,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 解码字节并替换缓冲区内容，返回解码后的文本
    pub fn load_text(&mut self, bytes: &[u8], fallback: TextEncoding) -> String {
        let decoded = decode(bytes, fallback);
        self.buffer.reset(&decoded.text);
        self.encoding = decoded.encoding;
        decoded.text
    }

    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    /// 按重新读取时会检测到的编码写出缓冲区
    pub fn serialize(&self, fallback: TextEncoding) -> Vec<u8> {
        let text = self.buffer.text();
        encode(&text, encoding_for_save(&text, self.encoding, fallback))
    }

    pub fn mark_modified(&mut self, modified: bool) {
        self.buffer.set_modified(modified);
    }

    pub fn is_modified(&self) -> bool {
        self.buffer.is_modified()
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut TextBuffer {
        &mut self.buffer
    }

    pub fn text(&self) -> String {
        self.buffer.text()
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    /// 整体替换，不做原地修改
    pub fn set_document(&mut self, document: Option<Document>) {
        self.document = document;
    }

    pub fn clear(&mut self) {
        self.buffer.reset("");
        self.document = None;
    }
}
