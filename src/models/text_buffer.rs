//! 文本缓冲区模型
//!
//! 职责：
//! - 文本存储（Rope）
//! - 修改标记
//! - 以字符偏移为单位的编辑

use ropey::Rope;
use std::ops::Range;

#[derive(Clone, Default)]
pub struct TextBuffer {
    rope: Rope,
    modified: bool,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            modified: false,
        }
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn len_lines(&self) -> usize {
        self.rope.len_lines()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn set_modified(&mut self, modified: bool) {
        self.modified = modified;
    }

    // ==================== 编辑 ====================

    /// 在字符偏移处插入，越界时追加到末尾
    pub fn insert(&mut self, char_idx: usize, text: &str) {
        if text.is_empty() {
            return;
        }
        let at = char_idx.min(self.rope.len_chars());
        self.rope.insert(at, text);
        self.modified = true;
    }

    /// 删除字符区间，返回被删除的文本
    pub fn delete(&mut self, range: Range<usize>) -> String {
        let len = self.rope.len_chars();
        let start = range.start.min(len);
        let end = range.end.clamp(start, len);
        if start == end {
            return String::new();
        }
        let deleted = self.rope.slice(start..end).to_string();
        self.rope.remove(start..end);
        self.modified = true;
        deleted
    }

    pub fn replace_all(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        self.modified = true;
    }

    /// 整体替换内容并清除修改标记（加载 / 新建时使用）
    pub fn reset(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        self.modified = false;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/text_buffer.rs"]
mod tests;
