//! 字节偏移 → 行列，以及名称字符校验

use super::error::Position;
use memchr::{memchr_iter, memrchr};

/// `src[..offset]` 之后的位置；偏移落在多字节字符内部时向前取整
pub(crate) fn position_at(src: &str, offset: usize) -> Position {
    let mut offset = offset.min(src.len());
    while !src.is_char_boundary(offset) {
        offset -= 1;
    }
    let head = &src[..offset];
    match memrchr(b'\n', head.as_bytes()) {
        Some(last) => Position {
            line: 1 + memchr_iter(b'\n', head.as_bytes()).count(),
            column: 1 + head[last + 1..].chars().count(),
        },
        None => Position {
            line: 1,
            column: 1 + head.chars().count(),
        },
    }
}

pub(crate) fn is_xml_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

pub(crate) fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | ':' | '-' | '.'))
}
