//! 字节与文本之间的编解码
//!
//! 顺序：BOM → `<?xml encoding="..."?>` 声明 → 默认编码。
//! 解码从不失败，无法解码的序列替换为 U+FFFD。

use regex::bytes::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

/// 声明嗅探只看文件开头这么多字节
const SNIFF_LIMIT: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextEncoding {
    Utf8,
    Utf16Le,
    Utf16Be,
    Latin1,
    Ascii,
    Windows1252,
}

impl TextEncoding {
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim().to_ascii_lowercase();
        let enc = match label.as_str() {
            "utf-8" | "utf8" => TextEncoding::Utf8,
            "utf-16" | "utf16" | "utf-16le" => TextEncoding::Utf16Le,
            "utf-16be" => TextEncoding::Utf16Be,
            "iso-8859-1" | "iso8859-1" | "iso_8859-1" | "latin1" | "latin-1" | "l1" => {
                TextEncoding::Latin1
            }
            "us-ascii" | "ascii" => TextEncoding::Ascii,
            "windows-1252" | "cp1252" => TextEncoding::Windows1252,
            _ => return None,
        };
        Some(enc)
    }

    pub fn name(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "UTF-8",
            TextEncoding::Utf16Le => "UTF-16LE",
            TextEncoding::Utf16Be => "UTF-16BE",
            TextEncoding::Latin1 => "ISO-8859-1",
            TextEncoding::Ascii => "US-ASCII",
            TextEncoding::Windows1252 => "windows-1252",
        }
    }

    fn is_utf16(&self) -> bool {
        matches!(self, TextEncoding::Utf16Le | TextEncoding::Utf16Be)
    }
}

impl Default for TextEncoding {
    fn default() -> Self {
        TextEncoding::Utf8
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub text: String,
    pub encoding: TextEncoding,
    /// 是否发生过替换
    pub lossy: bool,
}

fn declaration_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^\s*<\?xml\s[^>]*?encoding\s*=\s*["']([A-Za-z][A-Za-z0-9._\-]*)["']"#).ok()
    })
    .as_ref()
}

/// 检测 BOM，返回编码和 BOM 长度
pub fn sniff_bom(bytes: &[u8]) -> Option<(TextEncoding, usize)> {
    match bytes {
        [0xEF, 0xBB, 0xBF, ..] => Some((TextEncoding::Utf8, 3)),
        [0xFF, 0xFE, ..] => Some((TextEncoding::Utf16Le, 2)),
        [0xFE, 0xFF, ..] => Some((TextEncoding::Utf16Be, 2)),
        // 无 BOM 的 UTF-16："<?" 的两种字节序
        [0x3C, 0x00, 0x3F, 0x00, ..] => Some((TextEncoding::Utf16Le, 0)),
        [0x00, 0x3C, 0x00, 0x3F, ..] => Some((TextEncoding::Utf16Be, 0)),
        _ => None,
    }
}

/// 从 XML 声明中读取编码标签
pub fn sniff_declaration(bytes: &[u8]) -> Option<&str> {
    let head = &bytes[..bytes.len().min(SNIFF_LIMIT)];
    let caps = declaration_re()?.captures(head)?;
    std::str::from_utf8(caps.get(1)?.as_bytes()).ok()
}

/// 确定文档实际使用的编码，返回编码和需要跳过的 BOM 长度
pub fn detect(bytes: &[u8], fallback: TextEncoding) -> (TextEncoding, usize) {
    if let Some(found) = sniff_bom(bytes) {
        return found;
    }

    match sniff_declaration(bytes).map(|label| (label, TextEncoding::from_label(label))) {
        // ASCII 兼容的字节流里声明 UTF-16 不可能成立
        Some((_, Some(enc))) if !enc.is_utf16() => (enc, 0),
        Some((label, _)) => {
            tracing::debug!(label, fallback = fallback.name(), "unsupported encoding label");
            (fallback, 0)
        }
        None => (fallback, 0),
    }
}

pub fn decode(bytes: &[u8], fallback: TextEncoding) -> Decoded {
    let (encoding, skip) = detect(bytes, fallback);
    let body = &bytes[skip..];

    let (text, lossy) = match encoding {
        TextEncoding::Utf8 => match String::from_utf8_lossy(body) {
            Cow::Borrowed(s) => (s.to_string(), false),
            Cow::Owned(s) => (s, true),
        },
        TextEncoding::Utf16Le => decode_utf16(body, u16::from_le_bytes),
        TextEncoding::Utf16Be => decode_utf16(body, u16::from_be_bytes),
        TextEncoding::Latin1 => (body.iter().map(|&b| b as char).collect(), false),
        TextEncoding::Ascii => {
            let lossy = body.iter().any(|b| !b.is_ascii());
            let text = body
                .iter()
                .map(|&b| {
                    if b.is_ascii() {
                        b as char
                    } else {
                        char::REPLACEMENT_CHARACTER
                    }
                })
                .collect();
            (text, lossy)
        }
        TextEncoding::Windows1252 => (body.iter().map(|&b| windows_1252(b)).collect(), false),
    };

    if lossy {
        tracing::debug!(encoding = encoding.name(), "undecodable bytes replaced");
    }

    Decoded {
        text,
        encoding,
        lossy,
    }
}

fn decode_utf16(body: &[u8], to_unit: fn([u8; 2]) -> u16) -> (String, bool) {
    let mut lossy = false;
    let units = body.chunks_exact(2).map(|pair| to_unit([pair[0], pair[1]]));
    let mut text: String = char::decode_utf16(units)
        .map(|r| {
            r.unwrap_or_else(|_| {
                lossy = true;
                char::REPLACEMENT_CHARACTER
            })
        })
        .collect();

    if body.len() % 2 == 1 {
        lossy = true;
        text.push(char::REPLACEMENT_CHARACTER);
    }
    (text, lossy)
}

/// 0x80..=0x9F 区间与 Latin-1 不同，其余一致；未定义位置按 C1 控制字符处理
const WINDOWS_1252_HIGH: [u32; 32] = [
    0x20AC, 0x0081, 0x201A, 0x0192, 0x201E, 0x2026, 0x2020, 0x2021, 0x02C6, 0x2030, 0x0160, 0x2039,
    0x0152, 0x008D, 0x017D, 0x008F, 0x0090, 0x2018, 0x2019, 0x201C, 0x201D, 0x2022, 0x2013, 0x2014,
    0x02DC, 0x2122, 0x0161, 0x203A, 0x0153, 0x009D, 0x017E, 0x0178,
];

fn windows_1252(b: u8) -> char {
    match b {
        0x80..=0x9F => char::from_u32(WINDOWS_1252_HIGH[(b - 0x80) as usize])
            .unwrap_or(char::REPLACEMENT_CHARACTER),
        _ => b as char,
    }
}

fn to_windows_1252(c: char) -> Option<u8> {
    let code = u32::from(c);
    match code {
        0x00..=0x7F | 0xA0..=0xFF => u8::try_from(code).ok(),
        _ => WINDOWS_1252_HIGH
            .iter()
            .position(|&high| high == code)
            .and_then(|i| u8::try_from(0x80 + i).ok()),
    }
}

/// 保存时使用的编码，保证重新读取时 `detect` 得到同一个编码：
/// UTF-16 保持不变（写出时带 BOM），否则以文本自身的编码声明为准，没有可用声明时用默认编码
pub fn encoding_for_save(text: &str, loaded: TextEncoding, fallback: TextEncoding) -> TextEncoding {
    if loaded.is_utf16() {
        return loaded;
    }
    match sniff_declaration(text.as_bytes()).and_then(TextEncoding::from_label) {
        Some(enc) if !enc.is_utf16() => enc,
        _ => fallback,
    }
}

/// 文本 → 字节；目标编码无法表示的字符写为 `?`
pub fn encode(text: &str, encoding: TextEncoding) -> Vec<u8> {
    let mut lossy = false;
    let mut narrow = |byte: Option<u8>| {
        byte.unwrap_or_else(|| {
            lossy = true;
            b'?'
        })
    };

    let bytes = match encoding {
        TextEncoding::Utf8 => text.as_bytes().to_vec(),
        TextEncoding::Utf16Le => [0xFF, 0xFE]
            .into_iter()
            .chain(text.encode_utf16().flat_map(u16::to_le_bytes))
            .collect(),
        TextEncoding::Utf16Be => [0xFE, 0xFF]
            .into_iter()
            .chain(text.encode_utf16().flat_map(u16::to_be_bytes))
            .collect(),
        TextEncoding::Latin1 => text
            .chars()
            .map(|c| narrow(u8::try_from(u32::from(c)).ok()))
            .collect(),
        TextEncoding::Ascii => text
            .chars()
            .map(|c| narrow(c.is_ascii().then_some(c as u8)))
            .collect(),
        TextEncoding::Windows1252 => text.chars().map(|c| narrow(to_windows_1252(c))).collect(),
    };

    if lossy {
        tracing::warn!(encoding = encoding.name(), "unencodable characters written as '?'");
    }
    bytes
}

#[cfg(test)]
#[path = "../../tests/unit/xml/decode.rs"]
mod tests;
