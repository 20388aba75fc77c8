//! XML 解析器
//!
//! 词法由 quick-xml 完成，这里负责建树和结构校验：
//! - 元素与属性、自闭合标签、文本、注释
//! - 实体引用（五个预定义实体与数字引用），未知或格式错误的引用报错
//! - CDATA 原样作为文本；处理指令与 DOCTYPE 跳过
//!
//! 使用显式的打开元素栈，不递归，任意嵌套都不会耗尽调用栈。
//! 行列号由字节偏移在解码后的文本上换算。

use super::decode::{decode, TextEncoding};
use super::error::{ParseError, ParseErrorKind, Position};
use super::location::{is_valid_name, is_xml_whitespace, position_at};
use crate::models::{Attribute, DocNode, Document, Element};
use memchr::{memchr, memchr_iter};
use quick_xml::errors::{Error as XmlError, IllFormedError, SyntaxError};
use quick_xml::escape::unescape;
use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Reader;
use std::borrow::Cow;

pub const DEFAULT_MAX_NESTING: usize = 4096;

#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// 没有 BOM 和编码声明时使用
    pub default_encoding: TextEncoding,
    /// 是否保留纯空白文本节点
    pub keep_whitespace: bool,
    pub max_nesting: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            default_encoding: TextEncoding::Utf8,
            keep_whitespace: false,
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }
}

pub fn parse(bytes: &[u8]) -> Result<Document, ParseError> {
    parse_with(bytes, &ParseOptions::default())
}

pub fn parse_with(bytes: &[u8], options: &ParseOptions) -> Result<Document, ParseError> {
    let decoded = decode(bytes, options.default_encoding);
    let root = parse_str(&decoded.text, options)?;
    Ok(Document {
        root,
        encoding: decoded.encoding,
    })
}

/// 解析已解码的文本，返回根元素
pub fn parse_str(text: &str, options: &ParseOptions) -> Result<Element, ParseError> {
    Parser::new(text, options).run()
}

struct OpenElement {
    element: Element,
    at: Position,
}

/// 相邻的文本与实体引用事件合并成一个文本节点
struct PendingText {
    value: String,
    blank: bool,
}

struct Parser<'a> {
    src: &'a str,
    options: &'a ParseOptions,
    stack: Vec<OpenElement>,
    root: Option<Element>,
    pending: Option<PendingText>,
    /// 上一个标记（标签、注释等）结束处的字节偏移
    markup_end: usize,
    /// 当前文本段已经读到的字节偏移
    text_cursor: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str, options: &'a ParseOptions) -> Self {
        Self {
            src,
            options,
            stack: Vec::new(),
            root: None,
            pending: None,
            markup_end: 0,
            text_cursor: 0,
        }
    }

    fn run(mut self) -> Result<Element, ParseError> {
        let mut reader = Reader::from_str(self.src);
        reader.config_mut().check_end_names = true;

        let mut buf = Vec::new();
        loop {
            let event = match reader.read_event_into(&mut buf) {
                Ok(event) => event,
                Err(e) => return Err(self.xml_error(e)),
            };
            let end = reader.buffer_position() as usize;

            match event {
                Event::Eof => break,
                Event::Text(e) => self.text(&e)?,
                Event::GeneralRef(r) => self.reference(&r)?,
                markup => {
                    self.flush_text();
                    self.markup(markup)?;
                    self.markup_end = end;
                    self.text_cursor = end;
                }
            }
            buf.clear();
        }
        self.flush_text();

        if let Some(open) = self.stack.last() {
            return Err(self.unclosed_error(open));
        }

        let at = position_at(self.src, self.src.len());
        self.root
            .ok_or_else(|| ParseError::new(at, ParseErrorKind::NoRootElement, "no root element found"))
    }

    /// 下一个标记的起始偏移：文本中不会出现 `<`
    fn markup_start(&self) -> usize {
        let rest = &self.src.as_bytes()[self.markup_end..];
        memchr(b'<', rest).map_or(self.src.len(), |i| self.markup_end + i)
    }

    fn utf8<'b>(&self, bytes: &'b [u8], offset: usize) -> Result<&'b str, ParseError> {
        std::str::from_utf8(bytes).map_err(|e| {
            ParseError::new(
                position_at(self.src, offset),
                ParseErrorKind::UnexpectedChar,
                format!("invalid UTF-8 in markup: {e}"),
            )
        })
    }

    fn markup(&mut self, event: Event<'_>) -> Result<(), ParseError> {
        match event {
            Event::Start(e) => {
                let (element, at) = self.start_tag(&e)?;
                self.stack.push(OpenElement { element, at });
            }
            Event::Empty(e) => {
                let (element, _) = self.start_tag(&e)?;
                self.close(element);
            }
            Event::End(e) => self.end_tag(&e)?,
            Event::Comment(e) => {
                let body = self.utf8(&e, self.markup_start())?.to_string();
                self.push_child(DocNode::Comment(body));
            }
            Event::CData(e) => {
                let start = self.markup_start();
                if self.stack.is_empty() {
                    return Err(ParseError::new(
                        position_at(self.src, start),
                        ParseErrorKind::TextOutsideRoot,
                        "CDATA is not allowed outside the root element",
                    ));
                }
                let body = self.utf8(&e, start)?.to_string();
                self.push_child(DocNode::Text(body));
            }
            Event::DocType(_) => {
                if !self.stack.is_empty() || self.root.is_some() {
                    return Err(ParseError::new(
                        position_at(self.src, self.markup_start()),
                        ParseErrorKind::UnexpectedChar,
                        "markup declarations are only allowed before the root element",
                    ));
                }
            }
            // XML 声明与处理指令
            _ => {}
        }
        Ok(())
    }

    fn push_child(&mut self, node: DocNode) {
        if let Some(open) = self.stack.last_mut() {
            open.element.children.push(node);
        }
    }

    fn append_text(&mut self, value: &str, blank: bool) {
        let pending = self.pending.get_or_insert_with(|| PendingText {
            value: String::new(),
            blank: true,
        });
        pending.value.push_str(value);
        pending.blank &= blank;
    }

    fn flush_text(&mut self) {
        let Some(text) = self.pending.take() else {
            return;
        };
        if text.blank && !self.options.keep_whitespace {
            return;
        }
        self.push_child(DocNode::Text(text.value));
    }

    fn text(&mut self, raw: &[u8]) -> Result<(), ParseError> {
        let offset = self.text_cursor;
        let raw = self.utf8(raw, offset)?;
        self.text_cursor += raw.len();
        let blank = raw.chars().all(is_xml_whitespace);

        if self.stack.is_empty() {
            if blank {
                return Ok(());
            }
            let lead = raw.len() - raw.trim_start_matches(is_xml_whitespace).len();
            return Err(ParseError::new(
                position_at(self.src, offset + lead),
                ParseErrorKind::TextOutsideRoot,
                "text is not allowed outside the root element",
            ));
        }

        if let Some(amp) = malformed_char_ref(raw) {
            return Err(ParseError::new(
                position_at(self.src, offset + amp),
                ParseErrorKind::InvalidEntity,
                "malformed character reference",
            ));
        }
        // 文本中可能残留的实体引用
        let value = unescape(raw).map_err(|e| {
            let amp = raw.find('&').unwrap_or(0);
            ParseError::new(
                position_at(self.src, offset + amp),
                ParseErrorKind::InvalidEntity,
                format!("invalid entity reference: {e}"),
            )
        })?;
        self.append_text(&value, blank);
        Ok(())
    }

    /// `&name;` 事件，`name` 不含 `&` 和 `;`
    fn reference(&mut self, name: &[u8]) -> Result<(), ParseError> {
        let offset = self.text_cursor;
        let name = self.utf8(name, offset)?;
        self.text_cursor += name.len() + 2;
        let at = position_at(self.src, offset);

        if self.stack.is_empty() {
            return Err(ParseError::new(
                at,
                ParseErrorKind::TextOutsideRoot,
                "text is not allowed outside the root element",
            ));
        }

        let entity = format!("&{name};");
        if malformed_char_ref(&entity).is_some() {
            return Err(ParseError::new(
                at,
                ParseErrorKind::InvalidEntity,
                format!("malformed character reference {entity}"),
            ));
        }
        let value = unescape(&entity).map_err(|e| {
            ParseError::new(
                at,
                ParseErrorKind::InvalidEntity,
                format!("invalid entity reference {entity}: {e}"),
            )
        })?;
        self.append_text(&value, false);
        Ok(())
    }

    fn start_tag(&self, e: &BytesStart<'_>) -> Result<(Element, Position), ParseError> {
        let start = self.markup_start();
        let at = position_at(self.src, start);
        let name = e.name();
        let tag = self.utf8(name.as_ref(), start)?;

        if !is_valid_name(tag) {
            return Err(ParseError::new(
                at,
                ParseErrorKind::InvalidName,
                format!("invalid element name '{tag}'"),
            ));
        }
        if self.stack.is_empty() && self.root.is_some() {
            return Err(ParseError::new(
                at,
                ParseErrorKind::MultipleRoots,
                format!("second root element <{tag}>; a document has exactly one root"),
            ));
        }
        if self.stack.len() >= self.options.max_nesting {
            return Err(ParseError::new(
                at,
                ParseErrorKind::TooDeep,
                format!(
                    "document too deeply nested (limit {})",
                    self.options.max_nesting
                ),
            ));
        }

        let mut element = Element::new(tag);
        for attr in e.attributes() {
            let attr = attr.map_err(|err| attr_error(err, at, tag))?;
            let name = self.utf8(attr.key.as_ref(), start)?;
            if !is_valid_name(name) {
                return Err(ParseError::new(
                    at,
                    ParseErrorKind::InvalidName,
                    format!("invalid attribute name '{name}' on <{tag}>"),
                ));
            }
            if element.attributes.iter().any(|a| a.name == name) {
                return Err(ParseError::new(
                    at,
                    ParseErrorKind::DuplicateAttribute,
                    format!("duplicate attribute '{name}' on <{tag}>"),
                ));
            }

            let raw = self.utf8(&attr.value, start)?;
            if raw.contains('<') {
                return Err(ParseError::new(
                    at,
                    ParseErrorKind::MalformedAttribute,
                    format!("'<' is not allowed in the value of attribute '{name}'"),
                ));
            }
            if malformed_char_ref(raw).is_some() {
                return Err(ParseError::new(
                    at,
                    ParseErrorKind::InvalidEntity,
                    format!("malformed character reference in attribute '{name}'"),
                ));
            }
            let literal = normalize_attr_whitespace(raw);
            let value = unescape(&literal).map_err(|err| {
                ParseError::new(
                    at,
                    ParseErrorKind::InvalidEntity,
                    format!("invalid entity reference in attribute '{name}': {err}"),
                )
            })?;
            element
                .attributes
                .push(Attribute::new(name, value.into_owned()));
        }
        Ok((element, at))
    }

    fn end_tag(&mut self, e: &BytesEnd<'_>) -> Result<(), ParseError> {
        let start = self.markup_start();
        let at = position_at(self.src, start);
        let name = e.name();
        let tag = self.utf8(name.as_ref(), start)?;

        let Some(open) = self.stack.pop() else {
            return Err(ParseError::new(
                at,
                ParseErrorKind::UnexpectedEndTag,
                format!("unexpected end tag </{tag}> with no open element"),
            ));
        };
        if open.element.tag != tag {
            return Err(mismatched(at, &open, tag));
        }
        self.close(open.element);
        Ok(())
    }

    fn close(&mut self, element: Element) {
        match self.stack.last_mut() {
            Some(parent) => parent.element.children.push(DocNode::Element(element)),
            None => self.root = Some(element),
        }
    }

    fn unclosed_error(&self, open: &OpenElement) -> ParseError {
        ParseError::new(
            position_at(self.src, self.src.len()),
            ParseErrorKind::UnclosedElement,
            format!(
                "unclosed element <{}> (opened at {})",
                open.element.tag, open.at
            ),
        )
    }

    /// 词法错误统一定位到出错标记的 `<`
    fn xml_error(&self, err: XmlError) -> ParseError {
        let at = position_at(self.src, self.markup_start());
        let kind = match &err {
            XmlError::IllFormed(IllFormedError::MismatchedEndTag { expected, found }) => {
                return match self.stack.last() {
                    Some(open) => mismatched(at, open, found),
                    None => ParseError::new(
                        at,
                        ParseErrorKind::MismatchedTag,
                        format!("mismatched end tag: expected </{expected}>, found </{found}>"),
                    ),
                };
            }
            XmlError::IllFormed(IllFormedError::UnmatchedEndTag(tag)) => {
                return ParseError::new(
                    at,
                    ParseErrorKind::UnexpectedEndTag,
                    format!("unexpected end tag </{tag}> with no open element"),
                );
            }
            XmlError::IllFormed(IllFormedError::MissingEndTag(_)) => {
                if let Some(open) = self.stack.last() {
                    return self.unclosed_error(open);
                }
                ParseErrorKind::UnclosedElement
            }
            XmlError::Syntax(SyntaxError::UnclosedComment) => ParseErrorKind::UnterminatedComment,
            XmlError::Syntax(SyntaxError::UnclosedCData) => ParseErrorKind::UnterminatedCData,
            XmlError::Syntax(SyntaxError::UnclosedPIOrXmlDecl) => {
                ParseErrorKind::UnterminatedInstruction
            }
            XmlError::Syntax(SyntaxError::InvalidBangMarkup) => ParseErrorKind::UnexpectedChar,
            // 其余语法错误都是标签、引号或声明未闭合就到了输入末尾
            XmlError::Syntax(_) => ParseErrorKind::UnexpectedEof,
            _ => ParseErrorKind::UnexpectedChar,
        };
        ParseError::new(at, kind, err.to_string())
    }
}

fn mismatched(at: Position, open: &OpenElement, found: &str) -> ParseError {
    ParseError::new(
        at,
        ParseErrorKind::MismatchedTag,
        format!(
            "mismatched end tag: expected </{}> (opened at {}), found </{found}>",
            open.element.tag, open.at
        ),
    )
}

fn attr_error(err: AttrError, at: Position, tag: &str) -> ParseError {
    let kind = match err {
        AttrError::Duplicated(..) => ParseErrorKind::DuplicateAttribute,
        _ => ParseErrorKind::MalformedAttribute,
    };
    ParseError::new(at, kind, format!("bad attribute in <{tag}>: {err}"))
}

/// 第一个格式错误的数字引用中 `&` 的偏移：
/// 只允许 `&#` 加十进制数字或 `&#x` 加十六进制数字，不接受符号
fn malformed_char_ref(raw: &str) -> Option<usize> {
    memchr_iter(b'&', raw.as_bytes()).find(|&amp| {
        let rest = &raw[amp + 1..];
        let name = rest.find(';').map_or(rest, |end| &rest[..end]);
        let Some(num) = name.strip_prefix('#') else {
            return false;
        };
        match num.strip_prefix('x') {
            Some(hex) => hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()),
            None => num.is_empty() || !num.bytes().all(|b| b.is_ascii_digit()),
        }
    })
}

/// 属性值中字面出现的行尾先归一为单个换行，再与制表符一起替换为空格；
/// 字符引用产生的空白保持不变
fn normalize_attr_whitespace(raw: &str) -> Cow<'_, str> {
    if !raw.contains(['\t', '\n', '\r']) {
        return Cow::Borrowed(raw);
    }
    Cow::Owned(
        raw.replace("\r\n", "\n")
            .replace(['\t', '\n', '\r'], " "),
    )
}

#[cfg(test)]
#[path = "../../tests/unit/xml/parser.rs"]
mod tests;
