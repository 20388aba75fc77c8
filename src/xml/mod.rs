//! XML 解析层：字节编解码、基于 quick-xml 的事件流与结构校验

pub mod decode;
pub mod error;
mod location;
pub mod parser;

pub use decode::{decode, detect, encode, Decoded, TextEncoding};
pub use error::{ParseError, ParseErrorKind, Position};
pub use parser::{parse, parse_str, parse_with, ParseOptions, DEFAULT_MAX_NESTING};
