use std::fmt;

/// 1-based 行列位置，列按字符计数
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub const START: Position = Position { line: 1, column: 1 };
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    UnexpectedEof,
    UnexpectedChar,
    InvalidName,
    MalformedAttribute,
    DuplicateAttribute,
    InvalidEntity,
    MismatchedTag,
    UnexpectedEndTag,
    UnclosedElement,
    NoRootElement,
    MultipleRoots,
    TextOutsideRoot,
    UnterminatedComment,
    UnterminatedCData,
    UnterminatedInstruction,
    TooDeep,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub kind: ParseErrorKind,
    pub message: String,
}

impl ParseError {
    pub fn new(at: Position, kind: ParseErrorKind, message: impl Into<String>) -> Self {
        Self {
            line: at.line,
            column: at.column,
            kind,
            message: message.into(),
        }
    }

    pub fn position(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}, column {}: {}",
            self.line, self.column, self.message
        )
    }
}

impl std::error::Error for ParseError {}
