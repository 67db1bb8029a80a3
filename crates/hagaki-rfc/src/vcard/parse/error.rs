//! vCard parse errors.

use thiserror::Error;

/// The kind of parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Property name missing or containing invalid characters.
    InvalidPropertyName,
    /// Malformed parameter.
    InvalidParameter,
    /// Malformed structured value.
    InvalidStructuredValue,
    /// VERSION value outside the supported set.
    UnsupportedVersion,
    /// Input ended before END:VCARD.
    UnexpectedEof,
}

impl ParseErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidPropertyName => "invalid property name",
            Self::InvalidParameter => "invalid parameter",
            Self::InvalidStructuredValue => "invalid structured value",
            Self::UnsupportedVersion => "unsupported version",
            Self::UnexpectedEof => "unexpected end of input",
        }
    }
}

/// A vCard parse error with line position.
#[derive(Debug, Clone, Error)]
#[error("{} at line {line}: {message}", kind.as_str())]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub line: usize,
    pub message: String,
}

impl ParseError {
    #[must_use]
    pub fn new(kind: ParseErrorKind, line: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            line,
            message: message.into(),
        }
    }
}

pub type ParseResult<T> = std::result::Result<T, ParseError>;
