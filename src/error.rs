use std::fmt;

use thiserror::Error;

/// Outcome taxonomy for [`Document::parse`](crate::Document::parse).
///
/// The identifiers are stable: [`ErrorCode::as_str`] returns the same
/// kebab-case name for a given variant in every release. The `File*`
/// codes are reserved for an external loader that reads bytes on behalf
/// of the caller; parsing itself never produces them. `MemPoolError` and
/// `ParsingObject` are likewise declared but currently never raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    NoError,
    FileNotFound,
    FileCouldNotBeOpened,
    FileReadError,
    MemPoolError,
    ObjectMismatch,
    ParsingObject,
    ArrayMismatch,
    ParsingElement,
    ParsingNumber,
    ParsingString,
    ParsingReservedLiteral,
    Parsing,
    EmptyDocument,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::NoError => "no-error",
            ErrorCode::FileNotFound => "file-not-found",
            ErrorCode::FileCouldNotBeOpened => "file-could-not-be-opened",
            ErrorCode::FileReadError => "file-read-error",
            ErrorCode::MemPoolError => "memory-pool-error",
            ErrorCode::ObjectMismatch => "object-mismatch",
            ErrorCode::ParsingObject => "parsing-object",
            ErrorCode::ArrayMismatch => "array-mismatch",
            ErrorCode::ParsingElement => "parsing-element",
            ErrorCode::ParsingNumber => "parsing-number",
            ErrorCode::ParsingString => "parsing-string",
            ErrorCode::ParsingReservedLiteral => "parsing-reserved-literal",
            ErrorCode::Parsing => "generic-parsing",
            ErrorCode::EmptyDocument => "empty-document",
        }
    }

    pub fn is_error(self) -> bool {
        self != ErrorCode::NoError
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed parse step: which code, and the byte offset in the owned
/// buffer where the step gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{code} at byte {offset}")]
pub struct ParseError {
    pub code: ErrorCode,
    pub offset: usize,
}

impl ParseError {
    pub fn new(code: ErrorCode, offset: usize) -> Self {
        Self { code, offset }
    }
}

/// Line/column position resolved from a byte offset, both 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}
