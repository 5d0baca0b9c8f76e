//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum CursorError {
    /// A read or positioned write would cross the end of the buffer
    #[error("{requested} bytes at offset {offset} exceed buffer of {len} bytes")]
    OutOfBounds {
        offset: usize,
        requested: usize,
        len: usize,
    },

    /// A NUL-terminated string ran to the end of the buffer
    #[error("string starting at offset {offset} has no terminator")]
    Unterminated { offset: usize },

    /// A string was not valid UTF-8
    #[error("string starting at offset {offset} is not valid UTF-8")]
    InvalidUtf8 {
        offset: usize,
        #[source]
        source: std::str::Utf8Error,
    },
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, CursorError>;
