//! Error types that can be emitted from this library
//!

use miette::Diagnostic;
use tf_cursor::CursorError;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum CodecError {
    /// header names an encoding or version this codec does not implement
    #[error("unsupported dmx header {header:?}")]
    #[diagnostic(help("only the binary encoding, versions 2 to 5, is supported"))]
    UnsupportedVersion { header: String },

    /// attribute could not be decoded or encoded
    #[error("malformed attribute at offset {offset}: {reason}")]
    MalformedAttribute { offset: usize, reason: String },

    /// element reference points outside the element table
    #[error("attribute {attribute:?} of element {element} references missing element {target}")]
    DanglingReference {
        element: usize,
        attribute: String,
        target: i64,
    },

    /// input ended before the structure it describes
    #[error("input truncated at offset {offset}")]
    TruncatedInput { offset: usize },

    /// string is not valid UTF-8 or cannot be stored NUL-terminated
    #[error("malformed string: {0}")]
    MalformedString(String),

    /// string table index is out of range
    #[error("string table index {index} out of range for {len} strings")]
    BadStringIndex { index: u32, len: usize },

    /// more distinct strings than the header's index width can address
    #[error("{count} distinct strings exceed the limit of {limit} for this version")]
    PoolOverflow { count: usize, limit: usize },
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, CodecError>;

impl From<CursorError> for CodecError {
    fn from(value: CursorError) -> Self {
        match value {
            CursorError::OutOfBounds { offset, .. } | CursorError::Unterminated { offset } => {
                CodecError::TruncatedInput { offset }
            }
            CursorError::InvalidUtf8 { offset, .. } => {
                CodecError::MalformedString(format!("invalid UTF-8 at offset {offset}"))
            }
        }
    }
}
