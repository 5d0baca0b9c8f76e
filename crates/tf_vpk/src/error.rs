//! Error types that can be emitted from this library

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum ArchiveError {
    /// file does not start with the vpk signature
    #[error("{} is not a vpk directory file", .path.display())]
    SignatureMismatch { path: PathBuf },

    /// vpk version is not one this library understands
    #[error("{} uses unsupported vpk version {version}", .path.display())]
    UnsupportedVersion { path: PathBuf, version: u32 },

    /// directory tree or entry metadata is inconsistent
    #[error("corrupt vpk directory: {0}")]
    CorruptDirectory(String),

    /// unable to find requested entry
    #[error("unable to find requested entry")]
    EntryNotFound(#[from] EntryNotFoundError),

    /// replacement is larger than the space allocated to the entry
    #[error("{path} is {overflow} bytes larger than the original entry")]
    #[diagnostic(help("entries can only be patched with payloads of the same size or smaller"))]
    PayloadTooLarge { path: String, overflow: u64 },

    /// replacement is shorter and the padding policy does not allow padding
    #[error("{path} is {missing} bytes short and padding is disabled for it")]
    PaddingRejected { path: String, missing: u64 },

    /// glob pattern could not be compiled
    #[error("invalid glob pattern {pattern:?}: {reason}")]
    InvalidPattern {
        pattern: String,
        reason: &'static str,
    },

    /// logical path would escape the extraction directory
    #[error("refusing to write {0} outside of the destination directory")]
    UnsafePath(String),

    /// I/O failure with the location it happened at
    #[error("failed to {operation} {} at offset {offset}", .path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        offset: u64,
        #[source]
        source: std::io::Error,
    },

    /// background batch worker exited without reporting
    #[error("batch worker exited without a report")]
    WorkerFailed,
}

/// Error type to provide further information when an entry has not been found
#[derive(Error, Diagnostic, Debug)]
pub enum EntryNotFoundError {
    /// by path {0}
    #[error("by path {0}")]
    Path(String),

    /// reference to {0} belongs to another archive session
    #[error("reference to {0} belongs to another archive session")]
    Stale(String),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, ArchiveError>;

impl From<tf_cursor::CursorError> for ArchiveError {
    fn from(value: tf_cursor::CursorError) -> Self {
        ArchiveError::CorruptDirectory(value.to_string())
    }
}

pub(crate) fn io_error<'a>(
    operation: &'static str,
    path: &'a std::path::Path,
    offset: u64,
) -> impl FnOnce(std::io::Error) -> ArchiveError + 'a {
    move |source| ArchiveError::Io {
        operation,
        path: path.to_path_buf(),
        offset,
        source,
    }
}
