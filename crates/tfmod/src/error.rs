//! Error types that can be emitted from the mod pipeline

use miette::Diagnostic;
use thiserror::Error;
use tf_pcf::CodecError;
use tf_vpk::ArchiveError;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Archive(#[from] ArchiveError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Codec(#[from] CodecError),

    /// no processor kind handles the entry's extension
    #[error("{path} has an unsupported file type")]
    #[diagnostic(help("only .pcf, .vmt, .txt and .res entries can be processed"))]
    UnsupportedFileType { path: String },

    /// processor kind does not match the entry's format
    #[error("{path} needs a {expected} processor")]
    ProcessorMismatch {
        path: String,
        expected: &'static str,
    },

    /// a mutation refused the entry
    #[error("failed to modify {target}: {reason}")]
    Mutation { target: String, reason: String },
}

impl Error {
    /// Convenience constructor for mutations rejecting their input.
    pub fn mutation(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Mutation {
            target: target.into(),
            reason: reason.into(),
        }
    }
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
