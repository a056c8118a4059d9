//! Error taxonomy for the WFM codec and its collaborators.

use thiserror::Error;

/// Every way a read, write, or dispatch can fail.
///
/// `NumericPrecisionWarning` from the error taxonomy this enum realizes is
/// deliberately absent as a variant: it is non-fatal and is surfaced through
/// `log::warn!` from the transform engine instead of as an `Err`.
#[derive(Error, Debug)]
pub enum WfmError {
    #[error("unrecognized endian marker: {0:?}")]
    BadEndian([u8; 2]),

    #[error("unrecognized version string: {0:?}")]
    BadVersion([u8; 8]),

    #[error("bad format: {0}")]
    BadFormat(String),

    #[error("unexpected end of file while reading {context}")]
    UnexpectedEof { context: &'static str },

    #[error("metadata unreadable: {0}")]
    MetadataUnreadable(String),

    #[error("unknown file extension: {0}")]
    UnknownExtension(String),

    #[error("no codec style matched this file")]
    NoStyleMatch,

    #[error("conversion error: {0}")]
    ConversionError(String),

    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, WfmError>;

/// A worker failure from the parallel read/write drivers, carrying the
/// offending path alongside the underlying error kind so a caller can
/// tell which file in a batch failed.
#[derive(Error, Debug)]
#[error("worker failed on {path}: {source}")]
pub struct WorkerError {
    pub path: String,
    #[source]
    pub source: WfmError,
}
