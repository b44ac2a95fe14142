//! Error types for the CAF format crate.

use thiserror::Error;

use crate::chunk::FourCc;

/// Errors that can occur when reading or writing CAF files.
#[derive(Error, Debug)]
pub enum CafError {
    #[error("Invalid magic bytes: expected caff (0x63616666)")]
    InvalidMagic,

    #[error("Truncated stream while reading {context}")]
    Truncated { context: &'static str },

    #[error("Invalid size {size} for chunk {tag}")]
    InvalidChunkSize { tag: FourCc, size: i64 },

    #[error("Malformed count in {field}: {got} (limit {max})")]
    MalformedCount {
        field: &'static str,
        got: i64,
        max: i64,
    },

    #[error("Count mismatch in {field}: header declares {declared}, payload has {actual}")]
    CountMismatch {
        field: &'static str,
        declared: i64,
        actual: i64,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CafError {
    /// Map an I/O error from a read that expected more bytes: end of
    /// stream becomes [`CafError::Truncated`], everything else is
    /// wrapped as [`CafError::Io`].
    pub(crate) fn from_io(err: std::io::Error, context: &'static str) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            CafError::Truncated { context }
        } else {
            CafError::Io(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, CafError>;
