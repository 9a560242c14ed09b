//! Error types for `calc_journal`.

use std::path::PathBuf;

/// Result type for journal and persistence operations.
pub type JournalResult<T> = Result<T, JournalError>;

/// Errors returned by the `calc_journal` crate.
#[derive(thiserror::Error, Debug)]
pub enum JournalError {
    /// I/O error.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Format error (corrupt or unexpected document shape).
    #[error("format error: {0}")]
    Format(String),

    /// Encoding error.
    #[error("encode error: {0}")]
    Encode(String),

    /// Decoding error.
    #[error("decode error: {0}")]
    Decode(String),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Operation not supported by this backend.
    #[error("operation not supported: {0}")]
    NotSupported(String),

    /// Lock acquisition failed.
    #[error("lock failed on {resource}: {reason}")]
    LockFailed {
        /// What we were trying to lock (file path, in-memory map, etc.).
        resource: String,
        /// Human-readable reason (poisoned lock, OS error, etc.).
        reason: String,
    },

    /// Resource not found in a non-filesystem backend.
    #[error("not found: {0}")]
    NotFound(String),

    /// Requested path does not exist.
    #[error("missing path: {0}")]
    MissingPath(PathBuf),
}

impl JournalError {
    /// True when the error only says "nothing is stored there yet".
    pub fn is_missing(&self) -> bool {
        matches!(self, JournalError::NotFound(_) | JournalError::MissingPath(_))
    }

    pub(crate) fn poisoned(resource: &str) -> Self {
        JournalError::LockFailed {
            resource: resource.to_string(),
            reason: "lock poisoned".to_string(),
        }
    }
}
