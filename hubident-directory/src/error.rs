//! Error types for directory operations.

use thiserror::Error;

/// Result type for directory operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Errors that can occur while talking to the directory.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// A required connection parameter is missing or malformed.
    /// Not retryable.
    #[error("directory configuration error: {0}")]
    Config(String),

    /// The server is unreachable, timed out, or rejected the bind.
    #[error("directory connection error: {0}")]
    Connection(String),

    /// The search failed (bad filter, protocol fault, timeout).
    #[error("directory query error: {0}")]
    Query(String),

    /// An entry came back without the attributes needed to build a record.
    #[error("invalid directory entry {dn}: {reason}")]
    InvalidEntry { dn: String, reason: String },
}

impl DirectoryError {
    /// Whether retrying the same operation later could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Query(_))
    }
}
