//! Error types for the cache layer.

use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Errors that can occur in cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Bad cache location or table name.
    #[error("cache configuration error: {0}")]
    Config(String),

    /// The store could not be opened.
    #[error("cache connection error: {0}")]
    Connection(String),

    /// A record with this username is already cached.
    #[error("username already cached: {0}")]
    DuplicateKey(String),

    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A stored row could not be turned back into a record.
    #[error("invalid cached data: {0}")]
    InvalidData(String),
}
