//! Error types for the keyed store

use ctlog_primitives::CodecError;
use thiserror::Error;

/// Result type for storage operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors that can occur inside a store transaction
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite connection or statement error
    #[error("SQLite error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Stored bytes under `key` do not decode
    #[error("corrupt value under key {key}: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: CodecError,
    },

    /// Fixed-width value (hash, size counter) has the wrong length
    #[error("value under key {key} has wrong width: {len} bytes")]
    BadWidth { key: String, len: usize },

    /// A key the stored size says must exist is absent
    #[error("missing value under key {key}")]
    Missing { key: String },

    /// Transaction used after its connection was released
    #[error("transaction already finished")]
    Finished,

    /// IO error (for file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
