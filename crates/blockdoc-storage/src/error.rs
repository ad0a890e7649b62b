//! Storage error types for blockdoc-storage.
//!
//! [`StorageError`] covers the failure modes of the durable recovery area:
//! backend failures, serialization, schema migration, malformed records,
//! and storage that is full or disabled.

use thiserror::Error;

/// Errors produced by storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The SQLite backend reported an error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Applying schema migrations failed.
    #[error("migration error: {0}")]
    Migration(String),

    /// A stored record does not have the expected shape.
    #[error("malformed record: {reason}")]
    Malformed { reason: String },

    /// The store refused the write (quota exceeded, storage disabled).
    #[error("storage unavailable: {reason}")]
    Unavailable { reason: String },
}
