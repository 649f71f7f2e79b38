//! Error types for Lease-RAG

use thiserror::Error;

/// Result type for Lease-RAG operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the retrieval core
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid chunker or system configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// `initialize` called on an already-initialized system
    #[error("system is already initialized")]
    AlreadyInitialized,

    /// Query issued before `initialize` or rebuild completed
    #[error("system is not initialized")]
    NotInitialized,

    /// Embedding provider failure (query-time; batch-time failures are
    /// recovered and only logged)
    #[error("embedding error: {0}")]
    Embedding(String),

    /// Rebuild attempted from an empty persisted record list
    #[error("cannot rebuild from an empty chunk set")]
    EmptyChunkSet,

    /// Persisted record missing or violating a structurally required field
    #[error("malformed chunk record at position {position}: {reason}")]
    MalformedRecord {
        /// Zero-based position of the record in the input list
        position: usize,
        /// What the record is missing or violating
        reason: String,
    },

    /// Serialization error (serde_json)
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
