//! Error types for the preview cache
//!
//! Provides unified storage error handling using thiserror.

use thiserror::Error;

// == Storage Error Enum ==
/// Failure reported by a key-value storage tier.
///
/// The cache manager never surfaces these to its callers; they are logged and
/// degrade to a miss or to a weaker persistence tier.
#[derive(Error, Debug)]
pub enum StorageError {
    /// A write would exceed the store's byte quota
    #[error("Quota exceeded: needs {needed} bytes, quota is {quota} bytes")]
    QuotaExceeded { needed: usize, quota: usize },

    /// The store cannot be accessed at all
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Underlying file access failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored document could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// == Result Type Alias ==
/// Convenience Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
