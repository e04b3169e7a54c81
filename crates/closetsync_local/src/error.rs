//! Error types for cache operations.

use std::io;
use thiserror::Error;

/// Result type for cache-backend operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Errors that can occur inside a cache backend.
///
/// These never cross the [`crate::LocalStore`] boundary: the store logs
/// them and degrades to `false`/default instead.
#[derive(Debug, Error)]
pub enum CacheError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A value could not be serialized or deserialized.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// The key is not usable as a storage location.
    #[error("invalid cache key: {0:?}")]
    InvalidKey(String),
}
