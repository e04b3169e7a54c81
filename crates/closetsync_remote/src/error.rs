//! Error types for remote store operations.

use thiserror::Error;

/// Result type for remote store operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Errors that can occur against the remote store.
///
/// The variants encode the propagation policy: the two degraded classes
/// (`Unavailable`, `PermissionDenied`) mean "no cloud data this cycle"
/// and must never be treated as fatal by background sync paths, while
/// the remaining variants indicate corrupt data or a programming error
/// and should surface.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The remote store is unreachable (offline, timeout).
    #[error("remote store unavailable: {0}")]
    Unavailable(String),

    /// Access control rejected the call. Actionable: indicates
    /// misconfigured security rules, not a network condition.
    #[error("remote store permission denied: {0}")]
    PermissionDenied(String),

    /// A stored document exists but cannot be interpreted.
    #[error("malformed remote document at {path}: {message}")]
    Data {
        /// Document path.
        path: String,
        /// What failed to decode.
        message: String,
    },

    /// JSON encode/decode failure on our side of the wire.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl RemoteError {
    /// Creates an `Unavailable` error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// Creates a `PermissionDenied` error.
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied(message.into())
    }

    /// Creates a `Data` error for the document at `path`.
    pub fn data(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Data {
            path: path.into(),
            message: message.into(),
        }
    }

    /// True if the remote store was unreachable.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }

    /// True if access control rejected the call.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied(_))
    }

    /// True for the failure classes under which callers degrade to
    /// local-only operation instead of propagating.
    pub fn is_degraded(&self) -> bool {
        self.is_unavailable() || self.is_permission_denied()
    }
}
