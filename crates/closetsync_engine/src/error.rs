//! Error types for the sync coordinator.

use closetsync_remote::RemoteError;
use thiserror::Error;

/// Result type for user-triggered sync operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors surfaced to callers of explicit sync actions.
///
/// Background pushes never return these — they degrade to logs. Only
/// user-triggered entry points ([`crate::HybridStore::sync_all_to_cloud`])
/// propagate failures.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No user is signed in, so there is no remote namespace to sync to.
    #[error("no user is signed in")]
    NotAuthenticated,

    /// The remote store failed.
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_errors_pass_through_display() {
        let err = EngineError::from(RemoteError::unavailable("offline"));
        assert!(err.to_string().contains("unavailable"));
        assert_eq!(
            EngineError::NotAuthenticated.to_string(),
            "no user is signed in"
        );
    }
}
