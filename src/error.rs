//! Common error types for the sync engine

use thiserror::Error;

/// Common result type for engine operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Error taxonomy for synchronizer operations
///
/// The fallback policy in the synchronizer keys off the three-way split
/// between connectivity failures (recoverable by falling back to local
/// data), remote protocol failures (the server answered, but with an
/// application error or garbage), and local store failures (fatal — the
/// store is the durability backstop).
#[derive(Error, Debug)]
pub enum SyncError {
    /// Network-level failure: host unreachable, timeout, DNS, refused
    #[error("Connectivity error: {0}")]
    Connectivity(String),

    /// Application-level failure from a reachable remote: non-2xx with a
    /// server-reported error, or a malformed/undecodable payload
    #[error("Remote error: {0}")]
    Remote(String),

    /// Local store I/O failure (wraps sqlx::Error)
    #[error("Store error: {0}")]
    Store(#[from] sqlx::Error),

    /// Filesystem failure outside the store itself
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Operation rejected or abandoned by the task executor
    #[error("Operation canceled: {0}")]
    Canceled(String),
}

impl SyncError {
    /// True for transient network failures that the read paths recover
    /// from by serving local data.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, SyncError::Connectivity(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connectivity_predicate() {
        assert!(SyncError::Connectivity("timeout".into()).is_connectivity());
        assert!(!SyncError::Remote("500".into()).is_connectivity());
        assert!(!SyncError::Canceled("shutdown".into()).is_connectivity());
    }

    #[test]
    fn display_includes_cause() {
        let err = SyncError::Remote("Server error: 500".into());
        assert_eq!(err.to_string(), "Remote error: Server error: 500");
    }
}
