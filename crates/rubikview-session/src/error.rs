//! Error types for the session layer.

/// Errors raised by a [`KeyValueStore`](crate::KeyValueStore).
///
/// Browsers refuse storage access in some private-browsing modes, and a
/// poisoned lock has the same effect on the in-memory store. Callers treat
/// every variant the same way: stop enforcing timeouts, never crash.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The backing storage can't be read or written right now.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Errors that can occur while managing session data.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Reading or writing persisted session state failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A timeout policy document couldn't be parsed.
    #[error("invalid timeout policy: {0}")]
    InvalidPolicy(serde_json::Error),
}
