//! Error types for the monitor layer.

/// Errors returned by [`MonitorHandle`](crate::MonitorHandle) operations.
///
/// Starting a monitor never fails: every problem at start-up degrades to an
/// inactive monitor instead. These errors only come from talking to a
/// monitor afterwards.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// The monitor isn't running: never started (signed out, storage
    /// unavailable), already expired, or stopped.
    #[error("session monitor is not running")]
    NotRunning,

    /// The monitor task panicked or was cancelled.
    #[error("session monitor task failed: {0}")]
    TaskFailed(String),
}
