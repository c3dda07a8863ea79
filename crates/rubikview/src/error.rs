//! Unified error type for Rubik View.

use rubikview_monitor::MonitorError;
use rubikview_protocol::ProtocolError;
use rubikview_session::{SessionError, StoreError};

/// Top-level error that wraps every crate-specific error.
///
/// Each variant has a `#[from]` conversion, so `?` lifts sub-crate errors
/// into this one.
#[derive(Debug, thiserror::Error)]
pub enum RubikViewError {
    /// Encoding, decoding or parsing a protocol value failed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Session-level failure (storage, policy document).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Storage failed outside a session operation, e.g. while recording a
    /// login.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The monitor couldn't do what was asked.
    #[error(transparent)]
    Monitor(#[from] MonitorError),
}
