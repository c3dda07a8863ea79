//! Error types for the protocol layer.
//!
//! Each crate in Rubik View defines its own error enum, so a
//! `ProtocolError` always means "a value couldn't be encoded, decoded or
//! parsed", never a storage or timer problem.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust value into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, a missing field, or a
    /// value of the wrong type.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The name doesn't match any browser event in the activity set.
    #[error("unknown activity event: {0:?}")]
    UnknownActivity(String),
}
