//! Codec trait and implementations for handing monitor values to a UI.
//!
//! A UI binding (WASM bridge, desktop shell, terminal demo) receives the
//! published [`MonitorState`](crate::MonitorState) as bytes. The monitor
//! doesn't care how those bytes are laid out; it only needs something that
//! implements [`Codec`]. [`JsonCodec`] is the default because the dashboard
//! front end already speaks JSON.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// Encodes Rust values to bytes and decodes them back.
///
/// `Send + Sync + 'static` so a codec can live inside a long-running Tokio
/// task next to the monitor.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or don't
    /// match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] backed by `serde_json`.
///
/// Behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use rubikview_protocol::{Codec, Countdown, JsonCodec, MonitorState};
///
/// let codec = JsonCodec;
/// let state = MonitorState::Countdown { remaining: Countdown(45_000) };
///
/// let bytes = codec.encode(&state).unwrap();
/// assert_eq!(bytes, br#"{"state":"countdown","remaining":45000}"#);
///
/// let decoded: MonitorState = codec.decode(&bytes).unwrap();
/// assert_eq!(decoded, state);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
