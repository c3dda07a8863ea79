//! Shared vocabulary for the Rubik View session monitor.
//!
//! - **Types** ([`ActivityKind`], [`MonitorState`], [`Countdown`],
//!   [`LogoutReason`]) and the persisted key names.
//! - **Formatting** ([`format_remaining`]) for the countdown badge.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) for handing state to a UI.
//! - **Errors** ([`ProtocolError`]).
//!
//! ```text
//! UI binding (events, badge) ⇄ Protocol (this crate) ⇄ Monitor
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    format_remaining, ActivityKind, Countdown, LogoutReason, MonitorState, LOGIN_PATH,
    LOGIN_TIMESTAMP_KEY, ROLE_KEY, SESSION_KEYS, TOKEN_KEY,
};
