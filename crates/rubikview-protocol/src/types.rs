//! Core types shared by every layer of the session monitor.
//!
//! These are the values that cross the boundary between the monitor and
//! whatever UI binding renders it: the activity events a binding feeds in,
//! and the state the monitor publishes back out. Both sides serialize them
//! with the same [`Codec`](crate::Codec), so they derive serde traits.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Persisted keys
// ---------------------------------------------------------------------------

/// Storage key holding the auth token written at login.
pub const TOKEN_KEY: &str = "token";

/// Storage key holding the user's role (`admin`, `superadmin`, ...).
pub const ROLE_KEY: &str = "role";

/// Storage key holding the login instant as decimal epoch milliseconds.
pub const LOGIN_TIMESTAMP_KEY: &str = "loginTimestamp";

/// Every key the dashboard writes for a session. Logout clears all of them.
pub const SESSION_KEYS: [&str; 3] = [TOKEN_KEY, ROLE_KEY, LOGIN_TIMESTAMP_KEY];

/// Where a forced or manual logout sends the browser.
pub const LOGIN_PATH: &str = "/login";

// ---------------------------------------------------------------------------
// Activity events
// ---------------------------------------------------------------------------

/// A user interaction that counts as "the user is still here".
///
/// The set matches the browser events the dashboard listens to. Bindings
/// register a listener for every entry of [`ActivityKind::ALL`] on
/// activation and remove all of them together on teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    MouseDown,
    MouseMove,
    KeyPress,
    Scroll,
    TouchStart,
    Click,
    KeyDown,
}

impl ActivityKind {
    /// The full listener set, in registration order.
    pub const ALL: [ActivityKind; 7] = [
        Self::MouseDown,
        Self::MouseMove,
        Self::KeyPress,
        Self::Scroll,
        Self::TouchStart,
        Self::Click,
        Self::KeyDown,
    ];

    /// The DOM event name for this kind (`"mousemove"`, `"keydown"`, ...).
    pub fn dom_name(self) -> &'static str {
        match self {
            Self::MouseDown => "mousedown",
            Self::MouseMove => "mousemove",
            Self::KeyPress => "keypress",
            Self::Scroll => "scroll",
            Self::TouchStart => "touchstart",
            Self::Click => "click",
            Self::KeyDown => "keydown",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dom_name())
    }
}

impl FromStr for ActivityKind {
    type Err = ProtocolError;

    /// Parses a DOM event name. Matching is case-insensitive and ignores
    /// surrounding whitespace, so `" Click "` is a click.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.dom_name() == name)
            .ok_or_else(|| ProtocolError::UnknownActivity(s.trim().to_string()))
    }
}

// ---------------------------------------------------------------------------
// Countdown
// ---------------------------------------------------------------------------

/// Remaining time shown to the user, in milliseconds.
///
/// Newtype over `u64` so it can't be confused with an arbitrary duration,
/// and `#[serde(transparent)]` so it serializes as the bare number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Countdown(pub u64);

impl Countdown {
    /// Builds a countdown from a duration, truncated to whole milliseconds.
    pub fn from_duration(remaining: Duration) -> Self {
        Self(u64::try_from(remaining.as_millis()).unwrap_or(u64::MAX))
    }

    /// The remaining time as a [`Duration`].
    pub fn as_duration(self) -> Duration {
        Duration::from_millis(self.0)
    }
}

/// Renders as `minutes:seconds` (see [`format_remaining`]).
impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_remaining(self.as_duration()))
    }
}

/// Formats remaining time as `M:SS`.
///
/// Partial seconds round up, so the badge never shows `0:00` while the
/// session is still alive. Minutes are not padded and not wrapped into
/// hours.
///
/// ```rust
/// use std::time::Duration;
/// use rubikview_protocol::format_remaining;
///
/// assert_eq!(format_remaining(Duration::from_millis(545_000)), "9:05");
/// assert_eq!(format_remaining(Duration::from_millis(45_000)), "0:45");
/// ```
pub fn format_remaining(remaining: Duration) -> String {
    let millis = remaining.as_millis();
    let total_secs = millis.div_ceil(1000);
    let minutes = total_secs / 60;
    let seconds = total_secs % 60;
    format!("{minutes}:{seconds:02}")
}

// ---------------------------------------------------------------------------
// Monitor state
// ---------------------------------------------------------------------------

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogoutReason {
    /// No qualifying activity within the inactivity timeout.
    Inactivity,
    /// The absolute cap since login elapsed.
    SessionCap,
    /// The user signed out.
    Manual,
}

impl fmt::Display for LogoutReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inactivity => write!(f, "inactivity"),
            Self::SessionCap => write!(f, "session cap"),
            Self::Manual => write!(f, "manual"),
        }
    }
}

/// What the monitor publishes to the UI.
///
/// ```text
///   Inactive ──(start, valid session)──→ Active ⇄ Countdown
///                                          │          │
///                                          └────┬─────┘
///                                               ▼
///                                           Expired (terminal)
/// ```
///
/// Serialized with an internal `state` tag, e.g.
/// `{"state":"countdown","remaining":545000}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum MonitorState {
    /// Not authenticated, no session tracked, or the monitor is stopped.
    Inactive,
    /// Session alive, more than the countdown threshold remaining.
    Active,
    /// Session alive and inside the countdown window.
    Countdown { remaining: Countdown },
    /// Session ended. Terminal for this session.
    Expired { reason: LogoutReason },
}

impl MonitorState {
    /// The visible countdown, if any.
    pub fn countdown(&self) -> Option<Countdown> {
        match self {
            Self::Countdown { remaining } => Some(*remaining),
            _ => None,
        }
    }

    /// `true` for `Active` and `Countdown`.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active | Self::Countdown { .. })
    }

    /// `true` once the session has ended.
    pub fn is_expired(&self) -> bool {
        matches!(self, Self::Expired { .. })
    }
}

impl fmt::Display for MonitorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inactive => write!(f, "Inactive"),
            Self::Active => write!(f, "Active"),
            Self::Countdown { remaining } => write!(f, "Countdown({remaining})"),
            Self::Expired { reason } => write!(f, "Expired({reason})"),
        }
    }
}
