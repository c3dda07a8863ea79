//! Timeout policy: the three durations that drive the monitor.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::SessionError;

/// Default inactivity timeout: 30 minutes.
pub const DEFAULT_INACTIVITY_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Default countdown threshold: 10 minutes.
pub const DEFAULT_COUNTDOWN_THRESHOLD: Duration = Duration::from_secs(10 * 60);

/// Default absolute session cap: 8 hours.
pub const DEFAULT_MAX_SESSION_DURATION: Duration = Duration::from_secs(8 * 60 * 60);

/// How long a session may idle, how long it may live, and when the user
/// starts seeing a countdown.
///
/// Serialized with durations in milliseconds, and every field is optional
/// when deserializing:
///
/// ```json
/// { "inactivity_timeout_ms": 1800000, "countdown_threshold_ms": 600000 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutPolicy {
    /// Time since the last activity before a forced logout.
    #[serde(rename = "inactivity_timeout_ms", with = "duration_ms")]
    pub inactivity_timeout: Duration,

    /// Remaining time at which the countdown becomes visible.
    #[serde(rename = "countdown_threshold_ms", with = "duration_ms")]
    pub countdown_threshold: Duration,

    /// Absolute cap measured from login. Activity never extends it.
    #[serde(rename = "max_session_duration_ms", with = "duration_ms")]
    pub max_session_duration: Duration,
}

impl Default for TimeoutPolicy {
    fn default() -> Self {
        Self {
            inactivity_timeout: DEFAULT_INACTIVITY_TIMEOUT,
            countdown_threshold: DEFAULT_COUNTDOWN_THRESHOLD,
            max_session_duration: DEFAULT_MAX_SESSION_DURATION,
        }
    }
}

impl TimeoutPolicy {
    /// Parses a policy from JSON. Missing fields take their defaults.
    ///
    /// The result is not validated; the monitor builder runs
    /// [`validated`](Self::validated) when it starts a monitor.
    ///
    /// # Errors
    /// Returns [`SessionError::InvalidPolicy`] for malformed JSON or
    /// fields of the wrong type.
    pub fn from_json(json: &str) -> Result<Self, SessionError> {
        serde_json::from_str(json).map_err(SessionError::InvalidPolicy)
    }

    pub fn with_inactivity_timeout(mut self, timeout: Duration) -> Self {
        self.inactivity_timeout = timeout;
        self
    }

    pub fn with_countdown_threshold(mut self, threshold: Duration) -> Self {
        self.countdown_threshold = threshold;
        self
    }

    pub fn with_max_session_duration(mut self, cap: Duration) -> Self {
        self.max_session_duration = cap;
        self
    }

    /// Fixes out-of-range values so the policy is safe to run.
    ///
    /// - A zero inactivity timeout or session cap falls back to its default.
    /// - The countdown threshold is capped at the inactivity timeout.
    pub fn validated(mut self) -> Self {
        if self.inactivity_timeout.is_zero() {
            warn!("inactivity_timeout is zero, using default");
            self.inactivity_timeout = DEFAULT_INACTIVITY_TIMEOUT;
        }
        if self.max_session_duration.is_zero() {
            warn!("max_session_duration is zero, using default");
            self.max_session_duration = DEFAULT_MAX_SESSION_DURATION;
        }
        if self.countdown_threshold > self.inactivity_timeout {
            warn!(
                threshold_ms = self.countdown_threshold.as_millis() as u64,
                timeout_ms = self.inactivity_timeout.as_millis() as u64,
                "countdown_threshold exceeds inactivity_timeout, clamping"
            );
            self.countdown_threshold = self.inactivity_timeout;
        }
        self
    }

    /// When the countdown appears after the last activity, absent the cap.
    pub fn countdown_delay(&self) -> Duration {
        self.inactivity_timeout
            .saturating_sub(self.countdown_threshold)
    }
}

/// Serde adapter storing a [`Duration`] as whole milliseconds.
mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
