//! The session record and the arithmetic behind the countdown.
//!
//! A session has two deadlines:
//!
//! ```text
//!  login_at          last_activity_at
//!     │                     │
//!     ▼                     ▼
//! ────┼─────────────────────┼───────────────────┼──────────────┼────→ time
//!     │                     └── inactivity_timeout ──→ idle deadline
//!     └──────────────── max_session_duration ─────────────────→ cap deadline
//! ```
//!
//! Activity moves the idle deadline; nothing moves the cap. Whichever
//! deadline is closer decides what the user sees.

use std::time::Duration;

use rubikview_protocol::{Countdown, LogoutReason, MonitorState};

use crate::{Timestamp, TimeoutPolicy};

/// One signed-in session as the monitor tracks it.
///
/// Invariant: `last_activity_at >= login_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    login_at: Timestamp,
    last_activity_at: Timestamp,
}

impl Session {
    /// Starts tracking a session that logged in at `login_at`, with `now` as
    /// the most recent activity.
    ///
    /// If `login_at` lies in the future (skewed clock), the last activity is
    /// pulled forward to it to keep the invariant.
    pub fn new(login_at: Timestamp, now: Timestamp) -> Self {
        Self {
            login_at,
            last_activity_at: now.max(login_at),
        }
    }

    pub fn login_at(&self) -> Timestamp {
        self.login_at
    }

    pub fn last_activity_at(&self) -> Timestamp {
        self.last_activity_at
    }

    /// Records qualifying activity at `at`.
    ///
    /// Only the latest timestamp matters: an event older than the current
    /// one is ignored, and repeating an event changes nothing.
    pub fn record_activity(&mut self, at: Timestamp) {
        if at > self.last_activity_at {
            self.last_activity_at = at;
        }
    }

    /// Adopts a login instant written by someone else (another tab logging
    /// in again). The last writer to storage wins.
    pub fn rebase_login(&mut self, login_at: Timestamp) {
        self.login_at = login_at;
        self.last_activity_at = self.last_activity_at.max(login_at);
    }

    /// Computes both remaining windows at `now`.
    ///
    /// Negative elapsed time (a clock that went backwards) is clamped so a
    /// window never reports more than its full configured length.
    pub fn evaluate(&self, now: Timestamp, policy: &TimeoutPolicy) -> Evaluation {
        let timeout_ms = duration_millis(policy.inactivity_timeout);
        let cap_ms = duration_millis(policy.max_session_duration);

        let idle = now.millis_since(self.last_activity_at);
        let age = now.millis_since(self.login_at);

        Evaluation {
            inactivity_remaining_ms: timeout_ms.saturating_sub(idle).min(timeout_ms),
            cap_remaining_ms: cap_ms.saturating_sub(age).min(cap_ms),
            threshold_ms: duration_millis(policy.countdown_threshold),
        }
    }
}

/// Snapshot of both deadlines at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    /// Milliseconds until the idle deadline. Zero or negative once passed.
    pub inactivity_remaining_ms: i64,
    /// Milliseconds until the absolute cap. Zero or negative once passed.
    pub cap_remaining_ms: i64,
    threshold_ms: i64,
}

impl Evaluation {
    /// The closer of the two deadlines, in milliseconds.
    pub fn remaining_ms(&self) -> i64 {
        self.inactivity_remaining_ms.min(self.cap_remaining_ms)
    }

    /// Which deadline is closer. Ties go to inactivity.
    pub fn binding(&self) -> LogoutReason {
        if self.cap_remaining_ms < self.inactivity_remaining_ms {
            LogoutReason::SessionCap
        } else {
            LogoutReason::Inactivity
        }
    }

    pub fn is_expired(&self) -> bool {
        self.remaining_ms() <= 0
    }

    /// Time until the idle deadline, floored at zero. Used to arm the
    /// one-shot logout timer.
    pub fn inactivity_remaining(&self) -> Duration {
        Duration::from_millis(u64::try_from(self.inactivity_remaining_ms).unwrap_or(0))
    }

    /// What the UI should show for this snapshot.
    pub fn state(&self) -> MonitorState {
        let remaining = self.remaining_ms();
        if remaining <= 0 {
            MonitorState::Expired {
                reason: self.binding(),
            }
        } else if remaining <= self.threshold_ms {
            MonitorState::Countdown {
                remaining: Countdown(remaining.unsigned_abs()),
            }
        } else {
            MonitorState::Active
        }
    }
}

fn duration_millis(d: Duration) -> i64 {
    i64::try_from(d.as_millis()).unwrap_or(i64::MAX)
}
