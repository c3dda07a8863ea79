//! Fixed-interval poll scheduler for the Rubik View session monitor.
//!
//! The monitor re-checks both session deadlines once per second. This
//! crate provides that heartbeat: a scheduler whose
//! [`PollScheduler::wait_for_poll`] resolves once per interval, with
//! re-phasing on demand and skip-ahead when the process wakes up late (a
//! laptop lid closed mid-session, a blocked executor).
//!
//! # Integration
//!
//! The scheduler sits inside the monitor actor's `tokio::select!` loop:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* activity, stop, logout */ }
//!         _ = poller.wait_for_poll() => { /* re-evaluate deadlines */ }
//!     }
//! }
//! ```

use std::time::Duration;

use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for the poll scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Time between polls. Default: 1 second.
    pub interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Self::DEFAULT_INTERVAL,
        }
    }
}

impl PollConfig {
    /// One poll per second, the countdown badge's resolution.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

    /// Shortest interval accepted. Anything faster just burns CPU.
    pub const MIN_INTERVAL: Duration = Duration::from_millis(10);

    /// Longest interval accepted. Keeps `Instant + interval` representable.
    pub const MAX_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

    /// Create a config with a specific interval.
    pub fn with_interval(interval: Duration) -> Self {
        Self { interval }
    }

    /// Clamp the interval into [`Self::MIN_INTERVAL`]..=[`Self::MAX_INTERVAL`].
    ///
    /// Called automatically by [`PollScheduler::new`].
    pub fn validated(mut self) -> Self {
        if self.interval < Self::MIN_INTERVAL {
            warn!(
                interval_ms = self.interval.as_millis() as u64,
                min_ms = Self::MIN_INTERVAL.as_millis() as u64,
                "poll interval below minimum, clamping"
            );
            self.interval = Self::MIN_INTERVAL;
        }
        if self.interval > Self::MAX_INTERVAL {
            warn!(
                interval_ms = u64::try_from(self.interval.as_millis()).unwrap_or(u64::MAX),
                max_ms = Self::MAX_INTERVAL.as_millis() as u64,
                "poll interval above maximum, clamping"
            );
            self.interval = Self::MAX_INTERVAL;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Poll info
// ---------------------------------------------------------------------------

/// Information about one poll, returned by [`PollScheduler::wait_for_poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollInfo {
    /// Monotonically increasing poll number (starts at 1).
    pub poll: u64,
    /// `true` if the scheduler woke up more than 10% of an interval late.
    pub late: bool,
    /// Whole intervals that passed without a poll because of the late wakeup.
    pub skipped: u64,
}

/// Running counters for the scheduler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollMetrics {
    pub total_polls: u64,
    pub total_late: u64,
    pub total_skipped: u64,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Fixed-interval poll scheduler. One per monitor.
///
/// Late wakeups never produce a burst of catch-up polls: the next poll is
/// always scheduled one interval after the wakeup. Each poll re-reads the
/// clock, so missed polls lose nothing.
#[derive(Debug)]
pub struct PollScheduler {
    interval: Duration,
    poll_count: u64,
    next_poll: Instant,
    metrics: PollMetrics,
}

impl PollScheduler {
    /// Create a scheduler. The first poll fires one interval from now.
    pub fn new(config: PollConfig) -> Self {
        let config = config.validated();
        debug!(
            interval_ms = config.interval.as_millis() as u64,
            "poll scheduler created"
        );
        Self {
            interval: config.interval,
            poll_count: 0,
            next_poll: Instant::now() + config.interval,
            metrics: PollMetrics::default(),
        }
    }

    /// Wait until the next poll is due.
    ///
    /// Cancel-safe: dropping the future before it resolves (another
    /// `select!` branch won) leaves the schedule untouched.
    pub async fn wait_for_poll(&mut self) -> PollInfo {
        let due = self.next_poll;
        time::sleep_until(due).await;

        let now = Instant::now();
        self.poll_count += 1;

        let late_by = now.saturating_duration_since(due);
        let late = late_by > self.interval / 10;
        let skipped = if late {
            (late_by.as_nanos() / self.interval.as_nanos()) as u64
        } else {
            0
        };
        if skipped > 0 {
            warn!(
                poll = self.poll_count,
                skipped,
                late_ms = late_by.as_millis() as u64,
                "poll woke up late, skipping ahead"
            );
        }

        self.next_poll = now + self.interval;

        self.metrics.total_polls += 1;
        self.metrics.total_skipped += skipped;
        if late {
            self.metrics.total_late += 1;
        }

        trace!(poll = self.poll_count, late, "poll fired");

        PollInfo {
            poll: self.poll_count,
            late,
            skipped,
        }
    }

    /// Restart the schedule from now: the next poll fires one interval
    /// from this call, and every later one keeps that phase.
    ///
    /// The monitor calls this on user activity so polls stay aligned with
    /// the moment the idle deadline was last reset.
    pub fn rephase(&mut self) {
        self.next_poll = Instant::now() + self.interval;
        trace!(poll = self.poll_count, "poll schedule rephased");
    }

    pub fn poll_count(&self) -> u64 {
        self.poll_count
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn metrics(&self) -> &PollMetrics {
        &self.metrics
    }
}
