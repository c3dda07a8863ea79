//! Wall-clock timestamps and the injectable [`Clock`].
//!
//! Session instants are persisted next to the auth token as epoch
//! milliseconds, so they must survive reloads and be comparable across
//! processes. That rules out `Instant` (monotonic, process-local) for the
//! stored values; the monitor still uses Tokio's monotonic timers to decide
//! *when* to look at the clock.

use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch.
///
/// Signed, because a skewed clock can put "now" before a stored instant
/// and the difference has to stay representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Signed milliseconds from `earlier` to `self`. Negative when the
    /// clock went backwards.
    pub fn millis_since(self, earlier: Timestamp) -> i64 {
        self.0.saturating_sub(earlier.0)
    }

    /// `self` shifted forward by `millis`.
    pub fn plus_millis(self, millis: i64) -> Timestamp {
        Timestamp(self.0.saturating_add(millis))
    }
}

/// Formats as the bare decimal number, which is the persisted form.
impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Timestamp {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Timestamp)
    }
}

/// Source of "now".
///
/// `Send + Sync + 'static` so one clock can be shared between the monitor
/// task and the handle that stamps activity events.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> Timestamp;
}

/// The operating system's wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(since) => Timestamp(i64::try_from(since.as_millis()).unwrap_or(i64::MAX)),
            // A clock set before 1970 is still a clock.
            Err(before) => Timestamp(
                -i64::try_from(before.duration().as_millis()).unwrap_or(i64::MAX),
            ),
        }
    }
}

/// A wall clock that advances with Tokio's clock.
///
/// Anchored to an epoch instant at construction and moved forward by the
/// elapsed `tokio::time::Instant`. Under `#[tokio::test(start_paused =
/// true)]` it follows `tokio::time::advance`, so timer-driven tests see
/// timers and timestamps move together.
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    epoch: Timestamp,
    origin: tokio::time::Instant,
}

impl TokioClock {
    /// Anchors at the current system time.
    pub fn new() -> Self {
        Self::starting_at(SystemClock.now())
    }

    /// Anchors at a chosen instant.
    pub fn starting_at(epoch: Timestamp) -> Self {
        Self {
            epoch,
            origin: tokio::time::Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    fn now(&self) -> Timestamp {
        let elapsed = self.origin.elapsed().as_millis();
        self.epoch
            .plus_millis(i64::try_from(elapsed).unwrap_or(i64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_timestamp_parses_persisted_form() {
        let ts: Timestamp = "1700000000000".parse().unwrap();
        assert_eq!(ts, Timestamp(1_700_000_000_000));
        assert_eq!(ts.to_string(), "1700000000000");
        assert!(" 42 ".parse::<Timestamp>().is_ok());
        assert!("NaN".parse::<Timestamp>().is_err());
    }

    #[test]
    fn test_millis_since_can_be_negative() {
        assert_eq!(Timestamp(1_500).millis_since(Timestamp(1_000)), 500);
        assert_eq!(Timestamp(1_000).millis_since(Timestamp(1_500)), -500);
    }

    #[test]
    fn test_system_clock_is_after_2020() {
        assert!(SystemClock.now() > Timestamp(1_577_836_800_000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_clock_follows_paused_time() {
        let clock = TokioClock::starting_at(Timestamp(10_000));
        assert_eq!(clock.now(), Timestamp(10_000));

        tokio::time::advance(Duration::from_millis(1_250)).await;

        assert_eq!(clock.now(), Timestamp(11_250));
    }
}
