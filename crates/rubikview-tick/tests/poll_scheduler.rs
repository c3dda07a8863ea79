//! Integration tests for the poll scheduler.
//!
//! Uses `start_paused = true` so Tokio's clock only moves when the test
//! advances it (or when every task is idle and auto-advance kicks in).

use std::time::Duration;

use rubikview_tick::{PollConfig, PollScheduler};
use tokio::time::Instant;

/// Paused time lands on timer-wheel ticks, which are whole milliseconds.
fn assert_elapsed(since: Instant, expected: Duration) {
    let elapsed = since.elapsed();
    assert!(
        elapsed >= expected && elapsed <= expected + Duration::from_millis(1),
        "expected ~{expected:?}, got {elapsed:?}"
    );
}

// =========================================================================
// PollConfig
// =========================================================================

#[test]
fn test_default_config_is_one_second() {
    assert_eq!(PollConfig::default().interval, Duration::from_secs(1));
}

#[test]
fn test_validated_clamps_tiny_interval() {
    let cfg = PollConfig::with_interval(Duration::ZERO).validated();
    assert_eq!(cfg.interval, PollConfig::MIN_INTERVAL);
}

#[test]
fn test_validated_clamps_huge_interval() {
    let cfg = PollConfig::with_interval(Duration::MAX).validated();
    assert_eq!(cfg.interval, PollConfig::MAX_INTERVAL);
}

#[tokio::test(start_paused = true)]
async fn test_new_with_huge_interval_does_not_overflow() {
    let s = PollScheduler::new(PollConfig::with_interval(Duration::MAX));
    assert_eq!(s.interval(), PollConfig::MAX_INTERVAL);
}

#[test]
fn test_validated_keeps_sane_interval() {
    let cfg = PollConfig::with_interval(Duration::from_millis(250)).validated();
    assert_eq!(cfg.interval, Duration::from_millis(250));
}

// =========================================================================
// Firing
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_initial_state() {
    let s = PollScheduler::new(PollConfig::default());
    assert_eq!(s.poll_count(), 0);
    assert_eq!(s.interval(), Duration::from_secs(1));
    assert_eq!(s.metrics().total_polls, 0);
}

#[tokio::test(start_paused = true)]
async fn test_wait_for_poll_fires_after_one_interval() {
    let mut s = PollScheduler::new(PollConfig::default());
    let start = Instant::now();

    let info = s.wait_for_poll().await;

    assert_eq!(info.poll, 1);
    assert!(!info.late);
    assert_eq!(info.skipped, 0);
    assert_elapsed(start, Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_polls_increment_monotonically() {
    let mut s = PollScheduler::new(PollConfig::default());
    for expected in 1..=5 {
        assert_eq!(s.wait_for_poll().await.poll, expected);
    }
    assert_eq!(s.metrics().total_polls, 5);
}

#[tokio::test(start_paused = true)]
async fn test_late_wakeup_skips_ahead_without_burst() {
    let mut s = PollScheduler::new(PollConfig::default());
    let start = Instant::now();

    // The process "sleeps" for 5.5 seconds before anyone polls.
    tokio::time::advance(Duration::from_millis(5_500)).await;
    let info = s.wait_for_poll().await;

    assert!(info.late);
    assert_eq!(info.skipped, 4);

    // Next poll is one interval after the late wakeup, not immediately.
    s.wait_for_poll().await;
    assert_elapsed(start, Duration::from_millis(6_500));
    assert_eq!(s.metrics().total_late, 1);
    assert_eq!(s.metrics().total_skipped, 4);
}

// =========================================================================
// Rephase
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_rephase_moves_next_poll_to_one_interval_from_now() {
    let mut s = PollScheduler::new(PollConfig::default());
    let start = Instant::now();

    tokio::time::advance(Duration::from_millis(300)).await;
    s.rephase();

    let info = s.wait_for_poll().await;
    assert_eq!(info.poll, 1);
    assert!(!info.late);
    assert_elapsed(start, Duration::from_millis(1_300));

    // Later polls keep the new phase.
    s.wait_for_poll().await;
    assert_elapsed(start, Duration::from_millis(2_300));
}

#[tokio::test(start_paused = true)]
async fn test_rephase_after_poll_does_not_count_a_poll() {
    let mut s = PollScheduler::new(PollConfig::default());
    s.wait_for_poll().await;

    s.rephase();
    s.rephase();

    assert_eq!(s.poll_count(), 1);
    assert_eq!(s.metrics().total_polls, 1);
}

// =========================================================================
// select! loop pattern (mirrors the monitor actor)
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_select_loop_pattern() {
    let mut s = PollScheduler::new(PollConfig::default());
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<&str>();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(3_500)).await;
        let _ = tx.send("stop");
    });

    let mut polls = 0u64;
    loop {
        tokio::select! {
            Some(cmd) = rx.recv() => {
                assert_eq!(cmd, "stop");
                break;
            }
            info = s.wait_for_poll() => {
                polls += 1;
                assert_eq!(info.poll, polls);
            }
        }
    }

    assert_eq!(polls, 3);
}
