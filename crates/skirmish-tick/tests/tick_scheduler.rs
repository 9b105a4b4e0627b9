//! Integration tests for the tick scheduler.
//!
//! Timing tests run with a paused Tokio clock, which auto-advances to the
//! next timer whenever the runtime is otherwise idle.

use std::time::Duration;

use skirmish_tick::{TickConfig, TickScheduler};

// =========================================================================
// TickConfig
// =========================================================================

#[test]
fn test_default_config_is_event_driven() {
    let cfg = TickConfig::default();
    assert_eq!(cfg.tick_rate_hz, 0);
    assert_eq!(cfg.tick_duration(), None);
}

#[test]
fn test_with_rate_one_hz_is_one_second() {
    let cfg = TickConfig::with_rate(1);
    assert_eq!(cfg.tick_duration(), Some(Duration::from_secs(1)));
}

#[test]
fn test_validated_clamps_rate_and_threshold() {
    let cfg = TickConfig {
        tick_rate_hz: 1000,
        budget_warn_threshold: 3.0,
        ..TickConfig::default()
    }
    .validated();
    assert_eq!(cfg.tick_rate_hz, TickConfig::MAX_TICK_RATE_HZ);
    assert_eq!(cfg.budget_warn_threshold, 1.0);
}

// =========================================================================
// Tick firing
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_wait_for_tick_fires_after_one_period() {
    let start = tokio::time::Instant::now();
    let mut s = TickScheduler::with_rate(1);

    let info = s.wait_for_tick().await;
    assert_eq!(info.tick, 1);
    assert_eq!(info.dt, Duration::from_secs(1));
    assert!(start.elapsed() >= Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_ticks_increment_monotonically() {
    let mut s = TickScheduler::with_rate(20);
    for expected in 1..=5 {
        assert_eq!(s.wait_for_tick().await.tick, expected);
    }
}

#[tokio::test(start_paused = true)]
async fn test_event_driven_never_fires() {
    let mut s = TickScheduler::with_rate(0);

    let result = tokio::time::timeout(Duration::from_secs(60), s.wait_for_tick()).await;
    assert!(result.is_err(), "event-driven scheduler should pend forever");
}

#[tokio::test(start_paused = true)]
async fn test_wait_for_tick_after_stall_does_not_burst() {
    let mut s = TickScheduler::with_rate(10);
    s.wait_for_tick().await;

    // Stall for ten periods. Missed ticks are dropped, not fired back to back.
    tokio::time::advance(Duration::from_secs(1)).await;
    s.wait_for_tick().await;
    let result = tokio::time::timeout(Duration::from_millis(50), s.wait_for_tick()).await;
    assert!(result.is_err(), "skipped ticks should not fire immediately");
}

// =========================================================================
// record_tick_end()
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_record_tick_end_fast_tick_not_slow() {
    let mut s = TickScheduler::with_rate(20);
    for _ in 0..3 {
        s.wait_for_tick().await;
        assert!(!s.record_tick_end());
    }
}

#[tokio::test]
async fn test_record_tick_end_without_wait_is_noop() {
    let mut s = TickScheduler::with_rate(20);
    assert!(!s.record_tick_end());
}

#[tokio::test(start_paused = true)]
async fn test_record_tick_end_past_threshold_is_slow() {
    let mut s = TickScheduler::new(TickConfig {
        budget_warn_threshold: 0.0,
        ..TickConfig::with_rate(20)
    });

    s.wait_for_tick().await;
    // record_tick_end measures wall-clock time, not Tokio time.
    std::thread::sleep(Duration::from_micros(50));
    assert!(s.record_tick_end());
    assert!(!s.record_tick_end(), "tick already ended");
}

// =========================================================================
// select! loop pattern (mirrors the reactor)
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_select_loop_pattern() {
    let mut s = TickScheduler::with_rate(20);
    let (tx, mut rx) = tokio::sync::mpsc::channel::<&str>(10);

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(160)).await;
        tx.send("stop").await.ok();
    });

    let mut ticks_fired = 0u64;
    loop {
        tokio::select! {
            Some(cmd) = rx.recv() => {
                assert_eq!(cmd, "stop");
                break;
            }
            info = s.wait_for_tick() => {
                ticks_fired += 1;
                s.record_tick_end();
                assert_eq!(info.tick, ticks_fired);
            }
        }
    }

    assert!(ticks_fired >= 3, "expected at least 3 ticks, got {ticks_fired}");
}
