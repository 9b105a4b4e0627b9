//! Periodic tick scheduler for Skirmish.
//!
//! The reactor uses one scheduler to drive everything that must happen
//! without client traffic: heartbeats, the inactivity sweep, the duel's
//! re-arm delay and the world simulation step.
//!
//! # Event-driven mode
//!
//! When `tick_rate_hz` is 0, [`TickScheduler::wait_for_tick`] pends forever
//! and the reactor only reacts to sockets.
//!
//! # Integration
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(event) = inbound.recv() => { /* handle frame */ }
//!         info = scheduler.wait_for_tick() => {
//!             reactor.on_tick(Instant::now()).await;
//!             scheduler.record_tick_end();
//!         }
//!     }
//! }
//! ```

use std::time::{Duration, Instant};

use tokio::time::{self, Interval, MissedTickBehavior};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Full configuration for the tick scheduler.
///
/// A reactor that falls behind drops the missed ticks and resumes on the
/// original cadence; ticks never fire back to back to catch up.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Tick rate in Hz. 0 = event-driven (tick never fires).
    pub tick_rate_hz: u32,
    /// Fraction of the tick period (0.0–1.0) above which a slow tick is
    /// logged. Default: 0.80.
    pub budget_warn_threshold: f64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 0,
            budget_warn_threshold: 0.80,
        }
    }
}

impl TickConfig {
    /// Maximum supported tick rate.
    pub const MAX_TICK_RATE_HZ: u32 = 128;

    /// A config for a specific tick rate with default settings.
    pub fn with_rate(tick_rate_hz: u32) -> Self {
        Self {
            tick_rate_hz,
            ..Default::default()
        }
    }

    /// Clamps out-of-range values. Called by [`TickScheduler::new`].
    pub fn validated(mut self) -> Self {
        if self.tick_rate_hz > Self::MAX_TICK_RATE_HZ {
            warn!(
                rate = self.tick_rate_hz,
                max = Self::MAX_TICK_RATE_HZ,
                "tick_rate_hz exceeds maximum, clamping"
            );
            self.tick_rate_hz = Self::MAX_TICK_RATE_HZ;
        }
        self.budget_warn_threshold = self.budget_warn_threshold.clamp(0.0, 1.0);
        self
    }

    /// Duration of a single tick. `None` in event-driven mode.
    pub fn tick_duration(&self) -> Option<Duration> {
        (self.tick_rate_hz > 0).then(|| Duration::from_secs_f64(1.0 / self.tick_rate_hz as f64))
    }
}

// ---------------------------------------------------------------------------
// TickInfo
// ---------------------------------------------------------------------------

/// Information about a fired tick.
#[derive(Debug, Clone)]
pub struct TickInfo {
    /// Monotonically increasing tick number (starts at 1).
    pub tick: u64,
    /// The configured tick period.
    pub dt: Duration,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Fixed-period tick source for one reactor.
pub struct TickScheduler {
    config: TickConfig,
    interval: Option<Interval>,
    tick_count: u64,
    /// Set by `wait_for_tick`, consumed by `record_tick_end`.
    tick_start: Option<Instant>,
}

impl TickScheduler {
    /// Creates a scheduler. The first tick fires one period from now.
    ///
    /// Must be called inside a Tokio runtime when the rate is non-zero.
    pub fn new(config: TickConfig) -> Self {
        let config = config.validated();
        let interval = config.tick_duration().map(|period| {
            let mut interval = time::interval_at(time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            interval
        });

        match config.tick_duration() {
            None => debug!("tick scheduler created in event-driven mode"),
            Some(period) => debug!(
                rate_hz = config.tick_rate_hz,
                period_ms = period.as_secs_f64() * 1000.0,
                "tick scheduler created"
            ),
        }

        Self {
            config,
            interval,
            tick_count: 0,
            tick_start: None,
        }
    }

    /// A scheduler for a specific tick rate with default settings.
    pub fn with_rate(tick_rate_hz: u32) -> Self {
        Self::new(TickConfig::with_rate(tick_rate_hz))
    }

    /// Waits until the next tick is due.
    ///
    /// In event-driven mode this future never resolves, which leaves the
    /// other `select!` branches in charge.
    pub async fn wait_for_tick(&mut self) -> TickInfo {
        let Some(interval) = self.interval.as_mut() else {
            return std::future::pending().await;
        };
        interval.tick().await;

        self.tick_count += 1;
        self.tick_start = Some(Instant::now());
        trace!(tick = self.tick_count, "tick fired");

        TickInfo {
            tick: self.tick_count,
            dt: interval.period(),
        }
    }

    /// Records that the work for the current tick has finished.
    ///
    /// Logs a warning, and returns `true`, when the work used more than the
    /// configured share of the tick period. Returns `false` if no tick is in
    /// progress.
    pub fn record_tick_end(&mut self) -> bool {
        let Some(start) = self.tick_start.take() else {
            return false;
        };
        let Some(budget) = self.config.tick_duration() else {
            return false;
        };
        let elapsed = start.elapsed();
        let utilization = elapsed.as_secs_f64() / budget.as_secs_f64();
        let slow = utilization >= self.config.budget_warn_threshold;
        if slow {
            warn!(
                tick = self.tick_count,
                elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                budget_ms = budget.as_secs_f64() * 1000.0,
                "tick work approaching period"
            );
        }
        slow
    }
}
