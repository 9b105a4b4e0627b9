//! Slot types: the record binding one connection to one identity.
//!
//! A slot tracks:
//! - WHO occupies it (`PlayerId`, fixed by the slot's index)
//! - WHICH connection is bound to it (`ConnectionId`)
//! - WHEN it last saw genuine traffic (for the timeout sweep)
//! - HOW MANY sends in a row have failed (for the retry policy)

use std::time::{Duration, Instant};

use skirmish_protocol::PlayerId;
use skirmish_transport::ConnectionId;

// ---------------------------------------------------------------------------
// ReliabilityConfig
// ---------------------------------------------------------------------------

/// Timing and retry limits for connected participants.
#[derive(Debug, Clone)]
pub struct ReliabilityConfig {
    /// How often a keepalive is broadcast. Default: 10 seconds.
    pub heartbeat_interval: Duration,

    /// How long a participant may go without traffic before it is
    /// evicted. Default: 30 seconds.
    pub activity_timeout: Duration,

    /// Consecutive failed sends after which a participant is marked
    /// stale. Default: 3.
    pub max_send_failures: u32,
}

impl Default for ReliabilityConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval: Duration::from_secs(10),
            activity_timeout: Duration::from_secs(30),
            max_send_failures: 3,
        }
    }
}

// ---------------------------------------------------------------------------
// SlotState
// ---------------------------------------------------------------------------

/// Where a slot is in its lifecycle.
///
/// ```text
///   allocate()           record_send_failure() × max
/// Free ──────→ Connected ───────────────────────────→ Stale
///  ↑               │                                    │
///  └── release() ──┴────────────── release() ───────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// Available for the next connection.
    Free,
    /// Bound to a live connection.
    Connected,
    /// Its peer stopped accepting writes. Still bound, no longer a
    /// delivery target, waiting for the reactor to tear it down.
    Stale,
}

// ---------------------------------------------------------------------------
// Slot
// ---------------------------------------------------------------------------

/// One entry of the [`SlotRegistry`](crate::SlotRegistry).
#[derive(Debug, Clone)]
pub struct Slot {
    /// The identity this slot hands out. Equal to its index.
    pub player_id: PlayerId,
    /// Current lifecycle state.
    pub state: SlotState,
    /// Connection bound to the slot, if occupied.
    pub connection: Option<ConnectionId>,
    /// Last successful send or receive.
    pub last_activity: Instant,
    /// Failed sends since the last successful one.
    pub send_failures: u32,
}

impl Slot {
    pub(crate) fn free(player_id: PlayerId, now: Instant) -> Self {
        Self {
            player_id,
            state: SlotState::Free,
            connection: None,
            last_activity: now,
            send_failures: 0,
        }
    }

    /// Whether the slot is bound to a connection (connected or stale).
    pub fn is_occupied(&self) -> bool {
        self.state != SlotState::Free
    }
}

// ---------------------------------------------------------------------------
// SendVerdict
// ---------------------------------------------------------------------------

/// Outcome of recording a failed send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendVerdict {
    /// Keep the participant; this many consecutive failures so far.
    Retry(u32),
    /// The limit was reached and the slot is now [`SlotState::Stale`].
    Evict,
}

// ---------------------------------------------------------------------------
// HeartbeatClock
// ---------------------------------------------------------------------------

/// Paces keepalive broadcasts.
#[derive(Debug, Clone)]
pub struct HeartbeatClock {
    interval: Duration,
    last: Instant,
}

impl HeartbeatClock {
    /// Starts the clock at `now`; the first heartbeat is due one interval later.
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            last: now,
        }
    }

    /// Returns `true` at most once per interval, re-arming when it does.
    pub fn due(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last) >= self.interval {
            self.last = now;
            true
        } else {
            false
        }
    }
}
