//! Match configuration and state machine.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// FinishPolicy
// ---------------------------------------------------------------------------

/// What the server does after a match reaches [`MatchState::Finished`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishPolicy {
    /// Wait `delay`, reset the match, and go back to `Waiting` with the
    /// existing connections kept open.
    Rearm { delay: Duration },
    /// Stop the server once the results are delivered.
    Halt,
}

// ---------------------------------------------------------------------------
// MatchConfig
// ---------------------------------------------------------------------------

/// Configuration for the single match a server hosts.
///
/// Rule engines supply their own via `RuleEngine::match_config()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Number of connection slots. Connections beyond this are refused.
    pub capacity: usize,

    /// Connected participants needed to leave `Waiting`.
    pub required_players: usize,

    /// Maintenance and simulation tick rate in Hz. 0 disables ticking.
    pub tick_rate_hz: u32,

    /// Behaviour after the match finishes.
    pub finish: FinishPolicy,

    /// Answer messages that parse but don't fit the rule engine's message
    /// shapes with an `error` reply. When `false` they are only logged.
    pub report_malformed: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            capacity: 2,
            required_players: 2,
            tick_rate_hz: 1,
            finish: FinishPolicy::Rearm {
                delay: Duration::from_secs(5),
            },
            report_malformed: true,
        }
    }
}

// ---------------------------------------------------------------------------
// MatchState
// ---------------------------------------------------------------------------

/// The lifecycle state of a match.
///
/// ```text
///            ┌──────────────── reset ─────────────────┐
///            ▼                                        │
/// Waiting ──→ Setup ──→ Active ──→ Finished ──────────┤
///               │                     ▲               │
///               └─────────────────────┘               │
///   (any state may reset to Waiting) ─────────────────┘
/// ```
///
/// - **Waiting**: accepting connections, not enough participants yet.
/// - **Setup**: participants are submitting setup data (a secret code,
///   a base position).
/// - **Active**: the game is being played.
/// - **Finished**: a winner was decided. Results have been sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchState {
    Waiting,
    Setup,
    Active,
    Finished,
}

impl MatchState {
    /// The next state in the normal forward order, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Waiting => Some(Self::Setup),
            Self::Setup => Some(Self::Active),
            Self::Active => Some(Self::Finished),
            Self::Finished => None,
        }
    }

    /// Returns `true` if moving to `target` is allowed.
    ///
    /// Allowed moves are one step forward, `Setup → Finished` (a match can
    /// be decided before every participant finished setup), and a reset
    /// from any state back to `Waiting`.
    pub fn can_transition_to(self, target: Self) -> bool {
        self.next() == Some(target)
            || target == Self::Waiting
            || (self == Self::Setup && target == Self::Finished)
    }

    /// Returns `true` while a match is underway (Setup or Active).
    pub fn is_in_progress(self) -> bool {
        matches!(self, Self::Setup | Self::Active)
    }
}

impl std::fmt::Display for MatchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Waiting => write!(f, "Waiting"),
            Self::Setup => write!(f, "Setup"),
            Self::Active => write!(f, "Active"),
            Self::Finished => write!(f, "Finished"),
        }
    }
}
