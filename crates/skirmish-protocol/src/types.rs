//! Core protocol types shared by every rule engine.
//!
//! Every message on the wire is a JSON object with a mandatory `action`
//! string. Rule engines define their own action sets; the ones here are
//! emitted by the server core itself regardless of which game is running.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// A participant's identity: the index of the connection slot it occupies.
///
/// Identities come from a small fixed pool (`0..capacity`) and are reused
/// once the previous occupant has left. `#[serde(transparent)]` keeps it a
/// bare integer on the wire: `{"player_id":0}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// The slot index as a `usize`.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Recipient
// ---------------------------------------------------------------------------

/// Who should receive a server message.
///
/// Rule engines return `(Recipient, ServerMessage)` pairs and the
/// dispatcher resolves each recipient against the currently connected
/// slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// Every connected participant.
    All,

    /// One specific participant.
    Player(PlayerId),

    /// Everyone except the given participant.
    AllExcept(PlayerId),
}

// ---------------------------------------------------------------------------
// SystemMessage
// ---------------------------------------------------------------------------

/// Server-to-client messages produced by the core, not by a rule engine.
///
/// ```text
/// {"action":"assign_id","player_id":0}
/// {"action":"heartbeat","timestamp":10000}
/// {"action":"timeout","reason":"player 1 timed out"}
/// {"action":"error","message":"server full"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SystemMessage {
    /// Sent once, right after a slot is allocated.
    AssignId { player_id: PlayerId },

    /// Periodic keepalive. `timestamp` is milliseconds since server start.
    Heartbeat { timestamp: u64 },

    /// Another participant was evicted for inactivity.
    Timeout { reason: String },

    /// A request was rejected, or the connection is being refused.
    Error { message: String },
}

impl SystemMessage {
    /// Shorthand for an [`Error`](Self::Error) message.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}
