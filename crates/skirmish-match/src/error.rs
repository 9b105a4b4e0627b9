//! Error types for the match layer.

use skirmish_protocol::PlayerId;

use crate::MatchState;

/// Why a rule engine refused a request.
///
/// The `Display` text is sent to the client verbatim in an `error` message,
/// so variants carry human-readable reasons.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    /// The action isn't allowed in the current state (e.g. guessing out of
    /// turn). Nothing was changed.
    #[error("{0}")]
    IllegalState(String),

    /// The request's data is malformed (e.g. a code with repeated digits).
    /// The client may correct it and retry.
    #[error("{0}")]
    Validation(String),

    /// A lifecycle transition that the state machine doesn't allow.
    #[error("cannot move match from {from} to {to}")]
    InvalidTransition {
        /// State the match was in.
        from: MatchState,
        /// State that was requested.
        to: MatchState,
    },

    /// The sender has no participant record.
    #[error("player {0} is not in this match")]
    UnknownPlayer(PlayerId),
}
