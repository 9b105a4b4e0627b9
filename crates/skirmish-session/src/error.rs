//! Error types for the session layer.

use skirmish_protocol::PlayerId;

/// Errors that can occur while managing connection slots.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Every slot is occupied. The new connection is refused without
    /// consuming a slot.
    #[error("all {capacity} slots are occupied")]
    Full {
        /// Total number of slots in the registry.
        capacity: usize,
    },

    /// The identity doesn't refer to an occupied slot. Happens when a
    /// release races an earlier release of the same participant.
    #[error("no connection in slot {0}")]
    NotFound(PlayerId),
}
