//! The view of a match a rule engine gets while handling one event.

use skirmish_protocol::PlayerId;

use crate::{MatchState, RuleError};

/// Borrowed match state handed to every [`RuleEngine`](crate::RuleEngine)
/// callback.
///
/// The reactor owns the lifecycle state; rule engines can read it and
/// request transitions, but every transition is checked against
/// [`MatchState::can_transition_to`].
#[derive(Debug)]
pub struct MatchContext<'a> {
    phase: &'a mut MatchState,
    roster: &'a [PlayerId],
}

impl<'a> MatchContext<'a> {
    /// Wraps the reactor's lifecycle state and connected roster.
    pub fn new(phase: &'a mut MatchState, roster: &'a [PlayerId]) -> Self {
        Self { phase, roster }
    }

    /// Current lifecycle state.
    pub fn phase(&self) -> MatchState {
        *self.phase
    }

    /// Connected participants, in ascending identity order.
    pub fn roster(&self) -> &[PlayerId] {
        self.roster
    }

    /// Moves the match to `to`.
    ///
    /// # Errors
    /// Returns [`RuleError::InvalidTransition`] and leaves the state
    /// unchanged if the move isn't allowed.
    pub fn transition(&mut self, to: MatchState) -> Result<(), RuleError> {
        let from = *self.phase;
        if !from.can_transition_to(to) {
            return Err(RuleError::InvalidTransition { from, to });
        }
        *self.phase = to;
        tracing::info!(%from, %to, "match state changed");
        Ok(())
    }
}
