//! The `RuleEngine` trait, the extension point each game implements.
//!
//! The reactor owns connections, slots and the lifecycle state, and calls
//! into the rule engine at well-defined points. A rule engine never touches
//! a socket; it returns the messages it wants delivered.

use std::time::Instant;

use serde::{Serialize, de::DeserializeOwned};
use skirmish_protocol::{PlayerId, Recipient};

use crate::{MatchConfig, MatchContext, RuleError};

/// Messages a rule engine wants delivered, each with its recipients.
pub type Outbox<M> = Vec<(Recipient, M)>;

/// The game-specific half of a server.
///
/// Associated types:
/// - `Config`: game settings (map size, event interval, RNG seed)
/// - `State`: everything the game mutates, created once per server
/// - `ClientMessage`: the closed set of requests clients may send
/// - `ServerMessage`: the messages the game sends back
///
/// Callback order for one connection:
///
/// ```text
/// on_join ─→ [on_start once enough players] ─→ validate_message/handle_message*
///         ─→ tick* ─→ on_leave
/// ```
pub trait RuleEngine: Send + 'static {
    /// Game-specific configuration.
    type Config: Send + Clone + Default;

    /// The full game state. Owned by the reactor task.
    type State: Send;

    /// Requests clients send, tagged by `action`.
    type ClientMessage: DeserializeOwned + Send;

    /// Messages the game sends to clients, tagged by `action`.
    type ServerMessage: Serialize + Send;

    /// Slot count, start threshold, tick rate and finish policy.
    fn match_config() -> MatchConfig {
        MatchConfig::default()
    }

    /// Creates the game state when the server starts.
    fn init(config: &Self::Config) -> Self::State;

    /// A participant was given a slot. `ctx.roster()` already includes it.
    fn on_join(
        _state: &mut Self::State,
        _ctx: &mut MatchContext<'_>,
        _player: PlayerId,
    ) -> Outbox<Self::ServerMessage> {
        Vec::new()
    }

    /// The match just moved from `Waiting` to `Setup`.
    fn on_start(
        _state: &mut Self::State,
        _ctx: &mut MatchContext<'_>,
    ) -> Outbox<Self::ServerMessage> {
        Vec::new()
    }

    /// Checks a request against the current state before it is applied.
    ///
    /// An `Err` is sent back to the sender as an `error` message and the
    /// request is dropped. Default: accept everything.
    fn validate_message(
        _state: &Self::State,
        _ctx: &MatchContext<'_>,
        _sender: PlayerId,
        _msg: &Self::ClientMessage,
    ) -> Result<(), RuleError> {
        Ok(())
    }

    /// Applies a validated request.
    fn handle_message(
        state: &mut Self::State,
        ctx: &mut MatchContext<'_>,
        sender: PlayerId,
        msg: Self::ClientMessage,
    ) -> Outbox<Self::ServerMessage>;

    /// Called on every reactor tick with the current time. Default: no-op.
    fn tick(
        _state: &mut Self::State,
        _ctx: &mut MatchContext<'_>,
        _now: Instant,
    ) -> Outbox<Self::ServerMessage> {
        Vec::new()
    }

    /// A participant's slot is being released. `ctx.roster()` no longer
    /// includes it.
    fn on_leave(
        _state: &mut Self::State,
        _ctx: &mut MatchContext<'_>,
        _player: PlayerId,
    ) -> Outbox<Self::ServerMessage> {
        Vec::new()
    }

    /// Clears per-match fields before a finished match returns to
    /// `Waiting`. Only called under `FinishPolicy::Rearm`.
    fn on_rearm(_state: &mut Self::State) {}
}
