//! The world: a real-time tile-map strategy game for up to eight players.
//!
//! Each player places one base, produces units next to it, moves them a
//! tile at a time and attacks adjacent units. Every tick the full state is
//! broadcast. Once two bases have stood at the same time, the match ends
//! when only one is left; the server then stops.

mod command;
mod grid;
mod sim;
mod snapshot;

use std::time::{Duration, Instant};

use serde::Serialize;
use skirmish_match::{FinishPolicy, MatchConfig, MatchContext, MatchState, Outbox, RuleEngine, RuleError};
use skirmish_protocol::{PlayerId, Recipient};

pub use command::{CommandPayload, MissingField, WorldCommand, WorldRequest};
pub use grid::{Grid, Point, Tile};
pub use sim::{
    BASE_HP, Building, Incident, MAX_FACTION, MAX_UNITS, Participant, SimError, Unit, UnitKind,
    WorldState,
};
pub use snapshot::{PlayerView, Snapshot, UnitView};

use crate::Outcome;

/// Connection slots in a world server.
pub const WORLD_PLAYERS: usize = 8;

/// World generation and event settings.
#[derive(Debug, Clone)]
pub struct WorldConfig {
    pub width: usize,
    pub height: usize,
    /// Chance, per cell, of a resource tile.
    pub resource_percent: u8,
    /// Minimum time between random event rolls.
    pub event_interval: Duration,
    /// Fixed RNG seed. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 16,
            height: 16,
            resource_percent: 10,
            event_interval: Duration::from_secs(10),
            seed: None,
        }
    }
}

/// Messages the world sends to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum WorldEvent {
    CountryOk,
    UpdateState { state: Snapshot },
    Event { event: &'static str },
    GameStart { message: String },
    GameOver { result: Outcome, winner: PlayerId },
    Error { message: String },
}

impl WorldEvent {
    fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

/// The world rule engine.
pub struct World;

impl RuleEngine for World {
    type Config = WorldConfig;
    type State = WorldState;
    type ClientMessage = WorldRequest;
    type ServerMessage = WorldEvent;

    fn match_config() -> MatchConfig {
        MatchConfig {
            capacity: WORLD_PLAYERS,
            required_players: 2,
            tick_rate_hz: 1,
            finish: FinishPolicy::Halt,
            report_malformed: false,
        }
    }

    fn init(config: &WorldConfig) -> WorldState {
        WorldState::new(config)
    }

    fn on_join(
        state: &mut WorldState,
        _ctx: &mut MatchContext<'_>,
        player: PlayerId,
    ) -> Outbox<WorldEvent> {
        state.add_participant(player);
        Vec::new()
    }

    fn on_start(_state: &mut WorldState, _ctx: &mut MatchContext<'_>) -> Outbox<WorldEvent> {
        vec![(Recipient::All, WorldEvent::GameStart {
            message: "game started: place your base".into(),
        })]
    }

    fn validate_message(
        state: &WorldState,
        ctx: &MatchContext<'_>,
        sender: PlayerId,
        _msg: &WorldRequest,
    ) -> Result<(), RuleError> {
        if state.participant(sender).is_none() {
            return Err(RuleError::UnknownPlayer(sender));
        }
        if ctx.phase() == MatchState::Finished {
            return Err(RuleError::IllegalState("the match is over".into()));
        }
        Ok(())
    }

    fn handle_message(
        state: &mut WorldState,
        _ctx: &mut MatchContext<'_>,
        sender: PlayerId,
        msg: WorldRequest,
    ) -> Outbox<WorldEvent> {
        let reply = match msg {
            WorldRequest::Country { country } => match state.choose_faction(sender, country) {
                Ok(()) => {
                    tracing::info!(player = %sender, country, "country chosen");
                    Some(WorldEvent::CountryOk)
                }
                Err(e) => Some(WorldEvent::error(e.to_string())),
            },
            WorldRequest::Command { kind, payload } => match WorldCommand::parse(kind, payload.as_ref()) {
                Ok(Some(command)) => apply(state, sender, command),
                Ok(None) => {
                    tracing::debug!(player = %sender, kind, "command ignored");
                    None
                }
                Err(e) => Some(WorldEvent::error(e.to_string())),
            },
        };
        reply
            .map(|event| vec![(Recipient::Player(sender), event)])
            .unwrap_or_default()
    }

    fn tick(state: &mut WorldState, ctx: &mut MatchContext<'_>, now: Instant) -> Outbox<WorldEvent> {
        if ctx.phase() == MatchState::Finished {
            return Vec::new();
        }

        let mut out = Vec::new();
        if let Some(event) = state.tick(now).and_then(Incident::event_name) {
            out.push((Recipient::All, WorldEvent::Event { event }));
        }

        let live = state.live_bases();
        if ctx.phase() == MatchState::Setup && live.len() >= 2 {
            if let Err(e) = ctx.transition(MatchState::Active) {
                tracing::warn!(error = %e, "could not activate world");
            }
        }

        if state.is_terminal() {
            if let [winner] = live[..] {
                match ctx.transition(MatchState::Finished) {
                    Ok(()) => {
                        tracing::info!(%winner, "world decided");
                        out.extend(ctx.roster().iter().map(|&id| {
                            let result = if id == winner { Outcome::Victory } else { Outcome::Defeat };
                            (Recipient::Player(id), WorldEvent::GameOver { result, winner })
                        }));
                        return out;
                    }
                    Err(e) => tracing::warn!(error = %e, "could not finish world"),
                }
            }
        }

        out.push((Recipient::All, WorldEvent::UpdateState {
            state: state.snapshot(),
        }));
        out
    }

    fn on_leave(
        state: &mut WorldState,
        _ctx: &mut MatchContext<'_>,
        player: PlayerId,
    ) -> Outbox<WorldEvent> {
        state.remove_participant(player);
        Vec::new()
    }
}

/// Runs one command. Successful changes are reported through the next
/// state broadcast, so only failures and state requests produce a reply.
fn apply(state: &mut WorldState, sender: PlayerId, command: WorldCommand) -> Option<WorldEvent> {
    let result = match command {
        WorldCommand::RequestState => {
            return Some(WorldEvent::UpdateState {
                state: state.snapshot(),
            });
        }
        WorldCommand::PlaceBase { at } => state
            .place_base(sender, at)
            .map_err(|e| format!("place base failed: {e}")),
        WorldCommand::ProduceUnit { unit_type } => UnitKind::from_code(unit_type)
            .and_then(|kind| state.produce_unit(sender, kind))
            .map(|_| ())
            .map_err(|e| format!("produce failed: {e}")),
        WorldCommand::MoveUnit { unit_id, to } => state
            .move_unit(sender, unit_id, to)
            .map_err(|e| format!("move failed: {e}")),
        WorldCommand::AttackUnit {
            attacker_id,
            target_id,
        } => state
            .attack_unit(sender, attacker_id, target_id)
            .map(|_| ())
            .map_err(|e| format!("attack failed: {e}")),
    };

    match result {
        Ok(()) => None,
        Err(message) => {
            tracing::debug!(player = %sender, %message, "command rejected");
            Some(WorldEvent::error(message))
        }
    }
}
