//! Tests for the `RuleEngine` contract using a minimal game.
//!
//! The reactor isn't available here, so these tests play its part: they
//! hold the lifecycle state, build a `MatchContext` for each callback and
//! check what the engine asks to send.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use skirmish_match::{MatchConfig, MatchContext, MatchState, Outbox, RuleEngine, RuleError};
use skirmish_protocol::{PlayerId, Recipient};

// =========================================================================
// Mock game: first participant to press three times wins
// =========================================================================

struct PressRace;

#[derive(Default)]
struct PressState {
    presses: Vec<(PlayerId, u32)>,
}

#[derive(Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum PressRequest {
    Press,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum PressEvent {
    Pressed { player: PlayerId, count: u32 },
    Winner { player: PlayerId },
}

impl RuleEngine for PressRace {
    type Config = ();
    type State = PressState;
    type ClientMessage = PressRequest;
    type ServerMessage = PressEvent;

    fn match_config() -> MatchConfig {
        MatchConfig {
            tick_rate_hz: 0,
            ..MatchConfig::default()
        }
    }

    fn init(_config: &()) -> PressState {
        PressState::default()
    }

    fn on_join(
        state: &mut PressState,
        _ctx: &mut MatchContext<'_>,
        player: PlayerId,
    ) -> Outbox<PressEvent> {
        state.presses.push((player, 0));
        Vec::new()
    }

    fn validate_message(
        _state: &PressState,
        ctx: &MatchContext<'_>,
        _sender: PlayerId,
        _msg: &PressRequest,
    ) -> Result<(), RuleError> {
        if ctx.phase() != MatchState::Active {
            return Err(RuleError::IllegalState("not playing".into()));
        }
        Ok(())
    }

    fn handle_message(
        state: &mut PressState,
        ctx: &mut MatchContext<'_>,
        sender: PlayerId,
        _msg: PressRequest,
    ) -> Outbox<PressEvent> {
        let Some(entry) = state.presses.iter_mut().find(|(p, _)| *p == sender) else {
            return Vec::new();
        };
        entry.1 += 1;
        let count = entry.1;
        let mut out = vec![(Recipient::All, PressEvent::Pressed { player: sender, count })];
        if count == 3 && ctx.transition(MatchState::Finished).is_ok() {
            out.push((Recipient::All, PressEvent::Winner { player: sender }));
        }
        out
    }
}

// =========================================================================
// Tests
// =========================================================================

#[test]
fn test_default_hooks_return_nothing() {
    let mut state = PressRace::init(&());
    let mut phase = MatchState::Waiting;
    let mut ctx = MatchContext::new(&mut phase, &[]);

    assert!(PressRace::on_start(&mut state, &mut ctx).is_empty());
    assert!(PressRace::tick(&mut state, &mut ctx, Instant::now()).is_empty());
    assert!(PressRace::on_leave(&mut state, &mut ctx, PlayerId(0)).is_empty());
}

#[test]
fn test_validate_message_rejects_outside_active() {
    let state = PressRace::init(&());
    let mut phase = MatchState::Setup;
    let ctx = MatchContext::new(&mut phase, &[]);

    let result = PressRace::validate_message(&state, &ctx, PlayerId(0), &PressRequest::Press);
    assert_eq!(result, Err(RuleError::IllegalState("not playing".into())));
}

#[test]
fn test_handle_message_third_press_finishes_match() {
    let roster = [PlayerId(0), PlayerId(1)];
    let mut state = PressRace::init(&());
    let mut phase = MatchState::Active;

    for player in roster {
        let mut ctx = MatchContext::new(&mut phase, &roster);
        PressRace::on_join(&mut state, &mut ctx, player);
    }

    let mut last = Vec::new();
    for _ in 0..3 {
        let mut ctx = MatchContext::new(&mut phase, &roster);
        last = PressRace::handle_message(&mut state, &mut ctx, PlayerId(1), PressRequest::Press);
    }

    assert_eq!(phase, MatchState::Finished);
    assert_eq!(
        last.last(),
        Some(&(Recipient::All, PressEvent::Winner { player: PlayerId(1) }))
    );
}

#[test]
fn test_match_config_override() {
    let config = PressRace::match_config();
    assert_eq!(config.tick_rate_hz, 0);
    assert_eq!(config.capacity, 2);
}

#[test]
fn test_rule_error_display_is_client_facing() {
    assert_eq!(RuleError::Validation("bad code".into()).to_string(), "bad code");
    assert_eq!(
        RuleError::UnknownPlayer(PlayerId(4)).to_string(),
        "player P-4 is not in this match"
    );
}
