//! The duel: a two-player secret-number guessing game.
//!
//! Each player hides a code of three distinct digits. Players then take
//! turns guessing the opponent's code and are told how many digits are in
//! the right place (strikes) and how many are elsewhere (balls). Three
//! strikes wins.
//!
//! ```text
//! join ×2 → game_start → set_number ×2 → your_turn/wait_turn
//!        → guess → guess_result → (toggle turn | game_over)
//! ```

mod code;

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use skirmish_match::{FinishPolicy, MatchConfig, MatchContext, MatchState, Outbox, RuleEngine, RuleError};
use skirmish_protocol::{PlayerId, Recipient};

pub use code::{CODE_LEN, GuessResult, SecretCode, score, validate_code};

use crate::Outcome;

/// Players in a duel.
pub const DUEL_PLAYERS: usize = 2;

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Requests a duel client can send.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DuelRequest {
    /// `{"action":"set_number","number":"123"}`
    SetNumber { number: String },
    /// `{"action":"guess","guess":"456"}`
    Guess { guess: String },
}

/// Messages the duel sends to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DuelEvent {
    WaitPlayer {
        message: String,
    },
    GameStart {
        message: String,
    },
    NumberSet {
        message: String,
    },
    YourTurn {
        message: String,
    },
    WaitTurn {
        message: String,
    },
    GuessResult {
        guess: String,
        strikes: u8,
        balls: u8,
        attempts: u32,
        current_player: PlayerId,
    },
    GameOver {
        result: Outcome,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        your_number: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        opponent_number: Option<String>,
    },
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Where one player is within the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuelerState {
    /// Connected, no match running.
    Waiting,
    /// Must submit a secret code.
    Setting,
    /// Code submitted, waiting for the opponent's.
    Ready,
    /// This player guesses next.
    Turn,
    /// The opponent guesses next.
    WaitingTurn,
}

/// One player's record.
#[derive(Debug, Clone)]
pub struct Dueler {
    pub state: DuelerState,
    pub secret: Option<SecretCode>,
    pub attempts: u32,
}

impl Dueler {
    fn new() -> Self {
        Self {
            state: DuelerState::Waiting,
            secret: None,
            attempts: 0,
        }
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}

/// The duel's game state.
#[derive(Debug, Default)]
pub struct DuelState {
    duelers: BTreeMap<PlayerId, Dueler>,
    acting: Option<PlayerId>,
}

impl DuelState {
    /// A player's record, if connected.
    pub fn dueler(&self, id: PlayerId) -> Option<&Dueler> {
        self.duelers.get(&id)
    }

    /// The player whose turn it is, while a match is active.
    pub fn acting(&self) -> Option<PlayerId> {
        self.acting
    }

    fn opponent_of(&self, id: PlayerId) -> Option<PlayerId> {
        self.duelers.keys().copied().find(|&other| other != id)
    }

    fn secret_text(&self, id: Option<PlayerId>) -> Option<String> {
        id.and_then(|id| self.duelers.get(&id))
            .and_then(|d| d.secret)
            .map(|s| s.to_string())
    }

    fn all_ready(&self) -> bool {
        self.duelers.len() >= DUEL_PLAYERS
            && self.duelers.values().all(|d| d.state == DuelerState::Ready)
    }

    fn reset_all(&mut self) {
        self.duelers.values_mut().for_each(Dueler::reset);
        self.acting = None;
    }

    /// Hands the turn to `acting` and tells both players.
    fn start_turn(&mut self, acting: PlayerId) -> Outbox<DuelEvent> {
        self.acting = Some(acting);
        self.duelers
            .iter_mut()
            .map(|(&id, dueler)| {
                if id == acting {
                    dueler.state = DuelerState::Turn;
                    (Recipient::Player(id), DuelEvent::YourTurn {
                        message: "your turn: guess the opponent's number".into(),
                    })
                } else {
                    dueler.state = DuelerState::WaitingTurn;
                    (Recipient::Player(id), DuelEvent::WaitTurn {
                        message: "opponent's turn, please wait".into(),
                    })
                }
            })
            .collect()
    }

    /// Per-player results, revealing both codes. Leaves every player Waiting.
    fn game_over(&mut self, winner: PlayerId) -> Outbox<DuelEvent> {
        let ids: Vec<PlayerId> = self.duelers.keys().copied().collect();
        let out = ids
            .iter()
            .map(|&id| {
                let won = id == winner;
                (Recipient::Player(id), DuelEvent::GameOver {
                    result: if won { Outcome::Victory } else { Outcome::Defeat },
                    message: if won {
                        "you guessed the number".into()
                    } else {
                        "your opponent guessed first".into()
                    },
                    your_number: self.secret_text(Some(id)),
                    opponent_number: self.secret_text(self.opponent_of(id)),
                })
            })
            .collect();

        for dueler in self.duelers.values_mut() {
            dueler.state = DuelerState::Waiting;
        }
        self.acting = None;
        out
    }
}

// ---------------------------------------------------------------------------
// RuleEngine
// ---------------------------------------------------------------------------

/// The duel rule engine.
pub struct Duel;

impl RuleEngine for Duel {
    type Config = ();
    type State = DuelState;
    type ClientMessage = DuelRequest;
    type ServerMessage = DuelEvent;

    fn match_config() -> MatchConfig {
        MatchConfig {
            capacity: DUEL_PLAYERS,
            required_players: DUEL_PLAYERS,
            tick_rate_hz: 1,
            finish: FinishPolicy::Rearm {
                delay: Duration::from_secs(5),
            },
            report_malformed: true,
        }
    }

    fn init(_config: &()) -> DuelState {
        DuelState::default()
    }

    fn on_join(
        state: &mut DuelState,
        ctx: &mut MatchContext<'_>,
        player: PlayerId,
    ) -> Outbox<DuelEvent> {
        state.duelers.insert(player, Dueler::new());
        if ctx.roster().len() < DUEL_PLAYERS {
            vec![(Recipient::Player(player), DuelEvent::WaitPlayer {
                message: "waiting for an opponent".into(),
            })]
        } else {
            Vec::new()
        }
    }

    fn on_start(state: &mut DuelState, _ctx: &mut MatchContext<'_>) -> Outbox<DuelEvent> {
        state.reset_all();
        for dueler in state.duelers.values_mut() {
            dueler.state = DuelerState::Setting;
        }
        vec![(Recipient::All, DuelEvent::GameStart {
            message: "game started: set your 3-digit number".into(),
        })]
    }

    fn validate_message(
        state: &DuelState,
        _ctx: &MatchContext<'_>,
        sender: PlayerId,
        msg: &DuelRequest,
    ) -> Result<(), RuleError> {
        let dueler = state.dueler(sender).ok_or(RuleError::UnknownPlayer(sender))?;
        match msg {
            DuelRequest::SetNumber { number } => {
                if dueler.state != DuelerState::Setting {
                    return Err(RuleError::IllegalState("cannot set number now".into()));
                }
                SecretCode::parse(number).map(|_| ())
            }
            DuelRequest::Guess { guess } => {
                if dueler.state != DuelerState::Turn {
                    return Err(RuleError::IllegalState("not your turn".into()));
                }
                SecretCode::parse(guess).map(|_| ())
            }
        }
    }

    fn handle_message(
        state: &mut DuelState,
        ctx: &mut MatchContext<'_>,
        sender: PlayerId,
        msg: DuelRequest,
    ) -> Outbox<DuelEvent> {
        match msg {
            DuelRequest::SetNumber { number } => set_number(state, ctx, sender, &number),
            DuelRequest::Guess { guess } => take_guess(state, ctx, sender, &guess),
        }
    }

    fn on_leave(
        state: &mut DuelState,
        ctx: &mut MatchContext<'_>,
        player: PlayerId,
    ) -> Outbox<DuelEvent> {
        let leaver_secret = state.secret_text(Some(player));
        state.duelers.remove(&player);
        if !ctx.phase().is_in_progress() {
            return Vec::new();
        }

        let out = state
            .duelers
            .iter()
            .map(|(&id, dueler)| {
                (Recipient::Player(id), DuelEvent::GameOver {
                    result: Outcome::Victory,
                    message: "opponent left the match".into(),
                    your_number: dueler.secret.map(|s| s.to_string()),
                    opponent_number: leaver_secret.clone(),
                })
            })
            .collect();
        state.reset_all();
        if let Err(e) = ctx.transition(MatchState::Waiting) {
            tracing::warn!(error = %e, "duel reset after leave failed");
        }
        out
    }

    fn on_rearm(state: &mut DuelState) {
        state.reset_all();
    }
}

fn set_number(
    state: &mut DuelState,
    ctx: &mut MatchContext<'_>,
    sender: PlayerId,
    number: &str,
) -> Outbox<DuelEvent> {
    let (Ok(secret), Some(dueler)) = (SecretCode::parse(number), state.duelers.get_mut(&sender))
    else {
        return Vec::new();
    };
    dueler.secret = Some(secret);
    dueler.state = DuelerState::Ready;
    tracing::debug!(player = %sender, "secret number set");

    let mut out = vec![(Recipient::Player(sender), DuelEvent::NumberSet {
        message: "number set, waiting for the opponent".into(),
    })];

    if state.all_ready() {
        if let Err(e) = ctx.transition(MatchState::Active) {
            tracing::warn!(error = %e, "could not start duel");
            return out;
        }
        if let Some(&first) = state.duelers.keys().next() {
            out.extend(state.start_turn(first));
        }
    }
    out
}

fn take_guess(
    state: &mut DuelState,
    ctx: &mut MatchContext<'_>,
    sender: PlayerId,
    guess: &str,
) -> Outbox<DuelEvent> {
    let Ok(guess_code) = SecretCode::parse(guess) else {
        return Vec::new();
    };
    let Some(opponent) = state.opponent_of(sender) else {
        return Vec::new();
    };
    let Some(target) = state.duelers.get(&opponent).and_then(|d| d.secret) else {
        return Vec::new();
    };
    let Some(dueler) = state.duelers.get_mut(&sender) else {
        return Vec::new();
    };

    let result = score(&target, &guess_code);
    dueler.attempts += 1;
    let mut out = vec![(Recipient::All, DuelEvent::GuessResult {
        guess: guess_code.to_string(),
        strikes: result.strikes,
        balls: result.balls,
        attempts: dueler.attempts,
        current_player: sender,
    })];

    if result.is_win {
        if let Err(e) = ctx.transition(MatchState::Finished) {
            tracing::warn!(error = %e, "could not finish duel");
        }
        tracing::info!(winner = %sender, attempts = dueler.attempts, "duel won");
        out.extend(state.game_over(sender));
    } else {
        out.extend(state.start_turn(opponent));
    }
    out
}
