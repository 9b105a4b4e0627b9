//! The two rule engines a Skirmish server can host.
//!
//! - [`Duel`]: two players each hide a three-digit code and take turns
//!   guessing the other's, scored in strikes and balls.
//! - [`World`]: up to eight players place a base on a shared tile map,
//!   produce units, move them and fight, while the world rolls random
//!   events. The last base standing wins.

use serde::{Deserialize, Serialize};

pub mod duel;
pub mod world;

pub use duel::{Duel, DuelEvent, DuelRequest, DuelState, GuessResult, SecretCode, score, validate_code};
pub use world::{World, WorldConfig, WorldEvent, WorldRequest, WorldState};

/// A participant's result in a `game_over` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Victory,
    Defeat,
}
