//! # Skirmish
//!
//! Authoritative TCP game server with pluggable rule engines.
//!
//! A server hosts one match. Clients connect over length-prefixed TCP and
//! exchange JSON objects tagged by `action`. The server owns all game state:
//! a rule engine implements [`RuleEngine`](skirmish_match::RuleEngine) and
//! the framework handles slots, heartbeats, timeouts, delivery and the
//! match lifecycle.
//!
//! Two engines ship with the crate: [`Duel`], a two-player number guessing
//! game, and [`World`], a tile strategy game for up to eight players.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use skirmish::prelude::*;
//!
//! # async fn start() -> Result<(), SkirmishError> {
//! let server = SkirmishServer::<World>::builder()
//!     .bind("0.0.0.0:12345")
//!     .build(WorldConfig::default())
//!     .await?;
//! server.run().await
//! # }
//! ```

mod dispatch;
mod error;
mod handler;
mod reactor;
mod server;

#[cfg(test)]
mod testing;

pub use error::SkirmishError;
pub use server::{SkirmishServer, SkirmishServerBuilder};

pub use skirmish_match::{FinishPolicy, MatchConfig, MatchState, RuleEngine};
pub use skirmish_rules::{Duel, World, WorldConfig};
pub use skirmish_session::ReliabilityConfig;
pub use skirmish_transport::TransportOptions;

/// Everything needed to start a server.
pub mod prelude {
    pub use crate::{
        Duel, FinishPolicy, MatchConfig, ReliabilityConfig, RuleEngine, SkirmishError,
        SkirmishServer, TransportOptions, World, WorldConfig,
    };
}
