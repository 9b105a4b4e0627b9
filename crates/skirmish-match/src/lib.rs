//! Match lifecycle for Skirmish.
//!
//! A server runs exactly one match at a time. This crate defines the state
//! machine that match moves through and the trait a game implements to
//! plug its rules into the reactor.
//!
//! # Key types
//!
//! - [`RuleEngine`]: the trait each game implements
//! - [`MatchState`]: `Waiting → Setup → Active → Finished`
//! - [`MatchContext`]: what a rule engine sees of the match while handling
//!   an event, including the only way to change the state
//! - [`MatchConfig`]: slot count, start threshold, tick rate, finish policy

mod config;
mod context;
mod error;
mod logic;

pub use config::{FinishPolicy, MatchConfig, MatchState};
pub use context::MatchContext;
pub use error::RuleError;
pub use logic::{Outbox, RuleEngine};
