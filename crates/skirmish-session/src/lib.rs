//! Connection slots and reliability monitoring for Skirmish.
//!
//! This crate handles the lifecycle of a participant's connection:
//!
//! 1. **Slot allocation**: binding a connection to a small integer
//!    identity from a fixed pool ([`SlotRegistry`])
//! 2. **Activity tracking**: noticing participants that have gone silent
//!    ([`SlotRegistry::timed_out`])
//! 3. **Send failures**: evicting peers whose writes keep failing
//!    ([`SlotRegistry::record_send_failure`])
//! 4. **Heartbeats**: pacing keepalive broadcasts ([`HeartbeatClock`])
//!
//! Every method that depends on time takes `now` as an argument, so the
//! registry never reads a clock itself.
//!
//! # How it fits in the stack
//!
//! ```text
//! Reactor (above)  ← owns the registry, feeds it accept/recv/send outcomes
//!     ↕
//! Session Layer (this crate)  ← slot table, activity, retry counters
//!     ↕
//! Protocol / Transport (below)  ← PlayerId, ConnectionId
//! ```

mod error;
mod registry;
mod slot;

pub use error::SessionError;
pub use registry::SlotRegistry;
pub use slot::{HeartbeatClock, ReliabilityConfig, SendVerdict, Slot, SlotState};
