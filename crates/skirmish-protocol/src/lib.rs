//! Wire protocol for Skirmish.
//!
//! This crate defines the messages clients and servers exchange once a frame
//! body has been read off the socket:
//!
//! - **Types** ([`PlayerId`], [`Recipient`], [`SystemMessage`]) shared by
//!   every rule engine.
//! - **Inbound** ([`decode_inbound`]) which peeks the `action` tag and
//!   splits keepalives from game messages.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) turning values into frame
//!   bodies and back.
//!
//! ```text
//! Transport (frame body) → Protocol (typed message) → Reactor
//! ```

mod codec;
mod error;
mod inbound;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use inbound::{ActionHeader, Inbound, decode_inbound};
pub use types::{PlayerId, Recipient, SystemMessage};
