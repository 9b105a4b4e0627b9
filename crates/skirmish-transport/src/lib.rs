//! Transport layer for Skirmish.
//!
//! Provides the [`Transport`] and [`Connection`] traits the reactor is
//! written against, the length-prefixed [`framing`] codec, and a TCP
//! implementation of both traits.
//!
//! # Feature Flags
//!
//! - `tcp` (default): TCP transport over `tokio::net`

pub mod framing;

mod error;
#[cfg(feature = "tcp")]
mod tcp;

pub use error::TransportError;
pub use framing::{MAX_FRAME_LEN, encode_frame, read_frame, write_frame};
#[cfg(feature = "tcp")]
pub use tcp::{TcpConnection, TcpTransport, TransportOptions};

use std::fmt;
use std::future::Future;
use std::net::SocketAddr;

/// Opaque identifier for a connection.
///
/// Unlike a player slot, a `ConnectionId` is never reused for the life of
/// the process, so it can tell two successive occupants of a slot apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Accepts new incoming connections.
pub trait Transport: Send + 'static {
    /// The connection type produced by this transport.
    type Connection: Connection;

    /// Waits for and accepts the next incoming connection.
    fn accept(
        &mut self,
    ) -> impl Future<Output = Result<Self::Connection, TransportError>> + Send;

    /// The address the transport is listening on.
    fn local_addr(&self) -> Result<SocketAddr, TransportError>;
}

/// A single connection that exchanges whole message bodies.
///
/// Implementations own the framing: `send` takes an unframed body and
/// `recv` yields one unframed body per call.
pub trait Connection: Send + Sync + 'static {
    /// Sends one message body to the remote peer.
    fn send(&self, data: &[u8]) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Receives the next message body from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    fn recv(&self) -> impl Future<Output = Result<Option<Vec<u8>>, TransportError>> + Send;

    /// Closes the connection.
    fn close(&self) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}
