//! Outbound message delivery.
//!
//! The dispatcher owns the write side of every attached connection. It
//! encodes each message once, resolves recipients against the slot
//! registry and reports every send outcome back to the registry, which is
//! how unreachable peers end up stale.
//!
//! A message too large for one frame is a local fault. It is logged and
//! dropped before any send, so no peer is charged for it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use skirmish_match::Outbox;
use skirmish_protocol::{Codec, PlayerId, Recipient, SystemMessage};
use skirmish_session::{SendVerdict, SlotRegistry};
use skirmish_transport::framing::MAX_ENCODABLE_LEN;
use skirmish_transport::{Connection, TransportError};

/// Whether a successful send counts as activity for the receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Normal traffic. Success refreshes the receiver's activity.
    Tracked,
    /// Heartbeats. Success leaves activity alone, so a silent client
    /// still times out.
    Keepalive,
}

/// Sends encoded messages to attached connections.
pub struct Dispatcher<C: Connection, K: Codec> {
    codec: K,
    connections: HashMap<PlayerId, Arc<C>>,
}

impl<C: Connection, K: Codec> Dispatcher<C, K> {
    pub fn new(codec: K) -> Self {
        Self {
            codec,
            connections: HashMap::new(),
        }
    }

    pub fn codec(&self) -> &K {
        &self.codec
    }

    /// Makes `conn` the write side for `player`.
    pub fn attach(&mut self, player: PlayerId, conn: Arc<C>) {
        self.connections.insert(player, conn);
    }

    /// Removes and returns the write side for `player`.
    pub fn detach(&mut self, player: PlayerId) -> Option<Arc<C>> {
        self.connections.remove(&player)
    }

    /// Sends one message to one participant.
    ///
    /// Logs and returns if the participant isn't connected.
    pub async fn unicast<M: Serialize>(
        &self,
        registry: &mut SlotRegistry,
        player: PlayerId,
        msg: &M,
        delivery: Delivery,
        now: Instant,
    ) {
        if let Some(bytes) = self.encode(msg) {
            self.send_bytes(registry, player, &bytes, delivery, now).await;
        }
    }

    /// Sends one message to every connected participant.
    pub async fn broadcast<M: Serialize>(
        &self,
        registry: &mut SlotRegistry,
        msg: &M,
        delivery: Delivery,
        now: Instant,
    ) {
        self.send_to(registry, Recipient::All, msg, delivery, now).await;
    }

    /// Delivers everything a rule engine asked to send, in order.
    pub async fn deliver<M: Serialize>(
        &self,
        registry: &mut SlotRegistry,
        outbox: Outbox<M>,
        now: Instant,
    ) {
        for (recipient, msg) in outbox {
            self.send_to(registry, recipient, &msg, Delivery::Tracked, now)
                .await;
        }
    }

    /// Sends an `error` message straight to a connection that has no slot,
    /// such as one refused for capacity.
    pub async fn reject(&self, conn: &C, message: &str) {
        let Some(bytes) = self.encode(&SystemMessage::error(message)) else {
            return;
        };
        if let Err(e) = conn.send(&bytes).await {
            tracing::debug!(conn_id = %conn.id(), error = %e, "rejection not delivered");
        }
    }

    async fn send_to<M: Serialize>(
        &self,
        registry: &mut SlotRegistry,
        recipient: Recipient,
        msg: &M,
        delivery: Delivery,
        now: Instant,
    ) {
        let Some(bytes) = self.encode(msg) else {
            return;
        };
        match recipient {
            Recipient::Player(player) => {
                self.send_bytes(registry, player, &bytes, delivery, now)
                    .await;
            }
            Recipient::All | Recipient::AllExcept(_) => {
                for player in registry.connected() {
                    if recipient == Recipient::AllExcept(player) {
                        continue;
                    }
                    self.send_bytes(registry, player, &bytes, delivery, now)
                        .await;
                }
            }
        }
    }

    async fn send_bytes(
        &self,
        registry: &mut SlotRegistry,
        player: PlayerId,
        bytes: &[u8],
        delivery: Delivery,
        now: Instant,
    ) {
        let conn = match self.connections.get(&player) {
            Some(conn) if registry.is_connected(player) => conn,
            _ => {
                tracing::warn!(%player, "send to participant that is not connected");
                return;
            }
        };

        match conn.send(bytes).await {
            Ok(()) => {
                if delivery == Delivery::Tracked {
                    registry.record_send_success(player, now);
                }
            }
            Err(e @ TransportError::InvalidFrame { .. }) => {
                tracing::error!(%player, error = %e, "outbound frame rejected");
            }
            // A timed-out write may have left half a frame on the stream.
            Err(e @ (TransportError::Timeout(_) | TransportError::Desynchronized)) => {
                tracing::warn!(%player, error = %e, "send abandoned");
                registry.mark_stale(player);
            }
            Err(e) => {
                tracing::warn!(%player, error = %e, "send failed");
                if let SendVerdict::Evict = registry.record_send_failure(player) {
                    tracing::warn!(%player, "participant marked stale");
                }
            }
        }
    }

    fn encode<M: Serialize>(&self, msg: &M) -> Option<Vec<u8>> {
        match self.codec.encode(msg) {
            Ok(bytes) if bytes.len() > MAX_ENCODABLE_LEN => {
                tracing::error!(
                    len = bytes.len(),
                    max = MAX_ENCODABLE_LEN,
                    "outbound message too large for a frame"
                );
                None
            }
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::error!(error = %e, "failed to encode outbound message");
                None
            }
        }
    }
}
