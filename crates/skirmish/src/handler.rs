//! Per-connection reader tasks.
//!
//! Each connection gets one Tokio task that only reads. It turns frames
//! into [`InboundEvent`]s for the reactor and never touches shared state,
//! so all writes stay on the reactor task in issue order.

use std::sync::Arc;

use skirmish_protocol::PlayerId;
use skirmish_transport::{Connection, ConnectionId, TransportError};
use tokio::sync::mpsc;

/// What a reader task reports to the reactor.
///
/// Events carry the [`ConnectionId`] they were read from. A slot can be
/// released and reallocated while an event is queued; the reactor drops
/// events whose connection no longer occupies the slot.
#[derive(Debug)]
pub(crate) enum InboundEvent {
    /// One complete frame body.
    Frame {
        player: PlayerId,
        conn_id: ConnectionId,
        bytes: Vec<u8>,
    },
    /// The peer went away or broke the framing. No more events follow.
    Closed {
        player: PlayerId,
        conn_id: ConnectionId,
        reason: String,
    },
}

/// Reads frames from `conn` until it closes or the reactor goes away.
pub(crate) async fn read_loop<C: Connection>(
    player: PlayerId,
    conn: Arc<C>,
    tx: mpsc::UnboundedSender<InboundEvent>,
) {
    let conn_id = conn.id();
    tracing::debug!(%player, %conn_id, "reader started");

    let reason = loop {
        match conn.recv().await {
            Ok(Some(bytes)) => {
                let event = InboundEvent::Frame {
                    player,
                    conn_id,
                    bytes,
                };
                if tx.send(event).is_err() {
                    return;
                }
            }
            Ok(None) => break "connection closed by peer".to_string(),
            Err(e @ TransportError::InvalidFrame { .. }) => {
                tracing::debug!(%player, error = %e, "protocol violation");
                break e.to_string();
            }
            Err(e) => break e.to_string(),
        }
    };

    let _ = tx.send(InboundEvent::Closed {
        player,
        conn_id,
        reason,
    });
}
