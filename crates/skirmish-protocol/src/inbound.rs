//! Classification of client-to-server bodies.
//!
//! Decoding happens in two steps so the server can tell a broken peer from
//! a confused one. First only the `action` tag is read; a body that fails
//! here isn't speaking the protocol at all. Then the whole body is decoded
//! into the rule engine's closed message enum; a failure there is reported
//! back to the client as [`ProtocolError::InvalidMessage`].

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::{Codec, ProtocolError};

/// Action name reserved for client keepalives.
pub const HEARTBEAT_ACTION: &str = "heartbeat";

/// The tag every body must carry. Other fields are ignored at this stage.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ActionHeader {
    pub action: String,
}

/// A decoded client body.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound<M> {
    /// `{"action":"heartbeat"}`: counts as activity, nothing else.
    Heartbeat,
    /// A message for the rule engine.
    Message(M),
}

/// Decodes one client body.
///
/// # Errors
/// - [`ProtocolError::Decode`] if the body has no readable `action` tag.
/// - [`ProtocolError::InvalidMessage`] if the tag is present but the body
///   doesn't match any message `M` accepts.
pub fn decode_inbound<M, C>(codec: &C, data: &[u8]) -> Result<Inbound<M>, ProtocolError>
where
    M: DeserializeOwned,
    C: Codec,
{
    let header: ActionHeader = codec.decode(data)?;
    if header.action == HEARTBEAT_ACTION {
        return Ok(Inbound::Heartbeat);
    }
    codec
        .decode::<M>(data)
        .map(Inbound::Message)
        .map_err(|e| ProtocolError::InvalidMessage(format!("{}: {e}", header.action)))
}
