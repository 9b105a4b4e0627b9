//! Codec trait and implementations for message bodies.
//!
//! The framing layer hands us opaque bodies. A [`Codec`] turns those into
//! typed messages and back, so the reactor never touches a serialization
//! library directly. [`JsonCodec`] matches the text bodies existing
//! clients speak.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes Rust values to frame bodies and decodes them back.
///
/// `Send + Sync + 'static` because the codec lives inside the reactor task
/// for the life of the server.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into a frame body.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if the value can't be represented.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes a frame body into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or don't
    /// match `T`.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// `serde_json` rejects bodies that aren't valid UTF-8, which is the only
/// text-encoding check the wire format needs.
///
/// ## Example
///
/// ```rust
/// use skirmish_protocol::{Codec, JsonCodec, PlayerId, SystemMessage};
///
/// let codec = JsonCodec;
/// let msg = SystemMessage::AssignId { player_id: PlayerId(1) };
///
/// let bytes = codec.encode(&msg).unwrap();
/// assert_eq!(bytes, br#"{"action":"assign_id","player_id":1}"#);
///
/// let decoded: SystemMessage = codec.decode(&bytes).unwrap();
/// assert_eq!(decoded, msg);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
