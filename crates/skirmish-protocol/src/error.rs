//! Error types for the protocol layer.

/// Errors that can occur in the protocol layer.
///
/// The two decode-side variants are treated differently by the server:
/// a body that isn't a JSON object with an `action` string is a
/// [`Decode`](Self::Decode) error and ends the connection, while a
/// well-formed body whose fields don't fit the expected message is an
/// [`InvalidMessage`](Self::InvalidMessage) and only earns an error reply.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, not UTF-8, or no `action`.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The body parsed but doesn't describe a message we understand.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
