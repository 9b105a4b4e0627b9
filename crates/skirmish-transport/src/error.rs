/// Errors that can occur in the transport layer.
///
/// The reactor never retries a read. A failed write counts toward the
/// dispatcher's send-failure limit, except that [`Timeout`](Self::Timeout)
/// and [`Desynchronized`](Self::Desynchronized) end the connection at once.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The peer closed the stream, possibly part-way through a frame.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// Sending data failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving data failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// Binding or accepting connections failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),

    /// A frame announced a length of zero or one above the allowed maximum.
    #[error("invalid frame length {len} (max {max})")]
    InvalidFrame {
        /// Length announced by the prefix (or the body length on encode).
        len: usize,
        /// Largest length accepted on this path.
        max: usize,
    },

    /// A write did not complete within the configured send timeout.
    #[error("send timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// An earlier send was abandoned part-way through a frame.
    #[error("stream desynchronized by an abandoned send")]
    Desynchronized,
}
