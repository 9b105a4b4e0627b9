//! TCP transport implementation using `tokio::net`.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::Mutex;

use crate::framing::{self, MAX_FRAME_LEN};
use crate::{Connection, ConnectionId, Transport, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Per-connection limits applied by [`TcpTransport`].
#[derive(Debug, Clone)]
pub struct TransportOptions {
    /// Largest inbound frame body accepted. Default: 4096 bytes.
    pub max_frame_len: usize,
    /// How long a single write may block before it counts as failed.
    /// Default: 5 seconds.
    pub send_timeout: Duration,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            max_frame_len: MAX_FRAME_LEN,
            send_timeout: Duration::from_secs(5),
        }
    }
}

/// A TCP [`Transport`] that listens for incoming connections.
pub struct TcpTransport {
    listener: TcpListener,
    options: TransportOptions,
}

impl TcpTransport {
    /// Binds a new TCP transport to the given address.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        Self::bind_with(addr, TransportOptions::default()).await
    }

    /// Binds with explicit frame and timeout limits.
    pub async fn bind_with(
        addr: &str,
        options: TransportOptions,
    ) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::info!(addr, "TCP transport listening");
        Ok(Self { listener, options })
    }
}

impl Transport for TcpTransport {
    type Connection = TcpConnection;

    async fn accept(&mut self) -> Result<TcpConnection, TransportError> {
        let (stream, peer) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;
        // Messages are small and latency matters more than throughput.
        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(%peer, error = %e, "failed to set TCP_NODELAY");
        }

        let id = ConnectionId::new(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(%id, %peer, "accepted TCP connection");

        let (reader, writer) = stream.into_split();
        Ok(TcpConnection {
            id,
            reader: Mutex::new(reader),
            writer: Mutex::new(writer),
            desynced: AtomicBool::new(false),
            options: self.options.clone(),
        })
    }

    fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        self.listener
            .local_addr()
            .map_err(TransportError::AcceptFailed)
    }
}

/// A single framed TCP connection.
///
/// Reads and writes go through separate halves, so a reader task parked in
/// [`recv`](Connection::recv) never blocks the reactor's writes.
///
/// A send that times out may leave part of a frame on the wire. After that
/// the peer can no longer find frame boundaries, so every later send fails
/// with [`TransportError::Desynchronized`].
pub struct TcpConnection {
    id: ConnectionId,
    reader: Mutex<OwnedReadHalf>,
    writer: Mutex<OwnedWriteHalf>,
    desynced: AtomicBool,
    options: TransportOptions,
}

impl Connection for TcpConnection {
    async fn send(&self, data: &[u8]) -> Result<(), TransportError> {
        if self.desynced.load(Ordering::Acquire) {
            return Err(TransportError::Desynchronized);
        }
        let timeout = self.options.send_timeout;
        let mut writer = self.writer.lock().await;
        match tokio::time::timeout(timeout, framing::write_frame(&mut *writer, data)).await {
            Ok(result) => result,
            Err(_) => {
                self.desynced.store(true, Ordering::Release);
                tracing::warn!(id = %self.id, ?timeout, "send timed out mid-frame");
                Err(TransportError::Timeout(timeout))
            }
        }
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, TransportError> {
        let mut reader = self.reader.lock().await;
        framing::read_frame(&mut *reader, self.options.max_frame_len).await
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.writer
            .lock()
            .await
            .shutdown()
            .await
            .map_err(TransportError::SendFailed)
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
