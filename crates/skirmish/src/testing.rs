//! In-memory connection for reactor and dispatcher tests.

use std::io;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use skirmish_transport::{Connection, ConnectionId, TransportError};

/// Records what is sent to it. `recv` never resolves; tests feed frames to
/// the reactor directly.
///
/// Clones share one record, so a test can keep a handle on a connection it
/// hands to the reactor.
#[derive(Clone)]
pub(crate) struct MockConnection {
    id: ConnectionId,
    shared: Arc<Shared>,
}

#[derive(Default)]
struct Shared {
    sent: Mutex<Vec<Vec<u8>>>,
    fail: AtomicBool,
    stall: AtomicBool,
    fail_close: AtomicBool,
    attempts: AtomicU32,
    closed: AtomicBool,
}

impl MockConnection {
    pub(crate) fn new(id: u64) -> Self {
        Self {
            id: ConnectionId::new(id),
            shared: Arc::default(),
        }
    }

    /// Makes every following send fail (or succeed again).
    pub(crate) fn fail_sends(&self, fail: bool) {
        self.shared.fail.store(fail, Ordering::SeqCst);
    }

    /// Makes every following send fail as a write that timed out.
    pub(crate) fn stall_sends(&self, stall: bool) {
        self.shared.stall.store(stall, Ordering::SeqCst);
    }

    /// Makes `close` report an error. The connection still counts as closed.
    pub(crate) fn fail_close(&self) {
        self.shared.fail_close.store(true, Ordering::SeqCst);
    }

    /// Send calls, successful or not.
    pub(crate) fn attempts(&self) -> u32 {
        self.shared.attempts.load(Ordering::SeqCst)
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::SeqCst)
    }

    /// Successfully sent bodies, parsed as JSON.
    pub(crate) fn sent_json(&self) -> Vec<serde_json::Value> {
        self.shared
            .sent
            .lock()
            .unwrap()
            .iter()
            .map(|b| serde_json::from_slice(b).unwrap())
            .collect()
    }

    /// The `action` of every successfully sent body.
    pub(crate) fn actions(&self) -> Vec<String> {
        self.sent_json()
            .iter()
            .map(|v| v["action"].as_str().unwrap_or_default().to_string())
            .collect()
    }
}

impl Connection for MockConnection {
    async fn send(&self, data: &[u8]) -> Result<(), TransportError> {
        self.shared.attempts.fetch_add(1, Ordering::SeqCst);
        if self.shared.stall.load(Ordering::SeqCst) {
            return Err(TransportError::Timeout(Duration::from_secs(5)));
        }
        if self.shared.fail.load(Ordering::SeqCst) {
            return Err(TransportError::SendFailed(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "mock send failure",
            )));
        }
        self.shared.sent.lock().unwrap().push(data.to_vec());
        Ok(())
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, TransportError> {
        std::future::pending().await
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.shared.closed.store(true, Ordering::SeqCst);
        if self.shared.fail_close.load(Ordering::SeqCst) {
            return Err(TransportError::SendFailed(io::Error::new(
                io::ErrorKind::NotConnected,
                "mock close failure",
            )));
        }
        Ok(())
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
