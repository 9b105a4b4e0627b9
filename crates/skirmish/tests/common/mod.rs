//! A minimal framed JSON client for driving a server over real TCP.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use serde_json::Value;
use skirmish_transport::framing::MAX_ENCODABLE_LEN;
use skirmish_transport::{read_frame, write_frame};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

pub struct Client {
    stream: TcpStream,
}

impl Client {
    pub async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.expect("connect");
        Self { stream }
    }

    pub async fn send(&mut self, body: Value) {
        let bytes = serde_json::to_vec(&body).unwrap();
        write_frame(&mut self.stream, &bytes).await.expect("send");
    }

    /// Writes raw bytes, bypassing framing.
    pub async fn send_raw(&mut self, bytes: &[u8]) {
        self.stream.write_all(bytes).await.expect("send raw");
    }

    /// Next non-heartbeat message, or `None` once the server closes.
    pub async fn recv(&mut self) -> Option<Value> {
        loop {
            let frame = timeout(RECV_TIMEOUT, read_frame(&mut self.stream, MAX_ENCODABLE_LEN))
                .await
                .expect("timed out waiting for the server");
            let body = match frame {
                Ok(Some(body)) => body,
                Ok(None) | Err(_) => return None,
            };
            let msg: Value = serde_json::from_slice(&body).expect("server sent invalid JSON");
            if msg["action"] != "heartbeat" {
                return Some(msg);
            }
        }
    }

    /// Receives the next message and checks its `action`.
    pub async fn expect(&mut self, action: &str) -> Value {
        let msg = self.recv().await.expect("connection closed");
        assert_eq!(msg["action"], action, "unexpected message: {msg}");
        msg
    }

    /// Skips messages until one with `action` arrives.
    pub async fn wait_for(&mut self, action: &str) -> Value {
        loop {
            let msg = self.recv().await.expect("connection closed");
            if msg["action"] == action {
                return msg;
            }
        }
    }
}
