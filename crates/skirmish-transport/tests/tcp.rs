//! Integration tests for the TCP transport.
//!
//! These spin up a real listener on an ephemeral port and talk to it with a
//! raw `TcpStream`, so the framing is exercised exactly as a client sees it.

#[cfg(feature = "tcp")]
mod tcp {
    use std::time::Duration;

    use skirmish_transport::{
        Connection, MAX_FRAME_LEN, TcpConnection, TcpTransport, Transport, TransportError,
        TransportOptions, read_frame, write_frame,
    };
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpStream;

    async fn pair() -> (TcpConnection, TcpStream) {
        let mut transport = TcpTransport::bind("127.0.0.1:0").await.unwrap();
        let addr = transport.local_addr().unwrap();
        let client = tokio::spawn(async move { TcpStream::connect(addr).await.unwrap() });
        let server_conn = transport.accept().await.unwrap();
        (server_conn, client.await.unwrap())
    }

    #[tokio::test]
    async fn test_recv_reads_client_frame() {
        let (conn, mut client) = pair().await;
        write_frame(&mut client, br#"{"action":"guess","guess":"123"}"#)
            .await
            .unwrap();

        let body = conn.recv().await.unwrap().unwrap();
        assert_eq!(body, br#"{"action":"guess","guess":"123"}"#);
    }

    #[tokio::test]
    async fn test_send_writes_prefixed_frame() {
        let (conn, mut client) = pair().await;
        conn.send(br#"{"action":"assign_id","player_id":0}"#)
            .await
            .unwrap();

        let body = read_frame(&mut client, MAX_FRAME_LEN).await.unwrap().unwrap();
        assert_eq!(body, br#"{"action":"assign_id","player_id":0}"#);
    }

    #[tokio::test]
    async fn test_recv_client_disconnect_returns_none() {
        let (conn, client) = pair().await;
        drop(client);
        assert!(conn.recv().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_recv_oversized_frame_is_rejected() {
        let (conn, mut client) = pair().await;
        let len = (MAX_FRAME_LEN as u16 + 1).to_be_bytes();
        client.write_all(&len).await.unwrap();

        let err = conn.recv().await.unwrap_err();
        assert!(matches!(err, TransportError::InvalidFrame { .. }));
    }

    #[tokio::test]
    async fn test_accept_assigns_distinct_connection_ids() {
        let mut transport = TcpTransport::bind("127.0.0.1:0").await.unwrap();
        let addr = transport.local_addr().unwrap();
        let _a = TcpStream::connect(addr).await.unwrap();
        let _b = TcpStream::connect(addr).await.unwrap();

        let first = transport.accept().await.unwrap();
        let second = transport.accept().await.unwrap();
        assert_ne!(first.id(), second.id());
    }

    #[tokio::test]
    async fn test_close_signals_eof_to_client() {
        let (conn, mut client) = pair().await;
        conn.close().await.unwrap();
        assert!(read_frame(&mut client, MAX_FRAME_LEN).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_send_after_timeout_is_desynchronized() {
        let options = TransportOptions {
            send_timeout: Duration::from_millis(100),
            ..TransportOptions::default()
        };
        let mut transport = TcpTransport::bind_with("127.0.0.1:0", options).await.unwrap();
        let addr = transport.local_addr().unwrap();
        // The client never reads, so the socket buffers eventually fill.
        let _client = TcpStream::connect(addr).await.unwrap();
        let conn = transport.accept().await.unwrap();

        let body = vec![b'x'; 60_000];
        let mut first_err = None;
        for _ in 0..10_000 {
            if let Err(e) = conn.send(&body).await {
                first_err = Some(e);
                break;
            }
        }
        assert!(matches!(first_err, Some(TransportError::Timeout(_))));

        let err = conn.send(b"{}").await.unwrap_err();
        assert!(matches!(err, TransportError::Desynchronized));
    }
}
