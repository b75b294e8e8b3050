//! Integration tests for the WebSocket transport.
//!
//! Both ends use this crate: the server side through
//! [`WebSocketTransport::accept`], the cabinet side through
//! [`WebSocketConnection::connect`].

#[cfg(feature = "websocket")]
mod websocket {
    use flapcade_transport::{
        Connection, Transport, TransportError, WebSocketConnection, WebSocketTransport,
    };

    async fn bind_any() -> (WebSocketTransport, String) {
        let transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("bound address").to_string();
        (transport, addr)
    }

    #[tokio::test]
    async fn test_websocket_connect_and_exchange_frames() {
        let (mut transport, addr) = bind_any().await;

        let server_handle =
            tokio::spawn(async move { transport.accept().await.expect("should accept") });

        let client = WebSocketConnection::connect(&format!("ws://{addr}"))
            .await
            .expect("client should connect");
        let server = server_handle.await.expect("task should complete");

        assert_ne!(client.id(), server.id());

        client.send(b"insert coin").await.expect("client send");
        let received = server
            .recv()
            .await
            .expect("recv should succeed")
            .expect("should have data");
        assert_eq!(received, b"insert coin");

        server.send(b"token granted").await.expect("server send");
        let received = client
            .recv()
            .await
            .expect("recv should succeed")
            .expect("should have data");
        assert_eq!(received, b"token granted");

        server.close().await.expect("close should succeed");
    }

    #[tokio::test]
    async fn test_websocket_recv_returns_none_on_peer_close() {
        let (mut transport, addr) = bind_any().await;

        let server_handle =
            tokio::spawn(async move { transport.accept().await.expect("should accept") });

        let client = WebSocketConnection::connect(&format!("ws://{addr}"))
            .await
            .expect("client should connect");
        let server = server_handle.await.expect("task should complete");

        client.close().await.expect("client close");

        let result = server.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on peer close");
    }

    #[tokio::test]
    async fn test_connect_to_closed_port_fails() {
        // Bind then drop to get a port that nobody is listening on.
        let (transport, addr) = bind_any().await;
        drop(transport);

        let result = WebSocketConnection::connect(&format!("ws://{addr}")).await;
        assert!(matches!(result, Err(TransportError::ConnectFailed(_))));
    }
}
