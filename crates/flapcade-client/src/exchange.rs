//! Request/response transport for the client.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use flapcade_protocol::{Codec, Envelope, JsonCodec, Payload, PaymentProof, Request, Response};
use flapcade_transport::{Connection, TransportError, WebSocketConnection};
use tokio::sync::Mutex;
use tracing::{debug, trace};

use crate::ClientError;

/// Sends one request and waits for its response.
///
/// Implementations do not interpret the response: a `PaymentRequired` or
/// `Error` answer is still `Ok`. Only failing to get an answer at all is
/// an error, normally [`ClientError::Unreachable`].
pub trait Exchange: Send + Sync {
    fn call(
        &self,
        request: Request,
        payment: Option<PaymentProof>,
    ) -> impl Future<Output = Result<Response, ClientError>> + Send;
}

/// An [`Exchange`] over a WebSocket connection to a Flapcade server.
///
/// Calls are serialized: one request is in flight at a time, and its
/// response is matched by sequence number.
pub struct RemoteArcade {
    conn: Mutex<WebSocketConnection>,
    codec: JsonCodec,
    seq: AtomicU64,
    start: Instant,
    timeout: Duration,
}

impl RemoteArcade {
    /// How long a call waits for its response by default.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Connects to `url` (e.g. `ws://127.0.0.1:3001`).
    ///
    /// # Errors
    /// [`ClientError::Unreachable`] if the connection can't be opened.
    pub async fn connect(url: &str) -> Result<Self, ClientError> {
        let conn = WebSocketConnection::connect(url)
            .await
            .map_err(|e| ClientError::Unreachable(e.to_string()))?;
        debug!(%url, conn_id = %conn.id(), "connected to arcade");
        Ok(Self {
            conn: Mutex::new(conn),
            codec: JsonCodec,
            seq: AtomicU64::new(1),
            start: Instant::now(),
            timeout: Self::DEFAULT_TIMEOUT,
        })
    }

    /// Sets the per-call response timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Closes the underlying connection.
    pub async fn close(&self) -> Result<(), ClientError> {
        self.conn
            .lock()
            .await
            .close()
            .await
            .map_err(|e| ClientError::Unreachable(e.to_string()))
    }

    async fn round_trip(
        &self,
        request: Request,
        payment: Option<PaymentProof>,
    ) -> Result<Response, ClientError> {
        let conn = self.conn.lock().await;
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);

        let mut envelope = Envelope::request(seq, self.elapsed_ms(), request);
        envelope.payment = payment;
        let bytes = self
            .codec
            .encode(&envelope)
            .map_err(|e| ClientError::Unknown(e.to_string()))?;
        conn.send(&bytes)
            .await
            .map_err(|e| ClientError::Unreachable(e.to_string()))?;

        loop {
            let data = match conn.recv().await {
                Ok(Some(data)) => data,
                Ok(None) => {
                    let closed = TransportError::ConnectionClosed(format!("awaiting seq {seq}"));
                    return Err(ClientError::Unreachable(closed.to_string()));
                }
                Err(e) => return Err(ClientError::Unreachable(e.to_string())),
            };

            let reply: Envelope = match self.codec.decode(&data) {
                Ok(reply) => reply,
                Err(e) => {
                    debug!(error = %e, "ignoring undecodable frame");
                    continue;
                }
            };

            match reply.payload {
                Payload::Response(response) if reply.seq == seq => return Ok(response),
                _ => trace!(seq = reply.seq, expected = seq, "ignoring unrelated frame"),
            }
        }
    }

    fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl Exchange for RemoteArcade {
    async fn call(
        &self,
        request: Request,
        payment: Option<PaymentProof>,
    ) -> Result<Response, ClientError> {
        tokio::time::timeout(self.timeout, self.round_trip(request, payment))
            .await
            .map_err(|_| ClientError::Unreachable("timed out waiting for response".into()))?
    }
}
