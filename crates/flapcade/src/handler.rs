//! Per-connection handler: decode, dispatch, answer.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Receive a frame (bounded by the idle timeout)
//!   2. Decode it as an Envelope → reject undecodable frames with BadRequest
//!   3. Dispatch the request to the service and echo its `seq` in the reply
//!
//! A cabinet may pipeline several requests on one connection; they are
//! answered in order.

use std::sync::Arc;
use std::time::Instant;

use flapcade_protocol::{Codec, Envelope, JsonCodec, Payload, ProtocolError};
use flapcade_session::PaymentGate;
use flapcade_transport::{Connection, WebSocketConnection};

use crate::{ArcadeService, FlapcadeError};

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<G: PaymentGate>(
    conn: WebSocketConnection,
    service: Arc<ArcadeService<G>>,
) -> Result<(), FlapcadeError> {
    let conn_id = conn.id();
    let codec = JsonCodec;
    let start = Instant::now();
    let idle_timeout = service.config().idle_timeout;
    tracing::debug!(%conn_id, "handling new connection");

    loop {
        let data = match tokio::time::timeout(idle_timeout, conn.recv()).await {
            Ok(Ok(Some(data))) => data,
            Ok(Ok(None)) => {
                tracing::debug!(%conn_id, "connection closed cleanly");
                break;
            }
            Ok(Err(e)) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
            Err(_) => {
                tracing::info!(%conn_id, "connection idle, closing");
                let _ = conn.close().await;
                break;
            }
        };

        let envelope: Envelope = match codec.decode(&data) {
            Ok(env) => env,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "failed to decode envelope");
                let reply = FlapcadeError::from(e).into_response();
                send(&conn, &codec, Envelope::response(0, elapsed_ms(&start), reply)).await?;
                continue;
            }
        };

        let seq = envelope.seq;
        let reply = match envelope.payload {
            Payload::Request(request) => {
                tracing::trace!(%conn_id, seq, ?request, "request");
                service.handle(request, envelope.payment.as_ref()).await
            }
            Payload::Response(_) => {
                FlapcadeError::from(ProtocolError::InvalidMessage("expected a request".into()))
                    .into_response()
            }
        };

        tracing::debug!(%conn_id, seq, status = reply.http_status(), "answered");
        send(&conn, &codec, Envelope::response(seq, elapsed_ms(&start), reply)).await?;
    }

    Ok(())
}

async fn send(
    conn: &WebSocketConnection,
    codec: &impl Codec,
    envelope: Envelope,
) -> Result<(), FlapcadeError> {
    let bytes = codec.encode(&envelope)?;
    conn.send(&bytes).await?;
    Ok(())
}

fn elapsed_ms(start: &Instant) -> u64 {
    start.elapsed().as_millis() as u64
}
