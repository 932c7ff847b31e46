//! Client session manager.
//!
//! One session per accepted browser socket:
//!
//! 1. **Connecting** — derive the [`SubscriptionFilter`] from the request
//!    URI and open an upstream subscription. Failure closes the socket.
//! 2. **Active** — forward each upstream event, enriched where it
//!    applies, as one JSON text frame, in upstream order. Client data
//!    frames are ignored.
//! 3. **Closed** — on client close (or upstream end) the subscription is
//!    closed exactly once and every reference is released. A close that
//!    arrives during a batch lookup is noticed without waiting for it.
//!
//! Sessions run as independent tasks and share nothing mutable.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;

use super::enrichment::enrich_event;
use super::registry::{ConnectionListener, IncomingConnection};
use crate::domain::{SessionId, SubscriptionFilter};
use crate::service::Upstream;

/// Why a session left the Active state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The browser closed the socket or the connection dropped.
    ClientClosed,
    /// Sending to the browser failed.
    ClientSendFailed,
    /// The upstream ended the subscription.
    UpstreamEnded,
}

/// Spawns the accept loop for `listener`, running each connection as its
/// own session task. The loop ends once the registry is dropped.
pub fn serve_sessions(mut listener: ConnectionListener, upstream: Arc<dyn Upstream>) {
    tokio::spawn(async move {
        tracing::info!(path = listener.path(), "relay endpoint ready");
        while let Some(connection) = listener.accept().await {
            tokio::spawn(run_session(connection, Arc::clone(&upstream)));
        }
        tracing::debug!(path = listener.path(), "relay endpoint stopped");
    });
}

/// Runs one client session to completion.
pub async fn run_session(connection: IncomingConnection, upstream: Arc<dyn Upstream>) {
    let IncomingConnection { socket, uri } = connection;
    let session_id = SessionId::new();
    let path = uri.path().to_string();
    let filter = SubscriptionFilter::from_uri(&uri);
    let (mut ws_tx, mut ws_rx) = socket.split();

    // Connecting
    let mut subscription = match upstream.listen(&filter).await {
        Ok(subscription) => subscription,
        Err(err) => {
            tracing::warn!(%session_id, %path, %err, "closing client; upstream subscription failed");
            let _ = ws_tx.send(Message::Close(None)).await;
            return;
        }
    };
    tracing::info!(%session_id, %path, events = ?filter.events(), "client session active");

    // Active
    let reason = loop {
        tokio::select! {
            msg = ws_rx.next() => if client_gone(&session_id, msg) {
                break CloseReason::ClientClosed;
            },
            event = subscription.next_event() => {
                let Some(event) = event else {
                    let _ = ws_tx.send(Message::Close(None)).await;
                    break CloseReason::UpstreamEnded;
                };

                // The client can leave while a batch lookup is in flight.
                let enrichment = enrich_event(event, upstream.as_ref());
                tokio::pin!(enrichment);
                let enriched = loop {
                    tokio::select! {
                        event = &mut enrichment => break Some(event),
                        msg = ws_rx.next() => if client_gone(&session_id, msg) {
                            break None;
                        },
                    }
                };
                let Some(event) = enriched else {
                    break CloseReason::ClientClosed;
                };

                if !forward(&mut ws_tx, &event).await {
                    break CloseReason::ClientSendFailed;
                }
            }
        }
    };

    // Closed
    subscription.close();
    tracing::info!(%session_id, %path, ?reason, "client session closed");
}

/// Returns `true` if a read from the client socket means it is gone.
/// Client data frames are ignored.
fn client_gone(session_id: &SessionId, msg: Option<Result<Message, axum::Error>>) -> bool {
    match msg {
        Some(Ok(Message::Close(_))) | None => true,
        Some(Err(err)) => {
            tracing::debug!(%session_id, %err, "client socket error");
            true
        }
        Some(Ok(_)) => false,
    }
}

/// Sends one event as a JSON text frame. Returns `false` if the client
/// socket is gone.
async fn forward(ws_tx: &mut SplitSink<WebSocket, Message>, event: &Value) -> bool {
    let json = match serde_json::to_string(event) {
        Ok(json) => json,
        Err(err) => {
            tracing::warn!(%err, "dropping unserializable event");
            return true;
        }
    };
    ws_tx.send(Message::text(json)).await.is_ok()
}
