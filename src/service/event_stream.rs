//! Upstream event subscriptions over the platform's WebSocket endpoint.
//!
//! Each call to [`open`] dials a dedicated upstream socket, sends a
//! `start` frame for an ephemeral, auto-acknowledged subscription, and
//! spawns a reader task that feeds events into an
//! [`UpstreamSubscription`]. Delivery is best-effort: an event that
//! finds the session's buffer full is dropped rather than stalling the
//! stream. Closing the subscription makes the reader send a close frame
//! upstream and exit.

use futures_util::{SinkExt, StreamExt};
use reqwest::Url;
use serde_json::{Value, json};
use tokio::sync::mpsc::error::TrySendError;
use tokio_tungstenite::tungstenite::Message;

use super::UpstreamSubscription;
use crate::domain::SubscriptionFilter;
use crate::domain::upstream_event;
use crate::error::GatewayError;

/// Upstream frame type reporting a rejected `start` or other protocol fault.
const PROTOCOL_ERROR: &str = "protocol_error";

/// Builds the `start` frame for an ephemeral subscription in `namespace`.
#[must_use]
pub fn start_message(namespace: &str, filter: &SubscriptionFilter) -> Value {
    let mut start = json!({
        "type": "start",
        "namespace": namespace,
        "autoack": true,
        "ephemeral": true,
    });
    if let (Some(frame), Value::Object(options)) =
        (start.as_object_mut(), filter.subscription_options())
    {
        frame.extend(options);
    }
    start
}

/// Opens an upstream event subscription.
///
/// # Errors
///
/// Returns [`GatewayError::SubscriptionFailed`] if the upstream socket
/// cannot be connected or the `start` frame cannot be sent.
pub async fn open(
    ws_url: &Url,
    namespace: &str,
    filter: &SubscriptionFilter,
    capacity: usize,
) -> Result<UpstreamSubscription, GatewayError> {
    let (stream, _) = tokio_tungstenite::connect_async(ws_url.as_str())
        .await
        .map_err(|e| GatewayError::SubscriptionFailed(format!("connect {ws_url}: {e}")))?;
    let (mut sink, mut source) = stream.split();

    let start = start_message(namespace, filter);
    sink.send(Message::text(start.to_string()))
        .await
        .map_err(|e| GatewayError::SubscriptionFailed(format!("send start frame: {e}")))?;

    let (subscription, event_tx, mut close_rx) = UpstreamSubscription::channel(capacity);
    let namespace = namespace.to_string();

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = &mut close_rx => break,
                frame = source.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        let event = match serde_json::from_str::<Value>(&text) {
                            Ok(event) => event,
                            Err(err) => {
                                tracing::warn!(%namespace, %err, "dropping non-JSON upstream frame");
                                continue;
                            }
                        };
                        if upstream_event::event_type(&event) == Some(PROTOCOL_ERROR) {
                            tracing::warn!(%namespace, frame = %event, "upstream protocol error");
                            continue;
                        }
                        match event_tx.try_send(event) {
                            Ok(()) => {}
                            Err(TrySendError::Full(dropped)) => {
                                tracing::warn!(
                                    %namespace,
                                    event_type = ?upstream_event::event_type(&dropped),
                                    "session buffer full; dropping event"
                                );
                            }
                            Err(TrySendError::Closed(_)) => break,
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::info!(%namespace, "upstream closed event stream");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        tracing::warn!(%namespace, %err, "upstream event stream failed");
                        break;
                    }
                },
            }
        }
        let _ = sink.send(Message::Close(None)).await;
        tracing::debug!(%namespace, "upstream subscription released");
    });

    Ok(subscription)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_frame_without_filter() {
        let frame = start_message("default", &SubscriptionFilter::default());
        assert_eq!(
            frame,
            json!({
                "type": "start",
                "namespace": "default",
                "autoack": true,
                "ephemeral": true,
            })
        );
    }

    #[test]
    fn start_frame_carries_filter() {
        let filter = SubscriptionFilter::new(Some("message_confirmed".to_string()));
        let frame = start_message("ns1", &filter);
        assert_eq!(frame["namespace"], "ns1");
        assert_eq!(frame["filter"], json!({ "events": "message_confirmed" }));
    }
}
