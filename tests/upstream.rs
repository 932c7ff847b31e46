//! Upstream client integration tests against a fake event socket.

#![allow(clippy::panic)]

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use reqwest::Url;
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{WebSocketStream, accept_async};

use sandbox_gateway::domain::SubscriptionFilter;
use sandbox_gateway::service::{FireFlyClient, Upstream};

const WAIT: Duration = Duration::from_secs(5);

async fn fake_platform() -> (TcpListener, FireFlyClient) {
    let Ok(listener) = TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind ephemeral port");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("local addr");
    };
    let Ok(endpoint) = Url::parse(&format!("http://{addr}")) else {
        panic!("valid url");
    };
    let client = FireFlyClient::new(reqwest::Client::new(), endpoint, "ns1", 8);
    (listener, client)
}

async fn accept(listener: &TcpListener) -> WebSocketStream<TcpStream> {
    let Ok(Ok((stream, _))) = timeout(WAIT, listener.accept()).await else {
        panic!("gateway never dialed the event socket");
    };
    let Ok(socket) = accept_async(stream).await else {
        panic!("websocket handshake");
    };
    socket
}

async fn next_text(socket: &mut WebSocketStream<TcpStream>) -> Value {
    let Ok(Some(Ok(Message::Text(text)))) = timeout(WAIT, socket.next()).await else {
        panic!("expected a text frame");
    };
    let Ok(value) = serde_json::from_str(text.as_str()) else {
        panic!("frame is not JSON");
    };
    value
}

#[tokio::test]
async fn subscription_sends_start_frame_and_delivers_events() {
    let (listener, client) = fake_platform().await;
    let filter = SubscriptionFilter::new(Some("message_confirmed".to_string()));

    let server = tokio::spawn(async move {
        let mut socket = accept(&listener).await;
        let start = next_text(&mut socket).await;
        let _ = socket
            .send(Message::text(
                json!({ "type": "protocol_error", "error": "ignored" }).to_string(),
            ))
            .await;
        let _ = socket
            .send(Message::text(
                json!({ "type": "message_confirmed", "id": "e1" }).to_string(),
            ))
            .await;
        (start, socket)
    });

    let Ok(mut subscription) = client.listen(&filter).await else {
        panic!("subscription opens");
    };
    let Ok(Some(event)) = timeout(WAIT, subscription.next_event()).await else {
        panic!("no event delivered");
    };
    assert_eq!(event, json!({ "type": "message_confirmed", "id": "e1" }));

    let Ok((start, mut socket)) = server.await else {
        panic!("fake platform task");
    };
    assert_eq!(
        start,
        json!({
            "type": "start",
            "namespace": "ns1",
            "autoack": true,
            "ephemeral": true,
            "filter": { "events": "message_confirmed" }
        })
    );

    assert!(subscription.close());
    assert!(!subscription.close());
    loop {
        match timeout(WAIT, socket.next()).await {
            Ok(Some(Ok(Message::Close(_))) | None) => break,
            Ok(Some(Ok(_))) => {}
            Ok(Some(Err(err))) => panic!("socket error before close: {err}"),
            Err(_) => panic!("no close frame after subscription close"),
        }
    }
}

#[tokio::test]
async fn upstream_hangup_ends_the_subscription() {
    let (listener, client) = fake_platform().await;

    let server = tokio::spawn(async move {
        let mut socket = accept(&listener).await;
        let _start = next_text(&mut socket).await;
        let _ = socket.close(None).await;
    });

    let Ok(mut subscription) = client.listen(&SubscriptionFilter::default()).await else {
        panic!("subscription opens");
    };
    let Ok(None) = timeout(WAIT, subscription.next_event()).await else {
        panic!("subscription should end when the upstream hangs up");
    };
    let _ = server.await;
}

#[tokio::test]
async fn unreachable_platform_fails_the_subscription() {
    let (listener, client) = fake_platform().await;
    drop(listener);
    assert!(client.listen(&SubscriptionFilter::default()).await.is_err());
}
