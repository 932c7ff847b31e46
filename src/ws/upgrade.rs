//! Upgrade router: dispatches WebSocket upgrade requests by path.
//!
//! Runs as an axum middleware in front of every route. Plain HTTP
//! requests pass straight through; upgrade requests are resolved against
//! the [`SocketRegistry`] using the path without its query string. A hit
//! completes the handshake and hands the socket to the registered
//! [`super::registry::SocketServer`]; a miss is answered with 404.

use std::sync::Arc;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use super::registry::{IncomingConnection, SocketRegistry};
use crate::error::GatewayError;

/// Returns `true` if the headers ask for a WebSocket upgrade.
#[must_use]
pub fn is_websocket_upgrade(headers: &HeaderMap) -> bool {
    headers
        .get(header::UPGRADE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("websocket"))
}

/// Completes the upgrade for a registered path.
///
/// Returns `None` when no server is registered for the request path; the
/// caller is responsible for answering with a not-found response. A
/// malformed handshake on a registered path yields the handshake
/// rejection.
pub async fn handle_upgrade(sockets: &SocketRegistry, mut parts: Parts) -> Option<Response> {
    let server = sockets.lookup(parts.uri.path())?.clone();
    let uri = parts.uri.clone();

    let ws = match WebSocketUpgrade::from_request_parts(&mut parts, &()).await {
        Ok(ws) => ws,
        Err(rejection) => {
            tracing::debug!(path = server.path(), %rejection, "websocket handshake rejected");
            return Some(rejection.into_response());
        }
    };

    let path = server.path().to_string();
    let response = ws
        .on_failed_upgrade(move |err| {
            tracing::warn!(%path, %err, "websocket upgrade failed");
        })
        .on_upgrade(move |socket| async move {
            if !server.emit(IncomingConnection { socket, uri }) {
                tracing::warn!(path = server.path(), "no listener for websocket endpoint");
            }
        });
    Some(response)
}

/// Middleware that intercepts upgrade requests before routing.
pub async fn dispatch_upgrade(
    State(sockets): State<Arc<SocketRegistry>>,
    request: Request,
    next: Next,
) -> Response {
    if !is_websocket_upgrade(request.headers()) {
        return next.run(request).await;
    }

    let (parts, _body) = request.into_parts();
    let path = parts.uri.path().to_string();
    match handle_upgrade(&sockets, parts).await {
        Some(response) => response,
        None => {
            tracing::debug!(%path, "upgrade for unregistered path");
            GatewayError::NotFound(format!("no websocket endpoint at {path}")).into_response()
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use axum::Router;
    use axum::body::Body;
    use axum::http::{HeaderValue, StatusCode};
    use axum::middleware;
    use axum::routing::get;
    use tower::ServiceExt;

    use super::*;

    fn app(sockets: SocketRegistry) -> Router {
        Router::new()
            .route("/health", get(|| async { "ok" }))
            .fallback(|| async { StatusCode::NOT_FOUND })
            .layer(middleware::from_fn_with_state(
                Arc::new(sockets),
                dispatch_upgrade,
            ))
    }

    fn upgrade_request(uri: &str) -> Request {
        let Ok(request) = axum::http::Request::builder()
            .uri(uri)
            .header(header::CONNECTION, "upgrade")
            .header(header::UPGRADE, "websocket")
            .header(header::SEC_WEBSOCKET_VERSION, "13")
            .header(header::SEC_WEBSOCKET_KEY, "dGhlIHNhbXBsZSBub25jZQ==")
            .body(Body::empty())
        else {
            panic!("valid request");
        };
        request
    }

    #[test]
    fn detects_upgrade_header_case_insensitively() {
        let mut headers = HeaderMap::new();
        assert!(!is_websocket_upgrade(&headers));
        headers.insert(header::UPGRADE, HeaderValue::from_static("WebSocket"));
        assert!(is_websocket_upgrade(&headers));
        headers.insert(header::UPGRADE, HeaderValue::from_static("h2c"));
        assert!(!is_websocket_upgrade(&headers));
    }

    #[tokio::test]
    async fn unregistered_upgrade_path_is_not_found() {
        let Ok(response) = app(SocketRegistry::new())
            .oneshot(upgrade_request("/api/nope?filter.events=x"))
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn plain_requests_pass_through() {
        let mut sockets = SocketRegistry::new();
        let _listener = sockets.add_websocket("/api/ws");
        let Ok(request) = axum::http::Request::builder().uri("/health").body(Body::empty()) else {
            panic!("valid request");
        };
        let Ok(response) = app(sockets).oneshot(request).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn registered_path_without_transport_upgrade_is_rejected() {
        // oneshot bypasses hyper, so the handshake cannot complete; the
        // request must still be claimed by the router rather than 404.
        let mut sockets = SocketRegistry::new();
        let _listener = sockets.add_websocket("/api/ws");
        let Ok(response) = app(sockets).oneshot(upgrade_request("/api/ws")).await;
        assert_ne!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.status().is_client_error());
    }
}
