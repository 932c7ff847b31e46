//! Application router assembly.

use std::sync::Arc;

use axum::Router;
use axum::http::Uri;
use axum::middleware;
use axum::response::IntoResponse;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::app_state::AppState;
use crate::error::GatewayError;
use crate::ws::SocketRegistry;
use crate::ws::upgrade::dispatch_upgrade;

/// Builds the full HTTP application.
///
/// The upgrade middleware wraps every route including the fallback, so
/// WebSocket upgrades are resolved against `sockets` before routing and
/// plain requests to unknown paths get a JSON 404.
pub fn build_app(state: AppState, sockets: Arc<SocketRegistry>) -> Router {
    Router::new()
        .merge(api::build_router())
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(sockets, dispatch_upgrade))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn not_found(uri: Uri) -> impl IntoResponse {
    GatewayError::NotFound(format!("no route for {}", uri.path()))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use reqwest::Url;
    use tower::ServiceExt;

    use super::*;
    use crate::service::FireFlyClients;

    fn test_app() -> Router {
        let Ok(endpoint) = Url::parse("http://127.0.0.1:1") else {
            panic!("valid url");
        };
        let clients = FireFlyClients::new(reqwest::Client::new(), endpoint, "default", 8);
        build_app(AppState::new(Arc::new(clients)), Arc::new(SocketRegistry::new()))
    }

    #[tokio::test]
    async fn health_is_ok() {
        let Ok(request) = Request::builder().uri("/health").body(Body::empty()) else {
            panic!("valid request");
        };
        let Ok(response) = test_app().oneshot(request).await else {
            panic!("infallible");
        };
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_path_is_json_not_found() {
        let Ok(request) = Request::builder().uri("/api/nope").body(Body::empty()) else {
            panic!("valid request");
        };
        let Ok(response) = test_app().oneshot(request).await else {
            panic!("infallible");
        };
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response
                .headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok()),
            Some("application/json")
        );
    }

    #[tokio::test]
    async fn upgrade_on_unknown_path_is_not_found() {
        let Ok(request) = Request::builder()
            .uri("/api/ws")
            .header("connection", "upgrade")
            .header("upgrade", "websocket")
            .header("sec-websocket-version", "13")
            .header("sec-websocket-key", "dGhlIHNhbXBsZSBub25jZQ==")
            .body(Body::empty())
        else {
            panic!("valid request");
        };
        let Ok(response) = test_app().oneshot(request).await else {
            panic!("infallible");
        };
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
