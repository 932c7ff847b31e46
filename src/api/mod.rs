//! REST API layer: route handlers, DTOs, and router composition.
//!
//! Resource endpoints live under `/api/...`; `/health` sits at the root.
//! Every resource endpoint takes an optional `?ns=` namespace selector.

pub mod dto;
pub mod handlers;

use axum::Router;
use utoipa::OpenApi;

use crate::app_state::AppState;

/// Path of the generated OpenAPI document.
pub const OPENAPI_PATH: &str = "/api/openapi.json";

/// OpenAPI document covering every REST endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "sandbox-gateway",
        description = "REST gateway for exploring a distributed-ledger messaging platform"
    ),
    paths(
        handlers::system::health_handler,
        handlers::common::list_organizations,
        handlers::common::self_organization,
        handlers::common::list_verifiers,
        handlers::common::self_verifiers,
        handlers::messages::broadcast,
        handlers::messages::private,
        handlers::messages::broadcast_blob,
        handlers::messages::private_blob,
        handlers::tokens::list_pools,
        handlers::tokens::get_pool,
        handlers::tokens::create_pool,
        handlers::tokens::mint,
        handlers::tokens::burn,
        handlers::tokens::transfer,
        handlers::tokens::balances,
        handlers::contracts::create_interface,
        handlers::contracts::list_interfaces,
        handlers::contracts::get_interface,
        handlers::contracts::create_api,
        handlers::contracts::list_apis,
        handlers::contracts::get_api,
        handlers::contracts::create_listener,
        handlers::contracts::list_listeners,
        handlers::datatypes::list_datatypes,
        handlers::datatypes::get_datatype,
        handlers::datatypes::create_datatype,
    ),
    tags(
        (name = "System", description = "Service health"),
        (name = "Common", description = "Network organizations and verifiers"),
        (name = "Messages", description = "Broadcast and private messaging"),
        (name = "Tokens", description = "Token pools, transfers, and balances"),
        (name = "Contracts", description = "Contract interfaces, APIs, and listeners"),
        (name = "Datatypes", description = "Message datatypes"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints and the
/// OpenAPI document.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .merge(handlers::routes())
        .merge(handlers::system::routes())
        .merge(docs_router())
}

#[cfg(feature = "swagger-ui")]
fn docs_router() -> Router<AppState> {
    Router::new()
        .merge(utoipa_swagger_ui::SwaggerUi::new("/api/docs").url(OPENAPI_PATH, ApiDoc::openapi()))
}

#[cfg(not(feature = "swagger-ui"))]
fn docs_router() -> Router<AppState> {
    use axum::Json;
    use axum::routing::get;

    Router::new().route(OPENAPI_PATH, get(|| async { Json(ApiDoc::openapi()) }))
}
