//! Smart contract handlers: interfaces, APIs, and event listeners.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{
    ApiDto, AsyncResponse, CreateApiRequest, CreateInterfaceRequest, CreateListenerRequest,
    InterfaceDto, InterfaceFormat, ListenerDto, NamespaceParams,
};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, GatewayError};

/// `POST /api/contracts/interface` — Publish a contract interface.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] for an ABI without name and
/// version, or [`GatewayError::Upstream`] if generation or publishing
/// fails.
#[utoipa::path(
    post,
    path = "/api/contracts/interface",
    tag = "Contracts",
    summary = "Publish a contract interface",
    description = "Publishes an interface document. With `format: abi` the ABI is converted upstream first, then the result is published.",
    params(NamespaceParams),
    request_body = CreateInterfaceRequest,
    responses(
        (status = 202, description = "Interface accepted", body = AsyncResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Upstream failure", body = ErrorResponse),
    )
)]
pub async fn create_interface(
    State(state): State<AppState>,
    Query(params): Query<NamespaceParams>,
    Json(req): Json<CreateInterfaceRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let client = state.client(params.ns.as_deref()).await;
    let ffi = match req.format {
        InterfaceFormat::Ffi => req.schema,
        InterfaceFormat::Abi => {
            let request = req.generate_body()?;
            client.generate_contract_interface(&request).await?
        }
    };
    let published = client.create_contract_interface(&ffi).await?;
    let response = AsyncResponse::from_upstream("contract_interface", &published, "/id")?;
    Ok((StatusCode::ACCEPTED, Json(response)))
}

/// `GET /api/contracts/interface` — List contract interfaces.
///
/// # Errors
///
/// Returns [`GatewayError::Upstream`] if the upstream call fails.
#[utoipa::path(
    get,
    path = "/api/contracts/interface",
    tag = "Contracts",
    summary = "List contract interfaces",
    params(NamespaceParams),
    responses(
        (status = 200, description = "Interfaces", body = Vec<InterfaceDto>),
        (status = 500, description = "Upstream failure", body = ErrorResponse),
    )
)]
pub async fn list_interfaces(
    State(state): State<AppState>,
    Query(params): Query<NamespaceParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let interfaces = state
        .client(params.ns.as_deref())
        .await
        .contract_interfaces()
        .await?;
    let data: Vec<InterfaceDto> = interfaces.iter().map(InterfaceDto::from_upstream).collect();
    Ok(Json(data))
}

/// `GET /api/contracts/interface/{name}/{version}` — Get one interface.
///
/// The full upstream document is returned so its methods and events can
/// be inspected.
///
/// # Errors
///
/// Returns [`GatewayError::NotFound`] if the interface does not exist.
#[utoipa::path(
    get,
    path = "/api/contracts/interface/{name}/{version}",
    tag = "Contracts",
    summary = "Get a contract interface",
    params(
        ("name" = String, Path, description = "Interface name"),
        ("version" = String, Path, description = "Interface version"),
        NamespaceParams,
    ),
    responses(
        (status = 200, description = "Interface document", body = serde_json::Value),
        (status = 404, description = "Interface not found", body = ErrorResponse),
    )
)]
pub async fn get_interface(
    State(state): State<AppState>,
    Path((name, version)): Path<(String, String)>,
    Query(params): Query<NamespaceParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let ffi = state
        .client(params.ns.as_deref())
        .await
        .contract_interface(&name, &version)
        .await?;
    Ok(Json(ffi))
}

/// `POST /api/contracts/api` — Expose an interface at a contract address.
///
/// # Errors
///
/// Returns [`GatewayError::Upstream`] if creation fails.
#[utoipa::path(
    post,
    path = "/api/contracts/api",
    tag = "Contracts",
    summary = "Create a contract API",
    params(NamespaceParams),
    request_body = CreateApiRequest,
    responses(
        (status = 202, description = "API accepted", body = AsyncResponse),
        (status = 500, description = "Upstream failure", body = ErrorResponse),
    )
)]
pub async fn create_api(
    State(state): State<AppState>,
    Query(params): Query<NamespaceParams>,
    Json(req): Json<CreateApiRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let api = state
        .client(params.ns.as_deref())
        .await
        .create_contract_api(&req.to_upstream())
        .await?;
    let response = AsyncResponse::from_upstream("contract_api", &api, "/id")?;
    Ok((StatusCode::ACCEPTED, Json(response)))
}

/// `GET /api/contracts/api` — List contract APIs.
///
/// # Errors
///
/// Returns [`GatewayError::Upstream`] if the upstream call fails.
#[utoipa::path(
    get,
    path = "/api/contracts/api",
    tag = "Contracts",
    summary = "List contract APIs",
    params(NamespaceParams),
    responses(
        (status = 200, description = "Contract APIs", body = Vec<ApiDto>),
        (status = 500, description = "Upstream failure", body = ErrorResponse),
    )
)]
pub async fn list_apis(
    State(state): State<AppState>,
    Query(params): Query<NamespaceParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let apis = state.client(params.ns.as_deref()).await.contract_apis().await?;
    let data: Vec<ApiDto> = apis.iter().map(ApiDto::from_upstream).collect();
    Ok(Json(data))
}

/// `GET /api/contracts/api/{name}` — Get one contract API.
///
/// # Errors
///
/// Returns [`GatewayError::NotFound`] if the API does not exist.
#[utoipa::path(
    get,
    path = "/api/contracts/api/{name}",
    tag = "Contracts",
    summary = "Get a contract API",
    params(
        ("name" = String, Path, description = "API name"),
        NamespaceParams,
    ),
    responses(
        (status = 200, description = "Contract API", body = ApiDto),
        (status = 404, description = "API not found", body = ErrorResponse),
    )
)]
pub async fn get_api(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<NamespaceParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let api = state
        .client(params.ns.as_deref())
        .await
        .contract_api(&name)
        .await?;
    Ok(Json(ApiDto::from_upstream(&api)))
}

/// `POST /api/contracts/listener` — Listen for a contract event.
///
/// Listener creation is synchronous upstream, so the listener itself is
/// returned.
///
/// # Errors
///
/// Returns [`GatewayError::NotFound`] for an unknown API or event, or
/// [`GatewayError::Upstream`] if creation fails.
#[utoipa::path(
    post,
    path = "/api/contracts/listener",
    tag = "Contracts",
    summary = "Create a contract event listener",
    params(NamespaceParams),
    request_body = CreateListenerRequest,
    responses(
        (status = 200, description = "Listener created", body = ListenerDto),
        (status = 404, description = "Unknown API or event", body = ErrorResponse),
        (status = 500, description = "Upstream failure", body = ErrorResponse),
    )
)]
pub async fn create_listener(
    State(state): State<AppState>,
    Query(params): Query<NamespaceParams>,
    Json(req): Json<CreateListenerRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let listener = state
        .client(params.ns.as_deref())
        .await
        .create_contract_api_listener(&req.api_name, &req.event_path, &req.to_upstream())
        .await?;
    Ok(Json(ListenerDto::from_upstream(&listener)))
}

/// `GET /api/contracts/listener` — List contract event listeners.
///
/// # Errors
///
/// Returns [`GatewayError::Upstream`] if the upstream call fails.
#[utoipa::path(
    get,
    path = "/api/contracts/listener",
    tag = "Contracts",
    summary = "List contract event listeners",
    params(NamespaceParams),
    responses(
        (status = 200, description = "Listeners", body = Vec<ListenerDto>),
        (status = 500, description = "Upstream failure", body = ErrorResponse),
    )
)]
pub async fn list_listeners(
    State(state): State<AppState>,
    Query(params): Query<NamespaceParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let listeners = state
        .client(params.ns.as_deref())
        .await
        .contract_listeners()
        .await?;
    let data: Vec<ListenerDto> = listeners.iter().map(ListenerDto::from_upstream).collect();
    Ok(Json(data))
}

/// Contract routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/contracts/interface",
            get(list_interfaces).post(create_interface),
        )
        .route(
            "/api/contracts/interface/{name}/{version}",
            get(get_interface),
        )
        .route("/api/contracts/api", get(list_apis).post(create_api))
        .route("/api/contracts/api/{name}", get(get_api))
        .route(
            "/api/contracts/listener",
            get(list_listeners).post(create_listener),
        )
}
