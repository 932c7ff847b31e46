//! Datatype handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{AsyncResponse, CreateDatatypeRequest, DatatypeDto, NamespaceParams};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, GatewayError};

/// `GET /api/datatypes` — List datatypes.
///
/// # Errors
///
/// Returns [`GatewayError::Upstream`] if the upstream call fails.
#[utoipa::path(
    get,
    path = "/api/datatypes",
    tag = "Datatypes",
    summary = "List datatypes",
    params(NamespaceParams),
    responses(
        (status = 200, description = "Datatypes", body = Vec<DatatypeDto>),
        (status = 500, description = "Upstream failure", body = ErrorResponse),
    )
)]
pub async fn list_datatypes(
    State(state): State<AppState>,
    Query(params): Query<NamespaceParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let datatypes = state.client(params.ns.as_deref()).await.datatypes().await?;
    let data: Vec<DatatypeDto> = datatypes.iter().map(DatatypeDto::from_upstream).collect();
    Ok(Json(data))
}

/// `GET /api/datatypes/{name}/{version}` — Get one datatype.
///
/// # Errors
///
/// Returns [`GatewayError::NotFound`] if the datatype does not exist.
#[utoipa::path(
    get,
    path = "/api/datatypes/{name}/{version}",
    tag = "Datatypes",
    summary = "Get a datatype",
    params(
        ("name" = String, Path, description = "Datatype name"),
        ("version" = String, Path, description = "Datatype version"),
        NamespaceParams,
    ),
    responses(
        (status = 200, description = "Datatype", body = DatatypeDto),
        (status = 404, description = "Datatype not found", body = ErrorResponse),
    )
)]
pub async fn get_datatype(
    State(state): State<AppState>,
    Path((name, version)): Path<(String, String)>,
    Query(params): Query<NamespaceParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let datatype = state
        .client(params.ns.as_deref())
        .await
        .datatype(&name, &version)
        .await?;
    Ok(Json(DatatypeDto::from_upstream(&datatype)))
}

/// `POST /api/datatypes` — Define a datatype.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] on a blank name or version or
/// a non-object schema, or [`GatewayError::Upstream`] if creation fails.
#[utoipa::path(
    post,
    path = "/api/datatypes",
    tag = "Datatypes",
    summary = "Create a datatype",
    params(NamespaceParams),
    request_body = CreateDatatypeRequest,
    responses(
        (status = 202, description = "Datatype accepted", body = AsyncResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Upstream failure", body = ErrorResponse),
    )
)]
pub async fn create_datatype(
    State(state): State<AppState>,
    Query(params): Query<NamespaceParams>,
    Json(req): Json<CreateDatatypeRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let body = req.to_upstream()?;
    let datatype = state
        .client(params.ns.as_deref())
        .await
        .create_datatype(&body)
        .await?;
    let response = AsyncResponse::from_upstream("datatype", &datatype, "/id")?;
    Ok((StatusCode::ACCEPTED, Json(response)))
}

/// Datatype routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/datatypes", get(list_datatypes).post(create_datatype))
        .route("/api/datatypes/{name}/{version}", get(get_datatype))
}
