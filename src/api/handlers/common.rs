//! Network identity handlers: organizations and verifiers.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{NamespaceParams, OrganizationDto, OrganizationParams, VerifierDto, str_at};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, GatewayError};

/// `GET /api/common/organizations` — List network organizations.
///
/// # Errors
///
/// Returns [`GatewayError::Upstream`] if the upstream call fails.
#[utoipa::path(
    get,
    path = "/api/common/organizations",
    tag = "Common",
    summary = "List organizations",
    description = "Lists organizations registered on the network, optionally without the local one.",
    params(OrganizationParams),
    responses(
        (status = 200, description = "Organizations", body = Vec<OrganizationDto>),
        (status = 500, description = "Upstream failure", body = ErrorResponse),
    )
)]
pub async fn list_organizations(
    State(state): State<AppState>,
    Query(params): Query<OrganizationParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let client = state.client(params.ns.as_deref()).await;
    let orgs = client.organizations().await?;

    let own_id = if params.exclude_self {
        str_at(&client.status().await?, "/org/id")
    } else {
        None
    };

    let data: Vec<OrganizationDto> = orgs
        .iter()
        .map(OrganizationDto::from_upstream)
        .filter(|org| own_id.is_none() || org.id != own_id)
        .collect();
    Ok(Json(data))
}

/// `GET /api/common/organizations/self` — The local organization.
///
/// # Errors
///
/// Returns [`GatewayError::Upstream`] if the upstream call fails.
#[utoipa::path(
    get,
    path = "/api/common/organizations/self",
    tag = "Common",
    summary = "Get the local organization",
    params(NamespaceParams),
    responses(
        (status = 200, description = "Local organization", body = OrganizationDto),
        (status = 500, description = "Upstream failure", body = ErrorResponse),
    )
)]
pub async fn self_organization(
    State(state): State<AppState>,
    Query(params): Query<NamespaceParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let status = state.client(params.ns.as_deref()).await.status().await?;
    let org = status.get("org").ok_or_else(|| {
        GatewayError::Upstream("upstream status has no organization".to_string())
    })?;
    Ok(Json(OrganizationDto::from_upstream(org)))
}

/// `GET /api/common/verifiers` — List identity verifiers.
///
/// # Errors
///
/// Returns [`GatewayError::Upstream`] if the upstream call fails.
#[utoipa::path(
    get,
    path = "/api/common/verifiers",
    tag = "Common",
    summary = "List verifiers",
    description = "Lists signing keys registered for identities in the namespace.",
    params(NamespaceParams),
    responses(
        (status = 200, description = "Verifiers", body = Vec<VerifierDto>),
        (status = 500, description = "Upstream failure", body = ErrorResponse),
    )
)]
pub async fn list_verifiers(
    State(state): State<AppState>,
    Query(params): Query<NamespaceParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let verifiers = state.client(params.ns.as_deref()).await.verifiers().await?;
    let data: Vec<VerifierDto> = verifiers.iter().map(VerifierDto::from_upstream).collect();
    Ok(Json(data))
}

/// `GET /api/common/verifiers/self` — Verifiers of the local organization.
///
/// # Errors
///
/// Returns [`GatewayError::Upstream`] if the upstream call fails.
#[utoipa::path(
    get,
    path = "/api/common/verifiers/self",
    tag = "Common",
    summary = "List the local organization's verifiers",
    params(NamespaceParams),
    responses(
        (status = 200, description = "Local verifiers", body = Vec<VerifierDto>),
        (status = 500, description = "Upstream failure", body = ErrorResponse),
    )
)]
pub async fn self_verifiers(
    State(state): State<AppState>,
    Query(params): Query<NamespaceParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let client = state.client(params.ns.as_deref()).await;
    let status = client.status().await?;
    let own_did = str_at(&status, "/org/did");

    let data: Vec<VerifierDto> = client
        .verifiers()
        .await?
        .iter()
        .map(VerifierDto::from_upstream)
        .filter(|v| v.did.is_some() && v.did == own_did)
        .collect();
    Ok(Json(data))
}

/// Organization and verifier routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/common/organizations", get(list_organizations))
        .route("/api/common/organizations/self", get(self_organization))
        .route("/api/common/verifiers", get(list_verifiers))
        .route("/api/common/verifiers/self", get(self_verifiers))
}
