//! Token handlers: pools, mint/burn/transfer, and balances.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    AsyncResponse, BalanceParams, BurnRequest, CreateTokenPoolRequest, MintRequest,
    NamespaceParams, TokenBalanceDto, TokenPoolDto, TransferRequest,
};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, GatewayError};

/// Kind reported for mint, burn, and transfer actions.
const TOKEN_TRANSFER: &str = "token_transfer";

/// `GET /api/tokens/pools` — List token pools.
///
/// # Errors
///
/// Returns [`GatewayError::Upstream`] if the upstream call fails.
#[utoipa::path(
    get,
    path = "/api/tokens/pools",
    tag = "Tokens",
    summary = "List token pools",
    params(NamespaceParams),
    responses(
        (status = 200, description = "Token pools", body = Vec<TokenPoolDto>),
        (status = 500, description = "Upstream failure", body = ErrorResponse),
    )
)]
pub async fn list_pools(
    State(state): State<AppState>,
    Query(params): Query<NamespaceParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let pools = state.client(params.ns.as_deref()).await.token_pools().await?;
    let data: Vec<TokenPoolDto> = pools.iter().map(TokenPoolDto::from_upstream).collect();
    Ok(Json(data))
}

/// `GET /api/tokens/pools/{name}` — Get one token pool.
///
/// # Errors
///
/// Returns [`GatewayError::NotFound`] if the pool does not exist.
#[utoipa::path(
    get,
    path = "/api/tokens/pools/{name}",
    tag = "Tokens",
    summary = "Get a token pool",
    params(
        ("name" = String, Path, description = "Pool name or id"),
        NamespaceParams,
    ),
    responses(
        (status = 200, description = "Token pool", body = TokenPoolDto),
        (status = 404, description = "Pool not found", body = ErrorResponse),
    )
)]
pub async fn get_pool(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<NamespaceParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let pool = state
        .client(params.ns.as_deref())
        .await
        .token_pool(&name)
        .await?;
    Ok(Json(TokenPoolDto::from_upstream(&pool)))
}

/// `POST /api/tokens/pools` — Create a token pool.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] on a blank name, or
/// [`GatewayError::Upstream`] if creation fails.
#[utoipa::path(
    post,
    path = "/api/tokens/pools",
    tag = "Tokens",
    summary = "Create a token pool",
    description = "Creates a fungible or non-fungible pool. The pool becomes usable once its confirmation arrives on the event feed.",
    params(NamespaceParams),
    request_body = CreateTokenPoolRequest,
    responses(
        (status = 202, description = "Pool creation accepted", body = AsyncResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Upstream failure", body = ErrorResponse),
    )
)]
pub async fn create_pool(
    State(state): State<AppState>,
    Query(params): Query<NamespaceParams>,
    Json(req): Json<CreateTokenPoolRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let body = req.to_upstream()?;
    let pool = state
        .client(params.ns.as_deref())
        .await
        .create_token_pool(&body)
        .await?;
    let response = AsyncResponse::from_upstream("token_pool", &pool, "/id")?;
    Ok((StatusCode::ACCEPTED, Json(response)))
}

/// `POST /api/tokens/mint` — Mint tokens.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] on a malformed amount, or
/// [`GatewayError::Upstream`] if the mint fails.
#[utoipa::path(
    post,
    path = "/api/tokens/mint",
    tag = "Tokens",
    summary = "Mint tokens",
    params(NamespaceParams),
    request_body = MintRequest,
    responses(
        (status = 202, description = "Mint accepted", body = AsyncResponse),
        (status = 400, description = "Invalid amount", body = ErrorResponse),
        (status = 500, description = "Upstream failure", body = ErrorResponse),
    )
)]
pub async fn mint(
    State(state): State<AppState>,
    Query(params): Query<NamespaceParams>,
    Json(req): Json<MintRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let body = req.to_upstream()?;
    let transfer = state
        .client(params.ns.as_deref())
        .await
        .mint_tokens(&body)
        .await?;
    transfer_accepted(&transfer)
}

/// `POST /api/tokens/burn` — Burn tokens.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] on a malformed amount, or
/// [`GatewayError::Upstream`] if the burn fails.
#[utoipa::path(
    post,
    path = "/api/tokens/burn",
    tag = "Tokens",
    summary = "Burn tokens",
    params(NamespaceParams),
    request_body = BurnRequest,
    responses(
        (status = 202, description = "Burn accepted", body = AsyncResponse),
        (status = 400, description = "Invalid amount", body = ErrorResponse),
        (status = 500, description = "Upstream failure", body = ErrorResponse),
    )
)]
pub async fn burn(
    State(state): State<AppState>,
    Query(params): Query<NamespaceParams>,
    Json(req): Json<BurnRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let body = req.to_upstream()?;
    let transfer = state
        .client(params.ns.as_deref())
        .await
        .burn_tokens(&body)
        .await?;
    transfer_accepted(&transfer)
}

/// `POST /api/tokens/transfer` — Transfer tokens to another key.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] on a malformed amount or blank
/// recipient, or [`GatewayError::Upstream`] if the transfer fails.
#[utoipa::path(
    post,
    path = "/api/tokens/transfer",
    tag = "Tokens",
    summary = "Transfer tokens",
    params(NamespaceParams),
    request_body = TransferRequest,
    responses(
        (status = 202, description = "Transfer accepted", body = AsyncResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Upstream failure", body = ErrorResponse),
    )
)]
pub async fn transfer(
    State(state): State<AppState>,
    Query(params): Query<NamespaceParams>,
    Json(req): Json<TransferRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let body = req.to_upstream()?;
    let transfer = state
        .client(params.ns.as_deref())
        .await
        .transfer_tokens(&body)
        .await?;
    transfer_accepted(&transfer)
}

/// `GET /api/tokens/balances` — Token balances, optionally filtered.
///
/// # Errors
///
/// Returns [`GatewayError::Upstream`] if the upstream call fails.
#[utoipa::path(
    get,
    path = "/api/tokens/balances",
    tag = "Tokens",
    summary = "List token balances",
    params(BalanceParams),
    responses(
        (status = 200, description = "Balances", body = Vec<TokenBalanceDto>),
        (status = 500, description = "Upstream failure", body = ErrorResponse),
    )
)]
pub async fn balances(
    State(state): State<AppState>,
    Query(params): Query<BalanceParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let balances = state
        .client(params.ns.as_deref())
        .await
        .token_balances(params.pool.as_deref(), params.key.as_deref())
        .await?;
    let data: Vec<TokenBalanceDto> = balances.iter().map(TokenBalanceDto::from_upstream).collect();
    Ok(Json(data))
}

fn transfer_accepted(
    transfer: &serde_json::Value,
) -> Result<(StatusCode, Json<AsyncResponse>), GatewayError> {
    let response = AsyncResponse::from_upstream(TOKEN_TRANSFER, transfer, "/localId")?;
    Ok((StatusCode::ACCEPTED, Json(response)))
}

/// Token routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/tokens/pools", get(list_pools).post(create_pool))
        .route("/api/tokens/pools/{name}", get(get_pool))
        .route("/api/tokens/mint", post(mint))
        .route("/api/tokens/burn", post(burn))
        .route("/api/tokens/transfer", post(transfer))
        .route("/api/tokens/balances", get(balances))
}
