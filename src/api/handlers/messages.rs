//! Message handlers: inline and blob broadcasts and private sends.

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{
    AsyncResponse, BlobMessageForm, BroadcastRequest, NamespaceParams, PrivateRequest,
    blob_body, broadcast_body, private_body, str_at,
};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, GatewayError};
use crate::service::BlobUpload;

/// Kind reported for every message action.
const MESSAGE: &str = "message";

/// `POST /api/messages/broadcast` — Broadcast an inline message.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] without a payload, or
/// [`GatewayError::Upstream`] if the send fails.
#[utoipa::path(
    post,
    path = "/api/messages/broadcast",
    tag = "Messages",
    summary = "Broadcast a message",
    description = "Sends a message to every member of the network. Confirmation arrives on the event feed.",
    params(NamespaceParams),
    request_body = BroadcastRequest,
    responses(
        (status = 202, description = "Message accepted", body = AsyncResponse),
        (status = 400, description = "No payload", body = ErrorResponse),
        (status = 500, description = "Upstream failure", body = ErrorResponse),
    )
)]
pub async fn broadcast(
    State(state): State<AppState>,
    Query(params): Query<NamespaceParams>,
    Json(req): Json<BroadcastRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let body = broadcast_body(&req)?;
    let sent = state
        .client(params.ns.as_deref())
        .await
        .send_broadcast(&body)
        .await?;
    accepted(&sent)
}

/// `POST /api/messages/private` — Send an inline message to recipients.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] without a payload or
/// recipients, or [`GatewayError::Upstream`] if the send fails.
#[utoipa::path(
    post,
    path = "/api/messages/private",
    tag = "Messages",
    summary = "Send a private message",
    params(NamespaceParams),
    request_body = PrivateRequest,
    responses(
        (status = 202, description = "Message accepted", body = AsyncResponse),
        (status = 400, description = "No payload or recipients", body = ErrorResponse),
        (status = 500, description = "Upstream failure", body = ErrorResponse),
    )
)]
pub async fn private(
    State(state): State<AppState>,
    Query(params): Query<NamespaceParams>,
    Json(req): Json<PrivateRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let body = private_body(&req)?;
    let sent = state
        .client(params.ns.as_deref())
        .await
        .send_private(&body)
        .await?;
    accepted(&sent)
}

/// `POST /api/messages/broadcastblob` — Upload a file and broadcast it.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] on a malformed form or a
/// missing file, or [`GatewayError::Upstream`] if upload or send fails.
#[utoipa::path(
    post,
    path = "/api/messages/broadcastblob",
    tag = "Messages",
    summary = "Broadcast a file",
    description = "Multipart form with `file`, `tag`, and `topic`. The file is uploaded first, then broadcast by reference.",
    params(NamespaceParams),
    responses(
        (status = 202, description = "Message accepted", body = AsyncResponse),
        (status = 400, description = "Malformed form", body = ErrorResponse),
        (status = 500, description = "Upstream failure", body = ErrorResponse),
    )
)]
pub async fn broadcast_blob(
    State(state): State<AppState>,
    Query(params): Query<NamespaceParams>,
    multipart: Multipart,
) -> Result<impl IntoResponse, GatewayError> {
    send_blob(&state, params.ns.as_deref(), multipart, false).await
}

/// `POST /api/messages/privateblob` — Upload a file and send it privately.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] on a malformed form, a
/// missing file, or no recipients, or [`GatewayError::Upstream`] if
/// upload or send fails.
#[utoipa::path(
    post,
    path = "/api/messages/privateblob",
    tag = "Messages",
    summary = "Send a file privately",
    description = "Multipart form with `file`, `tag`, `topic`, and repeated `recipients[]`.",
    params(NamespaceParams),
    responses(
        (status = 202, description = "Message accepted", body = AsyncResponse),
        (status = 400, description = "Malformed form", body = ErrorResponse),
        (status = 500, description = "Upstream failure", body = ErrorResponse),
    )
)]
pub async fn private_blob(
    State(state): State<AppState>,
    Query(params): Query<NamespaceParams>,
    multipart: Multipart,
) -> Result<impl IntoResponse, GatewayError> {
    send_blob(&state, params.ns.as_deref(), multipart, true).await
}

async fn send_blob(
    state: &AppState,
    namespace: Option<&str>,
    multipart: Multipart,
    private: bool,
) -> Result<(StatusCode, Json<AsyncResponse>), GatewayError> {
    let mut form = read_form(multipart).await?;
    let Some(content) = form.content.take() else {
        return Err(GatewayError::InvalidRequest("file is required".to_string()));
    };
    if private && form.recipients.is_empty() {
        return Err(GatewayError::InvalidRequest(
            "private messages need at least one recipient".to_string(),
        ));
    }

    let client = state.client(namespace).await;
    let data = client
        .upload_data(BlobUpload {
            file_name: form.file_name.clone(),
            content,
        })
        .await?;
    let data_id = str_at(&data, "/id")
        .ok_or_else(|| GatewayError::Upstream("upload response has no id".to_string()))?;
    tracing::debug!(%data_id, private, "blob uploaded");

    let body = blob_body(&form, &data_id, private)?;
    let sent = if private {
        client.send_private(&body).await?
    } else {
        client.send_broadcast(&body).await?
    };
    accepted(&sent)
}

/// Collects the known fields of a blob-message form. Unknown fields are
/// skipped.
async fn read_form(mut multipart: Multipart) -> Result<BlobMessageForm, GatewayError> {
    let mut form = BlobMessageForm::default();
    while let Some(field) = multipart.next_field().await.map_err(bad_form)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                form.file_name = field.file_name().map(str::to_string);
                form.content = Some(field.bytes().await.map_err(bad_form)?.to_vec());
            }
            "tag" => form.tag = Some(field.text().await.map_err(bad_form)?),
            "topic" => form.topic = Some(field.text().await.map_err(bad_form)?),
            "recipients[]" | "recipients" => {
                let recipient = field.text().await.map_err(bad_form)?;
                if !recipient.is_empty() {
                    form.recipients.push(recipient);
                }
            }
            other => tracing::debug!(field = other, "ignoring form field"),
        }
    }
    Ok(form)
}

fn bad_form(err: MultipartError) -> GatewayError {
    GatewayError::InvalidRequest(format!("malformed multipart form: {err}"))
}

fn accepted(
    sent: &serde_json::Value,
) -> Result<(StatusCode, Json<AsyncResponse>), GatewayError> {
    let response = AsyncResponse::from_upstream(MESSAGE, sent, "/header/id")?;
    Ok((StatusCode::ACCEPTED, Json(response)))
}

/// Message routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/messages/broadcast", post(broadcast))
        .route("/api/messages/private", post(private))
        .route("/api/messages/broadcastblob", post(broadcast_blob))
        .route("/api/messages/privateblob", post(private_blob))
}
