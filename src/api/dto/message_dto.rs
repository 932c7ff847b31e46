//! Message DTOs and the upstream message bodies built from them.

use serde::Deserialize;
use serde_json::{Map, Value, json};
use utoipa::ToSchema;

use crate::error::GatewayError;

/// Request body for `POST /api/messages/broadcast`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastRequest {
    /// Application tag placed in the message header.
    #[serde(default)]
    pub tag: Option<String>,
    /// Ordering topic placed in the message header.
    #[serde(default)]
    pub topic: Option<String>,
    /// Plain string payload.
    #[serde(default)]
    pub value: Option<String>,
    /// Structured JSON payload; takes precedence over `value`.
    #[serde(default)]
    pub json_value: Option<Value>,
    /// Datatype name the JSON payload is validated against.
    #[serde(default, rename = "datatypename")]
    pub datatype_name: Option<String>,
    /// Datatype version the JSON payload is validated against.
    #[serde(default, rename = "datatypeversion")]
    pub datatype_version: Option<String>,
}

/// Request body for `POST /api/messages/private`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PrivateRequest {
    /// Message content.
    #[serde(flatten)]
    pub message: BroadcastRequest,
    /// Organization names or DIDs that receive the message.
    pub recipients: Vec<String>,
}

/// Fields collected from a blob-message multipart form.
#[derive(Debug, Clone, Default)]
pub struct BlobMessageForm {
    /// Application tag.
    pub tag: Option<String>,
    /// Ordering topic.
    pub topic: Option<String>,
    /// Recipients (`recipients[]` fields), private variant only.
    pub recipients: Vec<String>,
    /// Uploaded file name.
    pub file_name: Option<String>,
    /// Uploaded file content.
    pub content: Option<Vec<u8>>,
}

/// Builds the upstream message header from an optional tag and topic.
fn header(tag: Option<&str>, topic: Option<&str>) -> Value {
    let mut header = Map::new();
    if let Some(tag) = tag.filter(|t| !t.is_empty()) {
        header.insert("tag".to_string(), json!(tag));
    }
    if let Some(topic) = topic.filter(|t| !t.is_empty()) {
        header.insert("topics".to_string(), json!([topic]));
    }
    Value::Object(header)
}

/// Builds the single inline data entry of a message.
fn inline_data(req: &BroadcastRequest) -> Result<Value, GatewayError> {
    if let Some(json_value) = &req.json_value {
        let mut data = json!({ "value": json_value, "validator": "json" });
        if let (Some(name), Some(fields)) = (&req.datatype_name, data.as_object_mut()) {
            fields.insert(
                "datatype".to_string(),
                json!({ "name": name, "version": req.datatype_version }),
            );
        }
        return Ok(data);
    }
    match &req.value {
        Some(value) => Ok(json!({ "value": value })),
        None => Err(GatewayError::InvalidRequest(
            "either value or jsonValue is required".to_string(),
        )),
    }
}

/// Adds the recipient group to a message body.
fn with_recipients(mut body: Value, recipients: &[String]) -> Result<Value, GatewayError> {
    if recipients.is_empty() {
        return Err(GatewayError::InvalidRequest(
            "private messages need at least one recipient".to_string(),
        ));
    }
    let members: Vec<Value> = recipients
        .iter()
        .map(|identity| json!({ "identity": identity }))
        .collect();
    if let Some(fields) = body.as_object_mut() {
        fields.insert("group".to_string(), json!({ "members": members }));
    }
    Ok(body)
}

/// Upstream body for an inline broadcast.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] if no payload was supplied.
pub fn broadcast_body(req: &BroadcastRequest) -> Result<Value, GatewayError> {
    Ok(json!({
        "header": header(req.tag.as_deref(), req.topic.as_deref()),
        "data": [inline_data(req)?],
    }))
}

/// Upstream body for an inline private message.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] if no payload or no recipient
/// was supplied.
pub fn private_body(req: &PrivateRequest) -> Result<Value, GatewayError> {
    with_recipients(broadcast_body(&req.message)?, &req.recipients)
}

/// Upstream body referencing an uploaded data record.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] if `private` is set and the
/// form lists no recipients.
pub fn blob_body(form: &BlobMessageForm, data_id: &str, private: bool) -> Result<Value, GatewayError> {
    let body = json!({
        "header": header(form.tag.as_deref(), form.topic.as_deref()),
        "data": [{ "id": data_id }],
    });
    if private {
        with_recipients(body, &form.recipients)
    } else {
        Ok(body)
    }
}
