//! Shared DTO types used across multiple endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::error::GatewayError;

/// Namespace selector accepted by every endpoint as `?ns=`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct NamespaceParams {
    /// Namespace to address. Defaults to the configured namespace.
    #[serde(default)]
    pub ns: Option<String>,
}

/// Body of every `202 Accepted` response.
///
/// Identifies the asynchronous upstream operation the browser can watch
/// for on the event feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AsyncResponse {
    /// Kind of object created (e.g. `"message"`, `"token_transfer"`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Identifier of the created object.
    pub id: String,
}

impl AsyncResponse {
    /// Builds the response from the id found at `pointer` in `upstream`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Upstream`] if the upstream response lacks
    /// the identifier.
    pub fn from_upstream(kind: &str, upstream: &Value, pointer: &str) -> Result<Self, GatewayError> {
        let id = str_at(upstream, pointer).ok_or_else(|| {
            GatewayError::Upstream(format!("upstream {kind} response has no {pointer}"))
        })?;
        Ok(Self {
            kind: kind.to_string(),
            id,
        })
    }
}

/// Organization as shown in the sandbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct OrganizationDto {
    /// Organization identity id.
    pub id: Option<String>,
    /// Decentralized identifier.
    pub did: Option<String>,
    /// Registered name.
    pub name: Option<String>,
}

impl OrganizationDto {
    /// Maps an upstream organization (or `status.org`) record.
    #[must_use]
    pub fn from_upstream(org: &Value) -> Self {
        Self {
            id: str_at(org, "/id"),
            did: str_at(org, "/did"),
            name: str_at(org, "/name"),
        }
    }
}

/// Signing key bound to an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct VerifierDto {
    /// Identity the verifier belongs to.
    pub did: Option<String>,
    /// Verifier type (e.g. `"ethereum_address"`).
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Verifier value, such as a blockchain address.
    pub value: Option<String>,
}

impl VerifierDto {
    /// Maps an upstream verifier record.
    ///
    /// The upstream links verifiers to identities by id; the `did` is
    /// taken from the record when present.
    #[must_use]
    pub fn from_upstream(verifier: &Value) -> Self {
        Self {
            did: str_at(verifier, "/did").or_else(|| str_at(verifier, "/identity")),
            kind: str_at(verifier, "/type"),
            value: str_at(verifier, "/value"),
        }
    }
}

/// Query for `GET /api/common/organizations`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct OrganizationParams {
    /// Namespace to address.
    #[serde(default)]
    pub ns: Option<String>,
    /// Omit the local organization from the list.
    #[serde(default)]
    pub exclude_self: bool,
}

/// Reads a string (or number, rendered as a string) at a JSON pointer.
#[must_use]
pub fn str_at(value: &Value, pointer: &str) -> Option<String> {
    match value.pointer(pointer)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn async_response_reads_nested_id() {
        let upstream = json!({ "header": { "id": "msg1", "type": "broadcast" } });
        let Ok(resp) = AsyncResponse::from_upstream("message", &upstream, "/header/id") else {
            panic!("id present");
        };
        assert_eq!(resp.kind, "message");
        assert_eq!(resp.id, "msg1");

        let Ok(json) = serde_json::to_value(&resp) else {
            panic!("serializable");
        };
        assert_eq!(json, json!({ "type": "message", "id": "msg1" }));
    }

    #[test]
    fn async_response_requires_id() {
        let result = AsyncResponse::from_upstream("message", &json!({}), "/header/id");
        assert!(matches!(result, Err(GatewayError::Upstream(_))));
    }

    #[test]
    fn organization_mapping_ignores_extra_fields() {
        let org = OrganizationDto::from_upstream(&json!({
            "id": "o1",
            "did": "did:firefly:org/org_0",
            "name": "org_0",
            "parent": null,
            "created": "2024-01-01T00:00:00Z"
        }));
        assert_eq!(org.name.as_deref(), Some("org_0"));
        assert_eq!(org.did.as_deref(), Some("did:firefly:org/org_0"));
    }

    #[test]
    fn str_at_renders_numbers() {
        let v = json!({ "decimals": 18, "flag": true });
        assert_eq!(str_at(&v, "/decimals").as_deref(), Some("18"));
        assert_eq!(str_at(&v, "/flag"), None);
        assert_eq!(str_at(&v, "/missing"), None);
    }
}
