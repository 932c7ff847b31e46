//! Contract interface, API, and listener DTOs.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::ToSchema;

use super::common_dto::str_at;
use crate::error::GatewayError;

/// Format of a submitted contract interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum InterfaceFormat {
    /// Platform-native interface document, published as-is.
    Ffi,
    /// Ethereum ABI, converted upstream before publishing.
    Abi,
}

/// Request body for `POST /api/contracts/interface`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateInterfaceRequest {
    /// Interface document format.
    pub format: InterfaceFormat,
    /// Interface name (required for `abi`).
    #[serde(default)]
    pub name: Option<String>,
    /// Interface version (required for `abi`).
    #[serde(default)]
    pub version: Option<String>,
    /// The interface document or ABI.
    pub schema: Value,
}

impl CreateInterfaceRequest {
    /// Upstream body for the ABI-to-interface generator.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] if name or version is
    /// missing.
    pub fn generate_body(&self) -> Result<Value, GatewayError> {
        let (Some(name), Some(version)) = (
            self.name.as_deref().filter(|n| !n.is_empty()),
            self.version.as_deref().filter(|v| !v.is_empty()),
        ) else {
            return Err(GatewayError::InvalidRequest(
                "name and version are required for abi interfaces".to_string(),
            ));
        };
        Ok(json!({
            "name": name,
            "version": version,
            "input": { "abi": self.schema },
        }))
    }
}

/// Contract interface summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct InterfaceDto {
    /// Interface id.
    pub id: Option<String>,
    /// Interface name.
    pub name: Option<String>,
    /// Interface version.
    pub version: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
}

impl InterfaceDto {
    /// Maps an upstream interface record.
    #[must_use]
    pub fn from_upstream(ffi: &Value) -> Self {
        Self {
            id: str_at(ffi, "/id"),
            name: str_at(ffi, "/name"),
            version: str_at(ffi, "/version"),
            description: str_at(ffi, "/description"),
        }
    }
}

/// Request body for `POST /api/contracts/api`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateApiRequest {
    /// API name, used in its REST path upstream.
    pub name: String,
    /// Name of the interface the API exposes.
    pub interface_name: String,
    /// Version of the interface the API exposes.
    pub interface_version: String,
    /// On-chain address of the deployed contract.
    #[serde(default)]
    pub address: Option<String>,
}

impl CreateApiRequest {
    /// Upstream body for API creation.
    #[must_use]
    pub fn to_upstream(&self) -> Value {
        let mut body = json!({
            "name": self.name,
            "interface": {
                "name": self.interface_name,
                "version": self.interface_version,
            },
        });
        if let (Some(address), Some(fields)) = (&self.address, body.as_object_mut()) {
            fields.insert("location".to_string(), json!({ "address": address }));
        }
        body
    }
}

/// Contract API summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiDto {
    /// API id.
    pub id: Option<String>,
    /// API name.
    pub name: Option<String>,
    /// Id of the interface the API exposes.
    pub interface_id: Option<String>,
    /// Contract address.
    pub address: Option<String>,
    /// Generated OpenAPI document URL.
    pub openapi_url: Option<String>,
    /// Generated Swagger UI URL.
    pub ui_url: Option<String>,
}

impl ApiDto {
    /// Maps an upstream contract API record.
    #[must_use]
    pub fn from_upstream(api: &Value) -> Self {
        Self {
            id: str_at(api, "/id"),
            name: str_at(api, "/name"),
            interface_id: str_at(api, "/interface/id"),
            address: str_at(api, "/location/address"),
            openapi_url: str_at(api, "/urls/openapi"),
            ui_url: str_at(api, "/urls/ui"),
        }
    }
}

/// Request body for `POST /api/contracts/listener`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateListenerRequest {
    /// Contract API the event belongs to.
    pub api_name: String,
    /// Event path within the API (the event name).
    pub event_path: String,
    /// Topic assigned to emitted blockchain events.
    #[serde(default)]
    pub topic: Option<String>,
    /// Optional listener name.
    #[serde(default)]
    pub name: Option<String>,
}

impl CreateListenerRequest {
    /// Upstream body for listener creation.
    #[must_use]
    pub fn to_upstream(&self) -> Value {
        let mut body = json!({});
        if let Some(fields) = body.as_object_mut() {
            if let Some(topic) = &self.topic {
                fields.insert("topic".to_string(), json!(topic));
            }
            if let Some(name) = &self.name {
                fields.insert("name".to_string(), json!(name));
            }
        }
        body
    }
}

/// Contract event listener summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListenerDto {
    /// Listener id.
    pub id: Option<String>,
    /// Listener name.
    pub name: Option<String>,
    /// Topic of emitted events.
    pub topic: Option<String>,
    /// Contract address listened to.
    pub address: Option<String>,
    /// Name of the listened-to event.
    pub event_name: Option<String>,
}

impl ListenerDto {
    /// Maps an upstream listener record.
    #[must_use]
    pub fn from_upstream(listener: &Value) -> Self {
        Self {
            id: str_at(listener, "/id"),
            name: str_at(listener, "/name"),
            topic: str_at(listener, "/topic"),
            address: str_at(listener, "/location/address"),
            event_name: str_at(listener, "/event/name"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn abi_generation_requires_name_and_version() {
        let req = CreateInterfaceRequest {
            format: InterfaceFormat::Abi,
            name: Some("erc20".to_string()),
            version: None,
            schema: json!([]),
        };
        assert!(matches!(req.generate_body(), Err(GatewayError::InvalidRequest(_))));
    }

    #[test]
    fn abi_generation_wraps_schema() {
        let req = CreateInterfaceRequest {
            format: InterfaceFormat::Abi,
            name: Some("erc20".to_string()),
            version: Some("1.0".to_string()),
            schema: json!([{ "type": "function", "name": "transfer" }]),
        };
        let Ok(body) = req.generate_body() else {
            panic!("valid body");
        };
        assert_eq!(body["input"]["abi"][0]["name"], "transfer");
        assert_eq!(body["version"], "1.0");
    }

    #[test]
    fn api_body_nests_interface_and_location() {
        let req = CreateApiRequest {
            name: "token".to_string(),
            interface_name: "erc20".to_string(),
            interface_version: "1.0".to_string(),
            address: Some("0xabc".to_string()),
        };
        assert_eq!(
            req.to_upstream(),
            json!({
                "name": "token",
                "interface": { "name": "erc20", "version": "1.0" },
                "location": { "address": "0xabc" }
            })
        );
    }

    #[test]
    fn listener_mapping_flattens_nested_fields() {
        let dto = ListenerDto::from_upstream(&json!({
            "id": "l1",
            "name": "sb-transfer",
            "topic": "transfers",
            "location": { "address": "0xabc" },
            "event": { "name": "Transfer", "params": [] }
        }));
        assert_eq!(dto.address.as_deref(), Some("0xabc"));
        assert_eq!(dto.event_name.as_deref(), Some("Transfer"));
    }

    #[test]
    fn format_deserializes_lowercase() {
        let Ok(format) = serde_json::from_value::<InterfaceFormat>(json!("abi")) else {
            panic!("valid format");
        };
        assert_eq!(format, InterfaceFormat::Abi);
    }
}
