//! Datatype DTOs.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::ToSchema;

use super::common_dto::str_at;
use crate::error::GatewayError;

/// Request body for `POST /api/datatypes`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateDatatypeRequest {
    /// Datatype name.
    pub name: String,
    /// Datatype version.
    pub version: String,
    /// JSON Schema the datatype enforces.
    pub schema: Value,
}

impl CreateDatatypeRequest {
    /// Upstream body for datatype creation.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] if name or version is blank
    /// or the schema is not a JSON object.
    pub fn to_upstream(&self) -> Result<Value, GatewayError> {
        if self.name.trim().is_empty() || self.version.trim().is_empty() {
            return Err(GatewayError::InvalidRequest(
                "datatype name and version are required".to_string(),
            ));
        }
        if !self.schema.is_object() {
            return Err(GatewayError::InvalidRequest(
                "datatype schema must be a JSON object".to_string(),
            ));
        }
        Ok(json!({
            "name": self.name,
            "version": self.version,
            "value": self.schema,
        }))
    }
}

/// Datatype as shown in the sandbox.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DatatypeDto {
    /// Datatype id.
    pub id: Option<String>,
    /// Datatype name.
    pub name: Option<String>,
    /// Datatype version.
    pub version: Option<String>,
    /// JSON Schema enforced by the datatype.
    pub schema: Value,
}

impl DatatypeDto {
    /// Maps an upstream datatype record.
    #[must_use]
    pub fn from_upstream(datatype: &Value) -> Self {
        Self {
            id: str_at(datatype, "/id"),
            name: str_at(datatype, "/name"),
            version: str_at(datatype, "/version"),
            schema: datatype.get("value").cloned().unwrap_or(Value::Null),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_moves_to_value() {
        let req = CreateDatatypeRequest {
            name: "widget".to_string(),
            version: "1.0".to_string(),
            schema: json!({ "type": "object" }),
        };
        assert_eq!(
            req.to_upstream().ok(),
            Some(json!({ "name": "widget", "version": "1.0", "value": { "type": "object" } }))
        );
    }

    #[test]
    fn non_object_schema_is_rejected() {
        let req = CreateDatatypeRequest {
            name: "widget".to_string(),
            version: "1.0".to_string(),
            schema: json!("string"),
        };
        assert!(matches!(req.to_upstream(), Err(GatewayError::InvalidRequest(_))));
    }

    #[test]
    fn mapping_exposes_value_as_schema() {
        let dto = DatatypeDto::from_upstream(&json!({
            "id": "d1",
            "name": "widget",
            "version": "1.0",
            "value": { "type": "object" }
        }));
        assert_eq!(dto.schema, json!({ "type": "object" }));
    }
}
