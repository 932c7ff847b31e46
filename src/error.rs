//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] is the central error type for the gateway. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2001,
///     "message": "not found: datatype widget/1.0",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see the code ranges on [`GatewayError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status               |
/// |-----------|-----------------|---------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request           |
/// | 2000–2999 | Not Found       | 404 Not Found             |
/// | 3000–3999 | Server/Upstream | 500 Internal Server Error |
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The upstream platform does not know the named resource.
    #[error("not found: {0}")]
    NotFound(String),

    /// Calling the upstream platform failed (transport error or rejection).
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Opening an upstream event subscription failed.
    #[error("failed to open upstream subscription: {0}")]
    SubscriptionFailed(String),

    /// Configuration value missing or malformed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A WebSocket endpoint was registered twice for the same path.
    #[error("websocket path already registered: {0}")]
    DuplicateSocketPath(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::NotFound(_) => 2001,
            Self::Internal(_) => 3000,
            Self::Upstream(_) => 3001,
            Self::SubscriptionFailed(_) => 3002,
            Self::InvalidConfig(_) => 3003,
            Self::DuplicateSocketPath(_) => 3004,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream(_)
            | Self::SubscriptionFailed(_)
            | Self::InvalidConfig(_)
            | Self::DuplicateSocketPath(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        Self::Upstream(err.to_string())
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!(err = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let err = GatewayError::NotFound("contract api erc20".to_string());
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_code(), 2001);
    }

    #[test]
    fn upstream_failures_are_server_errors() {
        let err = GatewayError::Upstream("connection refused".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_code(), 3001);
    }

    #[test]
    fn response_carries_status_and_code() {
        let response = GatewayError::InvalidRequest("missing file".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn error_body_skips_empty_details() {
        let body = ErrorResponse {
            error: ErrorBody {
                code: 2001,
                message: "not found: x".to_string(),
                details: None,
            },
        };
        let Ok(json) = serde_json::to_value(&body) else {
            panic!("serialization failed");
        };
        assert_eq!(json["error"]["code"], 2001);
        assert!(json["error"].get("details").is_none());
    }
}
