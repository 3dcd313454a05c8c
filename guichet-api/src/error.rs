//! Error Types for the Guichet API
//!
//! Structured error responses for the HTTP layer: an [`ErrorCode`] enum
//! categorizing the failure, an [`ApiError`] struct serialized as JSON, and
//! the Axum `IntoResponse` implementation mapping codes to HTTP statuses.
//!
//! Write-path failures keep the upstream's own HTTP status so the dashboard
//! can show it and roll back its optimistic edit; read-path failures only
//! reach the client when no cached snapshot could mask them.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Result alias for route handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Request lacks the shared dashboard credential.
    Unauthorized,
    /// Request contains invalid input data.
    InvalidInput,
    /// Required field is missing from the request.
    MissingField,
    /// The named column is computed upstream and cannot be written.
    FieldNotEditable,
    /// Table read failed with no usable snapshot to fall back on.
    UpstreamFetch,
    /// Update/restore/recovery/snapshot call was rejected or never arrived.
    UpstreamWrite,
    /// Server-side configuration is missing or invalid.
    Configuration,
    /// Internal server error.
    InternalError,
}

impl ErrorCode {
    /// Default HTTP status for this code. Write errors are usually overridden
    /// by the upstream's own status (see [`ApiError::status_code`]).
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::InvalidInput
            | ErrorCode::MissingField
            | ErrorCode::FieldNotEditable => StatusCode::BAD_REQUEST,
            ErrorCode::UpstreamWrite => StatusCode::BAD_GATEWAY,
            ErrorCode::UpstreamFetch
            | ErrorCode::Configuration
            | ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Structured error response returned by all API endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code categorizing the error.
    pub code: ErrorCode,

    /// Human-readable error message.
    pub message: String,

    /// Optional additional details (upstream status and body, field names).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,

    /// Upstream HTTP status to answer with instead of the code's default.
    #[serde(skip)]
    pub upstream_status: Option<StatusCode>,
}

impl ApiError {
    /// Create a new API error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            upstream_status: None,
        }
    }

    /// Add additional details to the error.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// The HTTP status this error answers with.
    pub fn status_code(&self) -> StatusCode {
        self.upstream_status.unwrap_or_else(|| self.code.status_code())
    }

    // ========================================================================
    // Convenience constructors
    // ========================================================================

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingField,
            format!("Required field '{}' is missing", field),
        )
    }

    pub fn field_not_editable(field: &str) -> Self {
        Self::new(
            ErrorCode::FieldNotEditable,
            format!("Column '{}' is computed and cannot be edited", field),
        )
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Configuration, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl From<guichet_core::Error> for ApiError {
    fn from(err: guichet_core::Error) -> Self {
        use guichet_core::Error;

        match err {
            Error::UpstreamFetch { status, ref body } => {
                Self::new(ErrorCode::UpstreamFetch, err.to_string())
                    .with_details(upstream_details(status, body))
            }
            Error::UpstreamWrite { status, ref body } => {
                let mut api_err = Self::new(ErrorCode::UpstreamWrite, err.to_string())
                    .with_details(upstream_details(status, body));
                api_err.upstream_status =
                    status.and_then(|code| StatusCode::from_u16(code).ok());
                api_err
            }
            Error::Configuration(message) => Self::new(ErrorCode::Configuration, message),
        }
    }
}

/// Upstream bodies are passed along verbatim; JSON bodies stay structured.
fn upstream_details(status: Option<u16>, body: &str) -> serde_json::Value {
    let body_value = serde_json::from_str::<serde_json::Value>(body)
        .unwrap_or_else(|_| serde_json::Value::String(body.to_string()));
    serde_json::json!({ "status": status, "body": body_value })
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(self)).into_response()
    }
}
