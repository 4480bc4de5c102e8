use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

use a11y_contracts::error::AuditError;

pub type ApiResult<T> = Result<T, ApiError>;

/// Message sent with every 500 from the audit endpoint.
pub const AUDIT_FAILED: &str = "Failed to run audit";

/// An error response: `{message}` or `{message, error}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub error: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            error: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
        }
    }

    /// The 500 returned when an audit ends `failed` or cannot be persisted.
    pub fn audit_failed(error: impl Into<String>) -> Self {
        Self::internal(AUDIT_FAILED, error)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error {
            Some(error) => write!(f, "{}: {}", self.message, error),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.error {
            Some(error) => json!({ "message": self.message, "error": error }),
            None => json!({ "message": self.message }),
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<AuditError> for ApiError {
    fn from(err: AuditError) -> Self {
        match err {
            AuditError::InvalidInput { reason } => Self::bad_request(reason),
            AuditError::NotFound { .. } => Self::not_found(err.to_string()),
            _ => Self::internal("Internal server error", err.to_string()),
        }
    }
}
