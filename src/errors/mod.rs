//! Error handling module for the job-board backend.
//!
//! Provides centralized error types with mapping to HTTP status codes and response envelopes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Error codes as constants to avoid stringly-typed errors.
#[allow(dead_code)]
pub mod codes {
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const FORBIDDEN: &str = "FORBIDDEN";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const CONFLICT: &str = "CONFLICT";
    pub const INVALID_TRANSITION: &str = "INVALID_TRANSITION";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
    pub const DATABASE_ERROR: &str = "DATABASE_ERROR";
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Missing or invalid credential
    Unauthorized(String),
    /// Actor lacks rights over the entity
    Authorization(String),
    /// Entity missing or soft-deleted
    NotFound(String),
    /// Missing/malformed required fields
    Validation(String),
    /// Duplicate application, duplicate save, expired-date constraint
    Conflict(String),
    /// Illegal application lifecycle transition (e.g. withdrawing a hired application)
    InvalidTransition(String),
    /// Database error
    Database(String),
    /// Internal server error
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Authorization(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InvalidTransition(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => codes::UNAUTHORIZED,
            AppError::Authorization(_) => codes::FORBIDDEN,
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::Validation(_) => codes::VALIDATION_ERROR,
            AppError::Conflict(_) => codes::CONFLICT,
            AppError::InvalidTransition(_) => codes::INVALID_TRANSITION,
            AppError::Database(_) => codes::DATABASE_ERROR,
            AppError::Internal(_) => codes::INTERNAL_ERROR,
        }
    }

    /// Message safe to show to any caller. Internal failures stay generic.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Unauthorized(msg)
            | AppError::Authorization(msg)
            | AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::Conflict(msg)
            | AppError::InvalidTransition(msg) => msg.clone(),
            AppError::Database(_) | AppError::Internal(_) => "Internal server error".to_string(),
        }
    }

    /// Technical detail, exposed only in development mode.
    pub fn detail(&self) -> Option<String> {
        match self {
            AppError::Database(msg) | AppError::Internal(msg) => Some(msg.clone()),
            _ => None,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.public_message())
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        AppError::Database(format!("Database error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON error: {:?}", err);
        AppError::Internal(format!("JSON error: {}", err))
    }
}

/// Error response envelope: `{success: false, message, error?}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: &AppError, expose_detail: bool) -> Self {
        Self {
            success: false,
            code: error.error_code().to_string(),
            message: error.public_message(),
            error: if expose_detail { error.detail() } else { None },
        }
    }
}

/// Wrapper pairing an error with the dev-mode flag that gates technical detail.
pub struct ApiError {
    pub error: AppError,
    pub expose_detail: bool,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.error.status_code();
        let body = ErrorResponse::new(&self.error, self.expose_detail);
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_detail_is_gated() {
        let err = AppError::Database("table missing".to_string());
        let hidden = ErrorResponse::new(&err, false);
        assert_eq!(hidden.message, "Internal server error");
        assert!(hidden.error.is_none());

        let shown = ErrorResponse::new(&err, true);
        assert_eq!(shown.error.as_deref(), Some("table missing"));
    }

    #[test]
    fn conflict_maps_to_409() {
        let err = AppError::Conflict("You have already applied for this job".to_string());
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.public_message(), "You have already applied for this job");
    }

    #[test]
    fn invalid_transition_maps_to_400() {
        let err = AppError::InvalidTransition("cannot withdraw".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
