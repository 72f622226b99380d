//! REST API module.
//!
//! Contains all API routes and handlers following the frontend contract.

mod applications;
mod candidates;
mod employers;
mod jobs;
mod saved;
mod search_history;

pub use applications::*;
pub use candidates::*;
pub use employers::*;
pub use jobs::*;
pub use saved::*;
pub use search_history::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::auth::{AuthContext, Role};
use crate::errors::{ApiError, AppError};
use crate::models::Pagination;
use crate::AppState;

/// Success response envelope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse {
        success: true,
        message: None,
        data,
        status: StatusCode::OK,
    })
}

/// Create a successful response with a human-readable message.
pub fn success_message<T: Serialize>(data: T, message: &str) -> ApiResult<T> {
    Ok(ApiResponse {
        success: true,
        message: Some(message.to_string()),
        data,
        status: StatusCode::OK,
    })
}

/// Create a 201 response for newly created entities.
pub fn created<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse {
        success: true,
        message: None,
        data,
        status: StatusCode::CREATED,
    })
}

/// Create an error API response. Technical detail is gated on dev mode.
pub fn failure<T: Serialize>(state: &AppState, err: AppError) -> ApiResult<T> {
    Err(ApiError {
        error: err,
        expose_detail: state.config.dev_mode,
    })
}

/// A page of items plus the pagination block.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paged<T: Serialize> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T: Serialize> Paged<T> {
    pub fn new(items: Vec<T>, page: i64, limit: i64, total: i64) -> Self {
        Self {
            items,
            pagination: Pagination::new(page, limit, total),
        }
    }
}

/// Require the actor to hold one of the given roles. Admins pass everywhere.
pub fn require_role(ctx: &AuthContext, role: Role) -> Result<(), AppError> {
    if ctx.role == role || ctx.role == Role::Admin {
        Ok(())
    } else {
        Err(AppError::Authorization(format!(
            "This action requires the {} role",
            role.as_str()
        )))
    }
}
