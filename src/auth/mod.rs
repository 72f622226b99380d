//! PSK-based authentication module.
//!
//! Verifies the shared API credential with constant-time comparison, then resolves
//! the caller's identity headers into an [`AuthContext`] that core operations trust
//! unconditionally. No independent verification happens past this boundary.

use axum::{
    extract::{FromRequestParts, Request},
    http::{header, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use crate::errors::{codes, ErrorResponse};

/// Header name for the API key.
pub const API_KEY_HEADER: &str = "x-api-key";
/// Header carrying the acting user's id.
pub const USER_ID_HEADER: &str = "x-user-id";
/// Header carrying the acting user's role.
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Role of an authenticated actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Candidate,
    Employer,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Candidate => "candidate",
            Role::Employer => "employer",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "candidate" => Some(Role::Candidate),
            "employer" => Some(Role::Employer),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// Resolved identity of the current request's actor.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: String,
    pub role: Role,
}

/// Identity slot inserted by the auth layer. Empty on anonymous requests.
#[derive(Debug, Clone, Default)]
pub struct MaybeIdentity(pub Option<AuthContext>);

/// Extractor for endpoints that require an authenticated actor.
pub struct Identity(pub AuthContext);

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<MaybeIdentity>() {
            Some(MaybeIdentity(Some(ctx))) => Ok(Identity(ctx.clone())),
            _ => Err(unauthorized_response("Authentication required")),
        }
    }
}

/// Auth layer: checks the PSK, then resolves identity headers.
pub async fn auth_layer(expected_psk: Option<String>, mut request: Request, next: Next) -> Response {
    // If a PSK is configured, the credential must match (dev mode runs open)
    if let Some(expected) = expected_psk {
        let provided = credential_from_request(&request);
        match provided {
            Some(key) if constant_time_compare(&key, &expected) => {}
            Some(_) => return unauthorized_response("Invalid API key"),
            None => return unauthorized_response("Missing or invalid API key"),
        }
    }

    let identity = identity_from_headers(&request);
    request.extensions_mut().insert(MaybeIdentity(identity));

    next.run(request).await
}

/// Pull the API credential from `x-api-key` or an `Authorization: Bearer` header.
fn credential_from_request(request: &Request) -> Option<String> {
    let direct = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    direct.or_else(|| {
        request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "))
            .map(|s| s.to_string())
    })
}

/// Resolve the identity headers, if both are present and well-formed.
fn identity_from_headers(request: &Request) -> Option<AuthContext> {
    let user_id = request
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())?;

    let role = request
        .headers()
        .get(USER_ROLE_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(Role::parse)?;

    Some(AuthContext { user_id, role })
}

/// Perform constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Create an unauthorized response.
fn unauthorized_response(message: &str) -> Response {
    let body = ErrorResponse {
        success: false,
        code: codes::UNAUTHORIZED.to_string(),
        message: message.to_string(),
        error: None,
    };

    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}
