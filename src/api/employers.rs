//! Employer profile API endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::{failure, require_role, success, success_message, ApiResult, Paged};
use crate::auth::{Identity, Role};
use crate::errors::AppError;
use crate::filters::{page_window, EmployerSearchParams};
use crate::models::{EmployerProfile, EmployerProfileUpdate};
use crate::AppState;

/// GET /api/employers/me - The employer's own profile.
pub async fn get_my_employer_profile(
    State(state): State<AppState>,
    Identity(ctx): Identity,
) -> ApiResult<EmployerProfile> {
    if let Err(e) = require_role(&ctx, Role::Employer) {
        return failure(&state, e);
    }

    match state.repo.get_employer_profile(&ctx.user_id).await {
        Ok(Some(profile)) => success(profile),
        Ok(None) => failure(
            &state,
            AppError::NotFound("Profile not created yet".to_string()),
        ),
        Err(e) => failure(&state, e),
    }
}

/// PUT /api/employers/me - Create or merge-update the employer's profile.
pub async fn update_my_employer_profile(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Json(request): Json<EmployerProfileUpdate>,
) -> ApiResult<EmployerProfile> {
    if let Err(e) = require_role(&ctx, Role::Employer) {
        return failure(&state, e);
    }

    match state
        .repo
        .upsert_employer_profile(&ctx.user_id, request)
        .await
    {
        Ok(profile) => success(profile),
        Err(e) => failure(&state, e),
    }
}

/// DELETE /api/employers/me - Drop the employer's profile.
pub async fn delete_my_employer_profile(
    State(state): State<AppState>,
    Identity(ctx): Identity,
) -> ApiResult<()> {
    if let Err(e) = require_role(&ctx, Role::Employer) {
        return failure(&state, e);
    }

    match state.repo.delete_employer_profile(&ctx.user_id).await {
        Ok(true) => success_message((), "Profile deleted"),
        Ok(false) => failure(
            &state,
            AppError::NotFound("Profile not created yet".to_string()),
        ),
        Err(e) => failure(&state, e),
    }
}

/// GET /api/employers/{id} - An employer's public profile.
pub async fn get_employer_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<EmployerProfile> {
    match state.repo.get_employer_profile(&id).await {
        Ok(Some(profile)) => success(profile),
        Ok(None) => failure(
            &state,
            AppError::NotFound(format!("Employer {} not found", id)),
        ),
        Err(e) => failure(&state, e),
    }
}

/// GET /api/employers - Search the employer directory. Public.
pub async fn search_employers(
    State(state): State<AppState>,
    Query(params): Query<EmployerSearchParams>,
) -> ApiResult<Paged<EmployerProfile>> {
    let (page, limit, _) = page_window(params.page, params.limit);
    match state.repo.search_employers(&params).await {
        Ok((profiles, total)) => success(Paged::new(profiles, page, limit, total)),
        Err(e) => failure(&state, e),
    }
}
