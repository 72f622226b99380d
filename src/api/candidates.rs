//! Candidate profile API endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::{failure, require_role, success, success_message, ApiResult, Paged};
use crate::auth::{Identity, Role};
use crate::errors::AppError;
use crate::filters::{page_window, CandidateSearchParams};
use crate::models::{CandidateProfile, CandidateProfileUpdate};
use crate::AppState;

/// GET /api/candidates/me - The candidate's own profile.
pub async fn get_my_candidate_profile(
    State(state): State<AppState>,
    Identity(ctx): Identity,
) -> ApiResult<CandidateProfile> {
    if let Err(e) = require_role(&ctx, Role::Candidate) {
        return failure(&state, e);
    }

    match state.repo.get_candidate_profile(&ctx.user_id).await {
        Ok(Some(profile)) => success(profile),
        Ok(None) => failure(
            &state,
            AppError::NotFound("Profile not created yet".to_string()),
        ),
        Err(e) => failure(&state, e),
    }
}

/// PUT /api/candidates/me - Create or merge-update the candidate's profile.
pub async fn update_my_candidate_profile(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Json(request): Json<CandidateProfileUpdate>,
) -> ApiResult<CandidateProfile> {
    if let Err(e) = require_role(&ctx, Role::Candidate) {
        return failure(&state, e);
    }

    match state
        .repo
        .upsert_candidate_profile(&ctx.user_id, request)
        .await
    {
        Ok(profile) => success(profile),
        Err(e) => failure(&state, e),
    }
}

/// DELETE /api/candidates/me - Drop the candidate's profile.
pub async fn delete_my_candidate_profile(
    State(state): State<AppState>,
    Identity(ctx): Identity,
) -> ApiResult<()> {
    if let Err(e) = require_role(&ctx, Role::Candidate) {
        return failure(&state, e);
    }

    match state.repo.delete_candidate_profile(&ctx.user_id).await {
        Ok(true) => success_message((), "Profile deleted"),
        Ok(false) => failure(
            &state,
            AppError::NotFound("Profile not created yet".to_string()),
        ),
        Err(e) => failure(&state, e),
    }
}

/// GET /api/candidates/{id} - A candidate's public profile. Employer-facing.
pub async fn get_candidate_profile(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Path(id): Path<String>,
) -> ApiResult<CandidateProfile> {
    if let Err(e) = require_role(&ctx, Role::Employer) {
        return failure(&state, e);
    }

    match state.repo.get_candidate_profile(&id).await {
        Ok(Some(profile)) => {
            if !profile.account_settings.privacy.profile_public && ctx.role != Role::Admin {
                return failure(
                    &state,
                    AppError::NotFound(format!("Candidate {} not found", id)),
                );
            }
            success(profile)
        }
        Ok(None) => failure(
            &state,
            AppError::NotFound(format!("Candidate {} not found", id)),
        ),
        Err(e) => failure(&state, e),
    }
}

/// GET /api/candidates - Search the candidate directory. Employer-facing.
pub async fn search_candidates(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Query(params): Query<CandidateSearchParams>,
) -> ApiResult<Paged<CandidateProfile>> {
    if let Err(e) = require_role(&ctx, Role::Employer) {
        return failure(&state, e);
    }

    let (page, limit, _) = page_window(params.page, params.limit);
    match state.repo.search_candidates(&params).await {
        Ok((profiles, total)) => success(Paged::new(profiles, page, limit, total)),
        Err(e) => failure(&state, e),
    }
}
