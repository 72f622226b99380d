//! Bookmark API endpoints: saved jobs and saved candidates.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;

use super::{created, failure, require_role, success, success_message, ApiResult, Paged};
use crate::auth::{Identity, Role};
use crate::errors::AppError;
use crate::filters::{page_window, PageParams};
use crate::models::{JobView, SaveCandidateRequest, SavedCandidate, SavedJob};
use crate::AppState;

/// POST /api/saved-jobs/{jobId} - Bookmark a job. Candidate only.
pub async fn save_job(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Path(job_id): Path<String>,
) -> ApiResult<SavedJob> {
    if let Err(e) = require_role(&ctx, Role::Candidate) {
        return failure(&state, e);
    }

    match state.repo.save_job_for_user(&ctx.user_id, &job_id).await {
        Ok(saved) => created(saved),
        Err(e) => failure(&state, e),
    }
}

/// DELETE /api/saved-jobs/{jobId} - Remove a job bookmark.
pub async fn unsave_job(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Path(job_id): Path<String>,
) -> ApiResult<()> {
    if let Err(e) = require_role(&ctx, Role::Candidate) {
        return failure(&state, e);
    }

    match state.repo.unsave_job_for_user(&ctx.user_id, &job_id).await {
        Ok(true) => success_message((), "Job removed from saved jobs"),
        Ok(false) => failure(&state, AppError::NotFound("Job was not saved".to_string())),
        Err(e) => failure(&state, e),
    }
}

/// GET /api/saved-jobs - The user's bookmarked jobs.
pub async fn list_saved_jobs(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Query(params): Query<PageParams>,
) -> ApiResult<Paged<JobView>> {
    if let Err(e) = require_role(&ctx, Role::Candidate) {
        return failure(&state, e);
    }

    let (page, limit, _) = page_window(params.page, params.limit);
    match state.repo.list_saved_jobs(&ctx.user_id, &params).await {
        Ok((jobs, total)) => {
            let now = Utc::now();
            let views = jobs.into_iter().map(|job| JobView::new(job, now)).collect();
            success(Paged::new(views, page, limit, total))
        }
        Err(e) => failure(&state, e),
    }
}

/// GET /api/saved-jobs/{jobId}/check - Whether the job is bookmarked.
pub async fn check_saved_job(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Path(job_id): Path<String>,
) -> ApiResult<bool> {
    if let Err(e) = require_role(&ctx, Role::Candidate) {
        return failure(&state, e);
    }

    match state.repo.is_job_saved(&ctx.user_id, &job_id).await {
        Ok(saved) => success(saved),
        Err(e) => failure(&state, e),
    }
}

/// GET /api/saved-jobs/count - How many jobs the user has bookmarked.
pub async fn count_saved_jobs(
    State(state): State<AppState>,
    Identity(ctx): Identity,
) -> ApiResult<i64> {
    if let Err(e) = require_role(&ctx, Role::Candidate) {
        return failure(&state, e);
    }

    match state.repo.count_saved_jobs(&ctx.user_id).await {
        Ok(count) => success(count),
        Err(e) => failure(&state, e),
    }
}

/// POST /api/saved-candidates/{candidateId} - Bookmark a candidate. Employer only.
pub async fn save_candidate(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Path(candidate_id): Path<String>,
    Json(request): Json<SaveCandidateRequest>,
) -> ApiResult<SavedCandidate> {
    if let Err(e) = require_role(&ctx, Role::Employer) {
        return failure(&state, e);
    }

    match state
        .repo
        .save_candidate_for_employer(&ctx.user_id, &candidate_id, request.note)
        .await
    {
        Ok(saved) => created(saved),
        Err(e) => failure(&state, e),
    }
}

/// DELETE /api/saved-candidates/{candidateId} - Remove a candidate bookmark.
pub async fn unsave_candidate(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Path(candidate_id): Path<String>,
) -> ApiResult<()> {
    if let Err(e) = require_role(&ctx, Role::Employer) {
        return failure(&state, e);
    }

    match state
        .repo
        .unsave_candidate_for_employer(&ctx.user_id, &candidate_id)
        .await
    {
        Ok(true) => success_message((), "Candidate removed from saved candidates"),
        Ok(false) => failure(
            &state,
            AppError::NotFound("Candidate was not saved".to_string()),
        ),
        Err(e) => failure(&state, e),
    }
}

/// GET /api/saved-candidates - The employer's bookmarked candidates.
pub async fn list_saved_candidates(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Query(params): Query<PageParams>,
) -> ApiResult<Paged<SavedCandidate>> {
    if let Err(e) = require_role(&ctx, Role::Employer) {
        return failure(&state, e);
    }

    let (page, limit, _) = page_window(params.page, params.limit);
    match state.repo.list_saved_candidates(&ctx.user_id, &params).await {
        Ok((saved, total)) => success(Paged::new(saved, page, limit, total)),
        Err(e) => failure(&state, e),
    }
}
