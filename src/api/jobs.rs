//! Job posting API endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;

use super::{created, failure, require_role, success, success_message, ApiResult, Paged};
use crate::auth::{Identity, Role};
use crate::errors::AppError;
use crate::filters::{page_window, JobSearchParams, PageParams};
use crate::models::{CreateJobRequest, JobView, JobWithStats, StatusCounts, UpdateJobRequest};
use crate::AppState;

/// GET /api/jobs - Search live postings. Public.
pub async fn search_jobs(
    State(state): State<AppState>,
    Query(params): Query<JobSearchParams>,
) -> ApiResult<Paged<JobView>> {
    let (page, limit, _) = page_window(params.page, params.limit);
    match state.repo.search_jobs(&params).await {
        Ok((jobs, total)) => {
            let now = Utc::now();
            let views = jobs.into_iter().map(|job| JobView::new(job, now)).collect();
            success(Paged::new(views, page, limit, total))
        }
        Err(e) => failure(&state, e),
    }
}

/// GET /api/jobs/{id} - Get one posting. Public; counts a view.
pub async fn get_job(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<JobView> {
    match state.repo.view_job(&id).await {
        Ok(Some(job)) => success(JobView::new(job, Utc::now())),
        Ok(None) => failure(&state, AppError::NotFound(format!("Job {} not found", id))),
        Err(e) => failure(&state, e),
    }
}

/// POST /api/jobs - Create a posting. Employer only.
pub async fn create_job(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Json(request): Json<CreateJobRequest>,
) -> ApiResult<JobView> {
    if let Err(e) = require_role(&ctx, Role::Employer) {
        return failure(&state, e);
    }

    match state.repo.create_job(&ctx.user_id, &request).await {
        Ok(job) => created(JobView::new(job, Utc::now())),
        Err(e) => failure(&state, e),
    }
}

/// PUT /api/jobs/{id} - Update a posting. Owning employer only.
pub async fn update_job(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Path(id): Path<String>,
    Json(request): Json<UpdateJobRequest>,
) -> ApiResult<JobView> {
    if let Err(e) = require_role(&ctx, Role::Employer) {
        return failure(&state, e);
    }

    match state.repo.update_job(&id, &ctx.user_id, &request).await {
        Ok(job) => success(JobView::new(job, Utc::now())),
        Err(e) => failure(&state, e),
    }
}

/// DELETE /api/jobs/{id} - Remove a posting (transitions it to Closed).
pub async fn delete_job(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Path(id): Path<String>,
) -> ApiResult<JobView> {
    if let Err(e) = require_role(&ctx, Role::Employer) {
        return failure(&state, e);
    }

    match state.repo.delete_job(&id, &ctx.user_id).await {
        Ok(job) => success_message(JobView::new(job, Utc::now()), "Job closed"),
        Err(e) => failure(&state, e),
    }
}

/// GET /api/jobs/mine - The employer's own postings with per-status stats.
pub async fn list_my_jobs(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Query(params): Query<PageParams>,
) -> ApiResult<Paged<JobWithStats>> {
    if let Err(e) = require_role(&ctx, Role::Employer) {
        return failure(&state, e);
    }

    let (page, limit, _) = page_window(params.page, params.limit);
    match state.repo.list_employer_jobs(&ctx.user_id, &params).await {
        Ok((jobs, total)) => {
            let now = Utc::now();
            let items = jobs
                .into_iter()
                .map(|(job, stats)| JobWithStats {
                    view: JobView::new(job, now),
                    application_stats: stats,
                })
                .collect();
            success(Paged::new(items, page, limit, total))
        }
        Err(e) => failure(&state, e),
    }
}

/// GET /api/jobs/{id}/stats - Per-status application counts for one posting.
pub async fn job_stats(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Path(id): Path<String>,
) -> ApiResult<StatusCounts> {
    if let Err(e) = require_role(&ctx, Role::Employer) {
        return failure(&state, e);
    }

    let job = match state.repo.get_job(&id).await {
        Ok(Some(job)) => job,
        Ok(None) => return failure(&state, AppError::NotFound(format!("Job {} not found", id))),
        Err(e) => return failure(&state, e),
    };
    if job.employer != ctx.user_id && ctx.role != Role::Admin {
        return failure(
            &state,
            AppError::Authorization("You do not own this job posting".to_string()),
        );
    }

    match state.repo.job_application_stats(&id).await {
        Ok(stats) => success(stats),
        Err(e) => failure(&state, e),
    }
}

/// POST /api/jobs/{id}/recount - Reconcile the applications counter.
pub async fn recount_job_applications(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Path(id): Path<String>,
) -> ApiResult<i64> {
    if let Err(e) = require_role(&ctx, Role::Employer) {
        return failure(&state, e);
    }

    let job = match state.repo.get_job(&id).await {
        Ok(Some(job)) => job,
        Ok(None) => return failure(&state, AppError::NotFound(format!("Job {} not found", id))),
        Err(e) => return failure(&state, e),
    };
    if job.employer != ctx.user_id && ctx.role != Role::Admin {
        return failure(
            &state,
            AppError::Authorization("You do not own this job posting".to_string()),
        );
    }

    match state.repo.recount_applications(&id).await {
        Ok(count) => success(count),
        Err(e) => failure(&state, e),
    }
}

/// POST /api/jobs/expire-stale - Sweep Active postings past their deadline.
pub async fn expire_stale_jobs(
    State(state): State<AppState>,
    Identity(ctx): Identity,
) -> ApiResult<u64> {
    if ctx.role != Role::Admin {
        return failure(
            &state,
            AppError::Authorization("This action requires the admin role".to_string()),
        );
    }

    match state.repo.correct_expired_jobs().await {
        Ok(corrected) => success_message(corrected, "Stale postings expired"),
        Err(e) => failure(&state, e),
    }
}
