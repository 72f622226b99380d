//! Application API endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::{created, failure, require_role, success, success_message, ApiResult, Paged};
use crate::auth::{Identity, Role};
use crate::errors::AppError;
use crate::filters::{page_window, ApplicationListParams};
use crate::models::{
    AddNoteRequest, Application, ApplyRequest, ScheduleInterviewRequest, StatusCounts,
    UpdateStatusRequest, WithdrawRequest,
};
use crate::AppState;

/// POST /api/applications - Submit an application. Candidate only.
pub async fn apply(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Json(request): Json<ApplyRequest>,
) -> ApiResult<Application> {
    if let Err(e) = require_role(&ctx, Role::Candidate) {
        return failure(&state, e);
    }

    match state.repo.apply(&ctx.user_id, &request).await {
        Ok(application) => created(application),
        Err(e) => failure(&state, e),
    }
}

/// GET /api/applications/{id} - Get one application. Participants only.
pub async fn get_application(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Path(id): Path<String>,
) -> ApiResult<Application> {
    match state.repo.get_application(&id).await {
        Ok(Some(application)) => {
            let is_participant =
                application.candidate == ctx.user_id || application.employer == ctx.user_id;
            if !is_participant && ctx.role != Role::Admin {
                return failure(
                    &state,
                    AppError::Authorization(
                        "You are not a participant in this application".to_string(),
                    ),
                );
            }
            // employer opening the application counts as the first view
            if application.employer == ctx.user_id && !application.viewed_by_employer {
                match state.repo.mark_application_viewed(&id, &ctx.user_id).await {
                    Ok(viewed) => return success(viewed),
                    Err(e) => return failure(&state, e),
                }
            }
            success(application)
        }
        Ok(None) => failure(
            &state,
            AppError::NotFound(format!("Application {} not found", id)),
        ),
        Err(e) => failure(&state, e),
    }
}

/// GET /api/applications/mine - The candidate's own applications.
pub async fn list_my_applications(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Query(params): Query<ApplicationListParams>,
) -> ApiResult<Paged<Application>> {
    if let Err(e) = require_role(&ctx, Role::Candidate) {
        return failure(&state, e);
    }

    let (page, limit, _) = page_window(params.page, params.limit);
    match state
        .repo
        .list_candidate_applications(&ctx.user_id, &params)
        .await
    {
        Ok((applications, total)) => success(Paged::new(applications, page, limit, total)),
        Err(e) => failure(&state, e),
    }
}

/// GET /api/jobs/{id}/applications - Applications for one posting. Owner only.
pub async fn list_job_applications(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Path(id): Path<String>,
    Query(params): Query<ApplicationListParams>,
) -> ApiResult<Paged<Application>> {
    if let Err(e) = require_role(&ctx, Role::Employer) {
        return failure(&state, e);
    }

    let (page, limit, _) = page_window(params.page, params.limit);
    match state
        .repo
        .list_job_applications(&id, &ctx.user_id, &params)
        .await
    {
        Ok((applications, total)) => success(Paged::new(applications, page, limit, total)),
        Err(e) => failure(&state, e),
    }
}

/// PUT /api/applications/{id}/status - Transition the status. Employer only.
pub async fn update_application_status(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Path(id): Path<String>,
    Json(request): Json<UpdateStatusRequest>,
) -> ApiResult<Application> {
    if let Err(e) = require_role(&ctx, Role::Employer) {
        return failure(&state, e);
    }

    match state
        .repo
        .update_application_status(&id, &ctx.user_id, &request)
        .await
    {
        Ok(application) => success(application),
        Err(e) => failure(&state, e),
    }
}

/// POST /api/applications/{id}/interview - Schedule an interview. Employer only.
pub async fn schedule_interview(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Path(id): Path<String>,
    Json(request): Json<ScheduleInterviewRequest>,
) -> ApiResult<Application> {
    if let Err(e) = require_role(&ctx, Role::Employer) {
        return failure(&state, e);
    }

    match state
        .repo
        .schedule_interview(&id, &ctx.user_id, request)
        .await
    {
        Ok(application) => success(application),
        Err(e) => failure(&state, e),
    }
}

/// POST /api/applications/{id}/withdraw - Withdraw. Owning candidate only.
pub async fn withdraw_application(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Path(id): Path<String>,
    Json(request): Json<WithdrawRequest>,
) -> ApiResult<Application> {
    if let Err(e) = require_role(&ctx, Role::Candidate) {
        return failure(&state, e);
    }

    match state
        .repo
        .withdraw_application(&id, &ctx.user_id, request.reason)
        .await
    {
        Ok(application) => success_message(application, "Application withdrawn"),
        Err(e) => failure(&state, e),
    }
}

/// POST /api/applications/{id}/notes - Attach a note. Employer only.
pub async fn add_application_note(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Path(id): Path<String>,
    Json(request): Json<AddNoteRequest>,
) -> ApiResult<Application> {
    if let Err(e) = require_role(&ctx, Role::Employer) {
        return failure(&state, e);
    }

    match state
        .repo
        .add_application_note(&id, &ctx.user_id, &request)
        .await
    {
        Ok(application) => success(application),
        Err(e) => failure(&state, e),
    }
}

/// GET /api/applications/stats - Per-status counts across the employer's postings.
pub async fn employer_application_stats(
    State(state): State<AppState>,
    Identity(ctx): Identity,
) -> ApiResult<StatusCounts> {
    if let Err(e) = require_role(&ctx, Role::Employer) {
        return failure(&state, e);
    }

    match state.repo.employer_application_stats(&ctx.user_id).await {
        Ok(stats) => success(stats),
        Err(e) => failure(&state, e),
    }
}
