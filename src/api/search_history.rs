//! Search history API endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use super::{created, failure, success, success_message, ApiResult};
use crate::auth::Identity;
use crate::errors::AppError;
use crate::models::{PopularSearch, SaveSearchRequest, SearchHistoryEntry, TrendingSearch};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
    #[serde(default)]
    pub limit: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TrendingParams {
    #[serde(default)]
    pub days: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SuggestionParams {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
}

/// POST /api/search-history - Record a search (upsert per query).
pub async fn record_search(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Json(request): Json<SaveSearchRequest>,
) -> ApiResult<SearchHistoryEntry> {
    match state.repo.record_search(&ctx.user_id, &request).await {
        Ok(entry) => created(entry),
        Err(e) => failure(&state, e),
    }
}

/// GET /api/search-history - The user's recent searches.
pub async fn list_search_history(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Query(params): Query<HistoryParams>,
) -> ApiResult<Vec<SearchHistoryEntry>> {
    match state
        .repo
        .list_search_history(&ctx.user_id, params.limit.unwrap_or(10))
        .await
    {
        Ok(entries) => success(entries),
        Err(e) => failure(&state, e),
    }
}

/// DELETE /api/search-history/{id} - Delete one entry.
pub async fn delete_search_entry(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    Path(id): Path<String>,
) -> ApiResult<()> {
    match state.repo.delete_search_entry(&ctx.user_id, &id).await {
        Ok(true) => success_message((), "Search entry deleted"),
        Ok(false) => failure(
            &state,
            AppError::NotFound(format!("Search entry {} not found", id)),
        ),
        Err(e) => failure(&state, e),
    }
}

/// DELETE /api/search-history - Clear the user's whole history.
pub async fn clear_search_history(
    State(state): State<AppState>,
    Identity(ctx): Identity,
) -> ApiResult<u64> {
    match state.repo.clear_search_history(&ctx.user_id).await {
        Ok(removed) => success_message(removed, "Search history cleared"),
        Err(e) => failure(&state, e),
    }
}

/// GET /api/search-history/popular - Most-searched queries. Public.
pub async fn popular_searches(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> ApiResult<Vec<PopularSearch>> {
    match state.repo.popular_searches(params.limit.unwrap_or(10)).await {
        Ok(entries) => success(entries),
        Err(e) => failure(&state, e),
    }
}

/// GET /api/search-history/trending - Queries busy over a recent window. Public.
pub async fn trending_searches(
    State(state): State<AppState>,
    Query(params): Query<TrendingParams>,
) -> ApiResult<Vec<TrendingSearch>> {
    match state
        .repo
        .trending_searches(params.days.unwrap_or(7), params.limit.unwrap_or(10))
        .await
    {
        Ok(entries) => success(entries),
        Err(e) => failure(&state, e),
    }
}

/// GET /api/search-history/suggestions - Prefix suggestions. Public.
pub async fn search_suggestions(
    State(state): State<AppState>,
    Query(params): Query<SuggestionParams>,
) -> ApiResult<Vec<String>> {
    let prefix = params.q.unwrap_or_default();
    match state
        .repo
        .search_suggestions(&prefix, params.limit.unwrap_or(10))
        .await
    {
        Ok(suggestions) => success(suggestions),
        Err(e) => failure(&state, e),
    }
}
