//! Search history: one row per (user, query), upserted on repeat searches.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Filters captured alongside a recorded search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_salary: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_salary: Option<i64>,
}

/// One recorded search. Repeating the same normalized query bumps
/// `search_count` and refreshes `last_searched_at` instead of inserting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHistoryEntry {
    pub id: String,
    pub user: String,
    pub search_query: String,
    #[serde(default)]
    pub filters: SearchFilters,
    pub results_count: i64,
    pub search_count: i64,
    pub last_searched_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Request body for recording a search.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSearchRequest {
    pub search_query: String,
    #[serde(default)]
    pub filters: Option<SearchFilters>,
    #[serde(default)]
    pub results_count: Option<i64>,
}

/// A query aggregated across users, ranked by total volume.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularSearch {
    pub query: String,
    pub total_searches: i64,
    pub unique_users: i64,
}

/// A query trending over a recent window.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingSearch {
    pub query: String,
    pub recent_searches: i64,
}
