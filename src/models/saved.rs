//! Bookmarks: jobs saved by candidates, candidates saved by employers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A job bookmarked by a user. Unique per (user, job).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedJob {
    pub id: String,
    pub user: String,
    pub job: String,
    pub saved_at: DateTime<Utc>,
}

/// A candidate bookmarked by an employer. Unique per (employer, candidate).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedCandidate {
    pub id: String,
    pub employer: String,
    pub candidate: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub saved_at: DateTime<Utc>,
}

/// Request body for saving a candidate.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveCandidateRequest {
    #[serde(default)]
    pub note: Option<String>,
}
