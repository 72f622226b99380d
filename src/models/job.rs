//! Job posting model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::StatusCounts;

/// Lifecycle status of a posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Active,
    Expired,
    Closed,
    Draft,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Active => "Active",
            JobStatus::Expired => "Expired",
            JobStatus::Closed => "Closed",
            JobStatus::Draft => "Draft",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Active" => Some(JobStatus::Active),
            "Expired" => Some(JobStatus::Expired),
            "Closed" => Some(JobStatus::Closed),
            "Draft" => Some(JobStatus::Draft),
            _ => None,
        }
    }
}

/// Salary band attached to a posting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryRange {
    pub min: i64,
    pub max: i64,
    pub currency: String,
    pub is_negotiable: bool,
}

impl Default for SalaryRange {
    fn default() -> Self {
        Self {
            min: 0,
            max: 0,
            currency: "USD".to_string(),
            is_negotiable: false,
        }
    }
}

/// Location of a posting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobLocation {
    pub country: String,
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub is_remote: bool,
}

/// A job posting. The counters (`views`, `applications_count`, `hired_count`)
/// are derived from related entity events and never set by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub employer: String,
    pub job_title: String,
    pub job_description: String,
    pub job_type: String,
    pub salary_range: SalaryRange,
    pub location: JobLocation,
    pub experience_level: String,
    pub education_level: String,
    pub vacancies: i64,
    pub job_category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
    pub application_method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_url: Option<String>,
    pub posted_date: DateTime<Utc>,
    pub expiration_date: DateTime<Utc>,
    pub status: JobStatus,
    pub is_featured: bool,
    pub is_highlighted: bool,
    pub views: i64,
    pub applications_count: i64,
    pub hired_count: i64,
}

impl Job {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiration_date < now
    }

    pub fn days_remaining(&self, now: DateTime<Utc>) -> i64 {
        // ceiling division: a partially elapsed day still counts
        let secs = (self.expiration_date - now).num_seconds();
        ((secs + 86_399) / 86_400).max(0)
    }

    /// An Active posting past its expiration date is a detectable inconsistent
    /// state; callers correct it opportunistically on load and on save.
    pub fn needs_expiry_correction(&self, now: DateTime<Utc>) -> bool {
        self.status == JobStatus::Active && self.is_expired(now)
    }
}

/// Request body for creating a posting.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    pub job_title: String,
    pub job_description: String,
    pub job_type: String,
    #[serde(default)]
    pub min_salary: Option<i64>,
    #[serde(default)]
    pub max_salary: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub is_negotiable: Option<bool>,
    pub country: String,
    pub city: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub is_remote: Option<bool>,
    pub experience_level: String,
    pub education_level: String,
    #[serde(default)]
    pub vacancies: Option<i64>,
    pub job_category: String,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub benefits: Option<Vec<String>>,
    #[serde(default)]
    pub application_method: Option<String>,
    #[serde(default)]
    pub application_email: Option<String>,
    #[serde(default)]
    pub application_url: Option<String>,
    pub expiration_date: DateTime<Utc>,
}

/// Request body for updating a posting. Derived fields are not accepted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobRequest {
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub job_description: Option<String>,
    #[serde(default)]
    pub job_type: Option<String>,
    #[serde(default)]
    pub min_salary: Option<i64>,
    #[serde(default)]
    pub max_salary: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub is_negotiable: Option<bool>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub is_remote: Option<bool>,
    #[serde(default)]
    pub experience_level: Option<String>,
    #[serde(default)]
    pub education_level: Option<String>,
    #[serde(default)]
    pub vacancies: Option<i64>,
    #[serde(default)]
    pub job_category: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub benefits: Option<Vec<String>>,
    #[serde(default)]
    pub application_method: Option<String>,
    #[serde(default)]
    pub application_email: Option<String>,
    #[serde(default)]
    pub application_url: Option<String>,
    #[serde(default)]
    pub expiration_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<JobStatus>,
}

/// Job plus response-only derived fields.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobView {
    #[serde(flatten)]
    pub job: Job,
    pub days_remaining: i64,
    pub is_expired: bool,
}

impl JobView {
    pub fn new(job: Job, now: DateTime<Utc>) -> Self {
        let days_remaining = job.days_remaining(now);
        let is_expired = job.is_expired(now) || job.status == JobStatus::Expired;
        Self {
            job,
            days_remaining,
            is_expired,
        }
    }
}

/// Employer dashboard view: posting plus per-status application stats.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobWithStats {
    #[serde(flatten)]
    pub view: JobView,
    pub application_stats: StatusCounts,
}
