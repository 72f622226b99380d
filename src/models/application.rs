//! Application model: a candidate's submission against a job posting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of an application. Closed set, validated at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Reviewed,
    Shortlisted,
    Interview,
    Hired,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Reviewed => "reviewed",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Interview => "interview",
            ApplicationStatus::Hired => "hired",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Withdrawn => "withdrawn",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ApplicationStatus::Pending),
            "reviewed" => Some(ApplicationStatus::Reviewed),
            "shortlisted" => Some(ApplicationStatus::Shortlisted),
            "interview" => Some(ApplicationStatus::Interview),
            "hired" => Some(ApplicationStatus::Hired),
            "rejected" => Some(ApplicationStatus::Rejected),
            "withdrawn" => Some(ApplicationStatus::Withdrawn),
            _ => None,
        }
    }

    /// Terminal states admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::Hired | ApplicationStatus::Rejected | ApplicationStatus::Withdrawn
        )
    }

    pub const ALL: [ApplicationStatus; 7] = [
        ApplicationStatus::Pending,
        ApplicationStatus::Reviewed,
        ApplicationStatus::Shortlisted,
        ApplicationStatus::Interview,
        ApplicationStatus::Hired,
        ApplicationStatus::Rejected,
        ApplicationStatus::Withdrawn,
    ];
}

/// One entry in the append-only status history log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusHistoryEntry {
    pub status: ApplicationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Interview type for the interview transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterviewType {
    #[serde(rename = "online")]
    Online,
    #[serde(rename = "phone")]
    Phone,
    #[serde(rename = "in-person")]
    InPerson,
}

/// Details stored alongside the interview transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewDetails {
    pub scheduled_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    #[serde(rename = "type")]
    pub interview_type: InterviewType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Free-text note attributed to an actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationNote {
    pub text: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

/// Metadata of an uploaded resume. The binary lives in external file storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeMeta {
    pub filename: String,
    pub original_name: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mimetype: Option<String>,
}

/// A candidate's application to a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: String,
    pub job: String,
    pub candidate: String,
    pub employer: String,
    pub cover_letter: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume: Option<ResumeMeta>,
    pub status: ApplicationStatus,
    pub status_history: Vec<StatusHistoryEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interview_details: Option<InterviewDetails>,
    #[serde(default)]
    pub notes: Vec<ApplicationNote>,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub viewed_by_employer: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewed_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub withdrawal_reason: Option<String>,
}

impl Application {
    pub fn days_since_applied(&self, now: DateTime<Utc>) -> i64 {
        (now - self.applied_at).num_days()
    }
}

/// Request body for submitting an application.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRequest {
    pub job_id: String,
    pub cover_letter: String,
    #[serde(default)]
    pub resume: Option<ResumeMeta>,
}

/// Request body for a status transition.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: ApplicationStatus,
    #[serde(default)]
    pub note: Option<String>,
}

/// Request body for withdrawing an application.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

/// Request body for scheduling an interview.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleInterviewRequest {
    pub scheduled_date: DateTime<Utc>,
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(rename = "type")]
    pub interview_type: InterviewType,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub meeting_link: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Request body for adding a note.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddNoteRequest {
    pub text: String,
}

/// Per-status counts used by statistics endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub pending: i64,
    pub reviewed: i64,
    pub shortlisted: i64,
    pub interview: i64,
    pub hired: i64,
    pub rejected: i64,
    pub withdrawn: i64,
}

impl StatusCounts {
    pub fn record(&mut self, status: ApplicationStatus, count: i64) {
        match status {
            ApplicationStatus::Pending => self.pending = count,
            ApplicationStatus::Reviewed => self.reviewed = count,
            ApplicationStatus::Shortlisted => self.shortlisted = count,
            ApplicationStatus::Interview => self.interview = count,
            ApplicationStatus::Hired => self.hired = count,
            ApplicationStatus::Rejected => self.rejected = count,
            ApplicationStatus::Withdrawn => self.withdrawn = count,
        }
    }

    pub fn total(&self) -> i64 {
        self.pending
            + self.reviewed
            + self.shortlisted
            + self.interview
            + self.hired
            + self.rejected
            + self.withdrawn
    }
}
