//! Application lifecycle: status transitions and their side effects.
//!
//! Pure operations over an [`Application`] document. Each mutation returns the
//! counter adjustments the caller must apply to the owning job, so document
//! and counters change together or not at all.

use chrono::{DateTime, Utc};

use crate::errors::AppError;
use crate::models::{
    Application, ApplicationNote, ApplicationStatus, InterviewDetails, ResumeMeta,
    ScheduleInterviewRequest, StatusHistoryEntry,
};

/// Counter adjustment the owning job must absorb after a lifecycle operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterEffect {
    IncrementApplications,
    DecrementApplications,
    IncrementHired,
}

/// Build a fresh application in the `pending` state with one seed history entry.
pub fn submit(
    id: String,
    job: String,
    candidate: String,
    employer: String,
    cover_letter: String,
    resume: Option<ResumeMeta>,
    now: DateTime<Utc>,
) -> (Application, CounterEffect) {
    let application = Application {
        id,
        job,
        candidate,
        employer,
        cover_letter,
        resume,
        status: ApplicationStatus::Pending,
        status_history: vec![StatusHistoryEntry {
            status: ApplicationStatus::Pending,
            note: Some("Application submitted".to_string()),
            updated_by: None,
            updated_at: now,
        }],
        interview_details: None,
        notes: Vec::new(),
        applied_at: now,
        updated_at: now,
        viewed_by_employer: false,
        viewed_at: None,
        is_deleted: false,
        deleted_at: None,
        withdrawal_reason: None,
    };
    (application, CounterEffect::IncrementApplications)
}

/// Record a status transition initiated by the employer.
///
/// Appends exactly one history entry per call. Transitions are not
/// deduplicated: setting `hired` twice appends twice and increments the
/// hired counter twice.
pub fn record_transition(
    application: &mut Application,
    status: ApplicationStatus,
    note: Option<String>,
    updated_by: Option<String>,
    now: DateTime<Utc>,
) -> Result<Option<CounterEffect>, AppError> {
    if application.is_deleted {
        return Err(AppError::NotFound("Application not found".to_string()));
    }

    application.status = status;
    application.status_history.push(StatusHistoryEntry {
        status,
        note,
        updated_by,
        updated_at: now,
    });
    application.updated_at = now;

    let effect = match status {
        ApplicationStatus::Hired => Some(CounterEffect::IncrementHired),
        _ => None,
    };
    Ok(effect)
}

/// Schedule an interview: stores the details and transitions to `interview`.
pub fn schedule_interview(
    application: &mut Application,
    request: ScheduleInterviewRequest,
    updated_by: Option<String>,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    if application.is_deleted {
        return Err(AppError::NotFound("Application not found".to_string()));
    }

    application.interview_details = Some(InterviewDetails {
        scheduled_date: request.scheduled_date,
        duration: request.duration,
        interview_type: request.interview_type,
        location: request.location,
        meeting_link: request.meeting_link,
        notes: request.notes,
    });
    application.status = ApplicationStatus::Interview;
    application.status_history.push(StatusHistoryEntry {
        status: ApplicationStatus::Interview,
        note: Some("Interview scheduled".to_string()),
        updated_by,
        updated_at: now,
    });
    application.updated_at = now;
    Ok(())
}

/// Withdraw an application. Blocked once the employer has decided.
///
/// Soft-deletes the document and tells the caller to decrement the job's
/// applications counter.
pub fn withdraw(
    application: &mut Application,
    reason: Option<String>,
    now: DateTime<Utc>,
) -> Result<CounterEffect, AppError> {
    if application.is_deleted {
        return Err(AppError::NotFound("Application not found".to_string()));
    }
    if matches!(
        application.status,
        ApplicationStatus::Hired | ApplicationStatus::Rejected
    ) {
        return Err(AppError::InvalidTransition(format!(
            "Cannot withdraw an application that has been {}",
            application.status.as_str()
        )));
    }

    application.status = ApplicationStatus::Withdrawn;
    application.status_history.push(StatusHistoryEntry {
        status: ApplicationStatus::Withdrawn,
        note: reason.clone(),
        updated_by: Some(application.candidate.clone()),
        updated_at: now,
    });
    application.withdrawal_reason = reason;
    application.is_deleted = true;
    application.deleted_at = Some(now);
    application.updated_at = now;
    Ok(CounterEffect::DecrementApplications)
}

/// Mark the application as viewed by the employer. First view only.
pub fn mark_viewed(application: &mut Application, now: DateTime<Utc>) {
    if !application.viewed_by_employer {
        application.viewed_by_employer = true;
        application.viewed_at = Some(now);
    }
}

/// Attach a free-text note.
pub fn add_note(application: &mut Application, text: String, created_by: String, now: DateTime<Utc>) {
    application.notes.push(ApplicationNote {
        text,
        created_by,
        created_at: now,
    });
    application.updated_at = now;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> Application {
        let (app, _) = submit(
            "a1".into(),
            "j1".into(),
            "c1".into(),
            "e1".into(),
            "cover".into(),
            None,
            Utc::now(),
        );
        app
    }

    #[test]
    fn submit_seeds_pending_with_one_history_entry() {
        let (app, effect) = submit(
            "a1".into(),
            "j1".into(),
            "c1".into(),
            "e1".into(),
            "cover".into(),
            None,
            Utc::now(),
        );
        assert_eq!(app.status, ApplicationStatus::Pending);
        assert_eq!(app.status_history.len(), 1);
        assert_eq!(effect, CounterEffect::IncrementApplications);
    }

    #[test]
    fn history_grows_by_one_per_transition() {
        let mut app = fresh();
        let now = Utc::now();
        record_transition(&mut app, ApplicationStatus::Reviewed, None, None, now).unwrap();
        record_transition(&mut app, ApplicationStatus::Shortlisted, None, None, now).unwrap();
        assert_eq!(app.status_history.len(), 3);
        assert_eq!(app.status, ApplicationStatus::Shortlisted);
    }

    #[test]
    fn hired_yields_counter_effect_every_time() {
        let mut app = fresh();
        let now = Utc::now();
        let first = record_transition(&mut app, ApplicationStatus::Hired, None, None, now).unwrap();
        let second =
            record_transition(&mut app, ApplicationStatus::Hired, None, None, now).unwrap();
        assert_eq!(first, Some(CounterEffect::IncrementHired));
        assert_eq!(second, Some(CounterEffect::IncrementHired));
        assert_eq!(app.status_history.len(), 3);
    }

    #[test]
    fn withdraw_blocked_after_decision() {
        let now = Utc::now();
        for terminal in [ApplicationStatus::Hired, ApplicationStatus::Rejected] {
            let mut app = fresh();
            record_transition(&mut app, terminal, None, None, now).unwrap();
            let err = withdraw(&mut app, None, now).unwrap_err();
            assert!(matches!(err, AppError::InvalidTransition(_)));
            assert!(!app.is_deleted);
        }
    }

    #[test]
    fn withdraw_soft_deletes_and_decrements() {
        let mut app = fresh();
        let now = Utc::now();
        let effect = withdraw(&mut app, Some("found another role".into()), now).unwrap();
        assert_eq!(effect, CounterEffect::DecrementApplications);
        assert_eq!(app.status, ApplicationStatus::Withdrawn);
        assert!(app.is_deleted);
        assert_eq!(app.withdrawal_reason.as_deref(), Some("found another role"));
        assert_eq!(app.status_history.len(), 2);
    }

    #[test]
    fn deleted_application_rejects_transitions() {
        let mut app = fresh();
        let now = Utc::now();
        withdraw(&mut app, None, now).unwrap();
        let err =
            record_transition(&mut app, ApplicationStatus::Reviewed, None, None, now).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn interview_sets_details_and_status() {
        let mut app = fresh();
        let now = Utc::now();
        schedule_interview(
            &mut app,
            ScheduleInterviewRequest {
                scheduled_date: now,
                duration: Some(45),
                interview_type: crate::models::InterviewType::Online,
                location: None,
                meeting_link: Some("https://meet.test/abc".into()),
                notes: None,
            },
            Some("e1".into()),
            now,
        )
        .unwrap();
        assert_eq!(app.status, ApplicationStatus::Interview);
        assert!(app.interview_details.is_some());
        assert_eq!(app.status_history.len(), 2);
    }

    #[test]
    fn mark_viewed_is_first_view_only() {
        let mut app = fresh();
        let first = Utc::now();
        mark_viewed(&mut app, first);
        let recorded = app.viewed_at;
        mark_viewed(&mut app, first + chrono::Duration::hours(1));
        assert!(app.viewed_by_employer);
        assert_eq!(app.viewed_at, recorded);
    }
}
