//! Status-change notifications.
//!
//! Each application status maps to a fixed pair of channel templates, one
//! for SMS and one for email. Dispatch is log-only: structured events that
//! an external delivery worker can tail. A failed or skipped dispatch never
//! blocks the status transition that triggered it.

use tracing::info;

use crate::models::ApplicationStatus;

/// Rendered per-channel messages for one status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusNotification {
    pub sms: &'static str,
    pub email_subject: &'static str,
    pub email_body: &'static str,
}

/// Templates for a status, or `None` for statuses that stay silent.
pub fn template_for(status: ApplicationStatus) -> Option<StatusNotification> {
    match status {
        ApplicationStatus::Pending => Some(StatusNotification {
            sms: "Your application has been received and is pending review.",
            email_subject: "Application received",
            email_body: "Your application has been received and is pending review. \
                 We will notify you when the employer takes a look.",
        }),
        ApplicationStatus::Reviewed => Some(StatusNotification {
            sms: "Your application has been reviewed by the employer.",
            email_subject: "Application reviewed",
            email_body: "The employer has reviewed your application. \
                 You will hear from them if they want to move forward.",
        }),
        ApplicationStatus::Shortlisted => Some(StatusNotification {
            sms: "Congratulations! Your application has been shortlisted.",
            email_subject: "You have been shortlisted",
            email_body: "Congratulations! The employer has shortlisted your \
                 application for the next stage.",
        }),
        ApplicationStatus::Interview => Some(StatusNotification {
            sms: "An interview has been scheduled for your application.",
            email_subject: "Interview scheduled",
            email_body: "An interview has been scheduled for your application. \
                 Check the application details for the date and format.",
        }),
        ApplicationStatus::Hired => Some(StatusNotification {
            sms: "Congratulations, you are hired!",
            email_subject: "Congratulations, you are hired!",
            email_body: "The employer has selected you for this position. \
                 They will contact you with the next steps.",
        }),
        ApplicationStatus::Rejected => Some(StatusNotification {
            sms: "Unfortunately your application was not selected this time.",
            email_subject: "Application update",
            email_body: "Unfortunately your application was not selected this \
                 time. Keep an eye on new postings that match your profile.",
        }),
        // candidates initiate withdrawals themselves
        ApplicationStatus::Withdrawn => None,
    }
}

/// Emit the notification events for a status change, if the status has templates.
pub fn dispatch_status_change(candidate_id: &str, job_title: &str, status: ApplicationStatus) {
    if let Some(notification) = template_for(status) {
        info!(
            candidate = candidate_id,
            job = job_title,
            status = status.as_str(),
            message = notification.sms,
            "notification.sms"
        );
        info!(
            candidate = candidate_id,
            job = job_title,
            status = status.as_str(),
            subject = notification.email_subject,
            body = notification.email_body,
            "notification.email"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_employer_driven_status_has_templates() {
        for status in ApplicationStatus::ALL {
            let template = template_for(status);
            if status == ApplicationStatus::Withdrawn {
                assert!(template.is_none());
            } else {
                let t = template.unwrap_or_else(|| panic!("missing template for {status:?}"));
                assert!(!t.sms.is_empty());
                assert!(!t.email_subject.is_empty());
                assert!(!t.email_body.is_empty());
            }
        }
    }
}
