//! Candidate profile model: nested, independently-optional sections.
//!
//! Sections merge with explicit rules: nested objects deep-merge field by
//! field, arrays shallow-replace, and an explicit `null` clears the array.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::explicit_null;

/// Personal information section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cv_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
}

/// Profile details section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marital_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub biography: Option<String>,
}

/// A social link. Counts toward completion only when both parts are non-empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialLink {
    pub platform: String,
    pub url: String,
}

impl SocialLink {
    pub fn is_valid(&self) -> bool {
        super::field_is_filled(Some(&self.platform)) && super::field_is_filled(Some(&self.url))
    }
}

/// Contact sub-section of account settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Per-event notification toggles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    pub shortlisted: bool,
    pub saved: bool,
    pub job_expired: bool,
    pub rejected: bool,
    pub job_alerts: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            shortlisted: true,
            saved: true,
            job_expired: true,
            rejected: true,
            job_alerts: true,
        }
    }
}

/// Job alert preferences.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobAlertSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Privacy toggles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivacySettings {
    pub profile_public: bool,
    pub resume_public: bool,
}

impl Default for PrivacySettings {
    fn default() -> Self {
        Self {
            profile_public: true,
            resume_public: false,
        }
    }
}

/// Account settings section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSettings {
    #[serde(default)]
    pub contact: ContactSettings,
    #[serde(default)]
    pub notifications: NotificationSettings,
    #[serde(default)]
    pub job_alerts: JobAlertSettings,
    #[serde(default)]
    pub privacy: PrivacySettings,
}

/// A candidate's profile document. `completion_percentage` and
/// `is_profile_complete` are recomputed on every save, never client-settable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateProfile {
    pub user: String,
    #[serde(default)]
    pub personal_info: PersonalInfo,
    #[serde(default)]
    pub profile_details: ProfileDetails,
    #[serde(default)]
    pub social_links: Vec<SocialLink>,
    #[serde(default)]
    pub account_settings: AccountSettings,
    pub is_profile_complete: bool,
    pub completion_percentage: u8,
    pub last_updated: DateTime<Utc>,
}

impl CandidateProfile {
    pub fn empty(user: String, now: DateTime<Utc>) -> Self {
        Self {
            user,
            personal_info: PersonalInfo::default(),
            profile_details: ProfileDetails::default(),
            social_links: Vec::new(),
            account_settings: AccountSettings::default(),
            is_profile_complete: false,
            completion_percentage: 0,
            last_updated: now,
        }
    }

    /// Merge a partial update into this profile. Scoring happens afterwards.
    pub fn apply_update(&mut self, update: CandidateProfileUpdate, now: DateTime<Utc>) {
        if let Some(personal) = update.personal_info {
            merge_personal_info(&mut self.personal_info, personal);
        }
        if let Some(details) = update.profile_details {
            merge_profile_details(&mut self.profile_details, details);
        }
        match update.social_links {
            // explicit null clears the list
            Some(None) => self.social_links.clear(),
            // arrays shallow-replace, invalid entries dropped
            Some(Some(links)) => {
                self.social_links = links.into_iter().filter(SocialLink::is_valid).collect();
            }
            None => {}
        }
        if let Some(settings) = update.account_settings {
            merge_account_settings(&mut self.account_settings, settings);
        }
        self.last_updated = now;
    }
}

fn merge_personal_info(current: &mut PersonalInfo, update: PersonalInfo) {
    if update.full_name.is_some() {
        current.full_name = update.full_name;
    }
    if update.title.is_some() {
        current.title = update.title;
    }
    if update.experience.is_some() {
        current.experience = update.experience;
    }
    if update.education.is_some() {
        current.education = update.education;
    }
    if update.website.is_some() {
        current.website = update.website;
    }
    if update.cv_url.is_some() {
        current.cv_url = update.cv_url;
    }
    if update.profile_image.is_some() {
        current.profile_image = update.profile_image;
    }
}

fn merge_profile_details(current: &mut ProfileDetails, update: ProfileDetails) {
    if update.nationality.is_some() {
        current.nationality = update.nationality;
    }
    if update.date_of_birth.is_some() {
        current.date_of_birth = update.date_of_birth;
    }
    if update.gender.is_some() {
        current.gender = update.gender;
    }
    if update.marital_status.is_some() {
        current.marital_status = update.marital_status;
    }
    if update.biography.is_some() {
        current.biography = update.biography;
    }
}

fn merge_account_settings(current: &mut AccountSettings, update: AccountSettingsUpdate) {
    if let Some(contact) = update.contact {
        if contact.location.is_some() {
            current.contact.location = contact.location;
        }
        if contact.phone.is_some() {
            current.contact.phone = contact.phone;
        }
        if contact.email.is_some() {
            current.contact.email = contact.email;
        }
    }
    if let Some(notifications) = update.notifications {
        current.notifications = notifications;
    }
    if let Some(alerts) = update.job_alerts {
        if alerts.role.is_some() {
            current.job_alerts.role = alerts.role;
        }
        if alerts.location.is_some() {
            current.job_alerts.location = alerts.location;
        }
    }
    if let Some(privacy) = update.privacy {
        current.privacy = privacy;
    }
}

/// Partial account-settings update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSettingsUpdate {
    #[serde(default)]
    pub contact: Option<ContactSettings>,
    #[serde(default)]
    pub notifications: Option<NotificationSettings>,
    #[serde(default)]
    pub job_alerts: Option<JobAlertSettings>,
    #[serde(default)]
    pub privacy: Option<PrivacySettings>,
}

/// Request body for creating or updating a candidate profile.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateProfileUpdate {
    #[serde(default)]
    pub personal_info: Option<PersonalInfo>,
    #[serde(default)]
    pub profile_details: Option<ProfileDetails>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub social_links: Option<Option<Vec<SocialLink>>>,
    #[serde(default)]
    pub account_settings: Option<AccountSettingsUpdate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> CandidateProfile {
        CandidateProfile::empty("u1".to_string(), Utc::now())
    }

    #[test]
    fn partial_section_merge_preserves_siblings() {
        let mut p = profile();
        p.personal_info.full_name = Some("Jane".into());
        p.personal_info.title = Some("Engineer".into());

        let update = CandidateProfileUpdate {
            personal_info: Some(PersonalInfo {
                title: Some("Senior Engineer".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        p.apply_update(update, Utc::now());

        assert_eq!(p.personal_info.full_name.as_deref(), Some("Jane"));
        assert_eq!(p.personal_info.title.as_deref(), Some("Senior Engineer"));
    }

    #[test]
    fn social_links_replace_and_drop_invalid() {
        let mut p = profile();
        let update = CandidateProfileUpdate {
            social_links: Some(Some(vec![
                SocialLink {
                    platform: "github".into(),
                    url: "https://github.com/jane".into(),
                },
                SocialLink {
                    platform: "".into(),
                    url: "https://x.com/jane".into(),
                },
                SocialLink {
                    platform: "null".into(),
                    url: "https://x.com/jane".into(),
                },
            ])),
            ..Default::default()
        };
        p.apply_update(update, Utc::now());
        assert_eq!(p.social_links.len(), 1);
        assert_eq!(p.social_links[0].platform, "github");
    }

    #[test]
    fn explicit_null_clears_social_links() {
        let mut p = profile();
        p.social_links = vec![SocialLink {
            platform: "github".into(),
            url: "https://github.com/jane".into(),
        }];

        let update: CandidateProfileUpdate =
            serde_json::from_str(r#"{"socialLinks": null}"#).unwrap();
        p.apply_update(update, Utc::now());
        assert!(p.social_links.is_empty());
    }

    #[test]
    fn absent_social_links_left_untouched() {
        let mut p = profile();
        p.social_links = vec![SocialLink {
            platform: "github".into(),
            url: "https://github.com/jane".into(),
        }];

        let update: CandidateProfileUpdate = serde_json::from_str(r#"{}"#).unwrap();
        p.apply_update(update, Utc::now());
        assert_eq!(p.social_links.len(), 1);
    }

    #[test]
    fn contact_merge_is_per_field() {
        let mut p = profile();
        p.account_settings.contact.phone = Some("123".into());

        let update = CandidateProfileUpdate {
            account_settings: Some(AccountSettingsUpdate {
                contact: Some(ContactSettings {
                    email: Some("jane@example.com".into()),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        };
        p.apply_update(update, Utc::now());
        assert_eq!(p.account_settings.contact.phone.as_deref(), Some("123"));
        assert_eq!(
            p.account_settings.contact.email.as_deref(),
            Some("jane@example.com")
        );
    }
}
