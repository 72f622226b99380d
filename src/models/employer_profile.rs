//! Employer profile model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::SocialLink;

/// Company information section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about_us: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
}

/// Founding information section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoundingInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub establishment_year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_vision: Option<String>,
}

/// Employer contact section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployerContact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// An employer's profile document. Derived completion fields are recomputed
/// on every save, never client-settable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployerProfile {
    pub user: String,
    #[serde(default)]
    pub company_info: CompanyInfo,
    #[serde(default)]
    pub founding_info: FoundingInfo,
    #[serde(default)]
    pub contact: EmployerContact,
    #[serde(default)]
    pub social_links: Vec<SocialLink>,
    pub is_profile_complete: bool,
    pub completion_percentage: u8,
    pub last_updated: DateTime<Utc>,
}

impl EmployerProfile {
    pub fn empty(user: String, now: DateTime<Utc>) -> Self {
        Self {
            user,
            company_info: CompanyInfo::default(),
            founding_info: FoundingInfo::default(),
            contact: EmployerContact::default(),
            social_links: Vec::new(),
            is_profile_complete: false,
            completion_percentage: 0,
            last_updated: now,
        }
    }

    /// Merge a partial update into this profile. Scoring happens afterwards.
    pub fn apply_update(&mut self, update: EmployerProfileUpdate, now: DateTime<Utc>) {
        if let Some(company) = update.company_info {
            merge_company_info(&mut self.company_info, company);
        }
        if let Some(founding) = update.founding_info {
            merge_founding_info(&mut self.founding_info, founding);
        }
        if let Some(contact) = update.contact {
            if contact.location.is_some() {
                self.contact.location = contact.location;
            }
            if contact.phone.is_some() {
                self.contact.phone = contact.phone;
            }
            if contact.email.is_some() {
                self.contact.email = contact.email;
            }
        }
        if let Some(links) = update.social_links {
            self.social_links = links.into_iter().filter(SocialLink::is_valid).collect();
        }
        self.last_updated = now;
    }
}

fn merge_company_info(current: &mut CompanyInfo, update: CompanyInfo) {
    if update.company_name.is_some() {
        current.company_name = update.company_name;
    }
    if update.industry.is_some() {
        current.industry = update.industry;
    }
    if update.team_size.is_some() {
        current.team_size = update.team_size;
    }
    if update.about_us.is_some() {
        current.about_us = update.about_us;
    }
    if update.logo.is_some() {
        current.logo = update.logo;
    }
    if update.banner.is_some() {
        current.banner = update.banner;
    }
}

fn merge_founding_info(current: &mut FoundingInfo, update: FoundingInfo) {
    if update.organization_type.is_some() {
        current.organization_type = update.organization_type;
    }
    if update.establishment_year.is_some() {
        current.establishment_year = update.establishment_year;
    }
    if update.company_website.is_some() {
        current.company_website = update.company_website;
    }
    if update.company_vision.is_some() {
        current.company_vision = update.company_vision;
    }
}

/// Request body for creating or updating an employer profile.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployerProfileUpdate {
    #[serde(default)]
    pub company_info: Option<CompanyInfo>,
    #[serde(default)]
    pub founding_info: Option<FoundingInfo>,
    #[serde(default)]
    pub contact: Option<EmployerContact>,
    #[serde(default)]
    pub social_links: Option<Vec<SocialLink>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn company_merge_preserves_unset_fields() {
        let mut p = EmployerProfile::empty("e1".to_string(), Utc::now());
        p.company_info.company_name = Some("Acme".into());
        p.company_info.logo = Some("/logo.png".into());

        let update = EmployerProfileUpdate {
            company_info: Some(CompanyInfo {
                industry: Some("Software".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        p.apply_update(update, Utc::now());

        assert_eq!(p.company_info.company_name.as_deref(), Some("Acme"));
        assert_eq!(p.company_info.logo.as_deref(), Some("/logo.png"));
        assert_eq!(p.company_info.industry.as_deref(), Some("Software"));
    }
}
