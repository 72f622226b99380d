//! Profile completion scoring.
//!
//! Pure functions over profile documents. Weights are fixed per role; the
//! derived percentage and completeness flag are recomputed on every profile
//! save and never accepted from clients.

use crate::models::{field_is_filled, CandidateProfile, EmployerProfile};

/// Percentage threshold at or above which a profile counts as complete.
pub const COMPLETE_THRESHOLD: u8 = 80;

/// Result of scoring a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub percentage: u8,
    pub is_complete: bool,
}

impl Completion {
    fn from_points(points: f64) -> Self {
        let percentage = points.round().min(100.0).max(0.0) as u8;
        Self {
            percentage,
            is_complete: percentage >= COMPLETE_THRESHOLD,
        }
    }
}

/// Score a candidate profile.
///
/// Core identity fields weigh 10 points each, media 5, detail fields 6,
/// social presence a flat 10 for at least one valid link, and contact
/// fields 3.33 each capped at 10. The total caps at 100.
pub fn score_candidate(profile: &CandidateProfile) -> Completion {
    let mut points = 0.0;

    let personal = &profile.personal_info;
    for field in [
        personal.full_name.as_deref(),
        personal.title.as_deref(),
        personal.experience.as_deref(),
        personal.education.as_deref(),
    ] {
        if field_is_filled(field) {
            points += 10.0;
        }
    }
    for field in [personal.profile_image.as_deref(), personal.cv_url.as_deref()] {
        if field_is_filled(field) {
            points += 5.0;
        }
    }

    let details = &profile.profile_details;
    for field in [
        details.nationality.as_deref(),
        details.gender.as_deref(),
        details.marital_status.as_deref(),
        details.biography.as_deref(),
    ] {
        if field_is_filled(field) {
            points += 6.0;
        }
    }
    // date of birth is a date, not free text: presence is enough
    if details.date_of_birth.is_some() {
        points += 6.0;
    }

    if profile.social_links.iter().any(|link| link.is_valid()) {
        points += 10.0;
    }

    let contact = &profile.account_settings.contact;
    let mut contact_points: f64 = 0.0;
    for field in [
        contact.location.as_deref(),
        contact.phone.as_deref(),
        contact.email.as_deref(),
    ] {
        if field_is_filled(field) {
            contact_points += 3.33;
        }
    }
    points += contact_points.min(10.0);

    Completion::from_points(points)
}

/// Score an employer profile.
///
/// Ratio method: nine unit-weight fields plus logo at 1.5 and banner at 0.5,
/// over eleven total slots.
pub fn score_employer(profile: &EmployerProfile) -> Completion {
    const TOTAL_SLOTS: f64 = 11.0;
    let mut filled: f64 = 0.0;

    let contact = &profile.contact;
    let company = &profile.company_info;
    let founding = &profile.founding_info;
    for field in [
        contact.phone.as_deref(),
        contact.email.as_deref(),
        contact.location.as_deref(),
        company.company_name.as_deref(),
        company.about_us.as_deref(),
        company.industry.as_deref(),
        company.team_size.as_deref(),
        founding.organization_type.as_deref(),
        founding.company_website.as_deref(),
    ] {
        if field_is_filled(field) {
            filled += 1.0;
        }
    }
    if field_is_filled(company.logo.as_deref()) {
        filled += 1.5;
    }
    if field_is_filled(company.banner.as_deref()) {
        filled += 0.5;
    }

    Completion::from_points(filled / TOTAL_SLOTS * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SocialLink;
    use chrono::Utc;

    fn candidate() -> CandidateProfile {
        CandidateProfile::empty("u1".to_string(), Utc::now())
    }

    fn employer() -> EmployerProfile {
        EmployerProfile::empty("e1".to_string(), Utc::now())
    }

    #[test]
    fn empty_candidate_scores_zero() {
        let c = score_candidate(&candidate());
        assert_eq!(c.percentage, 0);
        assert!(!c.is_complete);
    }

    #[test]
    fn full_name_alone_is_ten_percent() {
        let mut p = candidate();
        p.personal_info.full_name = Some("Jane Doe".into());
        let c = score_candidate(&p);
        assert_eq!(c.percentage, 10);
        assert!(!c.is_complete);
    }

    #[test]
    fn blank_and_null_literal_fields_do_not_count() {
        let mut p = candidate();
        p.personal_info.full_name = Some("   ".into());
        p.personal_info.title = Some("null".into());
        assert_eq!(score_candidate(&p).percentage, 0);
    }

    #[test]
    fn contact_caps_at_ten() {
        let mut p = candidate();
        p.account_settings.contact.location = Some("Berlin".into());
        p.account_settings.contact.phone = Some("+49 170".into());
        p.account_settings.contact.email = Some("jane@example.com".into());
        // 3 * 3.33 = 9.99, capped path not hit but rounds to 10
        assert_eq!(score_candidate(&p).percentage, 10);
    }

    #[test]
    fn social_links_flat_bonus_regardless_of_count() {
        let link = SocialLink {
            platform: "github".into(),
            url: "https://github.com/jane".into(),
        };
        let mut p = candidate();
        p.social_links = vec![link.clone()];
        assert_eq!(score_candidate(&p).percentage, 10);
        p.social_links = vec![link.clone(), link];
        assert_eq!(score_candidate(&p).percentage, 10);
    }

    fn filled_candidate() -> CandidateProfile {
        let mut p = candidate();
        p.personal_info.full_name = Some("Jane Doe".into());
        p.personal_info.title = Some("Engineer".into());
        p.personal_info.experience = Some("5 years".into());
        p.personal_info.education = Some("BSc".into());
        p.personal_info.profile_image = Some("/img.png".into());
        p.personal_info.cv_url = Some("/cv.pdf".into());
        p.profile_details.nationality = Some("DE".into());
        p.profile_details.date_of_birth = Some(Utc::now());
        p.profile_details.gender = Some("female".into());
        p.profile_details.marital_status = Some("single".into());
        p.profile_details.biography = Some("bio".into());
        p.social_links = vec![SocialLink {
            platform: "github".into(),
            url: "https://github.com/jane".into(),
        }];
        p.account_settings.contact.location = Some("Berlin".into());
        p.account_settings.contact.phone = Some("+49 170".into());
        p.account_settings.contact.email = Some("jane@example.com".into());
        p
    }

    #[test]
    fn fully_filled_candidate_is_hundred() {
        let c = score_candidate(&filled_candidate());
        assert_eq!(c.percentage, 100);
        assert!(c.is_complete);
    }

    #[test]
    fn completeness_boundary_at_eighty() {
        // everything except detail fields: 40 + 10 + 10 + 10 = 70, below
        let mut p = filled_candidate();
        p.profile_details = Default::default();
        let c = score_candidate(&p);
        assert_eq!(c.percentage, 70);
        assert!(!c.is_complete);

        // add two detail fields: 70 + 12 = 82, at or above
        p.profile_details.nationality = Some("DE".into());
        p.profile_details.biography = Some("bio".into());
        let c = score_candidate(&p);
        assert_eq!(c.percentage, 82);
        assert!(c.is_complete);
    }

    #[test]
    fn empty_employer_scores_zero() {
        let c = score_employer(&employer());
        assert_eq!(c.percentage, 0);
        assert!(!c.is_complete);
    }

    #[test]
    fn logo_outweighs_banner() {
        let mut p = employer();
        p.company_info.logo = Some("/logo.png".into());
        assert_eq!(score_employer(&p).percentage, 14); // 1.5 / 11 = 13.6

        let mut p = employer();
        p.company_info.banner = Some("/banner.png".into());
        assert_eq!(score_employer(&p).percentage, 5); // 0.5 / 11 = 4.5
    }

    #[test]
    fn employer_contact_fields_count_one_each() {
        let mut p = employer();
        p.contact.phone = Some("+49 30 1234".into());
        p.contact.email = Some("jobs@acme.test".into());
        p.contact.location = Some("Berlin".into());
        // 3 of 11 slots
        assert_eq!(score_employer(&p).percentage, 27);
    }

    #[test]
    fn establishment_year_and_vision_are_not_scored() {
        let mut p = employer();
        p.founding_info.establishment_year = Some("2015".into());
        p.founding_info.company_vision = Some("vision".into());
        p.social_links = vec![SocialLink {
            platform: "linkedin".into(),
            url: "https://linkedin.com/company/acme".into(),
        }];
        assert_eq!(score_employer(&p).percentage, 0);
    }

    #[test]
    fn fully_filled_employer_is_hundred() {
        let mut p = employer();
        p.contact.phone = Some("+49 30 1234".into());
        p.contact.email = Some("jobs@acme.test".into());
        p.contact.location = Some("Berlin".into());
        p.company_info.company_name = Some("Acme".into());
        p.company_info.industry = Some("Software".into());
        p.company_info.team_size = Some("11-50".into());
        p.company_info.about_us = Some("about".into());
        p.company_info.logo = Some("/logo.png".into());
        p.company_info.banner = Some("/banner.png".into());
        p.founding_info.organization_type = Some("Private".into());
        p.founding_info.company_website = Some("https://acme.test".into());
        let c = score_employer(&p);
        assert_eq!(c.percentage, 100);
        assert!(c.is_complete);
    }
}
