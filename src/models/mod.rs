//! Data models for the job-board backend.
//!
//! Wire format is camelCase JSON; nested sections are stored as JSON documents
//! in the database and round-trip through these types.

mod application;
mod candidate_profile;
mod employer_profile;
mod job;
mod saved;
mod search_history;

pub use application::*;
pub use candidate_profile::*;
pub use employer_profile::*;
pub use job::*;
pub use saved::*;
pub use search_history::*;

use serde::{Deserialize, Deserializer, Serialize};

/// Pagination block returned with every list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: i64,
    pub total_pages: i64,
    pub total_items: i64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl Pagination {
    pub fn new(page: i64, limit: i64, total_items: i64) -> Self {
        let limit = limit.max(1);
        let total_pages = (total_items + limit - 1) / limit;
        Self {
            current_page: page,
            total_pages,
            total_items,
            has_next_page: page < total_pages,
            has_prev_page: page > 1,
        }
    }
}

/// Distinguishes an explicit JSON `null` from an absent field.
///
/// Absent deserializes to `None` via `#[serde(default)]`; `null` becomes
/// `Some(None)`, which callers treat as "clear this field".
pub fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Whether a free-form field value counts as filled: present, non-empty after
/// trimming, and not the literal string `"null"`.
pub fn field_is_filled(value: Option<&str>) -> bool {
    match value {
        Some(v) => {
            let trimmed = v.trim();
            !trimmed.is_empty() && trimmed != "null"
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_math() {
        let p = Pagination::new(1, 10, 25);
        assert_eq!(p.total_pages, 3);
        assert!(p.has_next_page);
        assert!(!p.has_prev_page);

        let last = Pagination::new(3, 10, 25);
        assert!(!last.has_next_page);
        assert!(last.has_prev_page);

        let empty = Pagination::new(1, 10, 0);
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_next_page);
    }

    #[test]
    fn filled_rejects_blank_and_null_literal() {
        assert!(field_is_filled(Some("Jane")));
        assert!(field_is_filled(Some("  x  ")));
        assert!(!field_is_filled(Some("")));
        assert!(!field_is_filled(Some("   ")));
        assert!(!field_is_filled(Some("null")));
        assert!(!field_is_filled(None));
    }
}
