//! Search filter builder.
//!
//! Query parameters become WHERE conditions plus bind arguments. The literal
//! `"All"` and the empty string are sentinels meaning "no constraint". Sort
//! fields go through an allowlist; anything else falls back to the default.

use serde::Deserialize;

/// A bind argument for a generated condition.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlArg {
    Text(String),
    Int(i64),
}

/// Accumulated WHERE conditions and their bind arguments, in order.
#[derive(Debug, Default)]
pub struct FilterClause {
    pub conditions: Vec<String>,
    pub args: Vec<SqlArg>,
}

impl FilterClause {
    /// Render as a WHERE clause, or an empty string when unconstrained.
    pub fn where_sql(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.conditions.join(" AND "))
        }
    }

    fn push_eq(&mut self, column: &str, value: &Option<String>) {
        if let Some(v) = active(value) {
            self.conditions.push(format!("{column} = ?"));
            self.args.push(SqlArg::Text(v.to_string()));
        }
    }

    fn push_like_group(&mut self, columns: &[&str], value: &Option<String>) {
        if let Some(v) = active(value) {
            let group = columns
                .iter()
                .map(|c| format!("{c} LIKE ?"))
                .collect::<Vec<_>>()
                .join(" OR ");
            self.conditions.push(format!("({group})"));
            for _ in columns {
                self.args.push(SqlArg::Text(format!("%{v}%")));
            }
        }
    }
}

/// Whether a filter value constrains anything. `"All"` and blank are sentinels.
fn active(value: &Option<String>) -> Option<&str> {
    match value {
        Some(v) => {
            let trimmed = v.trim();
            if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
                None
            } else {
                Some(trimmed)
            }
        }
        None => None,
    }
}

/// Clamp page/limit and derive the offset. Pages are 1-indexed.
pub fn page_window(page: Option<i64>, limit: Option<i64>) -> (i64, i64, i64) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(10).clamp(1, 100);
    (page, limit, (page - 1) * limit)
}

/// Resolve a requested sort field against an allowlist, falling back to the
/// default column. Returns `(column, direction)`.
fn resolve_sort(
    requested: &Option<String>,
    order: &Option<String>,
    allowed: &[(&'static str, &'static str)],
    default_column: &'static str,
) -> (&'static str, &'static str) {
    let column = requested
        .as_deref()
        .and_then(|r| allowed.iter().find(|(name, _)| *name == r))
        .map(|(_, column)| *column)
        .unwrap_or(default_column);
    let direction = match order.as_deref() {
        Some("asc") => "ASC",
        _ => "DESC",
    };
    (column, direction)
}

/// Query parameters for job search.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSearchParams {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub job_type: Option<String>,
    #[serde(default)]
    pub experience_level: Option<String>,
    #[serde(default)]
    pub education_level: Option<String>,
    #[serde(default)]
    pub min_salary: Option<i64>,
    #[serde(default)]
    pub max_salary: Option<i64>,
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_order: Option<String>,
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

const JOB_SORT_FIELDS: &[(&str, &str)] = &[
    ("postedDate", "posted_date"),
    ("expirationDate", "expiration_date"),
    ("jobTitle", "job_title"),
    ("views", "views"),
    ("applicationsCount", "applications_count"),
    ("minSalary", "min_salary"),
    ("maxSalary", "max_salary"),
];

impl JobSearchParams {
    /// Build the filter for public job search. Only live postings match.
    pub fn filter(&self) -> FilterClause {
        let mut clause = FilterClause::default();
        clause.conditions.push("status = 'Active'".to_string());

        clause.push_like_group(
            &["job_title", "job_description", "job_category", "tags"],
            &self.search,
        );
        clause.push_like_group(&["country", "city"], &self.location);
        clause.push_eq("job_category", &self.category);
        clause.push_eq("job_type", &self.job_type);
        clause.push_eq("experience_level", &self.experience_level);
        clause.push_eq("education_level", &self.education_level);

        // salary bands overlap when each range reaches into the other
        if let Some(min) = self.min_salary {
            clause.conditions.push("max_salary >= ?".to_string());
            clause.args.push(SqlArg::Int(min));
        }
        if let Some(max) = self.max_salary {
            clause.conditions.push("min_salary <= ?".to_string());
            clause.args.push(SqlArg::Int(max));
        }

        clause
    }

    pub fn order_sql(&self) -> String {
        let (column, direction) =
            resolve_sort(&self.sort_by, &self.sort_order, JOB_SORT_FIELDS, "posted_date");
        format!(" ORDER BY {column} {direction}")
    }
}

/// Query parameters for candidate search (employer-facing).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateSearchParams {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

impl CandidateSearchParams {
    /// Build the filter. Only public, listable profiles match.
    pub fn filter(&self) -> FilterClause {
        let mut clause = FilterClause::default();
        clause.conditions.push("profile_public = 1".to_string());

        clause.push_like_group(&["full_name", "title", "biography"], &self.search);
        clause.push_like_group(&["location"], &self.location);
        clause.push_eq("gender", &self.gender);
        clause.push_eq("nationality", &self.nationality);
        clause
    }
}

/// Query parameters for employer directory search.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployerSearchParams {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub organization_type: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

impl EmployerSearchParams {
    pub fn filter(&self) -> FilterClause {
        let mut clause = FilterClause::default();
        clause.push_like_group(&["company_name", "about_us"], &self.search);
        clause.push_eq("industry", &self.industry);
        clause.push_eq("organization_type", &self.organization_type);
        clause.push_like_group(&["location"], &self.location);
        clause
    }
}

/// Query parameters for application lists.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationListParams {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

/// Plain pagination parameters.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels_add_no_conditions() {
        let params = JobSearchParams {
            category: Some("All".into()),
            job_type: Some("  ".into()),
            location: Some("".into()),
            ..Default::default()
        };
        let clause = params.filter();
        assert_eq!(clause.conditions, vec!["status = 'Active'".to_string()]);
        assert!(clause.args.is_empty());
    }

    #[test]
    fn search_terms_fan_out_across_columns() {
        let params = JobSearchParams {
            search: Some("rust".into()),
            ..Default::default()
        };
        let clause = params.filter();
        assert_eq!(
            clause.conditions[1],
            "(job_title LIKE ? OR job_description LIKE ? OR job_category LIKE ? OR tags LIKE ?)"
        );
        assert_eq!(clause.args.len(), 4);
        assert!(clause
            .args
            .iter()
            .all(|a| *a == SqlArg::Text("%rust%".to_string())));
    }

    #[test]
    fn salary_filter_uses_range_overlap() {
        let params = JobSearchParams {
            min_salary: Some(50_000),
            max_salary: Some(90_000),
            ..Default::default()
        };
        let clause = params.filter();
        assert!(clause.conditions.contains(&"max_salary >= ?".to_string()));
        assert!(clause.conditions.contains(&"min_salary <= ?".to_string()));
        assert_eq!(
            clause.args,
            vec![SqlArg::Int(50_000), SqlArg::Int(90_000)]
        );
    }

    #[test]
    fn unknown_sort_field_falls_back_to_default() {
        let params = JobSearchParams {
            sort_by: Some("applications_count; DROP TABLE jobs".into()),
            ..Default::default()
        };
        assert_eq!(params.order_sql(), " ORDER BY posted_date DESC");

        let params = JobSearchParams {
            sort_by: Some("views".into()),
            sort_order: Some("asc".into()),
            ..Default::default()
        };
        assert_eq!(params.order_sql(), " ORDER BY views ASC");
    }

    #[test]
    fn page_window_clamps() {
        assert_eq!(page_window(None, None), (1, 10, 0));
        assert_eq!(page_window(Some(0), Some(0)), (1, 1, 0));
        assert_eq!(page_window(Some(3), Some(20)), (3, 20, 40));
        assert_eq!(page_window(Some(2), Some(500)), (2, 100, 100));
    }

    #[test]
    fn where_sql_renders_joined_conditions() {
        let params = JobSearchParams {
            category: Some("Engineering".into()),
            ..Default::default()
        };
        let clause = params.filter();
        assert_eq!(
            clause.where_sql(),
            " WHERE status = 'Active' AND job_category = ?"
        );
        assert_eq!(clause.args, vec![SqlArg::Text("Engineering".to_string())]);
    }
}
