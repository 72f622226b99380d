//! Database repository for CRUD operations.
//!
//! Uses prepared statements and transactions for data integrity. Mutable
//! scalars (status, counters) live in columns and are overlaid on the JSON
//! document when a row is loaded.

use chrono::{DateTime, Duration, Utc};
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::filters::{
    page_window, ApplicationListParams, CandidateSearchParams, EmployerSearchParams,
    JobSearchParams, PageParams, SqlArg,
};
use crate::lifecycle::{self, CounterEffect};
use crate::models::{
    AddNoteRequest, Application, ApplicationStatus, ApplyRequest, CandidateProfile,
    CandidateProfileUpdate, CreateJobRequest, EmployerProfile, EmployerProfileUpdate, Job,
    JobLocation, JobStatus, PopularSearch, SalaryRange, SaveSearchRequest, SavedCandidate,
    SavedJob, ScheduleInterviewRequest, SearchFilters, SearchHistoryEntry, StatusCounts,
    TrendingSearch, UpdateJobRequest, UpdateStatusRequest,
};
use crate::notify;
use crate::scoring;

type SqliteQuery<'q> = sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>;

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== USER OPERATIONS ====================

    /// Make sure a user row exists for the acting identity.
    pub async fn ensure_user(&self, id: &str, role: &str) -> Result<(), AppError> {
        sqlx::query("INSERT OR IGNORE INTO users (id, role, is_profile_complete, created_at) VALUES (?, ?, 0, ?)")
            .bind(id)
            .bind(role)
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Sync the denormalized completion flag, only touching the row on change.
    async fn sync_profile_complete(&self, user_id: &str, complete: bool) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET is_profile_complete = ? WHERE id = ? AND is_profile_complete != ?")
            .bind(complete as i32)
            .bind(user_id)
            .bind(complete as i32)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ==================== JOB OPERATIONS ====================

    /// Create a job posting.
    pub async fn create_job(
        &self,
        employer_id: &str,
        request: &CreateJobRequest,
    ) -> Result<Job, AppError> {
        let now = Utc::now();
        if request.expiration_date <= now {
            return Err(AppError::Validation(
                "Expiration date must be in the future".to_string(),
            ));
        }
        if request.job_title.trim().is_empty() {
            return Err(AppError::Validation("Job title is required".to_string()));
        }

        let job = Job {
            id: uuid::Uuid::new_v4().to_string(),
            employer: employer_id.to_string(),
            job_title: request.job_title.clone(),
            job_description: request.job_description.clone(),
            job_type: request.job_type.clone(),
            salary_range: SalaryRange {
                min: request.min_salary.unwrap_or(0),
                max: request.max_salary.unwrap_or(0),
                currency: request.currency.clone().unwrap_or_else(|| "USD".to_string()),
                is_negotiable: request.is_negotiable.unwrap_or(false),
            },
            location: JobLocation {
                country: request.country.clone(),
                city: request.city.clone(),
                state: request.state.clone().unwrap_or_default(),
                zip_code: request.zip_code.clone().unwrap_or_default(),
                address: request.address.clone().unwrap_or_default(),
                is_remote: request.is_remote.unwrap_or(false),
            },
            experience_level: request.experience_level.clone(),
            education_level: request.education_level.clone(),
            vacancies: request.vacancies.unwrap_or(1),
            job_category: request.job_category.clone(),
            tags: request.tags.clone().unwrap_or_default(),
            benefits: request.benefits.clone().unwrap_or_default(),
            application_method: request
                .application_method
                .clone()
                .unwrap_or_else(|| "Platform".to_string()),
            application_email: request.application_email.clone(),
            application_url: request.application_url.clone(),
            posted_date: now,
            expiration_date: request.expiration_date,
            status: JobStatus::Active,
            is_featured: false,
            is_highlighted: false,
            views: 0,
            applications_count: 0,
            hired_count: 0,
        };

        self.insert_job(&job).await?;
        Ok(job)
    }

    async fn insert_job(&self, job: &Job) -> Result<(), AppError> {
        let doc = serde_json::to_string(job)?;
        sqlx::query(
            r#"
            INSERT INTO jobs (
                id, employer_id, job_title, job_description, job_type, job_category,
                experience_level, education_level, min_salary, max_salary, country, city,
                tags, posted_date, expiration_date, status, views, applications_count,
                hired_count, doc
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&job.id)
        .bind(&job.employer)
        .bind(&job.job_title)
        .bind(&job.job_description)
        .bind(&job.job_type)
        .bind(&job.job_category)
        .bind(&job.experience_level)
        .bind(&job.education_level)
        .bind(job.salary_range.min)
        .bind(job.salary_range.max)
        .bind(&job.location.country)
        .bind(&job.location.city)
        .bind(job.tags.join(","))
        .bind(job.posted_date.to_rfc3339())
        .bind(job.expiration_date.to_rfc3339())
        .bind(job.status.as_str())
        .bind(job.views)
        .bind(job.applications_count)
        .bind(job.hired_count)
        .bind(&doc)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Rewrite a job row from its document, keeping columns in sync.
    async fn save_job(&self, job: &Job) -> Result<(), AppError> {
        let doc = serde_json::to_string(job)?;
        sqlx::query(
            r#"
            UPDATE jobs SET
                job_title = ?, job_description = ?, job_type = ?, job_category = ?,
                experience_level = ?, education_level = ?, min_salary = ?, max_salary = ?,
                country = ?, city = ?, tags = ?, expiration_date = ?, status = ?, doc = ?
            WHERE id = ?
            "#,
        )
        .bind(&job.job_title)
        .bind(&job.job_description)
        .bind(&job.job_type)
        .bind(&job.job_category)
        .bind(&job.experience_level)
        .bind(&job.education_level)
        .bind(job.salary_range.min)
        .bind(job.salary_range.max)
        .bind(&job.location.country)
        .bind(&job.location.city)
        .bind(job.tags.join(","))
        .bind(job.expiration_date.to_rfc3339())
        .bind(job.status.as_str())
        .bind(&doc)
        .bind(&job.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Get a job by ID, opportunistically correcting a stale Active status.
    pub async fn get_job(&self, id: &str) -> Result<Option<Job>, AppError> {
        let row = sqlx::query("SELECT * FROM jobs WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else { return Ok(None) };
        let mut job = job_from_row(&row)?;

        if job.needs_expiry_correction(Utc::now()) {
            job.status = JobStatus::Expired;
            sqlx::query("UPDATE jobs SET status = 'Expired' WHERE id = ?")
                .bind(id)
                .execute(&self.pool)
                .await?;
        }
        Ok(Some(job))
    }

    /// Public job view: bumps the view counter.
    pub async fn view_job(&self, id: &str) -> Result<Option<Job>, AppError> {
        let Some(mut job) = self.get_job(id).await? else {
            return Ok(None);
        };
        sqlx::query("UPDATE jobs SET views = views + 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        job.views += 1;
        Ok(Some(job))
    }

    /// Search live postings.
    pub async fn search_jobs(&self, params: &JobSearchParams) -> Result<(Vec<Job>, i64), AppError> {
        let clause = params.filter();
        let (_, limit, offset) = page_window(params.page, params.limit);

        let count_sql = format!("SELECT COUNT(*) AS cnt FROM jobs{}", clause.where_sql());
        let count_row = bind_args(sqlx::query(&count_sql), &clause.args)
            .fetch_one(&self.pool)
            .await?;
        let total: i64 = count_row.get("cnt");

        let sql = format!(
            "SELECT * FROM jobs{}{} LIMIT ? OFFSET ?",
            clause.where_sql(),
            params.order_sql()
        );
        let rows = bind_args(sqlx::query(&sql), &clause.args)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let jobs = rows
            .iter()
            .map(job_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((jobs, total))
    }

    /// List an employer's own postings, any status, with per-status stats.
    pub async fn list_employer_jobs(
        &self,
        employer_id: &str,
        params: &PageParams,
    ) -> Result<(Vec<(Job, StatusCounts)>, i64), AppError> {
        let (_, limit, offset) = page_window(params.page, params.limit);

        let count_row = sqlx::query("SELECT COUNT(*) AS cnt FROM jobs WHERE employer_id = ?")
            .bind(employer_id)
            .fetch_one(&self.pool)
            .await?;
        let total: i64 = count_row.get("cnt");

        let rows = sqlx::query(
            "SELECT * FROM jobs WHERE employer_id = ? ORDER BY posted_date DESC LIMIT ? OFFSET ?",
        )
        .bind(employer_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            let job = job_from_row(row)?;
            let stats = self.job_application_stats(&job.id).await?;
            out.push((job, stats));
        }
        Ok((out, total))
    }

    /// Update a posting. Only the owning employer may touch it.
    pub async fn update_job(
        &self,
        id: &str,
        employer_id: &str,
        request: &UpdateJobRequest,
    ) -> Result<Job, AppError> {
        let mut job = self
            .get_job(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;
        if job.employer != employer_id {
            return Err(AppError::Authorization(
                "You do not own this job posting".to_string(),
            ));
        }

        if let Some(date) = request.expiration_date {
            if date <= Utc::now() {
                return Err(AppError::Validation(
                    "Expiration date must be in the future".to_string(),
                ));
            }
        }

        apply_job_update(&mut job, request);
        if job.needs_expiry_correction(Utc::now()) {
            job.status = JobStatus::Expired;
        }

        self.save_job(&job).await?;
        Ok(job)
    }

    /// Remove a posting. Rows are never dropped; deletion closes the job so
    /// existing applications keep a valid parent.
    pub async fn delete_job(&self, id: &str, employer_id: &str) -> Result<Job, AppError> {
        let mut job = self
            .get_job(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;
        if job.employer != employer_id {
            return Err(AppError::Authorization(
                "You do not own this job posting".to_string(),
            ));
        }

        job.status = JobStatus::Closed;
        sqlx::query("UPDATE jobs SET status = 'Closed' WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(job)
    }

    /// Apply a lifecycle counter adjustment to the owning job.
    async fn apply_counter_effect(
        &self,
        job_id: &str,
        effect: CounterEffect,
    ) -> Result<(), AppError> {
        let sql = match effect {
            CounterEffect::IncrementApplications => {
                "UPDATE jobs SET applications_count = applications_count + 1 WHERE id = ?"
            }
            CounterEffect::DecrementApplications => {
                "UPDATE jobs SET applications_count = applications_count - 1 WHERE id = ?"
            }
            CounterEffect::IncrementHired => {
                "UPDATE jobs SET hired_count = hired_count + 1 WHERE id = ?"
            }
        };
        sqlx::query(sql).bind(job_id).execute(&self.pool).await?;
        Ok(())
    }

    /// Reconcile a job's applications counter against the live rows.
    pub async fn recount_applications(&self, job_id: &str) -> Result<i64, AppError> {
        sqlx::query(
            r#"
            UPDATE jobs SET applications_count =
                (SELECT COUNT(*) FROM applications WHERE job_id = jobs.id AND is_deleted = 0)
            WHERE id = ?
            "#,
        )
        .bind(job_id)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query("SELECT applications_count FROM jobs WHERE id = ?")
            .bind(job_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("applications_count"))
    }

    /// Sweep: mark every Active posting past its deadline as Expired.
    pub async fn correct_expired_jobs(&self) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE jobs SET status = 'Expired' WHERE status = 'Active' AND expiration_date < ?",
        )
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    // ==================== APPLICATION OPERATIONS ====================

    /// Submit an application to a live posting.
    pub async fn apply(
        &self,
        candidate_id: &str,
        request: &ApplyRequest,
    ) -> Result<Application, AppError> {
        let job = self
            .get_job(&request.job_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;
        if job.status != JobStatus::Active {
            return Err(AppError::Validation(
                "This job is no longer accepting applications".to_string(),
            ));
        }
        if request.cover_letter.trim().is_empty() {
            return Err(AppError::Validation("Cover letter is required".to_string()));
        }

        let duplicate = sqlx::query(
            "SELECT id FROM applications WHERE job_id = ? AND candidate_id = ? AND is_deleted = 0",
        )
        .bind(&request.job_id)
        .bind(candidate_id)
        .fetch_optional(&self.pool)
        .await?;
        if duplicate.is_some() {
            return Err(AppError::Conflict(
                "You have already applied for this job".to_string(),
            ));
        }

        let (application, effect) = lifecycle::submit(
            uuid::Uuid::new_v4().to_string(),
            request.job_id.clone(),
            candidate_id.to_string(),
            job.employer.clone(),
            request.cover_letter.clone(),
            request.resume.clone(),
            Utc::now(),
        );

        self.insert_application(&application).await?;
        self.apply_counter_effect(&job.id, effect).await?;
        notify::dispatch_status_change(candidate_id, &job.job_title, application.status);
        Ok(application)
    }

    async fn insert_application(&self, application: &Application) -> Result<(), AppError> {
        let doc = serde_json::to_string(application)?;
        sqlx::query(
            r#"
            INSERT INTO applications (
                id, job_id, candidate_id, employer_id, status, is_deleted,
                applied_at, updated_at, doc
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&application.id)
        .bind(&application.job)
        .bind(&application.candidate)
        .bind(&application.employer)
        .bind(application.status.as_str())
        .bind(application.is_deleted as i32)
        .bind(application.applied_at.to_rfc3339())
        .bind(application.updated_at.to_rfc3339())
        .bind(&doc)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn save_application(&self, application: &Application) -> Result<(), AppError> {
        let doc = serde_json::to_string(application)?;
        sqlx::query(
            "UPDATE applications SET status = ?, is_deleted = ?, updated_at = ?, doc = ? WHERE id = ?",
        )
        .bind(application.status.as_str())
        .bind(application.is_deleted as i32)
        .bind(application.updated_at.to_rfc3339())
        .bind(&doc)
        .bind(&application.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Get an application by ID. Soft-deleted rows are invisible.
    pub async fn get_application(&self, id: &str) -> Result<Option<Application>, AppError> {
        let row = sqlx::query("SELECT doc FROM applications WHERE id = ? AND is_deleted = 0")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(application_from_row).transpose()
    }

    async fn get_application_required(&self, id: &str) -> Result<Application, AppError> {
        self.get_application(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Application not found".to_string()))
    }

    /// A candidate's own applications, newest first.
    pub async fn list_candidate_applications(
        &self,
        candidate_id: &str,
        params: &ApplicationListParams,
    ) -> Result<(Vec<Application>, i64), AppError> {
        self.list_applications("candidate_id", candidate_id, params)
            .await
    }

    /// Applications for one posting, employer-facing.
    pub async fn list_job_applications(
        &self,
        job_id: &str,
        employer_id: &str,
        params: &ApplicationListParams,
    ) -> Result<(Vec<Application>, i64), AppError> {
        let job = self
            .get_job(job_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;
        if job.employer != employer_id {
            return Err(AppError::Authorization(
                "You do not own this job posting".to_string(),
            ));
        }
        self.list_applications("job_id", job_id, params).await
    }

    async fn list_applications(
        &self,
        owner_column: &str,
        owner_id: &str,
        params: &ApplicationListParams,
    ) -> Result<(Vec<Application>, i64), AppError> {
        let (_, limit, offset) = page_window(params.page, params.limit);
        let status = params
            .status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("all"));

        let (count_sql, list_sql) = match status {
            Some(_) => (
                format!(
                    "SELECT COUNT(*) AS cnt FROM applications WHERE {owner_column} = ? AND is_deleted = 0 AND status = ?"
                ),
                format!(
                    "SELECT doc FROM applications WHERE {owner_column} = ? AND is_deleted = 0 AND status = ? ORDER BY applied_at DESC LIMIT ? OFFSET ?"
                ),
            ),
            None => (
                format!(
                    "SELECT COUNT(*) AS cnt FROM applications WHERE {owner_column} = ? AND is_deleted = 0"
                ),
                format!(
                    "SELECT doc FROM applications WHERE {owner_column} = ? AND is_deleted = 0 ORDER BY applied_at DESC LIMIT ? OFFSET ?"
                ),
            ),
        };

        let mut count_query = sqlx::query(&count_sql).bind(owner_id);
        let mut list_query = sqlx::query(&list_sql).bind(owner_id);
        if let Some(status) = status {
            count_query = count_query.bind(status.to_string());
            list_query = list_query.bind(status.to_string());
        }

        let total: i64 = count_query.fetch_one(&self.pool).await?.get("cnt");
        let rows = list_query
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let applications = rows
            .iter()
            .map(application_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((applications, total))
    }

    /// Employer transitions an application to a new status.
    pub async fn update_application_status(
        &self,
        id: &str,
        employer_id: &str,
        request: &UpdateStatusRequest,
    ) -> Result<Application, AppError> {
        let mut application = self.get_application_required(id).await?;
        if application.employer != employer_id {
            return Err(AppError::Authorization(
                "You do not own this application".to_string(),
            ));
        }

        let effect = lifecycle::record_transition(
            &mut application,
            request.status,
            request.note.clone(),
            Some(employer_id.to_string()),
            Utc::now(),
        )?;
        self.save_application(&application).await?;
        if let Some(effect) = effect {
            self.apply_counter_effect(&application.job, effect).await?;
        }

        if let Some(job) = self.get_job(&application.job).await? {
            notify::dispatch_status_change(&application.candidate, &job.job_title, request.status);
        }
        Ok(application)
    }

    /// Employer schedules an interview.
    pub async fn schedule_interview(
        &self,
        id: &str,
        employer_id: &str,
        request: ScheduleInterviewRequest,
    ) -> Result<Application, AppError> {
        let mut application = self.get_application_required(id).await?;
        if application.employer != employer_id {
            return Err(AppError::Authorization(
                "You do not own this application".to_string(),
            ));
        }

        lifecycle::schedule_interview(
            &mut application,
            request,
            Some(employer_id.to_string()),
            Utc::now(),
        )?;
        self.save_application(&application).await?;

        if let Some(job) = self.get_job(&application.job).await? {
            notify::dispatch_status_change(
                &application.candidate,
                &job.job_title,
                ApplicationStatus::Interview,
            );
        }
        Ok(application)
    }

    /// Candidate withdraws their application.
    pub async fn withdraw_application(
        &self,
        id: &str,
        candidate_id: &str,
        reason: Option<String>,
    ) -> Result<Application, AppError> {
        let mut application = self.get_application_required(id).await?;
        if application.candidate != candidate_id {
            return Err(AppError::Authorization(
                "This is not your application".to_string(),
            ));
        }

        let effect = lifecycle::withdraw(&mut application, reason, Utc::now())?;
        self.save_application(&application).await?;
        self.apply_counter_effect(&application.job, effect).await?;
        Ok(application)
    }

    /// Employer attaches a note.
    pub async fn add_application_note(
        &self,
        id: &str,
        employer_id: &str,
        request: &AddNoteRequest,
    ) -> Result<Application, AppError> {
        if request.text.trim().is_empty() {
            return Err(AppError::Validation("Note text is required".to_string()));
        }
        let mut application = self.get_application_required(id).await?;
        if application.employer != employer_id {
            return Err(AppError::Authorization(
                "You do not own this application".to_string(),
            ));
        }

        lifecycle::add_note(
            &mut application,
            request.text.clone(),
            employer_id.to_string(),
            Utc::now(),
        );
        self.save_application(&application).await?;
        Ok(application)
    }

    /// Employer opens an application: records the first view.
    pub async fn mark_application_viewed(
        &self,
        id: &str,
        employer_id: &str,
    ) -> Result<Application, AppError> {
        let mut application = self.get_application_required(id).await?;
        if application.employer != employer_id {
            return Err(AppError::Authorization(
                "You do not own this application".to_string(),
            ));
        }

        if !application.viewed_by_employer {
            lifecycle::mark_viewed(&mut application, Utc::now());
            self.save_application(&application).await?;
        }
        Ok(application)
    }

    /// Per-status counts for one posting. Includes withdrawn rows.
    pub async fn job_application_stats(&self, job_id: &str) -> Result<StatusCounts, AppError> {
        self.application_stats("job_id", job_id).await
    }

    /// Per-status counts across all of an employer's postings.
    pub async fn employer_application_stats(
        &self,
        employer_id: &str,
    ) -> Result<StatusCounts, AppError> {
        self.application_stats("employer_id", employer_id).await
    }

    async fn application_stats(
        &self,
        owner_column: &str,
        owner_id: &str,
    ) -> Result<StatusCounts, AppError> {
        let sql = format!(
            "SELECT status, COUNT(*) AS cnt FROM applications WHERE {owner_column} = ? GROUP BY status"
        );
        let rows = sqlx::query(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

        let mut counts = StatusCounts::default();
        for row in rows {
            let status: String = row.get("status");
            if let Some(status) = ApplicationStatus::parse(&status) {
                counts.record(status, row.get("cnt"));
            }
        }
        Ok(counts)
    }

    // ==================== PROFILE OPERATIONS ====================

    /// Get a candidate profile by user ID.
    pub async fn get_candidate_profile(
        &self,
        user_id: &str,
    ) -> Result<Option<CandidateProfile>, AppError> {
        let row = sqlx::query("SELECT doc FROM candidate_profiles WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| serde_json::from_str(r.get::<String, _>("doc").as_str()))
            .transpose()
            .map_err(Into::into)
    }

    /// Create or merge-update a candidate profile, rescoring on every save.
    pub async fn upsert_candidate_profile(
        &self,
        user_id: &str,
        update: CandidateProfileUpdate,
    ) -> Result<CandidateProfile, AppError> {
        let now = Utc::now();
        let mut profile = self
            .get_candidate_profile(user_id)
            .await?
            .unwrap_or_else(|| CandidateProfile::empty(user_id.to_string(), now));

        profile.apply_update(update, now);
        let completion = scoring::score_candidate(&profile);
        profile.completion_percentage = completion.percentage;
        profile.is_profile_complete = completion.is_complete;

        let doc = serde_json::to_string(&profile)?;
        sqlx::query(
            r#"
            INSERT INTO candidate_profiles (
                user_id, full_name, title, biography, gender, nationality, location,
                profile_public, is_profile_complete, completion_percentage, last_updated, doc
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (user_id) DO UPDATE SET
                full_name = excluded.full_name,
                title = excluded.title,
                biography = excluded.biography,
                gender = excluded.gender,
                nationality = excluded.nationality,
                location = excluded.location,
                profile_public = excluded.profile_public,
                is_profile_complete = excluded.is_profile_complete,
                completion_percentage = excluded.completion_percentage,
                last_updated = excluded.last_updated,
                doc = excluded.doc
            "#,
        )
        .bind(user_id)
        .bind(&profile.personal_info.full_name)
        .bind(&profile.personal_info.title)
        .bind(&profile.profile_details.biography)
        .bind(&profile.profile_details.gender)
        .bind(&profile.profile_details.nationality)
        .bind(&profile.account_settings.contact.location)
        .bind(profile.account_settings.privacy.profile_public as i32)
        .bind(profile.is_profile_complete as i32)
        .bind(profile.completion_percentage as i64)
        .bind(profile.last_updated.to_rfc3339())
        .bind(&doc)
        .execute(&self.pool)
        .await?;

        self.ensure_user(user_id, "candidate").await?;
        self.sync_profile_complete(user_id, profile.is_profile_complete)
            .await?;
        Ok(profile)
    }

    /// Drop a candidate profile and reset the owning user's completion flag.
    /// Returns whether a profile existed.
    pub async fn delete_candidate_profile(&self, user_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM candidate_profiles WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Ok(false);
        }
        self.sync_profile_complete(user_id, false).await?;
        Ok(true)
    }

    /// Get an employer profile by user ID.
    pub async fn get_employer_profile(
        &self,
        user_id: &str,
    ) -> Result<Option<EmployerProfile>, AppError> {
        let row = sqlx::query("SELECT doc FROM employer_profiles WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| serde_json::from_str(r.get::<String, _>("doc").as_str()))
            .transpose()
            .map_err(Into::into)
    }

    /// Create or merge-update an employer profile, rescoring on every save.
    pub async fn upsert_employer_profile(
        &self,
        user_id: &str,
        update: EmployerProfileUpdate,
    ) -> Result<EmployerProfile, AppError> {
        let now = Utc::now();
        let mut profile = self
            .get_employer_profile(user_id)
            .await?
            .unwrap_or_else(|| EmployerProfile::empty(user_id.to_string(), now));

        profile.apply_update(update, now);
        let completion = scoring::score_employer(&profile);
        profile.completion_percentage = completion.percentage;
        profile.is_profile_complete = completion.is_complete;

        let doc = serde_json::to_string(&profile)?;
        sqlx::query(
            r#"
            INSERT INTO employer_profiles (
                user_id, company_name, industry, organization_type, location, about_us,
                is_profile_complete, completion_percentage, last_updated, doc
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (user_id) DO UPDATE SET
                company_name = excluded.company_name,
                industry = excluded.industry,
                organization_type = excluded.organization_type,
                location = excluded.location,
                about_us = excluded.about_us,
                is_profile_complete = excluded.is_profile_complete,
                completion_percentage = excluded.completion_percentage,
                last_updated = excluded.last_updated,
                doc = excluded.doc
            "#,
        )
        .bind(user_id)
        .bind(&profile.company_info.company_name)
        .bind(&profile.company_info.industry)
        .bind(&profile.founding_info.organization_type)
        .bind(&profile.contact.location)
        .bind(&profile.company_info.about_us)
        .bind(profile.is_profile_complete as i32)
        .bind(profile.completion_percentage as i64)
        .bind(profile.last_updated.to_rfc3339())
        .bind(&doc)
        .execute(&self.pool)
        .await?;

        self.ensure_user(user_id, "employer").await?;
        self.sync_profile_complete(user_id, profile.is_profile_complete)
            .await?;
        Ok(profile)
    }

    /// Drop an employer profile and reset the owning user's completion flag.
    /// Returns whether a profile existed.
    pub async fn delete_employer_profile(&self, user_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM employer_profiles WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Ok(false);
        }
        self.sync_profile_complete(user_id, false).await?;
        Ok(true)
    }

    /// Employer-facing candidate directory search.
    pub async fn search_candidates(
        &self,
        params: &CandidateSearchParams,
    ) -> Result<(Vec<CandidateProfile>, i64), AppError> {
        let clause = params.filter();
        let (_, limit, offset) = page_window(params.page, params.limit);

        let count_sql = format!(
            "SELECT COUNT(*) AS cnt FROM candidate_profiles{}",
            clause.where_sql()
        );
        let total: i64 = bind_args(sqlx::query(&count_sql), &clause.args)
            .fetch_one(&self.pool)
            .await?
            .get("cnt");

        let sql = format!(
            "SELECT doc FROM candidate_profiles{} ORDER BY completion_percentage DESC LIMIT ? OFFSET ?",
            clause.where_sql()
        );
        let rows = bind_args(sqlx::query(&sql), &clause.args)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let profiles = rows
            .iter()
            .map(|r| serde_json::from_str(r.get::<String, _>("doc").as_str()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((profiles, total))
    }

    /// Public employer directory search.
    pub async fn search_employers(
        &self,
        params: &EmployerSearchParams,
    ) -> Result<(Vec<EmployerProfile>, i64), AppError> {
        let clause = params.filter();
        let (_, limit, offset) = page_window(params.page, params.limit);

        let count_sql = format!(
            "SELECT COUNT(*) AS cnt FROM employer_profiles{}",
            clause.where_sql()
        );
        let total: i64 = bind_args(sqlx::query(&count_sql), &clause.args)
            .fetch_one(&self.pool)
            .await?
            .get("cnt");

        let sql = format!(
            "SELECT doc FROM employer_profiles{} ORDER BY company_name LIMIT ? OFFSET ?",
            clause.where_sql()
        );
        let rows = bind_args(sqlx::query(&sql), &clause.args)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let profiles = rows
            .iter()
            .map(|r| serde_json::from_str(r.get::<String, _>("doc").as_str()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((profiles, total))
    }

    // ==================== SAVED ITEM OPERATIONS ====================

    /// Bookmark a job for a user.
    pub async fn save_job_for_user(
        &self,
        user_id: &str,
        job_id: &str,
    ) -> Result<SavedJob, AppError> {
        self.get_job(job_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;

        let saved = SavedJob {
            id: uuid::Uuid::new_v4().to_string(),
            user: user_id.to_string(),
            job: job_id.to_string(),
            saved_at: Utc::now(),
        };

        let result = sqlx::query(
            "INSERT OR IGNORE INTO saved_jobs (id, user_id, job_id, saved_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&saved.id)
        .bind(user_id)
        .bind(job_id)
        .bind(saved.saved_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::Conflict("Job already saved".to_string()));
        }
        Ok(saved)
    }

    /// Whether a user has bookmarked a given job.
    pub async fn is_job_saved(&self, user_id: &str, job_id: &str) -> Result<bool, AppError> {
        let row = sqlx::query("SELECT 1 AS hit FROM saved_jobs WHERE user_id = ? AND job_id = ?")
            .bind(user_id)
            .bind(job_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    /// How many jobs a user has bookmarked.
    pub async fn count_saved_jobs(&self, user_id: &str) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT COUNT(*) AS cnt FROM saved_jobs WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("cnt"))
    }

    /// Remove a job bookmark. Returns whether anything was removed.
    pub async fn unsave_job_for_user(&self, user_id: &str, job_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM saved_jobs WHERE user_id = ? AND job_id = ?")
            .bind(user_id)
            .bind(job_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// A user's bookmarked jobs, newest bookmark first.
    pub async fn list_saved_jobs(
        &self,
        user_id: &str,
        params: &PageParams,
    ) -> Result<(Vec<Job>, i64), AppError> {
        let (_, limit, offset) = page_window(params.page, params.limit);

        let total: i64 = sqlx::query("SELECT COUNT(*) AS cnt FROM saved_jobs WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?
            .get("cnt");

        let rows = sqlx::query(
            r#"
            SELECT jobs.* FROM saved_jobs
            JOIN jobs ON jobs.id = saved_jobs.job_id
            WHERE saved_jobs.user_id = ?
            ORDER BY saved_jobs.saved_at DESC LIMIT ? OFFSET ?
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let jobs = rows
            .iter()
            .map(job_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((jobs, total))
    }

    /// Bookmark a candidate for an employer.
    pub async fn save_candidate_for_employer(
        &self,
        employer_id: &str,
        candidate_id: &str,
        note: Option<String>,
    ) -> Result<SavedCandidate, AppError> {
        self.get_candidate_profile(candidate_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Candidate not found".to_string()))?;

        let saved = SavedCandidate {
            id: uuid::Uuid::new_v4().to_string(),
            employer: employer_id.to_string(),
            candidate: candidate_id.to_string(),
            note,
            saved_at: Utc::now(),
        };

        let result = sqlx::query(
            "INSERT OR IGNORE INTO saved_candidates (id, employer_id, candidate_id, note, saved_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&saved.id)
        .bind(employer_id)
        .bind(candidate_id)
        .bind(&saved.note)
        .bind(saved.saved_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::Conflict("Candidate already saved".to_string()));
        }
        Ok(saved)
    }

    /// Remove a candidate bookmark.
    pub async fn unsave_candidate_for_employer(
        &self,
        employer_id: &str,
        candidate_id: &str,
    ) -> Result<bool, AppError> {
        let result =
            sqlx::query("DELETE FROM saved_candidates WHERE employer_id = ? AND candidate_id = ?")
                .bind(employer_id)
                .bind(candidate_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// An employer's bookmarked candidates.
    pub async fn list_saved_candidates(
        &self,
        employer_id: &str,
        params: &PageParams,
    ) -> Result<(Vec<SavedCandidate>, i64), AppError> {
        let (_, limit, offset) = page_window(params.page, params.limit);

        let total: i64 =
            sqlx::query("SELECT COUNT(*) AS cnt FROM saved_candidates WHERE employer_id = ?")
                .bind(employer_id)
                .fetch_one(&self.pool)
                .await?
                .get("cnt");

        let rows = sqlx::query(
            "SELECT * FROM saved_candidates WHERE employer_id = ? ORDER BY saved_at DESC LIMIT ? OFFSET ?",
        )
        .bind(employer_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let saved = rows
            .iter()
            .map(saved_candidate_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((saved, total))
    }

    // ==================== SEARCH HISTORY OPERATIONS ====================

    /// Record a search: upsert per (user, normalized query).
    pub async fn record_search(
        &self,
        user_id: &str,
        request: &SaveSearchRequest,
    ) -> Result<SearchHistoryEntry, AppError> {
        let query = request.search_query.trim().to_lowercase();
        if query.chars().count() < 2 {
            return Err(AppError::Validation(
                "Search query must be at least 2 characters".to_string(),
            ));
        }

        let now = Utc::now();
        let filters = request.filters.clone().unwrap_or_default();
        let filters_json = serde_json::to_string(&filters)?;
        let results_count = request.results_count.unwrap_or(0);
        let id = uuid::Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO search_history (
                id, user_id, search_query, filters, results_count, search_count,
                last_searched_at, created_at
            ) VALUES (?, ?, ?, ?, ?, 1, ?, ?)
            ON CONFLICT (user_id, search_query) DO UPDATE SET
                search_count = search_count + 1,
                filters = excluded.filters,
                results_count = excluded.results_count,
                last_searched_at = excluded.last_searched_at
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(&query)
        .bind(&filters_json)
        .bind(results_count)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await?;

        let row = sqlx::query("SELECT * FROM search_history WHERE user_id = ? AND search_query = ?")
            .bind(user_id)
            .bind(&query)
            .fetch_one(&self.pool)
            .await?;
        search_entry_from_row(&row)
    }

    /// A user's recent searches.
    pub async fn list_search_history(
        &self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<SearchHistoryEntry>, AppError> {
        let rows = sqlx::query(
            "SELECT * FROM search_history WHERE user_id = ? ORDER BY last_searched_at DESC LIMIT ?",
        )
        .bind(user_id)
        .bind(limit.clamp(1, 100))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(search_entry_from_row).collect()
    }

    /// Delete one search entry. Returns whether anything was removed.
    pub async fn delete_search_entry(&self, user_id: &str, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM search_history WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Clear a user's whole history.
    pub async fn clear_search_history(&self, user_id: &str) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM search_history WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Most-searched queries across all users.
    pub async fn popular_searches(&self, limit: i64) -> Result<Vec<PopularSearch>, AppError> {
        let rows = sqlx::query(
            r#"
            SELECT search_query, SUM(search_count) AS total, COUNT(DISTINCT user_id) AS users
            FROM search_history
            GROUP BY search_query
            ORDER BY total DESC
            LIMIT ?
            "#,
        )
        .bind(limit.clamp(1, 50))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| PopularSearch {
                query: row.get("search_query"),
                total_searches: row.get("total"),
                unique_users: row.get("users"),
            })
            .collect())
    }

    /// Queries searched within a recent window, busiest first.
    pub async fn trending_searches(
        &self,
        window_days: i64,
        limit: i64,
    ) -> Result<Vec<TrendingSearch>, AppError> {
        let since = Utc::now() - Duration::days(window_days.clamp(1, 90));
        let rows = sqlx::query(
            r#"
            SELECT search_query, COUNT(*) AS recent
            FROM search_history
            WHERE last_searched_at >= ?
            GROUP BY search_query
            ORDER BY recent DESC
            LIMIT ?
            "#,
        )
        .bind(since.to_rfc3339())
        .bind(limit.clamp(1, 50))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| TrendingSearch {
                query: row.get("search_query"),
                recent_searches: row.get("recent"),
            })
            .collect())
    }

    /// Prefix suggestions from recorded queries.
    pub async fn search_suggestions(
        &self,
        prefix: &str,
        limit: i64,
    ) -> Result<Vec<String>, AppError> {
        let prefix = prefix.trim().to_lowercase();
        if prefix.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(
            r#"
            SELECT search_query FROM search_history
            WHERE search_query LIKE ?
            GROUP BY search_query
            ORDER BY SUM(search_count) DESC
            LIMIT ?
            "#,
        )
        .bind(format!("{prefix}%"))
        .bind(limit.clamp(1, 20))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| row.get("search_query"))
            .collect())
    }
}

/// Merge the optional fields of an update request into a job.
fn apply_job_update(job: &mut Job, request: &UpdateJobRequest) {
    if let Some(v) = &request.job_title {
        job.job_title = v.clone();
    }
    if let Some(v) = &request.job_description {
        job.job_description = v.clone();
    }
    if let Some(v) = &request.job_type {
        job.job_type = v.clone();
    }
    if let Some(v) = request.min_salary {
        job.salary_range.min = v;
    }
    if let Some(v) = request.max_salary {
        job.salary_range.max = v;
    }
    if let Some(v) = &request.currency {
        job.salary_range.currency = v.clone();
    }
    if let Some(v) = request.is_negotiable {
        job.salary_range.is_negotiable = v;
    }
    if let Some(v) = &request.country {
        job.location.country = v.clone();
    }
    if let Some(v) = &request.city {
        job.location.city = v.clone();
    }
    if let Some(v) = &request.state {
        job.location.state = v.clone();
    }
    if let Some(v) = &request.zip_code {
        job.location.zip_code = v.clone();
    }
    if let Some(v) = &request.address {
        job.location.address = v.clone();
    }
    if let Some(v) = request.is_remote {
        job.location.is_remote = v;
    }
    if let Some(v) = &request.experience_level {
        job.experience_level = v.clone();
    }
    if let Some(v) = &request.education_level {
        job.education_level = v.clone();
    }
    if let Some(v) = request.vacancies {
        job.vacancies = v;
    }
    if let Some(v) = &request.job_category {
        job.job_category = v.clone();
    }
    if let Some(v) = &request.tags {
        job.tags = v.clone();
    }
    if let Some(v) = &request.benefits {
        job.benefits = v.clone();
    }
    if let Some(v) = &request.application_method {
        job.application_method = v.clone();
    }
    if let Some(v) = &request.application_email {
        job.application_email = Some(v.clone());
    }
    if let Some(v) = &request.application_url {
        job.application_url = Some(v.clone());
    }
    if let Some(v) = request.expiration_date {
        job.expiration_date = v;
    }
    if let Some(v) = request.status {
        job.status = v;
    }
}

/// Bind accumulated filter arguments onto a query, in order.
fn bind_args<'q>(mut query: SqliteQuery<'q>, args: &'q [SqlArg]) -> SqliteQuery<'q> {
    for arg in args {
        query = match arg {
            SqlArg::Text(s) => query.bind(s.as_str()),
            SqlArg::Int(i) => query.bind(*i),
        };
    }
    query
}

/// Parse a job row: document plus the authoritative column scalars.
fn job_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Job, AppError> {
    let doc: String = row.get("doc");
    let mut job: Job = serde_json::from_str(&doc)?;

    // counters and status mutate through column updates, columns win
    job.views = row.get("views");
    job.applications_count = row.get("applications_count");
    job.hired_count = row.get("hired_count");
    let status: String = row.get("status");
    if let Some(status) = JobStatus::parse(&status) {
        job.status = status;
    }
    Ok(job)
}

fn application_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Application, AppError> {
    let doc: String = row.get("doc");
    Ok(serde_json::from_str(&doc)?)
}

fn saved_candidate_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<SavedCandidate, AppError> {
    Ok(SavedCandidate {
        id: row.get("id"),
        employer: row.get("employer_id"),
        candidate: row.get("candidate_id"),
        note: row.get("note"),
        saved_at: parse_datetime(row.get("saved_at"))?,
    })
}

fn search_entry_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<SearchHistoryEntry, AppError> {
    let filters: String = row.get("filters");
    let filters: SearchFilters = serde_json::from_str(&filters)?;
    Ok(SearchHistoryEntry {
        id: row.get("id"),
        user: row.get("user_id"),
        search_query: row.get("search_query"),
        filters,
        results_count: row.get("results_count"),
        search_count: row.get("search_count"),
        last_searched_at: parse_datetime(row.get("last_searched_at"))?,
        created_at: parse_datetime(row.get("created_at"))?,
    })
}

fn parse_datetime(value: String) -> Result<DateTime<Utc>, AppError> {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::Internal(format!("Invalid timestamp in database: {e}")))
}
