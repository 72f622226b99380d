//! Database module for SQLite persistence.
//!
//! SQLite is the source of truth. Filterable scalars live in real columns;
//! nested sections round-trip through a JSON `doc` column per row.

mod repository;

pub use repository::*;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            role TEXT NOT NULL,
            is_profile_complete INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS jobs (
            id TEXT PRIMARY KEY,
            employer_id TEXT NOT NULL,
            job_title TEXT NOT NULL,
            job_description TEXT NOT NULL,
            job_type TEXT NOT NULL,
            job_category TEXT NOT NULL,
            experience_level TEXT NOT NULL,
            education_level TEXT NOT NULL,
            min_salary INTEGER NOT NULL DEFAULT 0,
            max_salary INTEGER NOT NULL DEFAULT 0,
            country TEXT NOT NULL DEFAULT '',
            city TEXT NOT NULL DEFAULT '',
            tags TEXT NOT NULL DEFAULT '',
            posted_date TEXT NOT NULL,
            expiration_date TEXT NOT NULL,
            status TEXT NOT NULL,
            views INTEGER NOT NULL DEFAULT 0,
            applications_count INTEGER NOT NULL DEFAULT 0,
            hired_count INTEGER NOT NULL DEFAULT 0,
            doc TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS applications (
            id TEXT PRIMARY KEY,
            job_id TEXT NOT NULL,
            candidate_id TEXT NOT NULL,
            employer_id TEXT NOT NULL,
            status TEXT NOT NULL,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            applied_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            doc TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS candidate_profiles (
            user_id TEXT PRIMARY KEY,
            full_name TEXT,
            title TEXT,
            biography TEXT,
            gender TEXT,
            nationality TEXT,
            location TEXT,
            profile_public INTEGER NOT NULL DEFAULT 1,
            is_profile_complete INTEGER NOT NULL DEFAULT 0,
            completion_percentage INTEGER NOT NULL DEFAULT 0,
            last_updated TEXT NOT NULL,
            doc TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS employer_profiles (
            user_id TEXT PRIMARY KEY,
            company_name TEXT,
            industry TEXT,
            organization_type TEXT,
            location TEXT,
            about_us TEXT,
            is_profile_complete INTEGER NOT NULL DEFAULT 0,
            completion_percentage INTEGER NOT NULL DEFAULT 0,
            last_updated TEXT NOT NULL,
            doc TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS saved_jobs (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            job_id TEXT NOT NULL,
            saved_at TEXT NOT NULL,
            UNIQUE (user_id, job_id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS saved_candidates (
            id TEXT PRIMARY KEY,
            employer_id TEXT NOT NULL,
            candidate_id TEXT NOT NULL,
            note TEXT,
            saved_at TEXT NOT NULL,
            UNIQUE (employer_id, candidate_id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS search_history (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            search_query TEXT NOT NULL,
            filters TEXT NOT NULL DEFAULT '{}',
            results_count INTEGER NOT NULL DEFAULT 0,
            search_count INTEGER NOT NULL DEFAULT 1,
            last_searched_at TEXT NOT NULL,
            created_at TEXT NOT NULL,
            UNIQUE (user_id, search_query)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // One live application per (job, candidate); withdrawn rows don't block re-applying
    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_applications_live
            ON applications(job_id, candidate_id) WHERE is_deleted = 0;
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_jobs_status ON jobs(status);
        CREATE INDEX IF NOT EXISTS idx_jobs_employer ON jobs(employer_id);
        CREATE INDEX IF NOT EXISTS idx_jobs_posted_date ON jobs(posted_date);
        CREATE INDEX IF NOT EXISTS idx_applications_job ON applications(job_id);
        CREATE INDEX IF NOT EXISTS idx_applications_candidate ON applications(candidate_id);
        CREATE INDEX IF NOT EXISTS idx_applications_employer ON applications(employer_id);
        CREATE INDEX IF NOT EXISTS idx_search_history_recent ON search_history(last_searched_at);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
