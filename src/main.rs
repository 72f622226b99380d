//! Job Board Backend
//!
//! A production-grade REST backend for a job board with SQLite persistence.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod filters;
mod lifecycle;
mod models;
mod notify;
mod scoring;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::Repository;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Job Board Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Warn if PSK is not configured
    if config.api_psk.is_none() {
        tracing::warn!("No API PSK configured (JOBBOARD_API_PSK). Authentication is disabled!");
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    // Expire stale postings left over from downtime
    let corrected = repo.correct_expired_jobs().await?;
    if corrected > 0 {
        tracing::info!("Expired {} stale job postings", corrected);
    }

    // Create application state
    let state = AppState {
        repo,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Clone PSK for the auth layer
    let psk = state.config.api_psk.clone();

    // API routes
    let api_routes = Router::new()
        // Jobs
        .route("/jobs", get(api::search_jobs))
        .route("/jobs", post(api::create_job))
        .route("/jobs/mine", get(api::list_my_jobs))
        .route("/jobs/expire-stale", post(api::expire_stale_jobs))
        .route("/jobs/{id}", get(api::get_job))
        .route("/jobs/{id}", put(api::update_job))
        .route("/jobs/{id}", delete(api::delete_job))
        .route("/jobs/{id}/stats", get(api::job_stats))
        .route("/jobs/{id}/recount", post(api::recount_job_applications))
        .route("/jobs/{id}/applications", get(api::list_job_applications))
        // Applications
        .route("/applications", post(api::apply))
        .route("/applications/mine", get(api::list_my_applications))
        .route("/applications/stats", get(api::employer_application_stats))
        .route("/applications/{id}", get(api::get_application))
        .route(
            "/applications/{id}/status",
            put(api::update_application_status),
        )
        .route(
            "/applications/{id}/interview",
            post(api::schedule_interview),
        )
        .route(
            "/applications/{id}/withdraw",
            post(api::withdraw_application),
        )
        .route("/applications/{id}/notes", post(api::add_application_note))
        // Candidate profiles
        .route("/candidates", get(api::search_candidates))
        .route("/candidates/me", get(api::get_my_candidate_profile))
        .route("/candidates/me", put(api::update_my_candidate_profile))
        .route("/candidates/me", delete(api::delete_my_candidate_profile))
        .route("/candidates/{id}", get(api::get_candidate_profile))
        // Employer profiles
        .route("/employers", get(api::search_employers))
        .route("/employers/me", get(api::get_my_employer_profile))
        .route("/employers/me", put(api::update_my_employer_profile))
        .route("/employers/me", delete(api::delete_my_employer_profile))
        .route("/employers/{id}", get(api::get_employer_profile))
        // Saved jobs and candidates
        .route("/saved-jobs", get(api::list_saved_jobs))
        .route("/saved-jobs/count", get(api::count_saved_jobs))
        .route("/saved-jobs/{job_id}", post(api::save_job))
        .route("/saved-jobs/{job_id}", delete(api::unsave_job))
        .route("/saved-jobs/{job_id}/check", get(api::check_saved_job))
        .route("/saved-candidates", get(api::list_saved_candidates))
        .route("/saved-candidates/{candidate_id}", post(api::save_candidate))
        .route(
            "/saved-candidates/{candidate_id}",
            delete(api::unsave_candidate),
        )
        // Search history
        .route("/search-history", post(api::record_search))
        .route("/search-history", get(api::list_search_history))
        .route("/search-history", delete(api::clear_search_history))
        .route("/search-history/popular", get(api::popular_searches))
        .route("/search-history/trending", get(api::trending_searches))
        .route("/search-history/suggestions", get(api::search_suggestions))
        .route("/search-history/{id}", delete(api::delete_search_entry))
        // Apply PSK auth middleware
        .layer(middleware::from_fn(move |req, next| {
            auth::auth_layer(psk.clone(), req, next)
        }));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;
