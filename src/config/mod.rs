//! Configuration module for the job-board backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key for API authentication (required in production)
    pub api_psk: Option<String>,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Development mode: exposes technical error detail in responses
    pub dev_mode: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let api_psk = env::var("JOBBOARD_API_PSK").ok();

        let db_path = env::var("JOBBOARD_DB_PATH")
            .unwrap_or_else(|_| "./data/jobboard.sqlite".to_string())
            .into();

        let bind_addr = env::var("JOBBOARD_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .expect("Invalid JOBBOARD_BIND_ADDR format");

        let log_level = env::var("JOBBOARD_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let dev_mode = env::var("JOBBOARD_DEV_MODE")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Self {
            api_psk,
            db_path,
            bind_addr,
            log_level,
            dev_mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // Clear any existing env vars
        env::remove_var("JOBBOARD_API_PSK");
        env::remove_var("JOBBOARD_DB_PATH");
        env::remove_var("JOBBOARD_BIND_ADDR");
        env::remove_var("JOBBOARD_LOG_LEVEL");
        env::remove_var("JOBBOARD_DEV_MODE");

        let config = Config::from_env();

        assert!(config.api_psk.is_none());
        assert_eq!(config.db_path, PathBuf::from("./data/jobboard.sqlite"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
        assert!(!config.dev_mode);
    }
}
