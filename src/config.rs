// src/config.rs

use std::env;
use std::time::Duration;

use dotenvy::dotenv;

/// Server-side configuration for the collaborator backend.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub rust_log: String,
    pub bind_addr: String,
    /// JSON file served as the question source.
    pub questions_file: String,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://exam-portal.db?mode=rwc".to_string());

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:5000".to_string());

        let questions_file = env::var("QUESTIONS_FILE")
            .unwrap_or_else(|_| "Backend/all_questions.json".to_string());

        Self {
            database_url,
            rust_log,
            bind_addr,
            questions_file,
            admin_email: env::var("ADMIN_EMAIL").ok(),
            admin_password: env::var("ADMIN_PASSWORD").ok(),
        }
    }
}

/// Default exam length: two hours.
pub const DEFAULT_EXAM_DURATION_SECS: u64 = 2 * 60 * 60;

/// Quiescence window for editor autosave.
pub const DEFAULT_AUTOSAVE_DELAY: Duration = Duration::from_secs(2);

/// Tunables of one exam attempt on the client side.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub duration_secs: u64,
    pub autosave_delay: Duration,
    pub exam_name: String,
    /// Prefix applied to every draft key; cleared wholesale at `start()`.
    pub storage_scope: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration_secs: DEFAULT_EXAM_DURATION_SECS,
            autosave_delay: DEFAULT_AUTOSAVE_DELAY,
            exam_name: "Coding Round".to_string(),
            storage_scope: String::new(),
        }
    }
}

impl SessionConfig {
    pub fn from_env() -> Self {
        dotenv().ok();

        let default = Self::default();
        Self {
            duration_secs: env::var("EXAM_DURATION_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.duration_secs),
            autosave_delay: env::var("AUTOSAVE_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(default.autosave_delay),
            exam_name: env::var("EXAM_NAME").unwrap_or(default.exam_name),
            storage_scope: env::var("STORAGE_SCOPE").unwrap_or(default.storage_scope),
        }
    }
}
