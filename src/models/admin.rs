// src/models/admin.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'admins' table in the database.
#[derive(Debug, Clone, FromRow)]
pub struct Admin {
    pub id: i64,
    pub email: String,
    /// Argon2 PHC string.
    pub password: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// One row of the admin dashboard: a registration joined with its latest result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardRow {
    pub name: String,
    pub email: String,
    /// `None` while the candidate has not submitted.
    pub final_score: Option<i64>,
    pub correct_questions: i64,
    pub incorrect_questions: i64,
    pub unsolved_questions: i64,
}
