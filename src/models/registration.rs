// src/models/registration.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'registrations' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub id: i64,
    pub fullname: String,
    /// Unique; also the key results are matched on.
    pub email: String,
    pub dob: String,
    pub contact: String,
    pub gender: String,
    pub school: String,
    pub registered_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for registering a candidate. Every field is required.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 100))]
    pub fullname: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 254))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 32))]
    pub dob: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 32))]
    pub contact: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 32))]
    pub gender: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 200))]
    pub school: String,
}
