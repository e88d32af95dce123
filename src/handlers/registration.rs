// src/handlers/registration.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{error::AppError, models::registration::RegisterRequest};

/// Registers a candidate for the exam.
///
/// Returns 201 Created with the new registration id, which the exam client
/// keeps as `registrationId` alongside the email.
pub async fn register(
    State(pool): State<SqlitePool>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.validate().is_err() {
        tracing::warn!("Registration rejected: missing required fields");
        return Err(AppError::BadRequest("All fields are required.".to_string()));
    }

    let existing = sqlx::query_scalar::<_, i64>("SELECT id FROM registrations WHERE email = ?")
        .bind(&payload.email)
        .fetch_optional(&pool)
        .await?;

    if existing.is_some() {
        tracing::warn!("Registration attempt for existing email: {}", payload.email);
        return Err(AppError::Conflict("Email already registered.".to_string()));
    }

    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO registrations (fullname, email, dob, contact, gender, school, registered_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(&payload.fullname)
    .bind(&payload.email)
    .bind(&payload.dob)
    .bind(&payload.contact)
    .bind(&payload.gender)
    .bind(&payload.school)
    .bind(chrono::Utc::now())
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        // Lost a race with a concurrent registration of the same email.
        if e.as_database_error().is_some_and(|db| db.is_unique_violation()) {
            AppError::Conflict("Email already registered.".to_string())
        } else {
            tracing::error!("Failed to register candidate: {:?}", e);
            AppError::from(e)
        }
    })?;

    tracing::info!("New candidate registered with id {}", id);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Registration successful!",
            "id": id,
            "email": payload.email,
        })),
    ))
}
