// src/handlers/admin.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::{
        admin::{Admin, AdminLoginRequest, DashboardRow},
        registration::Registration,
        test_result::TestResult,
    },
    utils::hash::verify_password,
};

const STATUS_PASSED: &str = "Passed";
const STATUS_FAILED: &str = "Failed";

/// Lists every registration with the outcome of its latest attempt.
pub async fn dashboard(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let registrations =
        sqlx::query_as::<_, Registration>("SELECT * FROM registrations ORDER BY id")
            .fetch_all(&pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list registrations: {:?}", e);
                AppError::from(e)
            })?;

    let results = sqlx::query_as::<_, TestResult>(
        "SELECT * FROM test_results ORDER BY submitted_at DESC, id DESC",
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list test results: {:?}", e);
        AppError::from(e)
    })?;

    tracing::debug!(
        "Dashboard over {} registrations and {} results",
        registrations.len(),
        results.len()
    );

    Ok((StatusCode::OK, Json(build_dashboard(&registrations, &results))))
}

/// Joins registrations with results by email. `results` must be ordered
/// newest first so the latest attempt wins.
pub fn build_dashboard(
    registrations: &[Registration],
    results: &[TestResult],
) -> Vec<DashboardRow> {
    registrations
        .iter()
        .map(|registration| {
            let latest = results
                .iter()
                .find(|r| r.candidate_email == registration.email);

            match latest {
                Some(result) => {
                    let count = |status: &str| {
                        result
                            .questions_analysis
                            .iter()
                            .filter(|q| q.status == status)
                            .count() as i64
                    };
                    DashboardRow {
                        name: registration.fullname.clone(),
                        email: registration.email.clone(),
                        final_score: Some(result.total_score),
                        correct_questions: count(STATUS_PASSED),
                        incorrect_questions: count(STATUS_FAILED),
                        unsolved_questions: result.unsolved_questions,
                    }
                }
                None => DashboardRow {
                    name: registration.fullname.clone(),
                    email: registration.email.clone(),
                    final_score: None,
                    correct_questions: 0,
                    incorrect_questions: 0,
                    unsolved_questions: 0,
                },
            }
        })
        .collect()
}

/// Checks admin credentials against the stored argon2 hash.
pub async fn login(
    State(pool): State<SqlitePool>,
    Json(payload): Json<AdminLoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let admin = sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE email = ?")
        .bind(&payload.email)
        .fetch_optional(&pool)
        .await?;

    let valid = match admin {
        Some(admin) => verify_password(&payload.password, &admin.password)?,
        None => false,
    };

    if !valid {
        tracing::info!("Failed admin login attempt for {}", payload.email);
        return Err(AppError::AuthError("Invalid email or password".to_string()));
    }

    tracing::info!("Admin {} logged in", payload.email);
    Ok((StatusCode::OK, Json(json!({ "message": "Login successful" }))))
}
