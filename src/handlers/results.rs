// src/handlers/results.rs

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use sqlx::{SqlitePool, types::Json as SqlJson};

use crate::{
    error::AppError,
    models::test_result::{ResultsQuery, SubmitTestResultRequest, TestResult},
};

/// Stores the final result of an exam attempt.
///
/// The response doubles as the client's acknowledgement: only a 201 here
/// means the attempt was recorded.
pub async fn submit_test_results(
    State(pool): State<SqlitePool>,
    Json(payload): Json<SubmitTestResultRequest>,
) -> Result<impl IntoResponse, AppError> {
    let registration_id = match payload.registration_id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => {
            tracing::warn!("Test results rejected: missing registrationId");
            return Err(AppError::BadRequest("Invalid test results data.".to_string()));
        }
    };

    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO test_results (
            registration_id, candidate_email, exam_name, status,
            total_questions, solved_questions, unsolved_questions,
            total_score, correct_answers, wrong_answers,
            questions_analysis, submitted_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(&registration_id)
    .bind(&payload.candidate_email)
    .bind(&payload.exam_name)
    .bind(&payload.status)
    .bind(payload.total_questions)
    .bind(payload.solved_questions)
    .bind(payload.unsolved_questions)
    .bind(payload.total_score)
    .bind(payload.correct_answers)
    .bind(payload.wrong_answers)
    .bind(SqlJson(&payload.questions_analysis))
    .bind(chrono::Utc::now())
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to store test results: {:?}", e);
        AppError::from(e)
    })?;

    tracing::info!(
        "Test results for {} stored with id {}",
        payload.candidate_email,
        id
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Test results submitted successfully!",
            "id": id,
        })),
    ))
}

/// Returns the most recent result stored for `?email=`.
pub async fn get_user_results(
    State(pool): State<SqlitePool>,
    Query(query): Query<ResultsQuery>,
) -> Result<Json<TestResult>, AppError> {
    let email = match query.email.as_deref() {
        Some(email) if !email.is_empty() => email,
        _ => {
            return Err(AppError::BadRequest(
                "Email query parameter is required.".to_string(),
            ));
        }
    };

    let result = sqlx::query_as::<_, TestResult>(
        r#"
        SELECT * FROM test_results
        WHERE candidate_email = ?
        ORDER BY submitted_at DESC, id DESC
        LIMIT 1
        "#,
    )
    .bind(email)
    .fetch_optional(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch results for {}: {:?}", email, e);
        AppError::from(e)
    })?
    .ok_or_else(|| AppError::NotFound("No test results found for this user.".to_string()))?;

    Ok(Json(result))
}
