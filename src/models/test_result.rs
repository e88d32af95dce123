// src/models/test_result.rs

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};

/// One entry of a result's per-question breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionAnalysis {
    pub question_id: u32,
    pub status: String,
}

/// Represents the 'test_results' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub id: i64,
    pub registration_id: String,
    pub candidate_email: String,
    pub exam_name: String,
    pub status: String,
    pub total_questions: i64,
    pub solved_questions: i64,
    pub unsolved_questions: i64,
    pub total_score: i64,
    pub correct_answers: i64,
    pub wrong_answers: i64,
    /// Stored as a JSON text column.
    pub questions_analysis: Json<Vec<QuestionAnalysis>>,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
}

/// Body posted by the exam client when a session finishes.
///
/// Only `registrationId` is mandatory; counters default to zero.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTestResultRequest {
    pub registration_id: Option<String>,
    #[serde(default)]
    pub candidate_email: String,
    #[serde(default)]
    pub exam_name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub total_questions: i64,
    #[serde(default)]
    pub solved_questions: i64,
    #[serde(default)]
    pub unsolved_questions: i64,
    #[serde(default)]
    pub total_score: i64,
    #[serde(default)]
    pub correct_answers: i64,
    #[serde(default)]
    pub wrong_answers: i64,
    #[serde(default)]
    pub questions_analysis: Vec<QuestionAnalysis>,
}

#[derive(Debug, Deserialize)]
pub struct ResultsQuery {
    pub email: Option<String>,
}
