// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// Global Application Error Enum.
/// Centralizes error handling of the REST layer and mapping to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    AuthError(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict (e.g., email already registered)
    Conflict(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::AuthError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        };
        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Converts `sqlx::Error` into `AppError::InternalServerError`.
/// Allows using `?` operator on database queries.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

/// Errors raised by the exam session core.
///
/// None of these are fatal: each one is scoped to the current attempt and
/// surfaced to the candidate as a notice.
#[derive(Debug)]
pub enum SessionError {
    /// The operation needs a running session.
    NotRunning,

    /// `start()` was called on a session that already left `NotStarted`.
    AlreadyStarted,

    /// The question set is empty, so there is nothing to navigate.
    NoQuestions,

    /// An identity field required for submission is absent from storage.
    MissingIdentity { field: &'static str },

    /// The question source could not be fetched or parsed.
    QuestionSource(String),

    /// The submission endpoint answered with a non-success status.
    SubmissionRejected { status: u16, message: String },

    /// The submission never reached the endpoint or the reply was unreadable.
    SubmissionFailed(String),

    /// Session-scoped storage could not be read or written.
    Storage(String),

    /// The text surface refused the change (read-only).
    Surface(String),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::NotRunning => write!(f, "The exam is not running."),
            SessionError::AlreadyStarted => write!(f, "The exam has already been started."),
            SessionError::NoQuestions => write!(f, "No questions are available for this exam."),
            SessionError::MissingIdentity { field } => write!(
                f,
                "Could not find user information ({} is missing). Cannot submit results.",
                field
            ),
            SessionError::QuestionSource(msg) => write!(f, "Failed to load questions: {}", msg),
            SessionError::SubmissionRejected { status, message } => write!(
                f,
                "Submission rejected with status {}: {}",
                status, message
            ),
            SessionError::SubmissionFailed(msg) => write!(f, "Submission failed: {}", msg),
            SessionError::Storage(msg) => write!(f, "Storage error: {}", msg),
            SessionError::Surface(msg) => write!(f, "Editor error: {}", msg),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<reqwest::Error> for SessionError {
    fn from(err: reqwest::Error) -> Self {
        SessionError::SubmissionFailed(err.to_string())
    }
}

impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        SessionError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        SessionError::Storage(err.to_string())
    }
}
