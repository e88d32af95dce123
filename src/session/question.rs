// src/session/question.rs

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::SessionError;

/// One input/expected-output pair shown under a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub input: String,
    pub expected_output: String,
}

/// A coding question as published by the question source.
/// Immutable for the lifetime of the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDefinition {
    /// 1-based position, also the identity used for navigation and drafts.
    pub question_number: u32,
    pub title: String,
    pub description: String,
    pub difficulty: String,
    pub topic: String,
    #[serde(default)]
    pub test_cases: Vec<TestCase>,
}

/// The ordered question list of one attempt.
#[derive(Debug, Clone, Default)]
pub struct QuestionSet {
    questions: Vec<QuestionDefinition>,
}

impl QuestionSet {
    pub fn new(questions: Vec<QuestionDefinition>) -> Self {
        Self { questions }
    }

    pub fn len(&self) -> u32 {
        self.questions.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Looks a question up by its 1-based position.
    pub fn get(&self, number: u32) -> Option<&QuestionDefinition> {
        let index = number.checked_sub(1)? as usize;
        self.questions.get(index)
    }
}

/// Where the question list comes from.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<QuestionDefinition>, SessionError>;
}

/// Fetches the question list as a static JSON resource over HTTP.
pub struct HttpQuestionSource {
    client: reqwest::Client,
    url: Url,
}

impl HttpQuestionSource {
    pub fn new(client: reqwest::Client, url: Url) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl QuestionSource for HttpQuestionSource {
    async fn fetch(&self) -> Result<Vec<QuestionDefinition>, SessionError> {
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| SessionError::QuestionSource(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SessionError::QuestionSource(format!(
                "HTTP error! status: {}",
                response.status().as_u16()
            )));
        }

        response
            .json::<Vec<QuestionDefinition>>()
            .await
            .map_err(|e| SessionError::QuestionSource(e.to_string()))
    }
}

/// Reads the question list from a local JSON file.
pub struct FileQuestionSource {
    path: PathBuf,
}

impl FileQuestionSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl QuestionSource for FileQuestionSource {
    async fn fetch(&self) -> Result<Vec<QuestionDefinition>, SessionError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| SessionError::QuestionSource(format!("{}: {}", self.path.display(), e)))?;
        serde_json::from_str(&raw).map_err(|e| SessionError::QuestionSource(e.to_string()))
    }
}

/// Loads the question set once for a session.
///
/// Never fails: any fetch or parse error is logged and yields an empty set,
/// which the session then reports as "no questions".
pub async fn load_questions(source: &dyn QuestionSource) -> QuestionSet {
    match source.fetch().await {
        Ok(questions) => {
            tracing::info!("Successfully loaded {} questions", questions.len());
            QuestionSet::new(questions)
        }
        Err(e) => {
            tracing::error!("Failed to load questions: {}", e);
            tracing::warn!("Falling back to empty question set");
            QuestionSet::default()
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_questions(count: u32) -> Vec<QuestionDefinition> {
    (1..=count)
        .map(|n| QuestionDefinition {
            question_number: n,
            title: format!("Question {}", n),
            description: format!("Solve problem {}", n),
            difficulty: "Easy".to_string(),
            topic: "Arrays".to_string(),
            test_cases: vec![TestCase {
                input: "1 2".to_string(),
                expected_output: "3".to_string(),
            }],
        })
        .collect()
}
