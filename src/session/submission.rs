// src/session/submission.rs

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::SessionError;
use crate::session::storage::CandidateIdentity;
use crate::session::tracker::NavigationTracker;

pub const STATUS_COMPLETED: &str = "Completed";
/// Per-question status emitted while no grading exists.
pub const STATUS_UNSOLVED: &str = "Unsolved";

/// Per-question entry of the submitted result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionOutcome {
    pub question_id: u32,
    pub status: String,
}

/// The final result handed to the submission endpoint.
///
/// Correctness fields (`total_score`, `correct_answers`, `wrong_answers`)
/// and the per-question status are placeholders: nothing is graded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub registration_id: String,
    pub candidate_email: String,
    pub exam_name: String,
    pub status: String,
    pub total_questions: u32,
    pub solved_questions: u32,
    pub unsolved_questions: u32,
    pub total_score: i64,
    pub correct_answers: u32,
    pub wrong_answers: u32,
    pub questions_analysis: Vec<QuestionOutcome>,
}

impl SubmissionPayload {
    pub fn build(
        identity: &CandidateIdentity,
        exam_name: &str,
        tracker: &NavigationTracker,
    ) -> Self {
        let total = tracker.total();
        let solved = tracker.answered().len() as u32;

        let questions_analysis = tracker
            .answered()
            .iter()
            .map(|id| QuestionOutcome {
                question_id: *id,
                status: STATUS_UNSOLVED.to_string(),
            })
            .collect();

        Self {
            registration_id: identity.registration_id.clone(),
            candidate_email: identity.email.clone(),
            exam_name: exam_name.to_string(),
            status: STATUS_COMPLETED.to_string(),
            total_questions: total,
            solved_questions: solved,
            unsolved_questions: total - solved,
            total_score: 0,
            correct_answers: 0,
            wrong_answers: 0,
            questions_analysis,
        }
    }
}

/// Acknowledgement returned by the submission endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub message: String,
    pub id: i64,
}

/// Hands the final payload to whoever stores results.
#[async_trait]
pub trait Submitter: Send + Sync {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<SubmissionReceipt, SessionError>;
}

/// POSTs the payload as JSON. One attempt, no retries.
pub struct HttpSubmitter {
    client: reqwest::Client,
    url: Url,
}

impl HttpSubmitter {
    pub fn new(client: reqwest::Client, url: Url) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl Submitter for HttpSubmitter {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<SubmissionReceipt, SessionError> {
        let response = self.client.post(self.url.clone()).json(payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SessionError::SubmissionRejected {
                status: status.as_u16(),
                message,
            });
        }

        let receipt = response.json::<SubmissionReceipt>().await?;
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> CandidateIdentity {
        CandidateIdentity {
            email: "candidate@example.com".to_string(),
            registration_id: "reg-42".to_string(),
        }
    }

    #[test]
    fn payload_carries_placeholders_for_grading() {
        let mut tracker = NavigationTracker::new(12);
        tracker.begin();
        tracker.mark_answered();
        tracker.visit(5);
        tracker.mark_answered();

        let payload = SubmissionPayload::build(&identity(), "Coding Round", &tracker);

        assert_eq!(payload.status, "Completed");
        assert_eq!(payload.total_questions, 12);
        assert_eq!(payload.solved_questions, 2);
        assert_eq!(payload.unsolved_questions, 10);
        assert_eq!(payload.total_score, 0);
        assert_eq!(payload.correct_answers, 0);
        assert_eq!(payload.wrong_answers, 0);
        assert_eq!(
            payload.questions_analysis,
            vec![
                QuestionOutcome {
                    question_id: 1,
                    status: "Unsolved".to_string()
                },
                QuestionOutcome {
                    question_id: 5,
                    status: "Unsolved".to_string()
                },
            ]
        );
    }

    #[test]
    fn payload_serializes_camel_case() {
        let tracker = NavigationTracker::new(1);
        let payload = SubmissionPayload::build(&identity(), "Coding Round", &tracker);
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(value["registrationId"], "reg-42");
        assert_eq!(value["candidateEmail"], "candidate@example.com");
        assert_eq!(value["unsolvedQuestions"], 1);
        assert!(value["questionsAnalysis"].as_array().unwrap().is_empty());
    }
}
