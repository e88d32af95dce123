// src/session/mod.rs

//! Exam session controller.
//!
//! One `ExamSession` owns everything an attempt needs: the loaded question
//! set, the navigation tracker, the draft store, the countdown and the two
//! text surfaces (code editor and output pane). All operations take
//! `&mut self`, so calls are serialised by construction; `driver` feeds them
//! from a single task.

pub mod debounce;
pub mod drafts;
pub mod driver;
pub mod question;
pub mod runner;
pub mod storage;
pub mod submission;
pub mod surface;
pub mod timer;
pub mod tracker;

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::Instant;

use crate::config::SessionConfig;
use crate::error::SessionError;

use self::drafts::{DraftRecord, DraftStore};
use self::question::{QuestionDefinition, QuestionSet};
use self::runner::{Language, OUTPUT_PLACEHOLDER, OutputLine};
use self::storage::{KeyValueStorage, read_identity};
use self::submission::{SubmissionPayload, SubmissionReceipt, Submitter};
use self::surface::TextSurface;
use self::timer::{Countdown, Tick};
use self::tracker::{NavigationTracker, QuestionStatus, SessionPhase, StatusCounts};

pub use self::driver::{SessionCommand, SessionDriver, SessionHandle};

/// Page the candidate is sent to once results are stored.
pub const RESULTS_VIEW: &str = "Dashboard.html";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// What the session tells the UI.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SessionEvent {
    Notice { level: NoticeLevel, message: String },
    QuestionShown { number: u32, title: String },
    StatusChanged { active: u32, counts: StatusCounts },
    Clock { remaining: u64, display: String },
    Redirect { target: String },
}

/// Who ended the exam. Both paths run the same protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishTrigger {
    Candidate,
    TimeUp,
}

/// Result of `finish()` once the precondition passed (or was already met).
#[derive(Debug)]
pub enum FinishOutcome {
    /// The endpoint acknowledged the result.
    Submitted(SubmissionReceipt),
    /// The session is finished but the result was not stored. No retry.
    Undelivered(SessionError),
    /// `finish()` had already run; nothing happened.
    AlreadyFinished,
}

/// Delivery state of the final result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Acknowledged(SubmissionReceipt),
    Failed(String),
}

/// Read-only snapshot for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub phase: SessionPhase,
    pub total_questions: u32,
    pub active_question: u32,
    pub visited: Vec<u32>,
    pub answered: Vec<u32>,
    pub counts: StatusCounts,
    /// Navigation panel colour of each question, in order.
    pub panel: Vec<QuestionStatus>,
    pub remaining_secs: u64,
    pub clock: String,
}

pub struct ExamSession {
    config: SessionConfig,
    questions: QuestionSet,
    phase: SessionPhase,
    tracker: NavigationTracker,
    drafts: DraftStore,
    countdown: Countdown,
    editor: Box<dyn TextSurface>,
    output: Box<dyn TextSurface>,
    language: Language,
    delivery: Option<Delivery>,
    events: UnboundedSender<SessionEvent>,
}

impl ExamSession {
    pub fn new(
        config: SessionConfig,
        questions: QuestionSet,
        storage: Box<dyn KeyValueStorage>,
        editor: Box<dyn TextSurface>,
        output: Box<dyn TextSurface>,
        events: UnboundedSender<SessionEvent>,
    ) -> Self {
        let drafts = DraftStore::new(storage, config.storage_scope.clone(), config.autosave_delay);
        Self {
            tracker: NavigationTracker::new(questions.len()),
            countdown: Countdown::new(config.duration_secs),
            config,
            questions,
            phase: SessionPhase::NotStarted,
            drafts,
            editor,
            output,
            language: Language::default(),
            delivery: None,
            events,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn active_question(&self) -> u32 {
        self.tracker.active()
    }

    pub fn tracker(&self) -> &NavigationTracker {
        &self.tracker
    }

    pub fn drafts(&self) -> &DraftStore {
        &self.drafts
    }

    pub fn remaining_secs(&self) -> u64 {
        self.countdown.remaining()
    }

    pub fn is_clock_running(&self) -> bool {
        self.countdown.is_running()
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn delivery(&self) -> Option<&Delivery> {
        self.delivery.as_ref()
    }

    pub fn current_question(&self) -> Option<&QuestionDefinition> {
        self.questions.get(self.tracker.active())
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            phase: self.phase,
            total_questions: self.tracker.total(),
            active_question: self.tracker.active(),
            visited: self.tracker.visited().iter().copied().collect(),
            answered: self.tracker.answered().iter().copied().collect(),
            counts: self.tracker.counts(),
            panel: (1..=self.tracker.total())
                .map(|id| self.tracker.status_of(id))
                .collect(),
            remaining_secs: self.countdown.remaining(),
            clock: self.countdown.display(),
        }
    }

    fn emit(&self, event: SessionEvent) {
        // A UI that went away is not the session's problem.
        let _ = self.events.send(event);
    }

    pub(crate) fn notify(&self, level: NoticeLevel, message: impl Into<String>) {
        self.emit(SessionEvent::Notice {
            level,
            message: message.into(),
        });
    }

    fn emit_question_shown(&self) {
        let title = self
            .current_question()
            .map(|q| q.title.clone())
            .unwrap_or_default();
        self.emit(SessionEvent::QuestionShown {
            number: self.tracker.active(),
            title,
        });
    }

    fn emit_status(&self) {
        self.emit(SessionEvent::StatusChanged {
            active: self.tracker.active(),
            counts: self.tracker.counts(),
        });
    }

    fn emit_clock(&self) {
        self.emit(SessionEvent::Clock {
            remaining: self.countdown.remaining(),
            display: self.countdown.display(),
        });
    }

    fn ensure_running(&self) -> Result<(), SessionError> {
        match self.phase {
            SessionPhase::Running => Ok(()),
            _ => Err(SessionError::NotRunning),
        }
    }

    fn snapshot(&self) -> DraftRecord {
        DraftRecord::new(self.editor.text(), self.output.text())
    }

    /// Synchronous save of the active question, bypassing the autosave delay.
    fn save_active(&mut self) -> Result<(), SessionError> {
        let record = self.snapshot();
        self.drafts.save(self.tracker.active(), &record)
    }

    fn show_draft(&mut self, draft: DraftRecord) {
        self.language = Language::default();
        if draft.code.is_empty() {
            self.editor.set_text(self.language.template());
        } else {
            self.editor.set_text(&draft.code);
        }
        if draft.output.is_empty() {
            self.output.set_text(OUTPUT_PLACEHOLDER);
        } else {
            self.output.set_text(&draft.output);
        }
    }

    /// `NotStarted -> Running`.
    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.phase != SessionPhase::NotStarted {
            return Err(SessionError::AlreadyStarted);
        }
        if self.questions.is_empty() {
            tracing::warn!("Refusing to start an exam without questions");
            self.notify(NoticeLevel::Error, SessionError::NoQuestions.to_string());
            return Err(SessionError::NoQuestions);
        }

        let purged = self.drafts.purge()?;
        tracing::debug!("Cleared {} stale drafts", purged);

        self.tracker.begin();
        self.countdown.start(self.config.duration_secs);
        self.phase = SessionPhase::Running;

        self.editor.set_read_only(false);
        self.show_draft(DraftRecord::default());

        tracing::info!(
            "Exam started: {} questions, {} on the clock",
            self.tracker.total(),
            self.countdown.display()
        );
        self.emit_question_shown();
        self.emit_status();
        self.emit_clock();
        Ok(())
    }

    /// Navigates to question `id`.
    ///
    /// Returns `Ok(false)` without touching any state when `id` is out of
    /// range; stale UI handlers may send such requests.
    pub fn go_to(&mut self, id: u32) -> Result<bool, SessionError> {
        self.ensure_running()?;
        if !self.tracker.in_bounds(id) {
            tracing::debug!("Ignoring navigation to question {} (out of range)", id);
            return Ok(false);
        }

        // Read the target before moving so a storage error leaves navigation untouched.
        self.save_active()?;
        let draft = self.drafts.load(id)?.unwrap_or_default();
        self.tracker.visit(id);
        self.show_draft(draft);

        tracing::info!("Navigated to question {}", id);
        self.emit_question_shown();
        self.emit_status();
        Ok(true)
    }

    /// Moves one question forward; on the last question it only tells the candidate.
    pub fn next(&mut self) -> Result<bool, SessionError> {
        self.ensure_running()?;
        match self.tracker.next() {
            Some(id) => self.go_to(id),
            None => {
                self.notify(NoticeLevel::Info, "This is the last question.");
                Ok(false)
            }
        }
    }

    /// Marks the active question answered and advances when not on the last one.
    pub fn submit_current(&mut self) -> Result<u32, SessionError> {
        self.ensure_running()?;

        let id = self.tracker.mark_answered();
        tracing::info!("Answer submitted for question {}", id);
        self.emit_status();

        if let Some(next) = self.tracker.next() {
            self.go_to(next)?;
        }
        Ok(id)
    }

    /// Switches language, replacing the editor text with that language's template.
    pub fn change_language(&mut self, language: Language) -> Result<(), SessionError> {
        self.ensure_running()?;
        self.save_active()?;
        self.language = language;
        self.editor.set_text(language.template());
        tracing::info!("Language changed to: {}", language);
        Ok(())
    }

    /// Runs the editor content through the simulated runner into the output pane.
    pub fn run_code(&mut self, now: Instant) -> Result<Vec<OutputLine>, SessionError> {
        self.ensure_running()?;

        let code = self.editor.text();
        let lines = runner::simulate_run(&code, self.language);
        let header = format!(
            "[{}] Compiling and executing {} code...",
            chrono::Local::now().format("%H:%M:%S"),
            self.language.as_str().to_uppercase()
        );
        self.output
            .set_text(&format!("{}\n{}", header, runner::render(&lines)));

        self.content_changed(now);
        Ok(lines)
    }

    /// Editor or output changed: queue a debounced save for the active question.
    pub fn content_changed(&mut self, now: Instant) {
        if self.phase != SessionPhase::Running || self.editor.is_read_only() {
            return;
        }
        let record = self.snapshot();
        self.drafts.schedule(self.tracker.active(), record, now);
    }

    pub fn next_autosave(&self) -> Option<Instant> {
        self.drafts.next_deadline()
    }

    pub fn flush_due_drafts(&mut self, now: Instant) -> Result<usize, SessionError> {
        self.drafts.flush_due(now)
    }

    /// One second of exam time. `Tick::Expired` means the caller must finish.
    pub fn tick(&mut self) -> Tick {
        if self.phase != SessionPhase::Running {
            return Tick::Idle;
        }
        let tick = self.countdown.tick();
        match tick {
            Tick::Remaining(_) => self.emit_clock(),
            Tick::Expired => {
                tracing::warn!("Time is up");
                self.emit_clock();
            }
            Tick::Idle => {}
        }
        tick
    }

    /// `Running -> Finished`, then hands the result to `submitter`.
    ///
    /// Fails without changing anything when the candidate identity is not in
    /// storage. Once past that check the session is finished for good: a
    /// failed hand-off is reported as `Undelivered` and not retried.
    pub async fn finish(
        &mut self,
        trigger: FinishTrigger,
        submitter: &dyn Submitter,
    ) -> Result<FinishOutcome, SessionError> {
        match self.phase {
            SessionPhase::Finished => return Ok(FinishOutcome::AlreadyFinished),
            SessionPhase::NotStarted => return Err(SessionError::NotRunning),
            SessionPhase::Running => {}
        }

        let identity = match read_identity(self.drafts.storage()) {
            Ok(identity) => identity,
            Err(e) => {
                tracing::error!("Cannot finish exam: {}", e);
                self.notify(NoticeLevel::Error, e.to_string());
                return Err(e);
            }
        };

        self.countdown.stop();
        self.phase = SessionPhase::Finished;
        tracing::info!("Exam finished ({:?}) with {} left", trigger, self.countdown.display());

        if let Err(e) = self.save_active() {
            tracing::error!("Failed to flush draft for question {}: {}", self.tracker.active(), e);
        }
        self.editor.set_read_only(true);

        let payload = SubmissionPayload::build(&identity, &self.config.exam_name, &self.tracker);
        tracing::info!(
            "Submitting results for {}: {} answered of {}",
            payload.candidate_email,
            payload.solved_questions,
            payload.total_questions
        );

        match submitter.submit(&payload).await {
            Ok(receipt) => {
                tracing::info!("Test results submitted successfully: id {}", receipt.id);
                self.delivery = Some(Delivery::Acknowledged(receipt.clone()));
                self.notify(
                    NoticeLevel::Success,
                    "Exam completed! Your answers have been submitted.",
                );
                self.emit(SessionEvent::Redirect {
                    target: RESULTS_VIEW.to_string(),
                });
                Ok(FinishOutcome::Submitted(receipt))
            }
            Err(e) => {
                tracing::error!("Failed to submit test results: {}", e);
                self.delivery = Some(Delivery::Failed(e.to_string()));
                self.notify(
                    NoticeLevel::Error,
                    "An error occurred while submitting your test results.",
                );
                Ok(FinishOutcome::Undelivered(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    use super::question::sample_questions;
    use super::storage::{MemoryStorage, REGISTRATION_ID_KEY, USER_EMAIL_KEY};
    use super::surface::BufferSurface;
    use super::*;

    #[derive(Default)]
    struct RecordingSubmitter {
        calls: AtomicUsize,
        payloads: Mutex<Vec<SubmissionPayload>>,
        fail: bool,
    }

    #[async_trait]
    impl Submitter for RecordingSubmitter {
        async fn submit(
            &self,
            payload: &SubmissionPayload,
        ) -> Result<SubmissionReceipt, SessionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.payloads.lock().unwrap().push(payload.clone());
            if self.fail {
                Err(SessionError::SubmissionRejected {
                    status: 500,
                    message: "Internal server error".to_string(),
                })
            } else {
                Ok(SubmissionReceipt {
                    message: "Test results submitted successfully!".to_string(),
                    id: 1,
                })
            }
        }
    }

    struct Fixture {
        session: ExamSession,
        storage: MemoryStorage,
        editor: BufferSurface,
        events: UnboundedReceiver<SessionEvent>,
    }

    fn fixture(total: u32, with_identity: bool) -> Fixture {
        let mut storage = MemoryStorage::new();
        if with_identity {
            storage.set(USER_EMAIL_KEY, "candidate@example.com").unwrap();
            storage.set(REGISTRATION_ID_KEY, "reg-1").unwrap();
        }
        let editor = BufferSurface::new("");
        let (tx, rx) = mpsc::unbounded_channel();
        let session = ExamSession::new(
            SessionConfig::default(),
            QuestionSet::new(sample_questions(total)),
            Box::new(storage.clone()),
            Box::new(editor.clone()),
            Box::new(BufferSurface::new("")),
            tx,
        );
        Fixture {
            session,
            storage,
            editor,
            events: rx,
        }
    }

    fn drain(events: &mut UnboundedReceiver<SessionEvent>) -> Vec<SessionEvent> {
        let mut out = Vec::new();
        while let Ok(event) = events.try_recv() {
            out.push(event);
        }
        out
    }

    fn assert_counts_sum(session: &ExamSession) {
        let status = session.status();
        assert_eq!(status.counts.total(), status.total_questions);
        assert!(session.tracker().answered().is_subset(session.tracker().visited()));
    }

    #[test]
    fn start_positions_on_first_question() {
        let mut f = fixture(12, true);
        f.session.start().unwrap();

        let status = f.session.status();
        assert_eq!(status.phase, SessionPhase::Running);
        assert_eq!(status.active_question, 1);
        assert_eq!(status.visited, vec![1]);
        assert_eq!(status.remaining_secs, 7200);
        assert_eq!(status.clock, "02:00:00");
        assert_eq!(f.editor.text(), Language::Cpp.template());
        assert_counts_sum(&f.session);
    }

    #[test]
    fn navigation_reports_title_and_panel_colours() {
        let mut f = fixture(4, true);
        f.session.start().unwrap();
        f.session.submit_current().unwrap();
        f.session.go_to(4).unwrap();

        let shown: Vec<(u32, String)> = drain(&mut f.events)
            .into_iter()
            .filter_map(|e| match e {
                SessionEvent::QuestionShown { number, title } => Some((number, title)),
                _ => None,
            })
            .collect();
        assert_eq!(
            shown,
            vec![
                (1, "Question 1".to_string()),
                (2, "Question 2".to_string()),
                (4, "Question 4".to_string()),
            ]
        );

        assert_eq!(
            f.session.status().panel,
            vec![
                QuestionStatus::Answered,
                QuestionStatus::Visited,
                QuestionStatus::NotVisited,
                QuestionStatus::Visited,
            ]
        );
    }

    #[test]
    fn unreadable_draft_loads_template_and_is_not_overwritten() {
        let mut f = fixture(3, true);
        f.session.start().unwrap();
        f.editor.edit("answer for one").unwrap();

        // Another page writes a raw value after the start-up purge.
        f.storage.set("question_2", "legacy raw code").unwrap();

        assert!(f.session.go_to(2).unwrap());
        assert_eq!(f.session.active_question(), 2);
        assert_eq!(f.editor.text(), Language::Cpp.template());

        assert!(f.session.go_to(3).unwrap());
        let stored = f.storage.get("question_2").unwrap().unwrap();
        assert!(!stored.contains("answer for one"));
        let one = f.session.drafts().load(1).unwrap().unwrap();
        assert_eq!(one.code, "answer for one");
    }

    #[test]
    fn start_twice_is_rejected() {
        let mut f = fixture(3, true);
        f.session.start().unwrap();
        assert!(matches!(f.session.start(), Err(SessionError::AlreadyStarted)));
    }

    #[test]
    fn start_without_questions_reports_and_stays_put() {
        let mut f = fixture(0, true);
        assert!(matches!(f.session.start(), Err(SessionError::NoQuestions)));
        assert_eq!(f.session.phase(), SessionPhase::NotStarted);
        assert!(drain(&mut f.events).iter().any(|e| matches!(
            e,
            SessionEvent::Notice {
                level: NoticeLevel::Error,
                ..
            }
        )));
    }

    #[test]
    fn start_clears_drafts_of_previous_attempt() {
        let mut f = fixture(3, true);
        f.storage
            .set("question_2", r#"{"code":"old answer","output":""}"#)
            .unwrap();

        f.session.start().unwrap();
        f.session.go_to(2).unwrap();
        assert_eq!(f.editor.text(), Language::Cpp.template());
    }

    #[test]
    fn out_of_range_navigation_is_silently_ignored() {
        let mut f = fixture(12, true);
        f.session.start().unwrap();

        assert!(f.session.go_to(5).unwrap());
        assert!(!f.session.go_to(150).unwrap());
        assert!(!f.session.go_to(0).unwrap());

        let status = f.session.status();
        assert_eq!(status.active_question, 5);
        assert_eq!(status.visited, vec![1, 5]);
        assert_counts_sum(&f.session);
    }

    #[test]
    fn navigation_before_start_is_refused() {
        let mut f = fixture(3, true);
        assert!(matches!(f.session.go_to(2), Err(SessionError::NotRunning)));
        assert!(matches!(f.session.submit_current(), Err(SessionError::NotRunning)));
    }

    #[test]
    fn drafts_follow_the_candidate_between_questions() {
        let mut f = fixture(4, true);
        f.session.start().unwrap();

        f.editor.edit("answer one").unwrap();
        f.session.go_to(2).unwrap();
        assert_eq!(f.editor.text(), Language::Cpp.template());

        f.editor.edit("answer two").unwrap();
        f.session.go_to(1).unwrap();
        assert_eq!(f.editor.text(), "answer one");

        f.session.go_to(2).unwrap();
        assert_eq!(f.editor.text(), "answer two");
    }

    #[test]
    fn submit_current_advances_until_last() {
        let mut f = fixture(12, true);
        f.session.start().unwrap();

        assert_eq!(f.session.submit_current().unwrap(), 1);
        assert_eq!(f.session.active_question(), 2);

        f.session.go_to(12).unwrap();
        assert_eq!(f.session.submit_current().unwrap(), 12);
        assert_eq!(f.session.active_question(), 12);
        assert!(f.session.tracker().answered().contains(&12));
        assert_counts_sum(&f.session);
    }

    #[test]
    fn next_on_last_question_only_notifies() {
        let mut f = fixture(2, true);
        f.session.start().unwrap();
        assert!(f.session.next().unwrap());
        drain(&mut f.events);

        assert!(!f.session.next().unwrap());
        assert_eq!(f.session.active_question(), 2);
        assert_eq!(
            drain(&mut f.events),
            vec![SessionEvent::Notice {
                level: NoticeLevel::Info,
                message: "This is the last question.".to_string()
            }]
        );
    }

    #[test]
    fn change_language_loads_template_after_saving() {
        let mut f = fixture(2, true);
        f.session.start().unwrap();
        f.editor.edit("int main() { return 1; }").unwrap();

        f.session.change_language(Language::Python).unwrap();
        assert_eq!(f.editor.text(), Language::Python.template());
        assert_eq!(
            f.session.drafts().load(1).unwrap().map(|d| d.code),
            Some("int main() { return 1; }".to_string())
        );
    }

    #[test]
    fn run_code_writes_output_and_schedules_autosave() {
        let mut f = fixture(2, true);
        f.session.start().unwrap();
        f.editor.edit("#include <iostream>\nint main() { cout << \"hi\"; }").unwrap();

        let now = Instant::now();
        let lines = f.session.run_code(now).unwrap();
        assert!(lines.iter().any(|l| l.text == "Output: hi"));
        assert!(f.session.drafts().has_pending(1));

        f.session
            .flush_due_drafts(now + SessionConfig::default().autosave_delay)
            .unwrap();
        let draft = f.session.drafts().load(1).unwrap().unwrap();
        assert!(draft.output.contains("Output: hi"));
    }

    #[test]
    fn ticks_count_down_and_expire_once() {
        let mut f = fixture(1, true);
        f.session.config.duration_secs = 2;
        assert_eq!(f.session.tick(), Tick::Idle);

        f.session.start().unwrap();
        assert_eq!(f.session.tick(), Tick::Remaining(1));
        assert_eq!(f.session.tick(), Tick::Expired);
        assert_eq!(f.session.tick(), Tick::Idle);
        assert_eq!(f.session.remaining_secs(), 0);
    }

    #[tokio::test]
    async fn finish_submits_once_and_freezes() {
        let mut f = fixture(12, true);
        let submitter = RecordingSubmitter::default();
        f.session.start().unwrap();
        f.session.submit_current().unwrap();
        f.editor.edit("last words").unwrap();

        let outcome = f.session.finish(FinishTrigger::Candidate, &submitter).await.unwrap();

        assert!(matches!(outcome, FinishOutcome::Submitted(_)));
        assert_eq!(f.session.phase(), SessionPhase::Finished);
        assert!(!f.session.is_clock_running());
        assert!(f.editor.is_read_only());
        assert!(f.editor.edit("more").is_err());
        assert_eq!(submitter.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            f.session.drafts().load(2).unwrap().map(|d| d.code),
            Some("last words".to_string())
        );

        let payload = submitter.payloads.lock().unwrap()[0].clone();
        assert_eq!(payload.registration_id, "reg-1");
        assert_eq!(payload.solved_questions, 1);
        assert_eq!(payload.unsolved_questions, 11);

        let events = drain(&mut f.events);
        assert!(events.contains(&SessionEvent::Redirect {
            target: RESULTS_VIEW.to_string()
        }));

        // Re-entry is a no-op.
        let again = f.session.finish(FinishTrigger::TimeUp, &submitter).await.unwrap();
        assert!(matches!(again, FinishOutcome::AlreadyFinished));
        assert_eq!(submitter.calls.load(Ordering::SeqCst), 1);
        assert_eq!(f.session.tick(), Tick::Idle);
    }

    #[tokio::test]
    async fn finish_without_identity_changes_nothing() {
        let mut f = fixture(12, false);
        let submitter = RecordingSubmitter::default();
        f.session.start().unwrap();
        f.session.tick();
        drain(&mut f.events);

        let result = f.session.finish(FinishTrigger::Candidate, &submitter).await;

        assert!(matches!(result, Err(SessionError::MissingIdentity { .. })));
        assert_eq!(submitter.calls.load(Ordering::SeqCst), 0);
        assert_eq!(f.session.phase(), SessionPhase::Running);
        assert!(f.session.is_clock_running());
        assert!(!f.editor.is_read_only());
        assert!(drain(&mut f.events).iter().any(|e| matches!(
            e,
            SessionEvent::Notice {
                level: NoticeLevel::Error,
                ..
            }
        )));
    }

    /// Known gap: a failed hand-off is delivered at most once. The session
    /// stays finished and frozen, nothing is retried and the answers are
    /// not resent.
    #[tokio::test]
    async fn failed_submission_stays_finished_without_retry() {
        let mut f = fixture(3, true);
        let submitter = RecordingSubmitter {
            fail: true,
            ..Default::default()
        };
        f.session.start().unwrap();

        let outcome = f.session.finish(FinishTrigger::Candidate, &submitter).await.unwrap();

        assert!(matches!(
            outcome,
            FinishOutcome::Undelivered(SessionError::SubmissionRejected { status: 500, .. })
        ));
        assert_eq!(f.session.phase(), SessionPhase::Finished);
        assert!(f.editor.is_read_only());
        assert!(matches!(f.session.delivery(), Some(Delivery::Failed(_))));
        assert!(matches!(
            f.session.finish(FinishTrigger::Candidate, &submitter).await,
            Ok(FinishOutcome::AlreadyFinished)
        ));
        assert_eq!(submitter.calls.load(Ordering::SeqCst), 1);
        assert!(!drain(&mut f.events).iter().any(|e| matches!(e, SessionEvent::Redirect { .. })));
    }

    #[test]
    fn edits_after_finish_are_not_autosaved() {
        let mut f = fixture(2, true);
        f.session.start().unwrap();
        f.session.phase = SessionPhase::Finished;
        f.session.content_changed(Instant::now());
        assert!(f.session.next_autosave().is_none());
    }
}
