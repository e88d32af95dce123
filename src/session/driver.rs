// src/session/driver.rs

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::{Instant, MissedTickBehavior};

use crate::session::runner::Language;
use crate::session::submission::Submitter;
use crate::session::surface::TextSurface;
use crate::session::timer::Tick;
use crate::session::tracker::SessionPhase;
use crate::session::{ExamSession, FinishOutcome, FinishTrigger, NoticeLevel};

const TICK_PERIOD: Duration = Duration::from_secs(1);

/// UI actions, queued in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Start,
    GoTo(u32),
    Next,
    SubmitCurrent,
    ChangeLanguage(Language),
    RunCode,
    /// The editor or output pane changed.
    ContentChanged,
    Finish,
}

/// Cloneable sender side used by UI code and editor listeners.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: UnboundedSender<SessionCommand>,
}

impl SessionHandle {
    /// Returns `false` once the driver has stopped.
    pub fn send(&self, command: SessionCommand) -> bool {
        self.tx.send(command).is_ok()
    }

    /// Wires a surface's change notification into the command queue.
    pub fn watch(&self, surface: &mut dyn TextSurface) {
        let tx = self.tx.clone();
        surface.on_change(Box::new(move |_| {
            let _ = tx.send(SessionCommand::ContentChanged);
        }));
    }
}

/// Runs one session on the current task.
///
/// The one-second tick, autosave deadlines and UI commands are all
/// multiplexed here, so no two session operations ever overlap. The loop
/// ends (and the ticker with it) as soon as the session is finished, or
/// when every handle has been dropped.
pub struct SessionDriver {
    session: ExamSession,
    submitter: Arc<dyn Submitter>,
    commands: UnboundedReceiver<SessionCommand>,
}

impl SessionDriver {
    pub fn new(session: ExamSession, submitter: Arc<dyn Submitter>) -> (Self, SessionHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let driver = Self {
            session,
            submitter,
            commands: rx,
        };
        (driver, SessionHandle { tx })
    }

    pub async fn run(mut self) -> ExamSession {
        let mut ticker = tokio::time::interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let ticking = self.session.is_clock_running();
            let autosave_at = self.session.next_autosave();

            tokio::select! {
                _ = ticker.tick(), if ticking => {
                    if self.session.tick() == Tick::Expired {
                        self.finish(FinishTrigger::TimeUp).await;
                    }
                }
                _ = sleep_until(autosave_at), if autosave_at.is_some() => {
                    if let Err(e) = self.session.flush_due_drafts(Instant::now()) {
                        tracing::error!("Auto-save failed: {}", e);
                        self.session.notify(NoticeLevel::Error, e.to_string());
                    }
                }
                command = self.commands.recv() => match command {
                    Some(command) => {
                        let started = command == SessionCommand::Start;
                        self.handle(command).await;
                        if started && self.session.is_clock_running() {
                            ticker.reset();
                        }
                    }
                    None => {
                        tracing::info!("All session handles dropped, stopping driver");
                        break;
                    }
                },
            }

            if self.session.phase() == SessionPhase::Finished {
                break;
            }
        }

        self.session
    }

    async fn handle(&mut self, command: SessionCommand) {
        let now = Instant::now();
        let result = match command {
            SessionCommand::Start => self.session.start(),
            SessionCommand::GoTo(id) => self.session.go_to(id).map(drop),
            SessionCommand::Next => self.session.next().map(drop),
            SessionCommand::SubmitCurrent => self.session.submit_current().map(drop),
            SessionCommand::ChangeLanguage(language) => self.session.change_language(language),
            SessionCommand::RunCode => self.session.run_code(now).map(drop),
            SessionCommand::ContentChanged => {
                self.session.content_changed(now);
                Ok(())
            }
            SessionCommand::Finish => {
                self.finish(FinishTrigger::Candidate).await;
                Ok(())
            }
        };

        if let Err(e) = result {
            tracing::warn!("Command rejected: {}", e);
            self.session.notify(NoticeLevel::Error, e.to_string());
        }
    }

    async fn finish(&mut self, trigger: FinishTrigger) {
        let submitter = Arc::clone(&self.submitter);
        match self.session.finish(trigger, submitter.as_ref()).await {
            Ok(FinishOutcome::Submitted(_)) | Ok(FinishOutcome::AlreadyFinished) => {}
            Ok(FinishOutcome::Undelivered(e)) => {
                tracing::warn!("Session finished but results were not stored: {}", e);
            }
            // The session already reported it and is still running.
            Err(e) => tracing::debug!("Finish aborted: {}", e),
        }
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
