// src/session/drafts.rs

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::error::SessionError;
use crate::session::debounce::Debouncer;
use crate::session::storage::KeyValueStorage;

/// A candidate's in-progress code and last run output for one question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftRecord {
    pub code: String,
    pub output: String,
}

impl DraftRecord {
    pub fn new(code: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            output: output.into(),
        }
    }
}

/// Per-question draft persistence with debounced autosave.
///
/// Owns the storage handle: the identity fields written by the registration
/// flow live in the same storage and are only read through `storage()`.
pub struct DraftStore {
    storage: Box<dyn KeyValueStorage>,
    scope: String,
    debouncer: Debouncer<u32, DraftRecord>,
}

impl DraftStore {
    pub fn new(
        storage: Box<dyn KeyValueStorage>,
        scope: impl Into<String>,
        delay: Duration,
    ) -> Self {
        Self {
            storage,
            scope: scope.into(),
            debouncer: Debouncer::new(delay),
        }
    }

    pub fn storage(&self) -> &dyn KeyValueStorage {
        self.storage.as_ref()
    }

    fn prefix(&self) -> String {
        format!("{}question_", self.scope)
    }

    fn key(&self, question_id: u32) -> String {
        format!("{}{}", self.prefix(), question_id)
    }

    /// Writes the record now, superseding any pending autosave for the question.
    pub fn save(&mut self, question_id: u32, record: &DraftRecord) -> Result<(), SessionError> {
        self.debouncer.flush(&question_id);
        self.write(question_id, record)
    }

    fn write(&mut self, question_id: u32, record: &DraftRecord) -> Result<(), SessionError> {
        let raw = serde_json::to_string(record)?;
        let key = self.key(question_id);
        self.storage.set(&key, &raw)?;
        tracing::debug!("Saved draft for question {}", question_id);
        Ok(())
    }

    /// Queues an autosave that fires once editing has been quiet for the delay.
    pub fn schedule(&mut self, question_id: u32, record: DraftRecord, now: Instant) {
        self.debouncer.schedule(question_id, record, now);
    }

    /// Writes the pending autosave for one question, if any.
    pub fn flush(&mut self, question_id: u32) -> Result<bool, SessionError> {
        match self.debouncer.flush(&question_id) {
            Some(record) => {
                self.write(question_id, &record)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Writes every autosave whose quiet period has elapsed.
    pub fn flush_due(&mut self, now: Instant) -> Result<usize, SessionError> {
        let due = self.debouncer.take_due(now);
        let count = due.len();
        for (question_id, record) in due {
            self.write(question_id, &record)?;
            tracing::info!("Auto-saved draft for question {}", question_id);
        }
        Ok(count)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.next_deadline()
    }

    pub fn has_pending(&self, question_id: u32) -> bool {
        self.debouncer.is_pending(&question_id)
    }

    /// An unreadable record is treated as no draft at all.
    pub fn load(&self, question_id: u32) -> Result<Option<DraftRecord>, SessionError> {
        let Some(raw) = self.storage.get(&self.key(question_id))? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                tracing::warn!("Ignoring unreadable draft for question {}: {}", question_id, e);
                Ok(None)
            }
        }
    }

    /// Drops every stored and pending draft in this scope.
    pub fn purge(&mut self) -> Result<usize, SessionError> {
        self.debouncer.cancel_all();
        let prefix = self.prefix();
        let stale: Vec<String> = self
            .storage
            .keys()?
            .into_iter()
            .filter(|k| k.starts_with(&prefix))
            .collect();
        for key in &stale {
            self.storage.remove(key)?;
        }
        Ok(stale.len())
    }
}
