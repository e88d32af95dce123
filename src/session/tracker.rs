// src/session/tracker.rs

use std::collections::BTreeSet;

use serde::Serialize;

/// Lifecycle of one exam attempt. `Finished` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionPhase {
    NotStarted,
    Running,
    Finished,
}

/// Colour of a question in the navigation panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum QuestionStatus {
    NotVisited,
    Visited,
    Answered,
}

/// Derived counters shown beside the navigation panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub answered: u32,
    pub visited_not_answered: u32,
    pub not_visited: u32,
}

impl StatusCounts {
    pub fn total(&self) -> u32 {
        self.answered + self.visited_not_answered + self.not_visited
    }
}

/// Visited/answered bookkeeping and the active question pointer.
///
/// Keeps `answered ⊆ visited ⊆ 1..=total` at all times: every insertion is
/// bounds-checked and answering only ever targets the active question,
/// which is visited by construction.
#[derive(Debug, Clone)]
pub struct NavigationTracker {
    total: u32,
    active: u32,
    visited: BTreeSet<u32>,
    answered: BTreeSet<u32>,
}

impl NavigationTracker {
    pub fn new(total: u32) -> Self {
        Self {
            total,
            active: 1,
            visited: BTreeSet::new(),
            answered: BTreeSet::new(),
        }
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn active(&self) -> u32 {
        self.active
    }

    pub fn visited(&self) -> &BTreeSet<u32> {
        &self.visited
    }

    pub fn answered(&self) -> &BTreeSet<u32> {
        &self.answered
    }

    pub fn in_bounds(&self, id: u32) -> bool {
        id >= 1 && id <= self.total
    }

    /// Resets to a fresh attempt positioned on question 1.
    pub fn begin(&mut self) {
        self.visited.clear();
        self.answered.clear();
        self.active = 1;
        if self.in_bounds(1) {
            self.visited.insert(1);
        }
    }

    /// Moves the pointer to `id`. Out-of-range ids are ignored.
    pub fn visit(&mut self, id: u32) -> bool {
        if !self.in_bounds(id) {
            return false;
        }
        self.visited.insert(id);
        self.active = id;
        true
    }

    /// Marks the active question as answered and returns its id.
    pub fn mark_answered(&mut self) -> u32 {
        // begin() may have run on an empty set, so re-check membership.
        if self.visited.contains(&self.active) {
            self.answered.insert(self.active);
        }
        self.active
    }

    /// The question after the active one, if there is one.
    pub fn next(&self) -> Option<u32> {
        let next = self.active + 1;
        self.in_bounds(next).then_some(next)
    }

    pub fn status_of(&self, id: u32) -> QuestionStatus {
        if self.answered.contains(&id) {
            QuestionStatus::Answered
        } else if self.visited.contains(&id) {
            QuestionStatus::Visited
        } else {
            QuestionStatus::NotVisited
        }
    }

    pub fn counts(&self) -> StatusCounts {
        let answered = self.answered.len() as u32;
        let visited = self.visited.len() as u32;
        StatusCounts {
            answered,
            visited_not_answered: visited - answered,
            not_visited: self.total - visited,
        }
    }
}
