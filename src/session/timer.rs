// src/session/timer.rs

/// Result of one countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Time is still left.
    Remaining(u64),
    /// This tick consumed the last second. Reported exactly once.
    Expired,
    /// The countdown is stopped or already expired; nothing changed.
    Idle,
}

/// Exam countdown in whole seconds.
#[derive(Debug, Clone)]
pub struct Countdown {
    remaining: u64,
    running: bool,
    expired: bool,
}

impl Countdown {
    pub fn new(duration_secs: u64) -> Self {
        Self {
            remaining: duration_secs,
            running: false,
            expired: false,
        }
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Restarts from `duration_secs`.
    pub fn start(&mut self, duration_secs: u64) {
        self.remaining = duration_secs;
        self.running = true;
        self.expired = false;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn tick(&mut self) -> Tick {
        if !self.running || self.expired {
            return Tick::Idle;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.expired = true;
            self.running = false;
            Tick::Expired
        } else {
            Tick::Remaining(self.remaining)
        }
    }

    pub fn display(&self) -> String {
        format_hms(self.remaining)
    }
}

/// Formats seconds as zero-padded `HH:MM:SS`.
pub fn format_hms(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}
