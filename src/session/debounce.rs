// src/session/debounce.rs

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug)]
struct Pending<V> {
    deadline: Instant,
    payload: V,
}

/// Coalesces bursts of writes per key into one write after a quiet period.
///
/// Each `schedule` replaces whatever was pending for the key and restarts
/// its window, so only the most recent payload survives. The owner drives
/// time: it asks for `next_deadline()`, sleeps until then and collects due
/// payloads with `take_due()`.
#[derive(Debug)]
pub struct Debouncer<K, V> {
    delay: Duration,
    pending: HashMap<K, Pending<V>>,
}

impl<K, V> Debouncer<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: HashMap::new(),
        }
    }

    /// Supersedes any pending payload for `key` and restarts its window.
    pub fn schedule(&mut self, key: K, payload: V, now: Instant) {
        self.pending.insert(
            key,
            Pending {
                deadline: now + self.delay,
                payload,
            },
        );
    }

    /// Removes and returns the pending payload for `key`, ignoring its deadline.
    pub fn flush(&mut self, key: &K) -> Option<V> {
        self.pending.remove(key).map(|p| p.payload)
    }

    /// Removes and returns every payload whose window has elapsed.
    pub fn take_due(&mut self, now: Instant) -> Vec<(K, V)> {
        let due: Vec<K> = self
            .pending
            .iter()
            .filter(|(_, p)| p.deadline <= now)
            .map(|(k, _)| k.clone())
            .collect();

        due.into_iter()
            .filter_map(|k| self.pending.remove(&k).map(|p| (k, p.payload)))
            .collect()
    }

    /// Earliest deadline among pending payloads.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|p| p.deadline).min()
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.pending.contains_key(key)
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }
}
