use dashmap::DashMap;
use std::time::{Duration, Instant};

// Attempt record - tracks verification requests per email
#[derive(Debug, Clone, Copy)]
pub struct AttemptRecord {
    pub count: u32,
    pub window_start: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    RateLimited,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Admitted,
    Denied(DenyReason),
}

impl Decision {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Decision::Admitted)
    }
}

/// Per-identifier attempt counter with a sliding "last attempt" window.
///
/// The window restarts on every admitted attempt, so an identifier is only
/// let back in once `window` has passed since its most recent admitted
/// request. Keys are compared verbatim (no case folding or trimming).
pub struct AttemptTracker {
    records: DashMap<String, AttemptRecord>,
    max_attempts: u32,
    window: Duration,
}

impl AttemptTracker {
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        Self {
            records: DashMap::new(),
            max_attempts,
            window,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Decide whether `identifier` may make another attempt at `now`, and
    /// count it if so.
    ///
    /// The entry guard is held for the whole check-then-increment, which keeps
    /// it atomic across worker threads.
    pub fn check_and_record(&self, identifier: &str, now: Instant) -> Decision {
        let mut record = self
            .records
            .entry(identifier.to_string())
            .or_insert(AttemptRecord {
                count: 0,
                window_start: now,
            });

        // window expired..? reset it
        if now.saturating_duration_since(record.window_start) > self.window {
            record.count = 0;
            record.window_start = now;
        }

        if record.count >= self.max_attempts {
            return Decision::Denied(DenyReason::RateLimited);
        }

        record.count += 1;
        record.window_start = now;
        Decision::Admitted
    }

    // current count for an identifier, without touching it
    pub fn attempts(&self, identifier: &str) -> Option<u32> {
        self.records.get(identifier).map(|record| record.count)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop records whose window ran out more than one full window ago.
    ///
    /// Any record removed here would have been reset on its next attempt,
    /// so eviction never changes a decision. Returns how many were removed.
    pub fn evict_stale(&self, now: Instant) -> usize {
        let before = self.records.len();
        let horizon = self.window.saturating_mul(2);
        self.records
            .retain(|_, record| now.saturating_duration_since(record.window_start) <= horizon);
        before.saturating_sub(self.records.len())
    }
}
