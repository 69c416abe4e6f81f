//! Detecting that the host was suspended.
//!
//! A terminal process gets no "became active" callback after a laptop sleep or
//! a `^Z`/`fg` cycle. The driver loop runs every few hundred milliseconds, so a
//! much larger wall-clock gap between two iterations means we were not running.

use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone)]
pub struct SuspensionDetector {
    threshold: Duration,
    last_seen: Option<DateTime<Utc>>,
}

impl SuspensionDetector {
    pub fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            last_seen: None,
        }
    }

    /// Record a loop iteration at `now`. Returns true once per detected gap.
    ///
    /// A wall clock stepped backwards by more than the threshold also counts,
    /// since the cached countdown is stale either way.
    pub fn observe(&mut self, now: DateTime<Utc>) -> bool {
        let resumed = self
            .last_seen
            .map(|last| {
                let gap = now - last;
                gap > self.threshold || -gap > self.threshold
            })
            .unwrap_or(false);
        self.last_seen = Some(now);
        resumed
    }

    /// The host reported an activation of its own (terminal focus regained).
    /// Absorbs any gap so the same wake-up is not reconciled twice.
    pub fn activated(&mut self, now: DateTime<Utc>) {
        self.last_seen = Some(now);
    }
}
