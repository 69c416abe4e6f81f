//! Configurable session lengths.

use focusbeat_ipc::SessionMode;
use serde::{Deserialize, Serialize};

pub const DEFAULT_FOCUS_SECS: u32 = 25 * 60;
pub const DEFAULT_BREAK_SECS: u32 = 5 * 60;
pub const MIN_DURATION_SECS: u32 = 60;
pub const MAX_DURATION_SECS: u32 = 60 * 60;

/// Source of the two session lengths.
///
/// The session machine samples it only when a session is started from a
/// fresh state or when the mode flips, never in the middle of a running session.
pub trait DurationProvider {
    fn focus_secs(&self) -> u32;
    fn break_secs(&self) -> u32;

    fn secs_for(&self, mode: SessionMode) -> u32 {
        match mode {
            SessionMode::Focus => self.focus_secs(),
            SessionMode::Break => self.break_secs(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Durations {
    pub focus_secs: u32,
    pub break_secs: u32,
}

impl Default for Durations {
    fn default() -> Self {
        Self {
            focus_secs: DEFAULT_FOCUS_SECS,
            break_secs: DEFAULT_BREAK_SECS,
        }
    }
}

impl Durations {
    /// Build from raw stored values. Missing or invalid values fall back to the
    /// default for that field.
    pub fn sanitized(focus_secs: Option<i64>, break_secs: Option<i64>) -> Self {
        Self {
            focus_secs: focus_secs
                .and_then(valid_secs)
                .unwrap_or(DEFAULT_FOCUS_SECS),
            break_secs: break_secs
                .and_then(valid_secs)
                .unwrap_or(DEFAULT_BREAK_SECS),
        }
    }

    pub fn secs_mut(&mut self, mode: SessionMode) -> &mut u32 {
        match mode {
            SessionMode::Focus => &mut self.focus_secs,
            SessionMode::Break => &mut self.break_secs,
        }
    }

    pub fn longest(&self) -> u32 {
        self.focus_secs.max(self.break_secs)
    }
}

impl DurationProvider for Durations {
    fn focus_secs(&self) -> u32 {
        self.focus_secs
    }

    fn break_secs(&self) -> u32 {
        self.break_secs
    }
}

/// Whole minutes within `[MIN_DURATION_SECS, MAX_DURATION_SECS]`.
pub fn valid_secs(secs: i64) -> Option<u32> {
    let secs = u32::try_from(secs).ok()?;
    let in_bounds = (MIN_DURATION_SECS..=MAX_DURATION_SECS).contains(&secs);
    (in_bounds && secs % 60 == 0).then_some(secs)
}

/// Minutes to seconds, clamped to the allowed range.
pub fn clamp_minutes(minutes: i64) -> u32 {
    let secs = minutes.saturating_mul(60);
    secs.clamp(i64::from(MIN_DURATION_SECS), i64::from(MAX_DURATION_SECS)) as u32
}
