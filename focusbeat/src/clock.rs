//! Conversions between "seconds remaining" and an absolute end time.
//!
//! While a session runs the end timestamp is the source of truth; the
//! remaining-seconds value shown on screen is recomputed from it on every
//! observation, so missed ticks (suspension, a stalled terminal) never cause drift.

use chrono::{DateTime, Duration, Utc};

pub fn compute_end_timestamp(remaining_secs: u32, now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::seconds(i64::from(remaining_secs))
}

/// Whole seconds left until `end`, rounded to the nearest second and floored at 0.
///
/// Rounding rather than truncating keeps a resume in the middle of a second
/// from dropping a second off the display.
pub fn compute_remaining(end: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    let millis = (end - now).num_milliseconds();
    if millis <= 0 {
        return 0;
    }
    u32::try_from((millis + 500) / 1000).unwrap_or(u32::MAX)
}

/// `MM:SS` with minutes not wrapped at the hour.
pub fn format_mmss(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
