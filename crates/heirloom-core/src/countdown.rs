//! Human-readable lock countdown.
//!
//! Tells the owner how long until the timelock opens, or how long ago it
//! opened.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Countdown to (or since) the moment a lock opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockCountdown {
    /// e.g. "12 days 3 hours 40 min left"
    pub long_form: String,
    /// e.g. "12 days 3 hours left"
    pub short_form: String,
    pub is_unlocked: bool,
}

/// Countdown for a lock started at `locked_at` lasting `days_locked` days.
///
/// The lock counts as open only once `now` is strictly past the unlock
/// instant. `None` if the unlock instant is past the representable range.
pub fn lock_countdown(
    locked_at: DateTime<Utc>,
    days_locked: u32,
    now: DateTime<Utc>,
) -> Option<LockCountdown> {
    let unlocks_at =
        locked_at.checked_add_signed(Duration::try_days(i64::from(days_locked))?)?;
    let diff = now.signed_duration_since(unlocks_at);
    let is_unlocked = diff > Duration::zero();

    let total_minutes = diff.num_minutes().abs();
    let days = total_minutes / MINUTES_PER_DAY;
    let hours = (total_minutes / 60) % 24;
    let minutes = total_minutes % 60;
    let word = if is_unlocked { "ago" } else { "left" };

    Some(LockCountdown {
        long_form: format!("{} days {} hours {} min {}", days, hours, minutes, word),
        short_form: format!("{} days {} hours {}", days, hours, word),
        is_unlocked,
    })
}

/// Same as [`lock_countdown`] with the start given in unix milliseconds.
///
/// Returns `None` if the timestamp or the unlock instant is out of range.
pub fn lock_countdown_from_millis(
    locked_at_ms: i64,
    days_locked: u32,
    now: DateTime<Utc>,
) -> Option<LockCountdown> {
    let locked_at = Utc.timestamp_millis_opt(locked_at_ms).single()?;
    lock_countdown(locked_at, days_locked, now)
}

/// Countdown against the current wall clock.
pub fn lock_countdown_now(locked_at: DateTime<Utc>, days_locked: u32) -> Option<LockCountdown> {
    lock_countdown(locked_at, days_locked, Utc::now())
}
