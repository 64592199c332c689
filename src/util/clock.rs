//! Wall-clock helpers. All engine timestamps are milliseconds since epoch.

use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch.
pub type TimestampMs = i64;

/// Milliseconds in one minute.
pub const MINUTE_MS: i64 = 60_000;

/// Current wall-clock time in milliseconds since epoch.
#[must_use]
pub fn now_ms() -> TimestampMs {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// Convert whole minutes to milliseconds.
#[must_use]
pub const fn minutes_to_ms(minutes: u32) -> i64 {
    minutes as i64 * MINUTE_MS
}

/// Span between two timestamps in whole minutes, rounded to nearest,
/// clamped at zero when `later` precedes `earlier`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn minutes_between(earlier: TimestampMs, later: TimestampMs) -> i64 {
    let diff = later.saturating_sub(earlier);
    if diff <= 0 {
        return 0;
    }
    (diff as f64 / MINUTE_MS as f64).round() as i64
}
