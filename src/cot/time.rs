// src/cot/time.rs
//! CoT timestamps

use chrono::{DateTime, Duration, Utc};

/// strftime pattern for CoT `time`, `start` and `stale` attributes
pub const COT_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Format `now`, shifted `offset_secs` into the future, as a CoT timestamp
pub fn cot_time(now: DateTime<Utc>, offset_secs: u64) -> String {
    i64::try_from(offset_secs)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|offset| now.checked_add_signed(offset))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
        .format(COT_TIME_FORMAT)
        .to_string()
}
