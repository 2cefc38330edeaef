//! Recency filtering with a fail-open policy for undated entries.
//!
//! Adapters surface unparseable dates as absent timestamps, so "no
//! timestamp" covers both feeds that omit dates and feeds whose dates the
//! parser rejected. Such entries are retained: a feed with broken dates
//! should over-deliver rather than go silent.

use chrono::{DateTime, Duration, Utc};

use crate::feed::Entry;

/// Oldest instant still inside the look-back window.
pub fn cutoff(now: DateTime<Utc>, window_days: u32) -> DateTime<Utc> {
    now - Duration::days(i64::from(window_days))
}

/// Keep entries whose timestamp is at or after the cutoff, preserving input
/// order. `published` falls back to `updated`; entries with neither are kept.
pub fn recent_entries(entries: &[Entry], window_days: u32, now: DateTime<Utc>) -> Vec<Entry> {
    let cutoff = cutoff(now, window_days);
    entries
        .iter()
        .filter(|e| e.timestamp().map_or(true, |ts| ts >= cutoff))
        .cloned()
        .collect()
}
