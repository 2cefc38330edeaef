// src/report.rs
//! Run summary: what was fetched, what went out, what failed.
//!
//! The report is the caller's view of a run. The run itself succeeds
//! whenever configuration was valid; everything that went wrong along the
//! way is recorded here instead of aborting.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::config::DeliveryStyle;
use crate::feed::Entry;

/// Per-source fetch summary.
#[derive(Debug, Clone, Serialize)]
pub struct SourceReport {
    pub name: String,
    pub entries: usize,
    pub error: Option<String>,
}

/// Per-feed dispatch summary.
#[derive(Debug, Clone, Serialize)]
pub struct FeedDispatch {
    pub feed: String,
    pub style: DeliveryStyle,
    /// Entries surviving the recency filter.
    pub retained: usize,
    /// Entries the relevance gate dropped (0 when the feed is not gated).
    pub dropped_irrelevant: usize,
    pub sent: usize,
    pub failures: usize,
}

/// Outcome of the dispatch stage.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DispatchReport {
    pub feeds: Vec<FeedDispatch>,
    /// Planned feeds that were missing from the aggregation results.
    pub missing: Vec<String>,
}

impl DispatchReport {
    pub fn sent(&self) -> usize {
        self.feeds.iter().map(|f| f.sent).sum()
    }

    pub fn failures(&self) -> usize {
        self.feeds.iter().map(|f| f.failures).sum()
    }
}

/// Full report for one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub sources: Vec<SourceReport>,
    pub dispatch: DispatchReport,
}

impl RunReport {
    /// True when every source fetched, every notification went out, and the
    /// plan matched the fetched sources.
    pub fn clean(&self) -> bool {
        self.sources.iter().all(|s| s.error.is_none())
            && self.dispatch.failures() == 0
            && self.dispatch.missing.is_empty()
    }
}

/// Span between the oldest and newest dated entries; `None` with fewer than
/// two dates, since one date says nothing about turnover.
pub fn entry_span(entries: &[Entry]) -> Option<Duration> {
    let stamps: Vec<DateTime<Utc>> = entries.iter().filter_map(Entry::timestamp).collect();
    if stamps.len() < 2 {
        return None;
    }
    let min = stamps.iter().min()?;
    let max = stamps.iter().max()?;
    Some(*max - *min)
}

/// A feed whose visible history is shorter than 1.5 look-back windows can
/// turn over completely between runs and silently skip entries.
pub fn span_is_tight(span: Duration, window_days: u32) -> bool {
    span < Duration::hours(i64::from(window_days) * 36)
}
