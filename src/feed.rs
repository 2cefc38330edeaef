//! Core data model shared by every stage of the pipeline.
//!
//! An [`Entry`] is immutable once produced by an adapter: downstream stages
//! filter, classify, and render entries but never rewrite their fields.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One syndication entry, normalized across feed dialects.
///
/// Missing fields normalize to empty strings rather than dropping the entry;
/// `summary` is the raw feed payload and may contain HTML and `$…$` /
/// `$$…$$` formula markup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    pub title: String,
    pub link: String,
    pub summary: String,
    pub published: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
}

impl Entry {
    /// Best-effort publication instant: `published`, falling back to
    /// `updated` for sources that only distinguish revisions.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.published.or(self.updated)
    }

    /// Title and summary joined for keyword matching.
    pub fn title_and_summary(&self) -> String {
        format!("{} {}", self.title, self.summary)
    }
}

/// Outcome of fetching one configured source in one run.
///
/// Exactly one of these exists per configured source name; a failed fetch
/// carries the flattened error and an empty entry list.
#[derive(Debug, Clone, Serialize)]
pub struct FeedResult {
    pub name: String,
    pub entries: Vec<Entry>,
    pub error: Option<String>,
}

impl FeedResult {
    pub fn ok(name: impl Into<String>, entries: Vec<Entry>) -> Self {
        Self {
            name: name.into(),
            entries,
            error: None,
        }
    }

    pub fn failed(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
            error: Some(error.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}
