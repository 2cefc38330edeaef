// src/ingest/mod.rs
//! Source ingestion: the adapter capability trait, its two implementations,
//! and the shared feed-document parser.
//!
//! Adapters return plain `anyhow` errors; the aggregator flattens them into
//! per-source results so one bad source never touches the others.

pub mod local;
pub mod remote;

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::config::{AppConfig, SourceKind};
use crate::error::{ConfigError, ConfigResult};
use crate::feed::Entry;

pub use local::LocalGenerator;
pub use remote::RemoteFeed;

/// Capability to produce the current entries of one named source.
///
/// Implementations own their transport details (HTTP client, subprocess
/// command) and their timeout; callers only ever see entries or an error.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Source name; keys results, logs, and the dispatch plan.
    fn name(&self) -> &str;

    /// Fetch and parse the source's current entries, in document order.
    async fn fetch(&self) -> Result<Vec<Entry>>;
}

/// Parse any supported syndication dialect (RSS 0.x/1.0/2.0, Atom, JSON
/// Feed) into normalized entries, preserving document order.
///
/// Field fallbacks: first link, summary falling back to the full content
/// body, `published` and `updated` kept separately. Dates the parser cannot
/// read surface as `None` and are handled by the recency filter's fail-open
/// rule.
pub fn parse_feed_document(bytes: &[u8]) -> Result<Vec<Entry>> {
    let feed = feed_rs::parser::parse(bytes).context("parsing feed document")?;
    let mut out = Vec::with_capacity(feed.entries.len());
    for entry in feed.entries {
        let summary = entry
            .summary
            .map(|s| s.content)
            .or_else(|| entry.content.and_then(|c| c.body))
            .unwrap_or_default();
        out.push(Entry {
            title: entry.title.map(|t| t.content).unwrap_or_default(),
            link: entry
                .links
                .first()
                .map(|l| l.href.clone())
                .unwrap_or_default(),
            summary,
            published: entry.published.map(|dt| dt.with_timezone(&chrono::Utc)),
            updated: entry.updated.map(|dt| dt.with_timezone(&chrono::Utc)),
        });
    }
    Ok(out)
}

/// Build one adapter per configured source, sharing the HTTP client across
/// remote feeds.
pub fn build_adapters(
    config: &AppConfig,
    client: &reqwest::Client,
) -> ConfigResult<Vec<Box<dyn SourceAdapter>>> {
    let timeout = config.pipeline.timeout();
    let mut adapters: Vec<Box<dyn SourceAdapter>> = Vec::with_capacity(config.sources.len());
    for spec in &config.sources {
        match spec.kind {
            SourceKind::Remote => {
                adapters.push(Box::new(RemoteFeed::new(
                    &spec.name,
                    &spec.location,
                    client.clone(),
                )));
            }
            SourceKind::Local => {
                let mut parts = spec.location.split_whitespace().map(str::to_string);
                let program = parts.next().ok_or_else(|| ConfigError::EmptyLocation {
                    name: spec.name.clone(),
                })?;
                adapters.push(Box::new(
                    LocalGenerator::new(&spec.name, program, parts.collect()).with_timeout(timeout),
                ));
            }
        }
    }
    Ok(adapters)
}
