// src/bin/feedgen.rs
//! Aggregator-feed generator: fetches the configured upstream feeds, keeps
//! the entries the relevance classifier accepts, and writes one RSS 2.0
//! document to the path given as the first argument.
//!
//! Runs standalone on a schedule, or as a `local` source of the pipeline
//! binary (which then passes the output path itself).

use std::path::Path;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use feed_courier::aggregate::aggregate_sources;
use feed_courier::config::AppConfig;
use feed_courier::error::ConfigError;
use feed_courier::feedgen::{rss_document, select_entries};
use feed_courier::ingest::{remote, RemoteFeed, SourceAdapter};
use feed_courier::relevance::RelevanceClassifier;

const DEFAULT_OUTPUT: &str = "filtered.xml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let output = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_OUTPUT.to_string());

    let config = AppConfig::load_default()?;
    let Some(feedgen) = config.feedgen.as_ref() else {
        return Err(ConfigError::Feedgen("missing [feedgen] section".into()).into());
    };
    if feedgen.upstreams.is_empty() {
        return Err(ConfigError::Feedgen("[feedgen].upstreams is empty".into()).into());
    }
    if !config.relevance.has_patterns() {
        return Err(ConfigError::Feedgen("[relevance] has no patterns".into()).into());
    }
    let classifier = RelevanceClassifier::from_config(&config.relevance)?;

    let client = remote::build_client(config.pipeline.timeout())?;
    let adapters: Vec<Box<dyn SourceAdapter>> = feedgen
        .upstreams
        .iter()
        .map(|url| {
            Box::new(RemoteFeed::new(url.clone(), url.clone(), client.clone()))
                as Box<dyn SourceAdapter>
        })
        .collect();

    let results = aggregate_sources(adapters).await;
    let (seen, kept) = select_entries(&feedgen.upstreams, &results, &classifier);
    tracing::info!(seen, kept = kept.len(), "entries classified");

    let document = rss_document(&feedgen.title, &feedgen.link, &feedgen.description, &kept)?;
    if let Some(parent) = Path::new(&output).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    std::fs::write(&output, document).with_context(|| format!("writing {output}"))?;
    tracing::info!(path = %output, entries = kept.len(), "feed written");
    Ok(())
}
