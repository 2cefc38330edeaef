// src/feedgen.rs
//! RSS 2.0 serialization for the generator binary.
//!
//! The produced document must round-trip through
//! [`crate::ingest::parse_feed_document`], since a local source is usually
//! this crate's own generator output.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::feed::{Entry, FeedResult};
use crate::relevance::RelevanceClassifier;

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Walk the upstreams in config order and keep the entries the classifier
/// accepts. Returns `(seen, kept)`; upstreams that failed to fetch (or are
/// absent from the results) contribute nothing.
pub fn select_entries(
    upstreams: &[String],
    results: &BTreeMap<String, FeedResult>,
    classifier: &RelevanceClassifier,
) -> (usize, Vec<Entry>) {
    let mut kept = Vec::new();
    let mut seen = 0usize;
    for url in upstreams {
        let Some(result) = results.get(url.as_str()) else {
            continue;
        };
        seen += result.entries.len();
        kept.extend(
            result
                .entries
                .iter()
                .filter(|e| classifier.is_relevant(&e.title_and_summary()))
                .cloned(),
        );
    }
    (seen, kept)
}

#[derive(Debug, Serialize)]
#[serde(rename = "rss")]
struct Rss<'a> {
    #[serde(rename = "@version")]
    version: &'a str,
    channel: Channel<'a>,
}

#[derive(Debug, Serialize)]
struct Channel<'a> {
    title: &'a str,
    link: &'a str,
    description: &'a str,
    #[serde(rename = "item")]
    items: Vec<Item<'a>>,
}

#[derive(Debug, Serialize)]
struct Item<'a> {
    title: &'a str,
    link: &'a str,
    description: &'a str,
    #[serde(rename = "pubDate", skip_serializing_if = "Option::is_none")]
    pub_date: Option<String>,
}

/// Render entries as one RSS 2.0 document, entities escaped, `pubDate` in
/// RFC 2822 where a timestamp is known.
pub fn rss_document(
    title: &str,
    link: &str,
    description: &str,
    entries: &[Entry],
) -> Result<String> {
    let items = entries
        .iter()
        .map(|e| Item {
            title: &e.title,
            link: &e.link,
            description: &e.summary,
            pub_date: e.timestamp().map(|ts| ts.to_rfc2822()),
        })
        .collect();
    let rss = Rss {
        version: "2.0",
        channel: Channel {
            title,
            link,
            description,
            items,
        },
    };
    let body = quick_xml::se::to_string(&rss).context("serializing rss document")?;
    Ok(format!("{XML_DECL}\n{body}\n"))
}
