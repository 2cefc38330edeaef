// src/ingest/remote.rs
//! Remote feed adapter: HTTP GET plus syndication parse.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;

use super::{parse_feed_document, SourceAdapter};
use crate::error::{ConfigError, ConfigResult};
use crate::feed::Entry;

const USER_AGENT: &str = concat!("feed-courier/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client shared by all remote sources. The per-request
/// timeout doubles as the per-source fetch timeout.
pub fn build_client(timeout: Duration) -> ConfigResult<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| ConfigError::HttpClient(e.to_string()))
}

/// Fetches one feed URL through the shared client.
pub struct RemoteFeed {
    name: String,
    url: String,
    client: reqwest::Client,
}

impl RemoteFeed {
    pub fn new(name: impl Into<String>, url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            client,
        }
    }
}

#[async_trait]
impl SourceAdapter for RemoteFeed {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<Vec<Entry>> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .with_context(|| format!("GET {}", self.url))?;
        let body = response
            .bytes()
            .await
            .with_context(|| format!("reading body of {}", self.url))?;
        parse_feed_document(&body)
    }
}
