// src/ingest/local.rs
//! Local generator adapter: runs an external program that writes a feed
//! document to a path the adapter hands it.
//!
//! The output file is a `NamedTempFile`, so it is removed on every exit
//! path (success, generator failure, timeout, parse error). The child is
//! spawned with `kill_on_drop` so an abandoned wait also reaps the process.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use tokio::process::Command;

use super::{parse_feed_document, SourceAdapter};
use crate::feed::Entry;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs a generator command with a fresh temporary output path appended as
/// its last argument, then parses whatever the generator wrote there.
pub struct LocalGenerator {
    name: String,
    program: String,
    args: Vec<String>,
    timeout: Duration,
    temp_dir: Option<PathBuf>,
}

impl LocalGenerator {
    pub fn new(name: impl Into<String>, program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args,
            timeout: DEFAULT_TIMEOUT,
            temp_dir: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Place output files in a specific directory instead of the system
    /// temp dir. Tests use this to verify cleanup.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }
}

#[async_trait]
impl SourceAdapter for LocalGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<Vec<Entry>> {
        let dir = self.temp_dir.clone().unwrap_or_else(std::env::temp_dir);
        let out_file = tempfile::Builder::new()
            .prefix("feed-courier-")
            .suffix(".xml")
            .tempfile_in(&dir)
            .context("creating temporary output file")?;
        let out_path = out_file.path().to_path_buf();

        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(&out_path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("spawning generator '{}'", self.program))?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                anyhow!(
                    "generator '{}' timed out after {}s",
                    self.program,
                    self.timeout.as_secs()
                )
            })?
            .with_context(|| format!("waiting for generator '{}'", self.program))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "generator '{}' exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            );
        }

        let bytes = tokio::fs::read(&out_path)
            .await
            .with_context(|| format!("reading generator output {}", out_path.display()))?;
        parse_feed_document(&bytes)
    }
}
