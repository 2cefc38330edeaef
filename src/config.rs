//! Typed TOML configuration: sources, dispatch plan, relevance patterns,
//! pipeline knobs, and delivery transport.
//!
//! The file is validated eagerly at load time; every violation is a
//! [`ConfigError`] so a bad plan aborts before any source is contacted.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Environment variable that overrides the config file location.
pub const ENV_CONFIG_PATH: &str = "FEED_COURIER_CONFIG";
/// Fallback config file location, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/feeds.toml";

/// Resolve the config path from the environment, falling back to the default.
pub fn config_path_from_env() -> PathBuf {
    std::env::var(ENV_CONFIG_PATH)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Root of the configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub relevance: RelevanceConfig,
    #[serde(default)]
    pub sources: Vec<SourceSpec>,
    #[serde(default)]
    pub dispatch: Vec<DispatchBinding>,
    #[serde(default)]
    pub feedgen: Option<FeedgenConfig>,
    #[serde(default)]
    pub delivery: DeliveryConfig,
}

/// Run-wide knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Recency look-back in days; entries older than this are dropped.
    #[serde(default = "default_window_days")]
    pub window_days: u32,
    /// Per-source fetch / subprocess timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl PipelineConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_window_days() -> u32 {
    1
}

fn default_timeout_secs() -> u64 {
    30
}

/// Keyword pattern sets for the relevance classifier.
///
/// Patterns are regex fragments compiled case-insensitively; an empty config
/// is valid as long as nothing asks for classification.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelevanceConfig {
    #[serde(default = "default_strong_threshold")]
    pub strong_threshold: usize,
    #[serde(default = "default_weak_threshold")]
    pub weak_threshold: usize,
    #[serde(default)]
    pub strong_patterns: Vec<String>,
    #[serde(default)]
    pub weak_patterns: Vec<String>,
}

impl RelevanceConfig {
    pub fn has_patterns(&self) -> bool {
        !self.strong_patterns.is_empty() || !self.weak_patterns.is_empty()
    }
}

fn default_strong_threshold() -> usize {
    1
}

fn default_weak_threshold() -> usize {
    2
}

/// One ingestion source.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceSpec {
    /// Unique key for results, logs, and the dispatch plan.
    pub name: String,
    pub kind: SourceKind,
    /// Remote: the feed URL. Local: the generator command line
    /// (whitespace-split; the output path is appended as the last argument).
    pub location: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Remote,
    Local,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Remote => write!(f, "remote"),
            SourceKind::Local => write!(f, "local"),
        }
    }
}

/// One dispatch plan entry: which feed goes out, and how.
#[derive(Debug, Clone, Deserialize)]
pub struct DispatchBinding {
    pub feed: String,
    pub style: DeliveryStyle,
    /// Gate entries through the relevance classifier before delivery.
    #[serde(default)]
    pub classify: bool,
}

/// Closed set of delivery styles; unknown names fail at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeliveryStyle {
    /// One notification per surviving entry, in source order.
    PerEntry,
    /// One digest notification per feed; nothing when the batch is empty.
    Summary,
}

impl fmt::Display for DeliveryStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryStyle::PerEntry => write!(f, "per-entry"),
            DeliveryStyle::Summary => write!(f, "summary"),
        }
    }
}

/// Settings consumed only by the `feedgen` binary.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedgenConfig {
    #[serde(default = "default_feedgen_title")]
    pub title: String,
    #[serde(default = "default_feedgen_link")]
    pub link: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub upstreams: Vec<String>,
}

fn default_feedgen_title() -> String {
    "filtered feed".to_string()
}

fn default_feedgen_link() -> String {
    "https://example.invalid/feed".to_string()
}

/// Where notifications go.
#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryConfig {
    #[serde(default)]
    pub transport: Transport,
    /// Target directory for the `file` transport.
    #[serde(default = "default_out_dir")]
    pub out_dir: String,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            transport: Transport::default(),
            out_dir: default_out_dir(),
        }
    }
}

fn default_out_dir() -> String {
    "outbox".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    #[default]
    Smtp,
    File,
}

impl AppConfig {
    /// Load from the env-selected path (or the default location).
    pub fn load_default() -> ConfigResult<Self> {
        Self::load(config_path_from_env())
    }

    /// Load and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&raw, &path.display().to_string())
    }

    /// Parse and validate config text; `origin` names the source in errors.
    pub fn from_toml_str(raw: &str, origin: &str) -> ConfigResult<Self> {
        let config: AppConfig = toml::from_str(raw).map_err(|e| ConfigError::Parse {
            path: origin.to_string(),
            detail: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> ConfigResult<()> {
        // Compile the pattern sets now so a bad regex fails the load, not
        // the first classified dispatch.
        if self.relevance.has_patterns() {
            crate::relevance::RelevanceClassifier::from_config(&self.relevance)?;
        }

        let mut names: HashSet<&str> = HashSet::new();
        for source in &self.sources {
            if !names.insert(source.name.as_str()) {
                return Err(ConfigError::DuplicateSource {
                    name: source.name.clone(),
                });
            }
            if source.kind == SourceKind::Local
                && source.location.split_whitespace().next().is_none()
            {
                return Err(ConfigError::EmptyLocation {
                    name: source.name.clone(),
                });
            }
        }

        let mut styles: HashMap<&str, DeliveryStyle> = HashMap::new();
        for binding in &self.dispatch {
            if let Some(prior) = styles.insert(binding.feed.as_str(), binding.style) {
                if prior != binding.style {
                    return Err(ConfigError::ConflictingStyles {
                        feed: binding.feed.clone(),
                    });
                }
                return Err(ConfigError::DuplicateDispatch {
                    feed: binding.feed.clone(),
                });
            }
            if binding.classify && !self.relevance.has_patterns() {
                return Err(ConfigError::ClassifyWithoutPatterns {
                    feed: binding.feed.clone(),
                });
            }
            if !names.contains(binding.feed.as_str()) {
                tracing::warn!(
                    feed = %binding.feed,
                    "dispatch plan names a feed with no configured source"
                );
            }
        }
        Ok(())
    }
}
