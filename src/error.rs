//! The fatal error class of the pipeline.
//!
//! Only configuration problems abort a run: everything downstream of a valid
//! configuration (fetching, parsing, rendering, sending) degrades per source
//! or per notification and ends up in the run report instead.

use thiserror::Error;

/// Errors that make a run impossible to start.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for the expected schema.
    #[error("cannot parse config file {path}: {detail}")]
    Parse { path: String, detail: String },

    /// Two sources share the same name; results are keyed by name.
    #[error("duplicate source name: {name}")]
    DuplicateSource { name: String },

    /// A feed is bound to more than one delivery style.
    #[error("feed '{feed}' is bound to more than one delivery style")]
    ConflictingStyles { feed: String },

    /// A feed appears twice in the dispatch plan (same style both times).
    #[error("feed '{feed}' appears more than once in the dispatch plan")]
    DuplicateDispatch { feed: String },

    /// A dispatch binding asks for relevance gating but no patterns exist.
    #[error("dispatch for feed '{feed}' sets classify=true but [relevance] has no patterns")]
    ClassifyWithoutPatterns { feed: String },

    /// A relevance pattern did not compile.
    #[error("invalid relevance pattern in {set} set: {detail}")]
    BadPattern { set: &'static str, detail: String },

    /// A local source has an empty command line.
    #[error("source '{name}' has an empty location")]
    EmptyLocation { name: String },

    /// Required settings for the selected notification transport are missing.
    #[error("notification transport misconfigured: {0}")]
    Transport(String),

    /// The shared HTTP client could not be constructed.
    #[error("cannot build HTTP client: {0}")]
    HttpClient(String),

    /// The feedgen binary needs a section the config does not provide.
    #[error("feedgen misconfigured: {0}")]
    Feedgen(String),
}

/// Convenience alias for fallible startup paths.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
