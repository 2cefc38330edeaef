//! Two-tier keyword relevance classification.
//!
//! A text is relevant when enough *distinct* strong patterns match, or,
//! failing that, enough distinct weak patterns do. Counting is per pattern,
//! not per occurrence: a weak keyword repeated ten times still contributes
//! one hit, so a verdict needs corroboration from different patterns rather
//! than repetition of one.

use regex::{RegexSet, RegexSetBuilder};

use crate::config::RelevanceConfig;
use crate::error::{ConfigError, ConfigResult};

/// Default number of distinct strong patterns that decide on their own.
pub const DEFAULT_STRONG_THRESHOLD: usize = 1;
/// Default number of distinct weak patterns needed without strong support.
pub const DEFAULT_WEAK_THRESHOLD: usize = 2;

/// Outcome of one classification, with the evidence behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub relevant: bool,
    /// Distinct strong patterns that matched.
    pub strong_hits: usize,
    /// Distinct weak patterns that matched.
    pub weak_hits: usize,
}

/// Compiled strong/weak pattern sets with their thresholds.
///
/// Patterns are regex fragments compiled case-insensitively into one
/// [`RegexSet`] per tier; classification is pure and deterministic for a
/// given configuration.
#[derive(Debug)]
pub struct RelevanceClassifier {
    strong: RegexSet,
    weak: RegexSet,
    strong_threshold: usize,
    weak_threshold: usize,
}

impl RelevanceClassifier {
    /// Compile pattern lists with the default thresholds.
    pub fn new<S: AsRef<str>>(strong: &[S], weak: &[S]) -> ConfigResult<Self> {
        Ok(Self {
            strong: compile_set(strong, "strong")?,
            weak: compile_set(weak, "weak")?,
            strong_threshold: DEFAULT_STRONG_THRESHOLD,
            weak_threshold: DEFAULT_WEAK_THRESHOLD,
        })
    }

    /// Override both thresholds.
    pub fn with_thresholds(mut self, strong: usize, weak: usize) -> Self {
        self.strong_threshold = strong;
        self.weak_threshold = weak;
        self
    }

    /// Build from the `[relevance]` config section.
    pub fn from_config(config: &RelevanceConfig) -> ConfigResult<Self> {
        Ok(
            Self::new(&config.strong_patterns, &config.weak_patterns)?
                .with_thresholds(config.strong_threshold, config.weak_threshold),
        )
    }

    /// Classify a text and report the per-tier evidence.
    ///
    /// The strong tier decides alone when it meets its threshold; the weak
    /// tier never vetoes it. Strong matches do not count toward the weak
    /// tally.
    pub fn evaluate(&self, text: &str) -> Verdict {
        let strong_hits = self.strong.matches(text).iter().count();
        let weak_hits = self.weak.matches(text).iter().count();
        let relevant = strong_hits >= self.strong_threshold || weak_hits >= self.weak_threshold;
        Verdict {
            relevant,
            strong_hits,
            weak_hits,
        }
    }

    pub fn is_relevant(&self, text: &str) -> bool {
        self.evaluate(text).relevant
    }
}

fn compile_set<S: AsRef<str>>(patterns: &[S], set: &'static str) -> ConfigResult<RegexSet> {
    RegexSetBuilder::new(patterns.iter().map(|p| p.as_ref()))
        .case_insensitive(true)
        .build()
        .map_err(|e| ConfigError::BadPattern {
            set,
            detail: e.to_string(),
        })
}
