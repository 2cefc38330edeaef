// src/pipeline.rs
//! One full run: build adapters, aggregate, diagnose, dispatch, report.

use chrono::Utc;

use crate::aggregate::aggregate_sources;
use crate::config::AppConfig;
use crate::dispatch::DispatchRouter;
use crate::error::ConfigResult;
use crate::ingest::{build_adapters, remote};
use crate::notify::Notifier;
use crate::relevance::RelevanceClassifier;
use crate::render::Renderer;
use crate::report::{self, RunReport, SourceReport};

/// Run the pipeline once against an already-validated config.
///
/// Returns `Err` only for configuration problems; every operational failure
/// along the way is absorbed into the report instead.
pub async fn run(
    config: &AppConfig,
    renderer: &dyn Renderer,
    notifier: &dyn Notifier,
) -> ConfigResult<RunReport> {
    let classifier = if config.relevance.has_patterns() {
        Some(RelevanceClassifier::from_config(&config.relevance)?)
    } else {
        None
    };

    let client = remote::build_client(config.pipeline.timeout())?;
    let adapters = build_adapters(config, &client)?;
    tracing::info!(sources = adapters.len(), "aggregation started");
    let results = aggregate_sources(adapters).await;

    for result in results.values() {
        if let Some(span) = report::entry_span(&result.entries) {
            if report::span_is_tight(span, config.pipeline.window_days) {
                tracing::warn!(
                    source = %result.name,
                    span_hours = span.num_hours(),
                    window_days = config.pipeline.window_days,
                    "feed history is shorter than the run cadence safely allows"
                );
            }
        }
    }

    // Report sources in config order, not map order.
    let sources: Vec<SourceReport> = config
        .sources
        .iter()
        .filter_map(|spec| results.get(&spec.name))
        .map(|r| SourceReport {
            name: r.name.clone(),
            entries: r.entries.len(),
            error: r.error.clone(),
        })
        .collect();

    let mut router = DispatchRouter::new(config.pipeline.window_days, renderer, notifier);
    if let Some(classifier) = classifier.as_ref() {
        router = router.with_classifier(classifier);
    }
    let dispatch = router.dispatch(&config.dispatch, &results, Utc::now()).await;

    Ok(RunReport { sources, dispatch })
}
