// src/main.rs
//! Pipeline binary: one aggregation + dispatch run per invocation.
//!
//! Exits non-zero only on configuration errors; operational failures are
//! logged and summarized in the run report.

use tracing_subscriber::EnvFilter;

use feed_courier::config::{AppConfig, Transport};
use feed_courier::notify::{EmailNotifier, FileNotifier, Notifier};
use feed_courier::pipeline;
use feed_courier::render::HtmlRenderer;

const ENV_REPORT_JSON: &str = "FEED_COURIER_REPORT_JSON";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when variables come from the service
    // environment.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = AppConfig::load_default()?;

    let renderer = HtmlRenderer::new();
    let notifier: Box<dyn Notifier> = match config.delivery.transport {
        Transport::Smtp => Box::new(EmailNotifier::from_env()?),
        Transport::File => Box::new(FileNotifier::new(&config.delivery.out_dir)),
    };

    let report = pipeline::run(&config, &renderer, notifier.as_ref()).await?;

    for source in &report.sources {
        match &source.error {
            Some(error) => tracing::warn!(source = %source.name, %error, "source failed"),
            None => {
                tracing::info!(source = %source.name, entries = source.entries, "source ok")
            }
        }
    }
    tracing::info!(
        sent = report.dispatch.sent(),
        failures = report.dispatch.failures(),
        missing = report.dispatch.missing.len(),
        clean = report.clean(),
        "run finished"
    );

    if std::env::var(ENV_REPORT_JSON).as_deref() == Ok("1") {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();
}
