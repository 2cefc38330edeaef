// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod aggregate;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod feed;
pub mod feedgen;
pub mod ingest;
pub mod notify;
pub mod pipeline;
pub mod recency;
pub mod relevance;
pub mod render;
pub mod report;

// ---- Re-exports for stable public API ----
pub use crate::config::{AppConfig, DeliveryStyle, SourceKind, Transport};
pub use crate::error::ConfigError;
pub use crate::feed::{Entry, FeedResult};
pub use crate::notify::{Notifier, OutboundMessage, RecordingNotifier};
pub use crate::relevance::RelevanceClassifier;
pub use crate::render::{HtmlRenderer, MessageBody, Renderer};
pub use crate::report::RunReport;
