// src/dispatch.rs
//! Dispatch routing: walk the plan, filter each feed's batch, and hand the
//! survivors to the notifier in the bound style.
//!
//! Nothing here aborts: a feed missing from the results, a render error, or
//! a failed send is logged, counted, and skipped. Aggregated feeds that no
//! binding names are never delivered.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::config::{DeliveryStyle, DispatchBinding};
use crate::feed::{Entry, FeedResult};
use crate::notify::{Notifier, OutboundMessage};
use crate::recency;
use crate::relevance::RelevanceClassifier;
use crate::render::{MessageBody, Renderer};
use crate::report::{DispatchReport, FeedDispatch};

/// Routes aggregated feeds to the notifier according to the dispatch plan.
pub struct DispatchRouter<'a> {
    window_days: u32,
    classifier: Option<&'a RelevanceClassifier>,
    renderer: &'a dyn Renderer,
    notifier: &'a dyn Notifier,
}

impl<'a> DispatchRouter<'a> {
    pub fn new(window_days: u32, renderer: &'a dyn Renderer, notifier: &'a dyn Notifier) -> Self {
        Self {
            window_days,
            classifier: None,
            renderer,
            notifier,
        }
    }

    /// Attach the classifier consulted by bindings with `classify = true`.
    pub fn with_classifier(mut self, classifier: &'a RelevanceClassifier) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Deliver everything the plan asks for, in plan order, with per-entry
    /// failure isolation. `now` anchors the recency window and digest dates.
    pub async fn dispatch(
        &self,
        plan: &[DispatchBinding],
        results: &BTreeMap<String, FeedResult>,
        now: DateTime<Utc>,
    ) -> DispatchReport {
        let mut report = DispatchReport::default();

        for binding in plan {
            let Some(result) = results.get(&binding.feed) else {
                tracing::warn!(feed = %binding.feed, "planned feed missing from aggregation results");
                report.missing.push(binding.feed.clone());
                continue;
            };

            let recent = recency::recent_entries(&result.entries, self.window_days, now);
            let retained = recent.len();
            let (kept, dropped_irrelevant) = self.apply_gate(binding, recent);

            let mut feed_report = FeedDispatch {
                feed: binding.feed.clone(),
                style: binding.style,
                retained,
                dropped_irrelevant,
                sent: 0,
                failures: 0,
            };

            match binding.style {
                DeliveryStyle::PerEntry => {
                    for entry in &kept {
                        let subject = format!("[{}] {}", binding.feed, entry.title);
                        let body = self.renderer.render_entry(&binding.feed, entry);
                        self.deliver(&binding.feed, subject, body, &mut feed_report)
                            .await;
                    }
                }
                DeliveryStyle::Summary => {
                    if kept.is_empty() {
                        tracing::info!(feed = %binding.feed, "no entries to digest, nothing sent");
                    } else {
                        let today = now.date_naive();
                        let subject = format!(
                            "[{}] Daily digest ({}) - {} {}",
                            binding.feed,
                            today,
                            kept.len(),
                            item_word(kept.len())
                        );
                        let body = self.renderer.render_digest(&binding.feed, &kept, today);
                        self.deliver(&binding.feed, subject, body, &mut feed_report)
                            .await;
                    }
                }
            }

            tracing::info!(
                feed = %binding.feed,
                style = %binding.style,
                retained = feed_report.retained,
                dropped_irrelevant = feed_report.dropped_irrelevant,
                sent = feed_report.sent,
                failures = feed_report.failures,
                "feed dispatched"
            );
            report.feeds.push(feed_report);
        }

        report
    }

    /// Relevance gate for `classify = true` bindings. Entries are judged on
    /// title + summary; verdicts are computed here and never stored.
    fn apply_gate(&self, binding: &DispatchBinding, entries: Vec<Entry>) -> (Vec<Entry>, usize) {
        if !binding.classify {
            return (entries, 0);
        }
        let Some(classifier) = self.classifier else {
            // Config validation rejects this combination at load; if a
            // caller wires it up anyway, over-deliver rather than drop.
            tracing::error!(feed = %binding.feed, "classify requested but no classifier attached");
            return (entries, 0);
        };
        let before = entries.len();
        let kept: Vec<Entry> = entries
            .into_iter()
            .filter(|e| classifier.is_relevant(&e.title_and_summary()))
            .collect();
        let dropped = before - kept.len();
        (kept, dropped)
    }

    async fn deliver(
        &self,
        feed: &str,
        subject: String,
        body: anyhow::Result<MessageBody>,
        feed_report: &mut FeedDispatch,
    ) {
        match body {
            Ok(body) => {
                let message = OutboundMessage { subject, body };
                match self.notifier.send(&message).await {
                    Ok(()) => feed_report.sent += 1,
                    Err(e) => {
                        feed_report.failures += 1;
                        tracing::warn!(
                            feed = %feed,
                            subject = %message.subject,
                            error = format!("{e:#}"),
                            "notification failed"
                        );
                    }
                }
            }
            Err(e) => {
                feed_report.failures += 1;
                tracing::warn!(feed = %feed, error = format!("{e:#}"), "render failed");
            }
        }
    }
}

fn item_word(n: usize) -> &'static str {
    if n == 1 {
        "item"
    } else {
        "items"
    }
}
