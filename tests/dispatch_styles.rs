// tests/dispatch_styles.rs
// Dispatch routing end to end against the in-memory notifier: styles,
// subjects, ordering, the relevance gate, and failure isolation.

use std::collections::BTreeMap;

use anyhow::{bail, Result};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use feed_courier::config::{DeliveryStyle, DispatchBinding};
use feed_courier::dispatch::DispatchRouter;
use feed_courier::feed::{Entry, FeedResult};
use feed_courier::notify::RecordingNotifier;
use feed_courier::relevance::RelevanceClassifier;
use feed_courier::render::{HtmlRenderer, MessageBody, Renderer};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap()
}

/// Undated entries pass the recency filter no matter what `now` is.
fn entry(title: &str) -> Entry {
    Entry {
        title: title.to_string(),
        link: format!("https://example.org/{}", title.to_lowercase()),
        summary: format!("summary of {title}"),
        published: None,
        updated: None,
    }
}

fn results_with(feed: &str, titles: &[&str]) -> BTreeMap<String, FeedResult> {
    let mut map = BTreeMap::new();
    map.insert(
        feed.to_string(),
        FeedResult::ok(feed, titles.iter().map(|t| entry(t)).collect()),
    );
    map
}

fn binding(feed: &str, style: DeliveryStyle) -> DispatchBinding {
    DispatchBinding {
        feed: feed.to_string(),
        style,
        classify: false,
    }
}

#[tokio::test]
async fn per_entry_sends_one_message_per_entry_in_order() {
    let renderer = HtmlRenderer::new();
    let notifier = RecordingNotifier::new();
    let router = DispatchRouter::new(1, &renderer, &notifier);

    let plan = vec![binding("papers", DeliveryStyle::PerEntry)];
    let results = results_with("papers", &["Alpha", "Beta", "Gamma"]);

    let report = router.dispatch(&plan, &results, now()).await;

    assert_eq!(
        notifier.subjects(),
        ["[papers] Alpha", "[papers] Beta", "[papers] Gamma"]
    );
    assert_eq!(report.feeds.len(), 1);
    assert_eq!(report.feeds[0].retained, 3);
    assert_eq!(report.feeds[0].sent, 3);
    assert_eq!(report.feeds[0].failures, 0);
}

#[tokio::test]
async fn summary_sends_exactly_one_digest() {
    let renderer = HtmlRenderer::new();
    let notifier = RecordingNotifier::new();
    let router = DispatchRouter::new(1, &renderer, &notifier);

    let plan = vec![binding("papers", DeliveryStyle::Summary)];
    let results = results_with("papers", &["Alpha", "Beta", "Gamma"]);

    let report = router.dispatch(&plan, &results, now()).await;

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "[papers] Daily digest (2024-01-10) - 3 items");
    assert!(sent[0].body.text.contains("1. Alpha"));
    assert!(sent[0].body.text.contains("3. Gamma"));
    assert_eq!(report.sent(), 1);
}

#[tokio::test]
async fn digest_subject_uses_the_singular_for_one_item() {
    let renderer = HtmlRenderer::new();
    let notifier = RecordingNotifier::new();
    let router = DispatchRouter::new(1, &renderer, &notifier);

    let plan = vec![binding("papers", DeliveryStyle::Summary)];
    let results = results_with("papers", &["Only"]);

    router.dispatch(&plan, &results, now()).await;

    assert_eq!(
        notifier.subjects(),
        ["[papers] Daily digest (2024-01-10) - 1 item"]
    );
}

#[tokio::test]
async fn an_empty_batch_sends_nothing_in_either_style() {
    let renderer = HtmlRenderer::new();
    let notifier = RecordingNotifier::new();
    let router = DispatchRouter::new(1, &renderer, &notifier);

    // All entries predate the window, so both feeds come up empty.
    let old = Utc.with_ymd_and_hms(2023, 12, 1, 0, 0, 0).unwrap();
    let mut results = BTreeMap::new();
    for feed in ["direct", "digested"] {
        let mut e = entry("Stale");
        e.published = Some(old);
        results.insert(feed.to_string(), FeedResult::ok(feed, vec![e]));
    }
    let plan = vec![
        binding("direct", DeliveryStyle::PerEntry),
        binding("digested", DeliveryStyle::Summary),
    ];

    let report = router.dispatch(&plan, &results, now()).await;

    assert_eq!(notifier.sent_count(), 0);
    assert_eq!(report.sent(), 0);
    assert_eq!(report.failures(), 0);
    assert_eq!(report.feeds.len(), 2);
}

#[tokio::test]
async fn a_failed_send_skips_only_that_entry() {
    let renderer = HtmlRenderer::new();
    let notifier = RecordingNotifier::new();
    notifier.fail_when_subject_contains("Beta");
    let router = DispatchRouter::new(1, &renderer, &notifier);

    let plan = vec![binding("papers", DeliveryStyle::PerEntry)];
    let results = results_with("papers", &["Alpha", "Beta", "Gamma"]);

    let report = router.dispatch(&plan, &results, now()).await;

    assert_eq!(notifier.subjects(), ["[papers] Alpha", "[papers] Gamma"]);
    assert_eq!(report.feeds[0].sent, 2);
    assert_eq!(report.feeds[0].failures, 1);
}

#[tokio::test]
async fn a_planned_but_missing_feed_is_reported_not_fatal() {
    let renderer = HtmlRenderer::new();
    let notifier = RecordingNotifier::new();
    let router = DispatchRouter::new(1, &renderer, &notifier);

    let plan = vec![
        binding("ghost", DeliveryStyle::PerEntry),
        binding("papers", DeliveryStyle::PerEntry),
    ];
    let results = results_with("papers", &["Alpha"]);

    let report = router.dispatch(&plan, &results, now()).await;

    assert_eq!(report.missing, ["ghost"]);
    // The feed after the missing one is still dispatched.
    assert_eq!(notifier.subjects(), ["[papers] Alpha"]);
}

#[tokio::test]
async fn unplanned_feeds_are_never_dispatched() {
    let renderer = HtmlRenderer::new();
    let notifier = RecordingNotifier::new();
    let router = DispatchRouter::new(1, &renderer, &notifier);

    let mut results = results_with("papers", &["Alpha"]);
    results.insert(
        "stray".to_string(),
        FeedResult::ok("stray", vec![entry("Never seen")]),
    );
    let plan = vec![binding("papers", DeliveryStyle::PerEntry)];

    let report = router.dispatch(&plan, &results, now()).await;

    assert_eq!(notifier.subjects(), ["[papers] Alpha"]);
    assert_eq!(report.feeds.len(), 1);
    assert!(report.missing.is_empty());
}

#[tokio::test]
async fn the_relevance_gate_drops_off_topic_entries() {
    let strong = ["Bekenstein"];
    let weak = [r"\bmodular\b", "holographic"];
    let classifier = RelevanceClassifier::new(&strong, &weak).unwrap();

    let renderer = HtmlRenderer::new();
    let notifier = RecordingNotifier::new();
    let router = DispatchRouter::new(1, &renderer, &notifier).with_classifier(&classifier);

    let mut plan = vec![binding("papers", DeliveryStyle::PerEntry)];
    plan[0].classify = true;
    let results = results_with(
        "papers",
        &[
            "Bekenstein bound revisited",
            "Knot invariants of torus links",
            "Modular holographic maps",
        ],
    );

    let report = router.dispatch(&plan, &results, now()).await;

    assert_eq!(
        notifier.subjects(),
        [
            "[papers] Bekenstein bound revisited",
            "[papers] Modular holographic maps"
        ]
    );
    assert_eq!(report.feeds[0].retained, 3);
    assert_eq!(report.feeds[0].dropped_irrelevant, 1);
    assert_eq!(report.feeds[0].sent, 2);
}

#[tokio::test]
async fn ungated_bindings_ignore_the_classifier() {
    let strong = ["Bekenstein"];
    let weak: [&str; 0] = [];
    let classifier = RelevanceClassifier::new(&strong, &weak).unwrap();

    let renderer = HtmlRenderer::new();
    let notifier = RecordingNotifier::new();
    let router = DispatchRouter::new(1, &renderer, &notifier).with_classifier(&classifier);

    // classify = false: everything goes out even though a classifier exists.
    let plan = vec![binding("papers", DeliveryStyle::PerEntry)];
    let results = results_with("papers", &["Knot invariants of torus links"]);

    let report = router.dispatch(&plan, &results, now()).await;

    assert_eq!(notifier.sent_count(), 1);
    assert_eq!(report.feeds[0].dropped_irrelevant, 0);
}

/// Renders normally except for one poisoned title.
struct FlakyRenderer {
    poison: &'static str,
    inner: HtmlRenderer,
}

impl Renderer for FlakyRenderer {
    fn render_entry(&self, feed: &str, entry: &Entry) -> Result<MessageBody> {
        if entry.title.contains(self.poison) {
            bail!("template expansion failed");
        }
        self.inner.render_entry(feed, entry)
    }

    fn render_digest(&self, feed: &str, entries: &[Entry], today: NaiveDate) -> Result<MessageBody> {
        self.inner.render_digest(feed, entries, today)
    }
}

#[tokio::test]
async fn a_render_error_counts_as_a_failure_and_continues() {
    let renderer = FlakyRenderer {
        poison: "Beta",
        inner: HtmlRenderer::new(),
    };
    let notifier = RecordingNotifier::new();
    let router = DispatchRouter::new(1, &renderer, &notifier);

    let plan = vec![binding("papers", DeliveryStyle::PerEntry)];
    let results = results_with("papers", &["Alpha", "Beta", "Gamma"]);

    let report = router.dispatch(&plan, &results, now()).await;

    assert_eq!(notifier.subjects(), ["[papers] Alpha", "[papers] Gamma"]);
    assert_eq!(report.feeds[0].sent, 2);
    assert_eq!(report.feeds[0].failures, 1);
}

#[tokio::test]
async fn one_feed_can_be_bound_per_entry_and_another_as_summary() {
    let renderer = HtmlRenderer::new();
    let notifier = RecordingNotifier::new();
    let router = DispatchRouter::new(1, &renderer, &notifier);

    let mut results = results_with("direct", &["One", "Two"]);
    results.insert(
        "weekly".to_string(),
        FeedResult::ok("weekly", vec![entry("Three"), entry("Four")]),
    );
    let plan = vec![
        binding("direct", DeliveryStyle::PerEntry),
        binding("weekly", DeliveryStyle::Summary),
    ];

    let report = router.dispatch(&plan, &results, now()).await;

    assert_eq!(
        notifier.subjects(),
        [
            "[direct] One",
            "[direct] Two",
            "[weekly] Daily digest (2024-01-10) - 2 items"
        ]
    );
    assert_eq!(report.sent(), 3);
}
