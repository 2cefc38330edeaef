// src/aggregate.rs
//! Concurrent per-source aggregation with failure isolation.
//!
//! One task per source; outcomes land in index-addressed slots and are
//! merged after every task has finished, so no shared map is locked while
//! fetches run.

use std::collections::BTreeMap;

use tokio::task::JoinSet;

use crate::feed::FeedResult;
use crate::ingest::SourceAdapter;

/// Fetch every source concurrently and key the outcomes by source name.
///
/// Always yields exactly one [`FeedResult`] per adapter: fetch errors (and
/// even panicked tasks) become per-source `error` strings instead of
/// failing the run.
pub async fn aggregate_sources(
    adapters: Vec<Box<dyn SourceAdapter>>,
) -> BTreeMap<String, FeedResult> {
    let names: Vec<String> = adapters.iter().map(|a| a.name().to_string()).collect();
    let mut slots: Vec<Option<FeedResult>> = Vec::new();
    slots.resize_with(adapters.len(), || None);

    let mut set = JoinSet::new();
    for (idx, adapter) in adapters.into_iter().enumerate() {
        set.spawn(async move { (idx, adapter.fetch().await) });
    }

    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((idx, Ok(entries))) => {
                tracing::info!(source = %names[idx], entries = entries.len(), "source fetched");
                slots[idx] = Some(FeedResult::ok(&names[idx], entries));
            }
            Ok((idx, Err(e))) => {
                tracing::warn!(source = %names[idx], error = format!("{e:#}"), "source failed");
                slots[idx] = Some(FeedResult::failed(&names[idx], format!("{e:#}")));
            }
            Err(join_err) => {
                // The index is lost with the task; the empty slot is
                // back-filled below.
                tracing::error!(error = ?join_err, "source task failed to join");
            }
        }
    }

    let mut results = BTreeMap::new();
    for (idx, slot) in slots.into_iter().enumerate() {
        let result =
            slot.unwrap_or_else(|| FeedResult::failed(&names[idx], "source task panicked"));
        results.insert(names[idx].clone(), result);
    }
    results
}
