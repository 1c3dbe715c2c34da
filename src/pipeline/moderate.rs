// src/pipeline/moderate.rs

//! Feed moderation pass.
//!
//! Walks the feed page by page, scores every item, removes confident scams
//! and records their text. The traversal is strictly sequential: one fetch,
//! then one item at a time, with fixed sleeps in between to stay inside the
//! upstream rate limits.
//!
//! ```text
//! Fetching ──▶ Classifying ──▶ (Acting) ──▶ Advancing ──▶ Fetching ...
//!     │                │                        │
//!     └── auth/transient error                  └── no cursor / page budget
//!                      └── item budget
//!                                   ▼
//!                               Terminal: flush once, report metrics
//! ```

use std::time::Duration;

use chrono::Utc;

use crate::error::Result;
use crate::models::{
    Budget, ClassificationResult, Config, Cursor, FeedItem, RunCounters, RunLimits, RunReport,
    Termination, normalize,
};
use crate::pipeline::accumulator::ScamAccumulator;
use crate::pipeline::metrics::{MetricsReporter, MetricsSink};
use crate::pipeline::retry::fetch_with_retry;
use crate::services::{FeedSource, ModerationAction, TextClassifier};
use crate::storage::FlaggedStore;
use crate::utils::preview;

/// Tunables for one pass.
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Probability a positive verdict must strictly exceed
    pub threshold: f64,
    /// Sleep after every processed item
    pub request_delay: Duration,
    /// Sleep before retrying a rate-limited fetch
    pub rate_limit_delay: Duration,
    pub limits: RunLimits,
    /// Page number shown for the first fetch
    pub starting_page: u64,
    /// Pages between metrics snapshots (0 = final snapshot only)
    pub metrics_interval_pages: u64,
}

impl RunSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            threshold: config.moderation.decision_threshold,
            request_delay: config.run.request_delay(),
            rate_limit_delay: config.run.rate_limit_delay(),
            limits: RunLimits::resolve(
                config.run.max_items,
                config.run.max_pages,
                config.feed.batch_size,
            ),
            starting_page: config.run.starting_page,
            metrics_interval_pages: config.metrics.log_interval_pages,
        }
    }
}

/// Everything the pass talks to.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub feed: &'a dyn FeedSource,
    pub classifier: &'a dyn TextClassifier,
    pub action: &'a dyn ModerationAction,
    pub store: &'a dyn FlaggedStore,
    pub metrics: &'a dyn MetricsSink,
}

/// Score one item. The classifier sees the lowercased body; a missing body
/// is scored as the empty string.
pub fn classify_item(
    classifier: &dyn TextClassifier,
    item: &FeedItem,
) -> Result<ClassificationResult> {
    let normalized_text = normalize(item.text());
    let verdict = classifier.classify(&normalized_text)?;
    Ok(ClassificationResult {
        label: verdict.label,
        probability: verdict.probability,
        normalized_text,
    })
}

/// Owns the traversal loop for a single run.
pub struct PaginationDriver<'a> {
    deps: Collaborators<'a>,
    settings: RunSettings,
}

impl<'a> PaginationDriver<'a> {
    pub fn new(deps: Collaborators<'a>, settings: RunSettings) -> Self {
        Self { deps, settings }
    }

    /// Run to termination.
    ///
    /// Flagged texts are flushed exactly once, whatever the reason for
    /// stopping. A failed flush is logged and reported, not returned.
    pub async fn run(self) -> RunReport {
        let start_time = Utc::now();
        let reporter =
            MetricsReporter::new(self.deps.metrics, self.settings.metrics_interval_pages);
        let mut counters = RunCounters::default();
        let mut accumulator = ScamAccumulator::new();

        log::info!("Fetching group wall posts...");
        let termination = self
            .traverse(&reporter, &mut counters, &mut accumulator)
            .await;

        match &termination {
            Termination::Failed(error) => {
                log::error!("Error fetching group wall posts: {}", error)
            }
            other => log::info!("Stopping: {}", other),
        }

        let output_location = self.deps.store.location();
        let flushed = match accumulator.flush(self.deps.store).await {
            Ok(count) => {
                log::info!("Saved {} scam comments to {}", count, output_location);
                Some(count)
            }
            Err(error) => {
                log::error!(
                    "Failed to save scam comments to {}: {}",
                    output_location,
                    error
                );
                None
            }
        };

        reporter.finish(&counters, &termination);

        RunReport {
            termination,
            counters,
            flushed,
            output_location,
            start_time,
            end_time: Utc::now(),
        }
    }

    async fn traverse(
        &self,
        reporter: &MetricsReporter<'_>,
        counters: &mut RunCounters,
        accumulator: &mut ScamAccumulator,
    ) -> Termination {
        let mut cursor: Option<Cursor> = None;

        loop {
            let page_number = self.settings.starting_page + counters.pages_fetched;
            log::info!("Fetching page {}...", page_number);

            let page = match fetch_with_retry(
                self.deps.feed,
                cursor.as_ref(),
                self.settings.rate_limit_delay,
                counters,
            )
            .await
            {
                Ok(page) => page,
                Err(error) => return Termination::Failed(error),
            };
            log::debug!("Page {} returned {} posts", page_number, page.items.len());

            for item in &page.items {
                self.process_item(item, counters, accumulator).await;

                if self.settings.limits.items_exhausted(counters.items_processed) {
                    return Termination::BudgetExhausted(Budget::Items);
                }
                if !self.settings.request_delay.is_zero() {
                    tokio::time::sleep(self.settings.request_delay).await;
                }
            }

            // An empty page with a cursor is not the end.
            let Some(next) = page.next_cursor else {
                log::info!("No more pages to fetch.");
                return Termination::Exhausted;
            };

            counters.pages_fetched += 1;
            cursor = Some(next);
            reporter.on_page(counters);

            if self.settings.limits.pages_exhausted(counters.pages_fetched) {
                return Termination::BudgetExhausted(Budget::Pages);
            }
        }
    }

    /// Classify, act and record one item. Never fails the run.
    async fn process_item(
        &self,
        item: &FeedItem,
        counters: &mut RunCounters,
        accumulator: &mut ScamAccumulator,
    ) {
        match classify_item(self.deps.classifier, item) {
            Ok(result) => {
                log::info!(
                    "Post ID: {} | {} (Probability: {:.4}) | {}",
                    item.id,
                    result.label,
                    result.probability,
                    preview(item.text(), 80)
                );

                if result.is_flagged(self.settings.threshold) {
                    counters.items_flagged += 1;
                    match self.deps.action.delete(item.id).await {
                        Ok(()) => {
                            counters.deletions_succeeded += 1;
                            log::info!("Successfully deleted post ID {}", item.id);
                        }
                        Err(error) => {
                            counters.deletions_failed += 1;
                            log::warn!("Failed to delete post ID {}: {}", item.id, error);
                        }
                    }
                    // Removal failure does not undo the flag.
                    accumulator.push(result.normalized_text);
                }
            }
            Err(error) => {
                log::warn!("Skipping post ID {}: {}", item.id, error);
            }
        }

        counters.items_processed += 1;
    }
}
