//! Run counters, budgets and the final report.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::error::FeedError;

/// Counters accumulated over one run.
///
/// `pages_fetched` and `items_processed` drive budget decisions; the rest are
/// for reporting only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounters {
    pub pages_fetched: u64,
    pub items_processed: u64,
    pub items_flagged: u64,
    pub deletions_succeeded: u64,
    pub deletions_failed: u64,
    pub rate_limit_retries: u64,
}

/// Ceilings bounding one run. `None` means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunLimits {
    pub max_items: Option<u64>,
    pub max_pages: Option<u64>,
}

impl RunLimits {
    /// Resolve limits from configured values.
    ///
    /// An explicit item ceiling wins. Otherwise a page ceiling implies an item
    /// ceiling of `max_pages * batch_size`.
    pub fn resolve(max_items: Option<u64>, max_pages: Option<u64>, batch_size: u32) -> Self {
        let max_items = max_items
            .or_else(|| max_pages.map(|pages| pages.saturating_mul(u64::from(batch_size))));
        Self {
            max_items,
            max_pages,
        }
    }

    pub fn items_exhausted(&self, items_processed: u64) -> bool {
        self.max_items.is_some_and(|max| items_processed >= max)
    }

    pub fn pages_exhausted(&self, pages_fetched: u64) -> bool {
        self.max_pages.is_some_and(|max| pages_fetched >= max)
    }
}

/// Which ceiling stopped the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Budget {
    Items,
    Pages,
}

/// Why the traversal stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// The feed returned no further cursor
    Exhausted,
    /// A configured ceiling was reached
    BudgetExhausted(Budget),
    /// A fetch failed with an unrecoverable error
    Failed(FeedError),
}

impl Termination {
    pub fn is_failure(&self) -> bool {
        matches!(self, Termination::Failed(_))
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Exhausted => f.write_str("no more pages"),
            Termination::BudgetExhausted(Budget::Items) => f.write_str("item budget reached"),
            Termination::BudgetExhausted(Budget::Pages) => f.write_str("page budget reached"),
            Termination::Failed(error) => write!(f, "aborted: {error}"),
        }
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub termination: Termination,
    pub counters: RunCounters,
    /// Number of flagged texts written, `None` when the flush failed
    pub flushed: Option<usize>,
    /// Where the flagged texts went
    pub output_location: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_item_budget_wins() {
        let limits = RunLimits::resolve(Some(7), Some(3), 100);
        assert_eq!(limits.max_items, Some(7));
        assert_eq!(limits.max_pages, Some(3));
    }

    #[test]
    fn test_page_budget_implies_item_budget() {
        let limits = RunLimits::resolve(None, Some(3), 25);
        assert_eq!(limits.max_items, Some(75));
        assert!(!limits.items_exhausted(74));
        assert!(limits.items_exhausted(75));
    }

    #[test]
    fn test_unbounded_when_nothing_configured() {
        let limits = RunLimits::resolve(None, None, 100);
        assert!(!limits.items_exhausted(u64::MAX));
        assert!(!limits.pages_exhausted(u64::MAX));
    }
}
