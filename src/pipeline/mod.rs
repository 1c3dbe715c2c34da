//! Pipeline entry points for moderation runs.
//!
//! - `moderate`: the pagination driver and per-item decision
//! - `retry`: fixed-delay retry of rate-limited fetches
//! - `accumulator`: flagged texts awaiting the end-of-run flush
//! - `metrics`: periodic performance snapshots

pub mod accumulator;
pub mod metrics;
pub mod moderate;
pub mod retry;

#[cfg(test)]
pub(crate) mod testing;

pub use accumulator::ScamAccumulator;
pub use metrics::{LogMetricsSink, MetricsReporter, MetricsSink, MetricsSnapshot};
pub use moderate::{Collaborators, PaginationDriver, RunSettings, classify_item};
pub use retry::fetch_with_retry;
