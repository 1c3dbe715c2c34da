//! Durable sink for flagged texts.
//!
//! The pipeline writes its flagged texts once, at the end of a run. Every write
//! replaces the previous contents.

pub mod local;

use async_trait::async_trait;

use crate::error::Result;

// Re-export for convenience
pub use local::TextFileStore;

/// Trait for flagged-text storage backends.
#[async_trait]
pub trait FlaggedStore: Send + Sync {
    /// Replace the stored contents with `entries`, one per line.
    async fn write_flagged(&self, entries: &[String]) -> Result<()>;

    /// Human-readable location used in logs and reports.
    fn location(&self) -> String;
}
