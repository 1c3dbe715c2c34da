// src/models/mod.rs

//! Domain models for the moderation pipeline.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod classification;
mod config;
mod feed;
mod stats;

// Re-export all public types
pub use classification::{ClassificationResult, Label, Verdict, normalize};
pub use config::{
    AuthConfig, CREDENTIAL_ENV, Config, FeedConfig, MetricsConfig, ModerationConfig, OutputConfig,
    RunConfig,
};
pub use feed::{Cursor, FeedItem, Page, WallPostsResponse};
pub use stats::{Budget, RunCounters, RunLimits, RunReport, Termination};
