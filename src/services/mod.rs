// src/services/mod.rs

//! Collaborators of the moderation pipeline.
//!
//! - `auth`: credential exchange for request tokens
//! - `feed`: paginated group wall listing
//! - `moderation`: post removal
//! - `classifier`: scam classifier

pub mod auth;
pub mod classifier;
pub mod feed;
pub mod moderation;

pub use auth::{AuthProvider, CsrfTokenProvider, Token};
pub use classifier::{LinearTextModel, TextClassifier};
pub use feed::{FeedSource, GroupWallFeed};
pub use moderation::{DryRunModerator, GroupWallModerator, ModerationAction};
