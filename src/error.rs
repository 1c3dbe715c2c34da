// src/error.rs

//! Unified error handling for the moderation pipeline.

use thiserror::Error;

/// Result type alias for moderator operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Credentials were rejected while acquiring a token
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Fetching a feed page failed
    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    /// Classifier model could not be loaded or evaluated
    #[error("Model error: {0}")]
    Model(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create an authentication error.
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    /// Create a model error.
    pub fn model(message: impl Into<String>) -> Self {
        Self::Model(message.into())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Failure modes of a single page fetch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    /// Token invalid or expired. Never retried.
    #[error("authentication rejected (status {status}): {body}")]
    Auth { status: u16, body: String },

    /// Upstream asked us to slow down. Retry the same cursor.
    #[error("rate limited by upstream")]
    RateLimited,

    /// Network failure, unexpected status or malformed payload.
    #[error("transient failure: {0}")]
    Transient(String),
}

impl FeedError {
    /// Create a transient error from anything displayable.
    pub fn transient(message: impl std::fmt::Display) -> Self {
        Self::Transient(message.to_string())
    }
}

impl From<reqwest::Error> for FeedError {
    fn from(error: reqwest::Error) -> Self {
        Self::transient(error)
    }
}

/// A failed deletion. Non-fatal to the run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeleteError {
    /// Upstream answered with a non-success status
    #[error("status {status}: {body}")]
    Status { status: u16, body: String },

    /// Request never completed
    #[error("request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for DeleteError {
    fn from(error: reqwest::Error) -> Self {
        Self::Request(error.to_string())
    }
}
