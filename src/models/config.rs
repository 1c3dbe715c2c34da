//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Environment variable that overrides `auth.credential`.
pub const CREDENTIAL_ENV: &str = "WALLGUARD_CREDENTIAL";

/// Page sizes the group wall endpoint accepts.
const ALLOWED_BATCH_SIZES: [u32; 4] = [10, 25, 50, 100];

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Credential and token endpoint
    #[serde(default)]
    pub auth: AuthConfig,

    /// Group wall endpoints and HTTP behavior
    #[serde(default)]
    pub feed: FeedConfig,

    /// Throttling and budgets for one run
    #[serde(default)]
    pub run: RunConfig,

    /// Classifier and decision settings
    #[serde(default)]
    pub moderation: ModerationConfig,

    /// Flagged-text output
    #[serde(default)]
    pub output: OutputConfig,

    /// Periodic performance snapshots
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(&path)?;
        let config = toml::from_str(&content)?;
        log::info!("Loaded configuration from {}", path.as_ref().display());
        Ok(config)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Replace the configured credential when an override is present.
    ///
    /// Empty overrides are ignored so an unset-but-exported variable does not
    /// wipe a credential from the file.
    pub fn with_credential_override(mut self, credential: Option<String>) -> Self {
        if let Some(credential) = credential.filter(|c| !c.trim().is_empty()) {
            self.auth.credential = credential;
        }
        self
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.auth.credential.trim().is_empty() {
            return Err(AppError::validation(format!(
                "auth.credential is empty (set it in the config or via {CREDENTIAL_ENV})"
            )));
        }
        if self.feed.group_id == 0 {
            return Err(AppError::validation("feed.group_id must be > 0"));
        }
        if !ALLOWED_BATCH_SIZES.contains(&self.feed.batch_size) {
            return Err(AppError::validation(format!(
                "feed.batch_size must be one of {:?}",
                ALLOWED_BATCH_SIZES
            )));
        }
        if self.feed.timeout_secs == 0 {
            return Err(AppError::validation("feed.timeout_secs must be > 0"));
        }
        if self.feed.user_agent.trim().is_empty() {
            return Err(AppError::validation("feed.user_agent is empty"));
        }
        if self.run.max_items == Some(0) {
            return Err(AppError::validation("run.max_items must be > 0"));
        }
        if self.run.max_pages == Some(0) {
            return Err(AppError::validation("run.max_pages must be > 0"));
        }
        let threshold = self.moderation.decision_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(AppError::validation(
                "moderation.decision_threshold must be within [0, 1]",
            ));
        }
        if self.output.scam_output_path.as_os_str().is_empty() {
            return Err(AppError::validation("output.scam_output_path is empty"));
        }
        Ok(())
    }
}

/// Credential and token endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Session cookie value sent as `.ROBLOSECURITY`
    #[serde(default)]
    pub credential: String,

    /// Endpoint that hands out CSRF tokens
    #[serde(default = "defaults::auth_url")]
    pub auth_url: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            credential: String::new(),
            auth_url: defaults::auth_url(),
        }
    }
}

/// Group wall endpoints and HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Group whose wall is moderated
    #[serde(default)]
    pub group_id: u64,

    /// Host serving the paginated wall listing
    #[serde(default = "defaults::feed_base_url")]
    pub feed_base_url: String,

    /// Host accepting wall post deletions
    #[serde(default = "defaults::delete_base_url")]
    pub delete_base_url: String,

    /// Items requested per page
    #[serde(default = "defaults::batch_size")]
    pub batch_size: u32,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            group_id: 0,
            feed_base_url: defaults::feed_base_url(),
            delete_base_url: defaults::delete_base_url(),
            batch_size: defaults::batch_size(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Throttling and budgets for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Delay after every processed item, in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Fixed delay before retrying a rate-limited fetch, in milliseconds
    #[serde(default = "defaults::rate_limit_delay")]
    pub rate_limit_delay_ms: u64,

    /// Ceiling on total items processed in one run.
    /// When unset, falls back to `max_pages * batch_size`.
    #[serde(default)]
    pub max_items: Option<u64>,

    /// Ceiling on pages advanced past in one run
    #[serde(default)]
    pub max_pages: Option<u64>,

    /// Number shown for the first fetched page in logs
    #[serde(default = "defaults::starting_page")]
    pub starting_page: u64,
}

impl RunConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn rate_limit_delay(&self) -> Duration {
        Duration::from_millis(self.rate_limit_delay_ms)
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            request_delay_ms: defaults::request_delay(),
            rate_limit_delay_ms: defaults::rate_limit_delay(),
            max_items: None,
            max_pages: None,
            starting_page: defaults::starting_page(),
        }
    }
}

/// Classifier and decision settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationConfig {
    /// Probability a positive verdict must strictly exceed to be flagged
    #[serde(default = "defaults::decision_threshold")]
    pub decision_threshold: f64,

    /// Log intended deletions instead of performing them
    #[serde(default)]
    pub dry_run: bool,

    /// Exported classifier model (JSON)
    #[serde(default = "defaults::model_path")]
    pub model_path: PathBuf,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            decision_threshold: defaults::decision_threshold(),
            dry_run: false,
            model_path: defaults::model_path(),
        }
    }
}

/// Flagged-text output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// File receiving one flagged text per line
    #[serde(default = "defaults::scam_output_path")]
    pub scam_output_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            scam_output_path: defaults::scam_output_path(),
        }
    }
}

/// Periodic metrics settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Emit a snapshot every N pages (0 disables periodic snapshots)
    #[serde(default = "defaults::log_interval_pages")]
    pub log_interval_pages: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            log_interval_pages: defaults::log_interval_pages(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Auth defaults
    pub fn auth_url() -> String {
        "https://auth.roblox.com/v2/login".into()
    }

    // Feed defaults
    pub fn feed_base_url() -> String {
        "https://groups.roblox.com".into()
    }
    pub fn delete_base_url() -> String {
        "https://groups.roproxy.com".into()
    }
    pub fn batch_size() -> u32 {
        100
    }
    pub fn user_agent() -> String {
        concat!("wallguard/", env!("CARGO_PKG_VERSION")).into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Run defaults
    pub fn request_delay() -> u64 {
        1
    }
    pub fn rate_limit_delay() -> u64 {
        5_000
    }
    pub fn starting_page() -> u64 {
        1
    }

    // Moderation defaults
    pub fn decision_threshold() -> f64 {
        0.9
    }
    pub fn model_path() -> PathBuf {
        PathBuf::from("models/scam_classifier.json")
    }

    // Output defaults
    pub fn scam_output_path() -> PathBuf {
        PathBuf::from("scam_comments.txt")
    }

    // Metrics defaults
    pub fn log_interval_pages() -> u64 {
        10
    }
}
