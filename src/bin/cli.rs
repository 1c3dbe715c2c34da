//! wallguard CLI
//!
//! Scans a group wall, removes posts the classifier is confident are scams and
//! saves their text for review.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use wallguard::{
    error::Result,
    models::{CREDENTIAL_ENV, Config, FeedItem, Termination},
    pipeline::{Collaborators, LogMetricsSink, PaginationDriver, RunSettings, classify_item},
    services::{
        AuthProvider, CsrfTokenProvider, DryRunModerator, GroupWallFeed, GroupWallModerator,
        LinearTextModel, ModerationAction,
    },
    storage::TextFileStore,
    utils::http,
};

/// wallguard - Group Wall Scam Moderator
#[derive(Parser, Debug)]
#[command(name = "wallguard", version, about = "Group wall scam moderator")]

struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "moderator.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan the wall and remove confident scams
    Run {
        /// Log intended deletions without performing them
        #[arg(long)]
        dry_run: bool,

        /// Stop after this many posts
        #[arg(long)]
        max_items: Option<u64>,

        /// Where to save flagged texts (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate configuration and classifier model
    Validate,

    /// Score a single text with the classifier
    Classify {
        /// Text to score
        text: String,
    },
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Execute one moderation pass.
async fn run_moderation(config: &Config) -> Result<()> {
    config.validate()?;

    let classifier = LinearTextModel::load(&config.moderation.model_path)?;
    log::info!(
        "Loaded classifier from {} ({} features)",
        config.moderation.model_path.display(),
        classifier.feature_count()
    );

    let client = http::create_async_client(&config.feed)?;
    let token = CsrfTokenProvider::new(client.clone(), &config.auth)
        .acquire_token()
        .await?;

    let feed = GroupWallFeed::new(client.clone(), &config.feed, token.clone())?;
    let action: Box<dyn ModerationAction> = if config.moderation.dry_run {
        log::warn!("Dry run: posts will not be deleted");
        Box::new(DryRunModerator)
    } else {
        Box::new(GroupWallModerator::new(client, &config.feed, token)?)
    };
    let store = TextFileStore::new(&config.output.scam_output_path);
    let sink = LogMetricsSink;

    let deps = Collaborators {
        feed: &feed,
        classifier: &classifier,
        action: action.as_ref(),
        store: &store,
        metrics: &sink,
    };
    let report = PaginationDriver::new(deps, RunSettings::from_config(config))
        .run()
        .await;

    wallguard::utils::log::summary(
        "Moderation run",
        &wallguard::utils::log::report_items(&report),
    );

    match report.termination {
        Termination::Failed(error) => Err(error.into()),
        _ => Ok(()),
    }
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load_or_default(&cli.config)
        .with_credential_override(std::env::var(CREDENTIAL_ENV).ok());

    match cli.command {
        Command::Run {
            dry_run,
            max_items,
            output,
        } => {
            if dry_run {
                config.moderation.dry_run = true;
            }
            if max_items.is_some() {
                config.run.max_items = max_items;
            }
            if let Some(path) = output {
                config.output.scam_output_path = path;
            }

            wallguard::utils::log::header("wallguard: moderating group wall");
            run_moderation(&config).await?;
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");

            let model = LinearTextModel::load(&config.moderation.model_path)?;
            log::info!("✓ Model OK ({} features)", model.feature_count());

            log::info!("All validations passed!");
        }

        Command::Classify { text } => {
            let model = LinearTextModel::load(&config.moderation.model_path)?;
            let item = FeedItem::new(0, text);
            let result = classify_item(&model, &item)?;
            let threshold = config.moderation.decision_threshold;

            log::info!(
                "Prediction: {} (Probability: {:.4})",
                result.label,
                result.probability
            );
            log::info!(
                "Would flag at threshold {}: {}",
                threshold,
                if result.is_flagged(threshold) { "yes" } else { "no" }
            );
        }
    }

    Ok(())
}
