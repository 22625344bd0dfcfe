pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::cli::rank::{DatasetCache, ThresholdOverrides};
use crate::core::config::AppConfig;
use anyhow::Result;
use tracing::{debug, info};

/// Options for the `rank` command.
#[derive(Debug, Clone, Default)]
pub struct RankOptions {
    /// Overrides `identifiers_path` from the config.
    pub identifiers_path: Option<String>,
    pub thresholds: ThresholdOverrides,
    /// Keep prompting for new thresholds after each table.
    pub interactive: bool,
}

#[derive(Debug, Clone)]
pub enum AppCommand {
    Rank(RankOptions),
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("mfrank starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    match command {
        AppCommand::Rank(options) => {
            let identifiers_path = options
                .identifiers_path
                .as_deref()
                .unwrap_or(&config.identifiers_path);
            let identifiers = cli::rank::read_identifiers(identifiers_path)?;

            let provider = providers::YahooMetricsProvider::new(config.yahoo_base_url())?;
            let cache = DatasetCache::new(config.cache_ttl());
            let thresholds = options.thresholds.apply(config.thresholds);

            cli::rank::run(
                &identifiers,
                &provider,
                &config.fetcher_options(),
                &cache,
                thresholds,
                options.interactive,
            )
            .await
        }
    }
}
