use crate::core::fetcher::{DEFAULT_DELAY, DEFAULT_TIMEOUT, DEFAULT_WORKERS, FetcherOptions};
use crate::core::filter::Thresholds;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct YahooProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub yahoo: Option<YahooProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            yahoo: Some(YahooProviderConfig {
                base_url: "https://query1.finance.yahoo.com".to_string(),
            }),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct FetcherConfig {
    pub workers: usize,
    pub delay_ms: u64,
    pub timeout_secs: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        FetcherConfig {
            workers: DEFAULT_WORKERS,
            delay_ms: DEFAULT_DELAY.as_millis() as u64,
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

fn default_identifiers_path() -> String {
    "codigos_acoes.txt".to_string()
}

fn default_market_suffix() -> String {
    ".SA".to_string()
}

fn default_cache_ttl_secs() -> u64 {
    3600
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default = "default_identifiers_path")]
    pub identifiers_path: String,
    #[serde(default = "default_market_suffix")]
    pub market_suffix: String,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            providers: ProvidersConfig::default(),
            identifiers_path: default_identifiers_path(),
            market_suffix: default_market_suffix(),
            fetcher: FetcherConfig::default(),
            thresholds: Thresholds::default(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

impl AppConfig {
    /// Loads the config from the default location, falling back to defaults
    /// when no file has been created yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "mfrank", "mfrank")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn yahoo_base_url(&self) -> &str {
        self.providers
            .yahoo
            .as_ref()
            .map_or("https://query1.finance.yahoo.com", |p| &p.base_url)
    }

    pub fn fetcher_options(&self) -> FetcherOptions {
        FetcherOptions {
            workers: self.fetcher.workers,
            delay: Duration::from_millis(self.fetcher.delay_ms),
            timeout: Duration::from_secs(self.fetcher.timeout_secs),
            market_suffix: self.market_suffix.clone(),
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}
