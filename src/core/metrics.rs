//! Fundamental metrics abstractions and core types

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Point-in-time fundamentals for one identifier.
///
/// Every metric is optional: `None` means the provider had no data for it,
/// which is distinct from a reported value of zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    pub identifier: String,
    pub price: Option<f64>,
    pub price_to_earnings: Option<f64>,
    pub return_on_assets: Option<f64>,
    pub return_on_equity: Option<f64>,
    pub ev_to_ebit: Option<f64>,
    pub market_cap: Option<f64>,
    pub sector: Option<String>,
    pub subsector: Option<String>,
}

/// Failure to obtain a snapshot for a single identifier.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("provider error: {0:#}")]
    Provider(#[from] anyhow::Error),
    #[error("lookup timed out after {0:?}")]
    Timeout(Duration),
}

#[async_trait]
pub trait MetricsProvider: Send + Sync {
    /// Looks up fundamentals for a provider-normalized symbol.
    async fn lookup(&self, symbol: &str) -> Result<MetricSnapshot>;
}
