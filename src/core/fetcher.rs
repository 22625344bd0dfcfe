//! Bounded-concurrency acquisition of metric snapshots.
use crate::core::metrics::{FetchError, MetricSnapshot, MetricsProvider};
use futures::stream::{self, StreamExt};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_WORKERS: usize = 7;
pub const DEFAULT_DELAY: Duration = Duration::from_secs(1);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Result of a single identifier lookup, keyed by the identifier as supplied.
pub type FetchOutcome = (String, Result<MetricSnapshot, FetchError>);

#[derive(Debug, Clone)]
pub struct FetcherOptions {
    /// Maximum number of lookups in flight.
    pub workers: usize,
    /// Pause each worker takes after a lookup, successful or not.
    pub delay: Duration,
    /// Upper bound for a single provider call.
    pub timeout: Duration,
    /// Appended to every identifier before it reaches the provider.
    pub market_suffix: String,
}

impl Default for FetcherOptions {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            delay: DEFAULT_DELAY,
            timeout: DEFAULT_TIMEOUT,
            market_suffix: String::new(),
        }
    }
}

pub struct Fetcher<'a> {
    provider: &'a (dyn MetricsProvider + Send + Sync),
    options: FetcherOptions,
}

impl<'a> Fetcher<'a> {
    pub fn new(provider: &'a (dyn MetricsProvider + Send + Sync), options: FetcherOptions) -> Self {
        Self { provider, options }
    }

    fn normalize(&self, identifier: &str) -> String {
        format!("{}{}", identifier.trim(), self.options.market_suffix)
    }

    /// Attempts every identifier and returns one outcome per input, in input order.
    ///
    /// Failures are logged and recorded against their identifier; they never
    /// abort the batch. `on_attempt` is invoked once per finished lookup.
    pub async fn fetch(
        &self,
        identifiers: &[String],
        on_attempt: &(dyn Fn() + Send + Sync),
    ) -> Vec<FetchOutcome> {
        let workers = self.options.workers.max(1);
        info!(
            count = identifiers.len(),
            workers, "Fetching metrics for identifiers"
        );

        let mut slots: Vec<Option<Result<MetricSnapshot, FetchError>>> =
            identifiers.iter().map(|_| None).collect();

        let lookups = identifiers.iter().enumerate().map(|(index, identifier)| {
            let symbol = self.normalize(identifier);
            async move {
                let result = self.lookup_one(identifier, &symbol).await;
                tokio::time::sleep(self.options.delay).await;
                on_attempt();
                (index, result)
            }
        });

        let mut completed = stream::iter(lookups).buffer_unordered(workers);
        while let Some((index, result)) = completed.next().await {
            slots[index] = Some(result);
        }

        identifiers
            .iter()
            .cloned()
            .zip(slots)
            .map(|(identifier, slot)| {
                let result = slot.unwrap_or_else(|| {
                    Err(FetchError::Provider(anyhow::anyhow!(
                        "Lookup never completed for {identifier}"
                    )))
                });
                (identifier, result)
            })
            .collect()
    }

    async fn lookup_one(
        &self,
        identifier: &str,
        symbol: &str,
    ) -> Result<MetricSnapshot, FetchError> {
        debug!(identifier, symbol, "Looking up metrics");
        let result = match tokio::time::timeout(self.options.timeout, self.provider.lookup(symbol))
            .await
        {
            Ok(Ok(snapshot)) => Ok(MetricSnapshot {
                identifier: identifier.to_string(),
                ..snapshot
            }),
            Ok(Err(e)) => Err(FetchError::Provider(e)),
            Err(_) => Err(FetchError::Timeout(self.options.timeout)),
        };

        if let Err(e) = &result {
            warn!(identifier, error = %e, "Skipping identifier");
        }
        result
    }
}

/// Splits outcomes into the successful snapshots (input order kept) and the failure count.
pub fn successful_snapshots(outcomes: Vec<FetchOutcome>) -> (Vec<MetricSnapshot>, usize) {
    let mut failed = 0;
    let snapshots = outcomes
        .into_iter()
        .filter_map(|(_, result)| match result {
            Ok(snapshot) => Some(snapshot),
            Err(_) => {
                failed += 1;
                None
            }
        })
        .collect();
    (snapshots, failed)
}
