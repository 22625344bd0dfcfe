//! Cleans fetched snapshots into a rankable dataset.
use crate::core::metrics::MetricSnapshot;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// A snapshot that carries every ranking metric.
///
/// `return_on_assets` and `return_on_equity` are percentages. All four ranking
/// metrics are rounded to two decimal places.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRow {
    pub identifier: String,
    pub price: Option<f64>,
    pub price_to_earnings: f64,
    pub return_on_assets: f64,
    pub return_on_equity: f64,
    pub ev_to_ebit: f64,
    pub market_cap: Option<f64>,
    pub sector: Option<String>,
    pub subsector: Option<String>,
}

pub type Dataset = Vec<CompanyRow>;

/// Rounds half to even, matching the usual dataframe rounding of ratios.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

fn complete(snapshot: MetricSnapshot) -> Option<CompanyRow> {
    // NaN or infinite values count as missing
    let finite = |value: Option<f64>| value.filter(|v| v.is_finite());
    let (Some(pe), Some(roa), Some(roe), Some(ev_ebit)) = (
        finite(snapshot.price_to_earnings),
        finite(snapshot.return_on_assets),
        finite(snapshot.return_on_equity),
        finite(snapshot.ev_to_ebit),
    ) else {
        debug!(identifier = %snapshot.identifier, "Dropping incomplete row");
        return None;
    };

    Some(CompanyRow {
        identifier: snapshot.identifier,
        price: snapshot.price,
        price_to_earnings: round2(pe),
        return_on_assets: round2(roa * 100.0),
        return_on_equity: round2(roe * 100.0),
        ev_to_ebit: round2(ev_ebit),
        market_cap: snapshot.market_cap,
        sector: snapshot.sector,
        subsector: snapshot.subsector,
    })
}

/// Deduplicates by identifier (first occurrence wins), drops rows missing any
/// ranking metric and converts the return ratios into rounded percentages.
pub fn build(records: impl IntoIterator<Item = MetricSnapshot>) -> Dataset {
    let mut seen = HashSet::new();
    let dataset: Dataset = records
        .into_iter()
        .filter(|snapshot| seen.insert(snapshot.identifier.clone()))
        .filter_map(complete)
        .collect();
    debug!(rows = dataset.len(), "Built dataset");
    dataset
}
