//! Threshold filtering and final ordering of ranked rows.
use crate::core::ranking::RankedRow;
use serde::{Deserialize, Serialize};

/// Quality and value cut-offs. ROA and ROE are percentages.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Thresholds {
    #[serde(default)]
    pub min_roa: f64,
    #[serde(default)]
    pub min_roe: f64,
    #[serde(default = "default_max_ratio")]
    pub max_pe: f64,
    #[serde(default = "default_max_ratio")]
    pub max_ev_ebit: f64,
}

fn default_max_ratio() -> f64 {
    20.0
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            min_roa: 0.0,
            min_roe: 0.0,
            max_pe: default_max_ratio(),
            max_ev_ebit: default_max_ratio(),
        }
    }
}

impl Thresholds {
    pub fn accepts(&self, row: &RankedRow) -> bool {
        let company = &row.company;
        company.return_on_assets >= self.min_roa
            && company.ev_to_ebit > 0.0
            && company.ev_to_ebit <= self.max_ev_ebit
            && company.price_to_earnings > 0.0
            && company.price_to_earnings < self.max_pe
            && company.return_on_equity > self.min_roe
    }
}

/// Keeps rows passing every threshold, best composite score first.
///
/// Rows with equal `total_rank` keep their incoming relative order.
pub fn filter(rows: &[RankedRow], thresholds: &Thresholds) -> Vec<RankedRow> {
    let mut kept: Vec<RankedRow> = rows
        .iter()
        .filter(|row| thresholds.accepts(row))
        .cloned()
        .collect();
    kept.sort_by(|a, b| b.total_rank.total_cmp(&a.total_rank));
    kept
}
