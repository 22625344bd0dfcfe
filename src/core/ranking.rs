//! Magic Formula ranking: per-metric average ranks summed into a composite score.
//!
//! A larger rank number is always more favorable. Tied values share the mean
//! of the positions they would occupy.
use crate::core::dataset::{CompanyRow, Dataset};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Higher values earn larger ranks.
    Ascending,
    /// Lower values earn larger ranks.
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Criterion {
    ReturnOnAssets,
    EvToEbit,
    ReturnOnEquity,
    PriceToEarnings,
}

impl Criterion {
    pub const ALL: [Criterion; 4] = [
        Criterion::ReturnOnAssets,
        Criterion::EvToEbit,
        Criterion::ReturnOnEquity,
        Criterion::PriceToEarnings,
    ];

    pub fn direction(&self) -> Direction {
        match self {
            Criterion::ReturnOnAssets | Criterion::ReturnOnEquity => Direction::Ascending,
            Criterion::EvToEbit | Criterion::PriceToEarnings => Direction::Descending,
        }
    }

    pub fn value(&self, row: &CompanyRow) -> f64 {
        match self {
            Criterion::ReturnOnAssets => row.return_on_assets,
            Criterion::EvToEbit => row.ev_to_ebit,
            Criterion::ReturnOnEquity => row.return_on_equity,
            Criterion::PriceToEarnings => row.price_to_earnings,
        }
    }
}

impl Display for Criterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Criterion::ReturnOnAssets => "R_ROA",
                Criterion::EvToEbit => "R_EV_EBIT",
                Criterion::ReturnOnEquity => "R_ROE",
                Criterion::PriceToEarnings => "R_PL",
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedRow {
    pub company: CompanyRow,
    pub roa_rank: f64,
    pub ev_ebit_rank: f64,
    pub roe_rank: f64,
    pub pe_rank: f64,
    pub total_rank: f64,
}

impl RankedRow {
    pub fn rank_for(&self, criterion: Criterion) -> f64 {
        match criterion {
            Criterion::ReturnOnAssets => self.roa_rank,
            Criterion::EvToEbit => self.ev_ebit_rank,
            Criterion::ReturnOnEquity => self.roe_rank,
            Criterion::PriceToEarnings => self.pe_rank,
        }
    }
}

/// 1-based ranks of `values` with ties resolved to the average position.
pub fn average_ranks(values: &[f64], direction: Direction) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| match direction {
        Direction::Ascending => values[a].total_cmp(&values[b]),
        Direction::Descending => values[b].total_cmp(&values[a]),
    });

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // Positions start+1..=end share their mean
        let shared = (start + 1 + end) as f64 / 2.0;
        for &index in &order[start..end] {
            ranks[index] = shared;
        }
        start = end;
    }
    ranks
}

/// Ranks every row on the four criteria and sums them into `total_rank`.
///
/// Pure: the dataset is left untouched and equal input yields equal output.
pub fn rank(dataset: &Dataset) -> Vec<RankedRow> {
    let [roa, ev_ebit, roe, pe] = Criterion::ALL.map(|criterion| {
        let values: Vec<f64> = dataset.iter().map(|row| criterion.value(row)).collect();
        average_ranks(&values, criterion.direction())
    });

    dataset
        .iter()
        .enumerate()
        .map(|(i, company)| RankedRow {
            company: company.clone(),
            roa_rank: roa[i],
            ev_ebit_rank: ev_ebit[i],
            roe_rank: roe[i],
            pe_rank: pe[i],
            total_rank: roa[i] + ev_ebit[i] + roe[i] + pe[i],
        })
        .collect()
}
