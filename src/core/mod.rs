//! Core business logic: acquisition, cleaning, ranking and filtering

pub mod cache;
pub mod config;
pub mod dataset;
pub mod fetcher;
pub mod filter;
pub mod log;
pub mod metrics;
pub mod ranking;

// Re-export main types for cleaner imports
pub use dataset::{CompanyRow, Dataset};
pub use fetcher::{FetchOutcome, Fetcher, FetcherOptions};
pub use filter::Thresholds;
pub use metrics::{FetchError, MetricSnapshot, MetricsProvider};
pub use ranking::{Criterion, RankedRow};
