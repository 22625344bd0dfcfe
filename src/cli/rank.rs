use super::ui;
use crate::core::cache::Cache;
use crate::core::fetcher::successful_snapshots;
use crate::core::{
    Criterion, Dataset, Fetcher, FetcherOptions, MetricsProvider, RankedRow, Thresholds, dataset,
    filter, ranking,
};
use crate::store::MemoryCache;
use anyhow::{Context, Result, anyhow};
use comfy_table::Cell;
use console::Term;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Command-line overrides applied on top of the configured thresholds.
#[derive(Debug, Clone, Default)]
pub struct ThresholdOverrides {
    pub min_roa: Option<f64>,
    pub min_roe: Option<f64>,
    pub max_pe: Option<f64>,
    pub max_ev_ebit: Option<f64>,
}

impl ThresholdOverrides {
    pub fn apply(&self, base: Thresholds) -> Thresholds {
        Thresholds {
            min_roa: self.min_roa.unwrap_or(base.min_roa),
            min_roe: self.min_roe.unwrap_or(base.min_roe),
            max_pe: self.max_pe.unwrap_or(base.max_pe),
            max_ev_ebit: self.max_ev_ebit.unwrap_or(base.max_ev_ebit),
        }
    }
}

/// Reads a newline-delimited identifier list, skipping blank lines.
pub fn read_identifiers<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read identifiers file: {}", path.display()))?;
    let identifiers: Vec<String> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect();
    debug!(count = identifiers.len(), "Read identifiers");
    Ok(identifiers)
}

/// Opt-in cache of built datasets keyed by the ordered identifier list.
pub struct DatasetCache {
    store: MemoryCache<Vec<String>, Dataset>,
    ttl: Duration,
}

impl DatasetCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            store: MemoryCache::new(),
            ttl,
        }
    }

    /// Returns the cached dataset for `identifiers`, fetching and building it on a miss.
    pub async fn get_or_fetch(
        &self,
        identifiers: &[String],
        provider: &(dyn MetricsProvider + Send + Sync),
        options: &FetcherOptions,
    ) -> Dataset {
        let key = identifiers.to_vec();
        if let Some(dataset) = self.store.get(&key).await {
            return dataset;
        }

        let dataset = fetch_dataset(identifiers, provider, options).await;
        self.store.put(key, dataset.clone(), Some(self.ttl)).await;
        dataset
    }
}

/// Fetches every identifier with a progress bar and cleans the result.
pub async fn fetch_dataset(
    identifiers: &[String],
    provider: &(dyn MetricsProvider + Send + Sync),
    options: &FetcherOptions,
) -> Dataset {
    let pb = ui::new_progress_bar(identifiers.len() as u64, true);
    pb.set_message("Fetching fundamentals...");

    let fetcher = Fetcher::new(provider, options.clone());
    let outcomes = fetcher.fetch(identifiers, &|| pb.inc(1)).await;
    pb.finish_and_clear();

    let (snapshots, failed) = successful_snapshots(outcomes);
    info!(
        fetched = snapshots.len(),
        failed, "Finished fetching fundamentals"
    );
    println!(
        "{}",
        ui::style_text(
            &format!(
                "Fetched {} of {} identifiers ({} failed)",
                snapshots.len(),
                identifiers.len(),
                failed
            ),
            ui::StyleType::Subtle
        )
    );

    dataset::build(snapshots)
}

/// Ranks the dataset and applies the thresholds.
pub fn rank_and_filter(dataset: &Dataset, thresholds: &Thresholds) -> Vec<RankedRow> {
    let ranked = ranking::rank(dataset);
    filter::filter(&ranked, thresholds)
}

pub fn display_as_table(rows: &[RankedRow]) -> String {
    if rows.is_empty() {
        return ui::style_text(
            "No companies matched the current filters.",
            ui::StyleType::Error,
        );
    }

    let mut table = ui::new_styled_table();
    let mut header = vec![
        ui::header_cell("Ticker"),
        ui::header_cell("Price"),
        ui::header_cell("P/E"),
        ui::header_cell("ROA (%)"),
        ui::header_cell("ROE (%)"),
        ui::header_cell("EV/EBIT"),
        ui::header_cell("Market Cap"),
        ui::header_cell("Sector"),
        ui::header_cell("Subsector"),
    ];
    header.extend(
        Criterion::ALL
            .iter()
            .map(|criterion| ui::header_cell(&criterion.to_string())),
    );
    header.push(ui::header_cell("Total"));
    table.set_header(header);

    let two_places = |v: f64| format!("{v:.2}");
    for row in rows {
        let company = &row.company;
        let mut cells = vec![
            Cell::new(&company.identifier),
            ui::format_optional_cell(company.price, two_places),
            ui::number_cell(company.price_to_earnings, two_places),
            ui::number_cell(company.return_on_assets, two_places),
            ui::number_cell(company.return_on_equity, two_places),
            ui::number_cell(company.ev_to_ebit, two_places),
            ui::format_optional_cell(company.market_cap, ui::format_compact),
            Cell::new(company.sector.as_deref().unwrap_or("N/A")),
            Cell::new(company.subsector.as_deref().unwrap_or("N/A")),
        ];
        cells.extend(
            Criterion::ALL
                .iter()
                .map(|&criterion| ui::number_cell(row.rank_for(criterion), |v| format!("{v:.1}"))),
        );
        cells.push(ui::total_cell(row.total_rank));
        table.add_row(cells);
    }

    table.to_string()
}

/// Parses one threshold answer. Blank input keeps `current`.
pub fn parse_threshold_input(input: &str, current: f64) -> Result<f64> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(current);
    }
    let value: f64 = input
        .parse()
        .map_err(|_| anyhow!("Invalid number: {}", input))?;
    if !value.is_finite() {
        return Err(anyhow!("Invalid number: {}", input));
    }
    Ok(value)
}

/// Asks for new thresholds on the terminal. `None` means the user quit.
fn prompt_thresholds(term: &Term, current: Thresholds) -> Result<Option<Thresholds>> {
    let mut next = current;
    let fields: [(&str, &mut f64); 4] = [
        ("Minimum ROA (%)", &mut next.min_roa),
        ("Minimum ROE (%)", &mut next.min_roe),
        ("Maximum P/E", &mut next.max_pe),
        ("Maximum EV/EBIT", &mut next.max_ev_ebit),
    ];

    for (label, value) in fields {
        loop {
            term.write_str(&format!("{label} [{value}] (q to quit): "))?;
            let answer = term.read_line()?;
            if answer.trim().eq_ignore_ascii_case("q") {
                return Ok(None);
            }
            match parse_threshold_input(&answer, *value) {
                Ok(parsed) => {
                    *value = parsed;
                    break;
                }
                Err(e) => {
                    term.write_line(&ui::style_text(&e.to_string(), ui::StyleType::Error))?
                }
            }
        }
    }
    Ok(Some(next))
}

fn print_results(rows: &[RankedRow], thresholds: &Thresholds) {
    println!(
        "{}\n",
        ui::style_text("Magic Formula Ranking", ui::StyleType::Title)
    );
    println!(
        "{}",
        ui::style_text(
            &format!(
                "ROA >= {}  ROE > {}  0 < P/E < {}  0 < EV/EBIT <= {}",
                thresholds.min_roa, thresholds.min_roe, thresholds.max_pe, thresholds.max_ev_ebit
            ),
            ui::StyleType::Subtle
        )
    );
    println!("{}", display_as_table(rows));
}

pub async fn run(
    identifiers: &[String],
    provider: &(dyn MetricsProvider + Send + Sync),
    options: &FetcherOptions,
    cache: &DatasetCache,
    thresholds: Thresholds,
    interactive: bool,
) -> Result<()> {
    if identifiers.is_empty() {
        println!("No identifiers found to rank.");
        return Ok(());
    }

    let mut thresholds = thresholds;
    let term = Term::stdout();
    loop {
        let dataset = cache.get_or_fetch(identifiers, provider, options).await;
        let rows = rank_and_filter(&dataset, &thresholds);
        print_results(&rows, &thresholds);

        if !interactive {
            return Ok(());
        }
        match prompt_thresholds(&term, thresholds)? {
            Some(next) => thresholds = next,
            None => return Ok(()),
        }
    }
}
