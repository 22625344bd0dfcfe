use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::core::metrics::{MetricSnapshot, MetricsProvider};

const MODULES: &str = "financialData,summaryDetail,defaultKeyStatistics,assetProfile";

// YahooMetricsProvider implementation for MetricsProvider
pub struct YahooMetricsProvider {
    base_url: String,
    client: reqwest::Client,
}

impl YahooMetricsProvider {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent("mfrank/1.0").build()?;
        Ok(YahooMetricsProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResponse {
    quote_summary: QuoteSummary,
}

#[derive(Deserialize, Debug)]
struct QuoteSummary {
    #[serde(default)]
    result: Option<Vec<QuoteSummaryItem>>,
    error: Option<QuoteSummaryError>,
}

#[derive(Deserialize, Debug)]
struct QuoteSummaryError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
struct QuoteSummaryItem {
    financial_data: FinancialData,
    summary_detail: SummaryDetail,
    default_key_statistics: KeyStatistics,
    asset_profile: AssetProfile,
}

/// Yahoo wraps numbers as `{"raw": 1.0, "fmt": "1.00"}`; missing data is `{}`.
#[derive(Deserialize, Debug, Default)]
struct RawValue {
    #[serde(default)]
    raw: Option<f64>,
}

fn raw(value: &Option<RawValue>) -> Option<f64> {
    value
        .as_ref()
        .and_then(|v| v.raw)
        .filter(|v| v.is_finite())
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
struct FinancialData {
    current_price: Option<RawValue>,
    return_on_assets: Option<RawValue>,
    return_on_equity: Option<RawValue>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
struct SummaryDetail {
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<RawValue>,
    market_cap: Option<RawValue>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
struct KeyStatistics {
    enterprise_to_ebitda: Option<RawValue>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct AssetProfile {
    sector: Option<String>,
    industry: Option<String>,
}

impl QuoteSummaryItem {
    fn into_snapshot(self, symbol: &str) -> MetricSnapshot {
        MetricSnapshot {
            identifier: symbol.to_string(),
            price: raw(&self.financial_data.current_price),
            price_to_earnings: raw(&self.summary_detail.trailing_pe),
            return_on_assets: raw(&self.financial_data.return_on_assets),
            return_on_equity: raw(&self.financial_data.return_on_equity),
            // Yahoo exposes no EV/EBIT ratio; EV/EBITDA stands in for it
            ev_to_ebit: raw(&self.default_key_statistics.enterprise_to_ebitda),
            market_cap: raw(&self.summary_detail.market_cap),
            sector: self.asset_profile.sector.filter(|s| !s.is_empty()),
            subsector: self.asset_profile.industry.filter(|s| !s.is_empty()),
        }
    }
}

#[async_trait]
impl MetricsProvider for YahooMetricsProvider {
    #[instrument(
        name = "YahooMetricsLookup",
        skip(self),
        fields(symbol = %symbol)
    )]
    async fn lookup(&self, symbol: &str) -> Result<MetricSnapshot> {
        let url = format!(
            "{}/v10/finance/quoteSummary/{}?modules={}",
            self.base_url, symbol, MODULES
        );
        debug!("Requesting fundamentals from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for symbol: {}", e, symbol))?;

        let status = response.status();
        let text = response.text().await?;
        debug!(%status, "Received Yahoo response");

        let parsed = serde_json::from_str::<QuoteSummaryResponse>(&text);
        if let Ok(data) = &parsed
            && let Some(error) = &data.quote_summary.error
        {
            return Err(anyhow!(
                "Yahoo error for symbol {}: {} {}",
                symbol,
                error.code.as_deref().unwrap_or("unknown"),
                error.description.as_deref().unwrap_or_default()
            ));
        }
        if !status.is_success() {
            return Err(anyhow!("HTTP error: {} for symbol: {}", status, symbol));
        }

        let data = parsed
            .map_err(|e| anyhow!("Failed to parse JSON response for {}: {}", symbol, e))?;

        let item = data
            .quote_summary
            .result
            .and_then(|items| items.into_iter().next())
            .ok_or_else(|| anyhow!("No fundamentals found for symbol: {}", symbol))?;

        Ok(item.into_snapshot(symbol))
    }
}
