use std::fs;
use tracing::info;

mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub fn quote_summary(roa: f64, roe: f64, pe: f64, ev_ebitda: f64) -> String {
        format!(
            r#"{{
                "quoteSummary": {{
                    "result": [{{
                        "financialData": {{
                            "currentPrice": {{"raw": 21.5}},
                            "returnOnAssets": {{"raw": {roa}}},
                            "returnOnEquity": {{"raw": {roe}}}
                        }},
                        "summaryDetail": {{
                            "trailingPE": {{"raw": {pe}}},
                            "marketCap": {{"raw": 12000000000}}
                        }},
                        "defaultKeyStatistics": {{
                            "enterpriseToEbitda": {{"raw": {ev_ebitda}}}
                        }},
                        "assetProfile": {{"sector": "Utilities", "industry": "Utilities - Regulated Electric"}}
                    }}],
                    "error": null
                }}
            }}"#
        )
    }

    pub async fn mount_symbol(server: &MockServer, symbol: &str, status: u16, body: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/v10/finance/quoteSummary/{symbol}")))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(server)
            .await;
    }

    pub fn write_config(dir: &std::path::Path, base_url: &str, identifiers: &[&str]) -> String {
        let identifiers_path = dir.join("tickers.txt");
        std::fs::write(&identifiers_path, identifiers.join("\n"))
            .expect("Failed to write identifiers file");

        let config_path = dir.join("config.yaml");
        let config_content = format!(
            r#"
providers:
  yahoo:
    base_url: {base_url}
identifiers_path: "{}"
fetcher:
  workers: 3
  delay_ms: 0
  timeout_secs: 5
thresholds:
  max_pe: 100
  max_ev_ebit: 100
"#,
            identifiers_path.display()
        );
        std::fs::write(&config_path, config_content).expect("Failed to write config file");
        config_path.display().to_string()
    }
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_with_mock() {
    let mock_server = wiremock::MockServer::start().await;
    for (symbol, body) in [
        ("AAA.SA", test_utils::quote_summary(0.10, 0.20, 8.0, 5.0)),
        ("BBB.SA", test_utils::quote_summary(0.05, 0.15, 12.0, 7.0)),
        ("CCC.SA", test_utils::quote_summary(0.20, 0.10, 6.0, 4.0)),
    ] {
        test_utils::mount_symbol(&mock_server, symbol, 200, &body).await;
    }
    test_utils::mount_symbol(&mock_server, "BAD.SA", 500, "").await;

    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(
        temp_dir.path(),
        &mock_server.uri(),
        &["AAA", "BAD", "BBB", "CCC", "AAA"],
    );
    info!(%config_path, "Running rank against mock Yahoo");

    let result = mfrank::run_command(
        mfrank::AppCommand::Rank(mfrank::RankOptions::default()),
        Some(config_path.as_str()),
    )
    .await;
    assert!(
        result.is_ok(),
        "Rank command failed with: {:?}",
        result.err()
    );

    let requests = mock_server
        .received_requests()
        .await
        .expect("Request recording is enabled");
    assert_eq!(requests.len(), 5);
}

#[test_log::test(tokio::test)]
async fn test_provider_down_yields_empty_result() {
    let mock_server = wiremock::MockServer::start().await;
    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path =
        test_utils::write_config(temp_dir.path(), &mock_server.uri(), &["AAA", "BBB"]);

    // No mocks mounted: every lookup gets a 404
    let result = mfrank::run_command(
        mfrank::AppCommand::Rank(mfrank::RankOptions::default()),
        Some(config_path.as_str()),
    )
    .await;
    assert!(result.is_ok(), "Rank command failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_missing_identifiers_file_is_an_error() {
    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, "identifiers_path: /nonexistent/tickers.txt\n")
        .expect("Failed to write config file");

    let result = mfrank::run_command(
        mfrank::AppCommand::Rank(mfrank::RankOptions::default()),
        config_path.to_str(),
    )
    .await;
    assert!(result.is_err());
}

#[test_log::test(tokio::test)]
async fn test_pipeline_with_mock_provider() {
    use mfrank::core::fetcher::successful_snapshots;
    use mfrank::core::{Fetcher, FetcherOptions, Thresholds, dataset, filter, ranking};
    use mfrank::providers::YahooMetricsProvider;

    let mock_server = wiremock::MockServer::start().await;
    test_utils::mount_symbol(
        &mock_server,
        "AAA.SA",
        200,
        &test_utils::quote_summary(0.10, 0.20, 8.0, 5.0),
    )
    .await;
    test_utils::mount_symbol(
        &mock_server,
        "CCC.SA",
        200,
        &test_utils::quote_summary(0.20, 0.10, 6.0, 4.0),
    )
    .await;

    let provider = YahooMetricsProvider::new(&mock_server.uri()).expect("Failed to build client");
    let fetcher = Fetcher::new(
        &provider,
        FetcherOptions {
            delay: std::time::Duration::ZERO,
            market_suffix: ".SA".to_string(),
            ..Default::default()
        },
    );
    let identifiers = vec!["CCC".to_string(), "MISSING".to_string(), "AAA".to_string()];
    let outcomes = fetcher.fetch(&identifiers, &|| {}).await;
    assert!(outcomes[1].1.is_err());

    let (snapshots, failed) = successful_snapshots(outcomes);
    assert_eq!(failed, 1);

    let dataset = dataset::build(snapshots);
    assert_eq!(dataset[0].identifier, "CCC");
    assert_eq!(dataset[0].return_on_assets, 20.0);

    let rows = filter::filter(
        &ranking::rank(&dataset),
        &Thresholds {
            min_roa: 15.0,
            ..Default::default()
        },
    );
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].company.identifier, "CCC");
}
