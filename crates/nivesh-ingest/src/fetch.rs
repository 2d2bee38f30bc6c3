//! Flow-data fetching with endpoint fallback.
//!
//! The upstream renames its JSON endpoint occasionally, so candidates are
//! tried in order; an HTML page can be configured as a further fallback.
//! A cookie warm-up GET against the home page is a precondition for the API
//! endpoints. A short fixed delay is applied between attempts — a courtesy
//! to a rate-limited service, not a backoff algorithm.

use crate::error::{IngestError, IngestResult};
use crate::html::extract_tables;
use crate::normalize::normalize_flow_payload;
use crate::table::{extract_flow_rows, select_flow_table};
use nivesh_core::FlowRecord;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CACHE_CONTROL, PRAGMA, REFERER};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

fn default_home_url() -> String {
    "https://www.nseindia.com/".to_string()
}

fn default_json_urls() -> Vec<String> {
    vec![
        // Newer endpoint first; the older name still works on some days.
        "https://www.nseindia.com/api/fiidiiTradeReact".to_string(),
        "https://www.nseindia.com/api/fiidiiTrade".to_string(),
    ]
}

fn default_request_timeout_secs() -> u64 {
    20
}

fn default_courtesy_delay_ms() -> u64 {
    800
}

/// Upstream endpoints and pacing for the FII/DII flow source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowSourceConfig {
    /// Home page fetched once for the cookie warm-up.
    #[serde(default = "default_home_url")]
    pub home_url: String,
    /// Candidate JSON endpoints, tried in order.
    #[serde(default = "default_json_urls")]
    pub json_urls: Vec<String>,
    /// HTML page fallbacks, tried after every JSON endpoint failed.
    #[serde(default)]
    pub html_urls: Vec<String>,
    /// Fixed per-request timeout. Default: 20.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Fixed delay between attempts against the upstream. Default: 800.
    #[serde(default = "default_courtesy_delay_ms")]
    pub courtesy_delay_ms: u64,
}

impl Default for FlowSourceConfig {
    fn default() -> Self {
        Self {
            home_url: default_home_url(),
            json_urls: default_json_urls(),
            html_urls: Vec::new(),
            request_timeout_secs: default_request_timeout_secs(),
            courtesy_delay_ms: default_courtesy_delay_ms(),
        }
    }
}

/// Fetches and normalizes daily flow records.
pub struct FlowFetcher {
    client: Client,
    config: FlowSourceConfig,
}

impl FlowFetcher {
    /// Build the HTTP client. The cookie store is required: the API
    /// endpoints reject sessions that never visited the home page.
    pub fn new(config: FlowSourceConfig) -> IngestResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(
            REFERER,
            HeaderValue::from_str(&config.home_url)
                .map_err(|e| IngestError::HttpClient(format!("Bad home URL: {e}")))?,
        );

        let client = Client::builder()
            .cookie_store(true)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| IngestError::HttpClient(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Fetch one day's flow records from the first source that yields a
    /// usable batch.
    ///
    /// Every candidate failing is fatal for the run; the error carries the
    /// last underlying failure. A timed-out call counts as a candidate
    /// failure like any other.
    pub async fn fetch_daily_flows(&self) -> IngestResult<Vec<FlowRecord>> {
        self.warm_up().await;

        let mut last_err = "no sources configured".to_string();
        let mut first_attempt = true;

        for url in &self.config.json_urls {
            self.pace(&mut first_attempt).await;
            match self.try_json_endpoint(url).await {
                Ok(rows) => {
                    info!(url = %url, rows = rows.len(), "Flow payload fetched");
                    return Ok(rows);
                }
                Err(e) => {
                    warn!(url = %url, error = %e, "Flow endpoint failed");
                    last_err = e.to_string();
                }
            }
        }

        for url in &self.config.html_urls {
            self.pace(&mut first_attempt).await;
            match self.try_html_page(url).await {
                Ok(rows) => {
                    info!(url = %url, rows = rows.len(), "Flow table scraped");
                    return Ok(rows);
                }
                Err(e) => {
                    warn!(url = %url, error = %e, "Flow page failed");
                    last_err = e.to_string();
                }
            }
        }

        Err(IngestError::SourceExhausted { last: last_err })
    }

    /// Best-effort cookie warm-up. A failure here is logged, not fatal —
    /// the endpoint attempts will fail on their own terms if it mattered.
    async fn warm_up(&self) {
        debug!(url = %self.config.home_url, "Cookie warm-up");
        match self.client.get(&self.config.home_url).send().await {
            Ok(_) => tokio::time::sleep(Duration::from_millis(500)).await,
            Err(e) => warn!(error = %e, "Warm-up request failed"),
        }
    }

    async fn pace(&self, first_attempt: &mut bool) {
        if *first_attempt {
            *first_attempt = false;
        } else {
            tokio::time::sleep(Duration::from_millis(self.config.courtesy_delay_ms)).await;
        }
    }

    async fn try_json_endpoint(&self, url: &str) -> IngestResult<Vec<FlowRecord>> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let payload: serde_json::Value = response.json().await?;
        let rows = normalize_flow_payload(&payload, url);
        if rows.is_empty() {
            return Err(IngestError::Payload(
                "payload yielded no usable rows".to_string(),
            ));
        }
        Ok(rows)
    }

    async fn try_html_page(&self, url: &str) -> IngestResult<Vec<FlowRecord>> {
        let page = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let tables = extract_tables(&page);
        let pick = select_flow_table(&tables).ok_or(IngestError::NoSuitableTable)?;
        if pick.is_low_confidence() {
            warn!(url = %url, "Flow table mapped by positional fallback; treat as low confidence");
        }

        let rows = extract_flow_rows(&tables[pick.index], &pick, url);
        if rows.is_empty() {
            return Err(IngestError::Payload(
                "selected table yielded no usable rows".to_string(),
            ));
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_try_the_newer_endpoint_first() {
        let config = FlowSourceConfig::default();
        assert_eq!(config.json_urls.len(), 2);
        assert!(config.json_urls[0].contains("fiidiiTradeReact"));
        assert!(config.html_urls.is_empty());
        assert_eq!(config.request_timeout_secs, 20);
    }

    #[test]
    fn config_deserializes_with_partial_fields() {
        let config: FlowSourceConfig = toml_like(r#"{"courtesy_delay_ms": 100}"#);
        assert_eq!(config.courtesy_delay_ms, 100);
        assert_eq!(config.home_url, default_home_url());
    }

    fn toml_like(json: &str) -> FlowSourceConfig {
        serde_json::from_str(json).unwrap()
    }

    /// Config pointing nowhere: the home URL is unroutable and pacing is
    /// disabled so exhaustion is reached without touching the network.
    fn dead_config(json_urls: Vec<String>) -> FlowSourceConfig {
        FlowSourceConfig {
            home_url: "http://127.0.0.1:9/".to_string(),
            json_urls,
            html_urls: Vec::new(),
            request_timeout_secs: 1,
            courtesy_delay_ms: 0,
        }
    }

    #[tokio::test]
    async fn no_sources_is_exhaustion_with_explicit_message() {
        let fetcher = FlowFetcher::new(dead_config(Vec::new())).unwrap();
        let err = fetcher.fetch_daily_flows().await.unwrap_err();
        match err {
            IngestError::SourceExhausted { last } => {
                assert_eq!(last, "no sources configured");
            }
            other => panic!("expected SourceExhausted, got {other}"),
        }
    }

    #[tokio::test]
    async fn failing_endpoint_becomes_the_reported_last_error() {
        let url = "http://127.0.0.1:9/api/fiidiiTradeReact".to_string();
        let fetcher = FlowFetcher::new(dead_config(vec![url.clone()])).unwrap();
        let err = fetcher.fetch_daily_flows().await.unwrap_err();
        match err {
            IngestError::SourceExhausted { last } => {
                // The exhaustion error carries the last underlying failure,
                // not the no-sources placeholder.
                assert_ne!(last, "no sources configured");
                assert!(!last.is_empty());
            }
            other => panic!("expected SourceExhausted, got {other}"),
        }
    }
}
