//! HTTP client for the market data API.
//!
//! Both endpoints are plain JSON GETs resolved against a configured base URL,
//! using the trailing-slash route form the backend serves:
//! - `GET api/market-metrics/` → `MarketSnapshot`
//! - `GET api/gamma-exposure/?expiry_filter=..[&customer_filter=..]` → `[ExposureRecord]`

use crate::error::{FeedError, FeedResult, FetchError, FetchResult};
use gex_core::{ExposureRecord, FilterSelection, MarketSnapshot};
use gex_telemetry::Metrics;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Default timeout for API requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum number of characters of an error body kept in `ServerStatus`.
const ERROR_BODY_LIMIT: usize = 200;

/// The two polled endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    MarketMetrics,
    GammaExposure,
}

impl Endpoint {
    /// Route relative to the API base URL.
    pub fn path(&self) -> &'static str {
        match self {
            Self::MarketMetrics => "api/market-metrics/",
            Self::GammaExposure => "api/gamma-exposure/",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MarketMetrics => "market_metrics",
            Self::GammaExposure => "gamma_exposure",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client for the market metrics and gamma exposure endpoints.
///
/// One outbound request per call. No caching, no retries.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    market_url: Url,
    exposure_url: Url,
}

impl Fetcher {
    /// Create a new fetcher.
    ///
    /// # Arguments
    /// * `base_url` - API root (e.g., "http://127.0.0.1:8000"); a trailing slash is optional
    /// * `timeout` - per-request timeout; expiry is reported as a network error
    pub fn new(base_url: &str, timeout: Duration) -> FeedResult<Self> {
        let base = normalize_base_url(base_url)?;
        let market_url = join(&base, Endpoint::MarketMetrics)?;
        let exposure_url = join(&base, Endpoint::GammaExposure)?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FeedError::HttpClient(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            market_url,
            exposure_url,
        })
    }

    /// Full URL of an endpoint (without query).
    pub fn url(&self, endpoint: Endpoint) -> &Url {
        match endpoint {
            Endpoint::MarketMetrics => &self.market_url,
            Endpoint::GammaExposure => &self.exposure_url,
        }
    }

    /// Fetch the latest market snapshot.
    pub async fn fetch_market_snapshot(&self) -> FetchResult<MarketSnapshot> {
        self.get_json(Endpoint::MarketMetrics, &[]).await
    }

    /// Fetch gamma exposure by strike for a filter selection.
    pub async fn fetch_exposure(
        &self,
        filter: &FilterSelection,
    ) -> FetchResult<Vec<ExposureRecord>> {
        self.get_json(Endpoint::GammaExposure, &filter.query_pairs())
            .await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        query: &[(&str, &str)],
    ) -> FetchResult<T> {
        let started = Instant::now();
        let result = self.send(endpoint, query).await;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        Metrics::fetch_latency(endpoint.as_str(), elapsed_ms);
        match &result {
            Ok(_) => debug!(%endpoint, elapsed_ms, "Fetch succeeded"),
            Err(e) => {
                Metrics::fetch_error(endpoint.as_str(), e.kind().as_str());
                warn!(%endpoint, kind = %e.kind(), error = %e, elapsed_ms, "Fetch failed");
            }
        }
        result
    }

    async fn send<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        query: &[(&str, &str)],
    ) -> FetchResult<T> {
        let url = self.url(endpoint);
        debug!(url = %url, ?query, "Sending request");

        let response = self
            .client
            .get(url.clone())
            .query(query)
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::ServerStatus {
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        let bytes = response.bytes().await.map_err(network_error)?;
        serde_json::from_slice(&bytes)
            .map_err(|e| FetchError::Decode(format!("{endpoint} payload: {e}")))
    }
}

fn network_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Network(format!("request timed out: {e}"))
    } else {
        FetchError::Network(e.to_string())
    }
}

fn normalize_base_url(base_url: &str) -> FeedResult<Url> {
    let trimmed = base_url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(FeedError::InvalidBaseUrl("empty base URL".to_string()));
    }
    let url = Url::parse(&format!("{trimmed}/"))
        .map_err(|e| FeedError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(FeedError::InvalidBaseUrl(base_url.to_string()));
    }
    Ok(url)
}

fn join(base: &Url, endpoint: Endpoint) -> FeedResult<Url> {
    base.join(endpoint.path())
        .map_err(|e| FeedError::InvalidBaseUrl(format!("{base}{}: {e}", endpoint.path())))
}
