//! Rate-limited HTTP document retrieval.
//!
//! A single [`Fetcher`] wraps one shared [`reqwest::Client`] and applies a
//! politeness delay (a bounded random interval) after every request so that
//! neither sequential nor pooled callers translate throughput into
//! request-rate spikes on the source site. Non-2xx statuses, network errors,
//! timeouts, and empty bodies are all classified as
//! [`PipelineError::FetchFailed`]. There is no retry at this layer; retry
//! policy belongs to external scheduling.

use crate::error::{PipelineError, Result};
use crate::models::ExtractedDocument;
use chrono::Utc;
use rand::Rng;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, instrument, warn};
use url::Url;

/// Tuning knobs for the fetcher.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent sent with every request.
    pub user_agent: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Lower bound of the politeness delay applied after each request.
    pub delay_min: Duration,
    /// Upper bound of the politeness delay.
    pub delay_max: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36"
                .to_string(),
            timeout: Duration::from_secs(30),
            delay_min: Duration::from_secs(3),
            delay_max: Duration::from_secs(7),
        }
    }
}

impl FetchConfig {
    /// A configuration with no politeness delay, for tests against local
    /// mock servers.
    pub fn without_delay() -> Self {
        Self {
            delay_min: Duration::ZERO,
            delay_max: Duration::ZERO,
            ..Self::default()
        }
    }
}

/// Polite HTTP fetcher shared across a pipeline run.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    delay_min: Duration,
    delay_max: Duration,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .build()
            .map_err(|e| PipelineError::FetchFailed {
                url: String::new(),
                reason: format!("client build failed: {e}"),
            })?;
        Ok(Self {
            client,
            delay_min: config.delay_min,
            delay_max: config.delay_max,
        })
    }

    /// Fetch a URL and return the raw document, or a typed failure.
    ///
    /// The politeness delay runs after every outcome, failures included; a
    /// run of 404s must not turn into back-to-back requests.
    #[instrument(level = "debug", skip(self), fields(url = %url))]
    pub async fn fetch(&self, url: &Url) -> Result<ExtractedDocument> {
        let result = self.fetch_once(url).await;
        self.politeness_delay().await;
        result
    }

    async fn fetch_once(&self, url: &Url) -> Result<ExtractedDocument> {
        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            let reason = if e.is_timeout() {
                "request timeout".to_string()
            } else if e.is_connect() {
                "connection failed".to_string()
            } else {
                e.to_string()
            };
            warn!(%url, %reason, "Fetch failed");
            PipelineError::FetchFailed {
                url: url.to_string(),
                reason,
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "Non-success status");
            return Err(PipelineError::FetchFailed {
                url: url.to_string(),
                reason: format!("HTTP {}", status.as_u16()),
            });
        }

        let html = response
            .text()
            .await
            .map_err(|e| PipelineError::FetchFailed {
                url: url.to_string(),
                reason: format!("body read failed: {e}"),
            })?;

        if html.trim().is_empty() {
            return Err(PipelineError::FetchFailed {
                url: url.to_string(),
                reason: "empty response body".to_string(),
            });
        }

        debug!(%url, bytes = html.len(), "Fetched document");
        Ok(ExtractedDocument {
            url: url.clone(),
            html,
            fetched_at: Utc::now(),
        })
    }

    async fn politeness_delay(&self) {
        if self.delay_max.is_zero() {
            return;
        }
        let min = self.delay_min.as_millis() as u64;
        let max = self.delay_max.as_millis() as u64;
        let ms = rand::rng().random_range(min..=max.max(min));
        debug!(delay_ms = ms, "Politeness delay before next request");
        sleep(Duration::from_millis(ms)).await;
    }
}
