//! HTTP retrieval for source feeds: browser User-Agent, bounded retries with
//! exponential backoff, redirect-following final-URL resolution.

use std::time::Duration;

use backoff::{backoff::Backoff, exponential::ExponentialBackoff};
use reqwest::Client;
use tracing::{debug, warn};

use crate::types::{AggregatorError, Result};

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub retry_delay_seconds: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            // Some news endpoints refuse obvious bot agents.
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
                .to_string(),
            timeout_seconds: 15,
            max_retries: 3,
            retry_delay_seconds: 2,
        }
    }
}

pub struct HttpFetcher {
    client: Client,
    config: FetchConfig,
}

impl HttpFetcher {
    pub fn new(config: FetchConfig) -> Self {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    /// GET a URL and return its body, retrying transient failures.
    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        let mut backoff: ExponentialBackoff<backoff::SystemClock> = ExponentialBackoff {
            current_interval: Duration::from_secs(self.config.retry_delay_seconds),
            initial_interval: Duration::from_secs(self.config.retry_delay_seconds),
            max_interval: Duration::from_secs(self.config.retry_delay_seconds * 16),
            multiplier: 2.0,
            max_elapsed_time: Some(Duration::from_secs(self.config.retry_delay_seconds * 30)),
            ..Default::default()
        };

        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match self.client.get(url).send().await {
                Ok(response) if response.status().is_success() => {
                    let body = response.text().await?;
                    debug!("fetched {} ({} bytes)", url, body.len());
                    return Ok(body);
                }
                Ok(response) => {
                    last_error = Some(AggregatorError::General(format!(
                        "HTTP {}: {}",
                        response.status(),
                        response.status().canonical_reason().unwrap_or("Unknown")
                    )));
                }
                Err(e) => {
                    last_error = Some(AggregatorError::Http(e));
                }
            }

            if attempt < self.config.max_retries {
                if let Some(delay) = backoff.next_backoff() {
                    warn!("attempt {} failed for {}, retrying in {:?}", attempt + 1, url, delay);
                    tokio::time::sleep(delay).await;
                    continue;
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| AggregatorError::General(format!("failed to fetch {url}"))))
    }

    /// Follow redirects and report the final URL. News aggregator links are
    /// usually redirects; the final URL is the stable identity key. Falls
    /// back to the input on failure.
    pub async fn resolve_final_url(&self, url: &str) -> String {
        match self.client.head(url).send().await {
            Ok(response) => response.url().to_string(),
            Err(e) => {
                warn!("could not resolve final URL for {}: {}", url, e);
                url.to_string()
            }
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(FetchConfig::default())
    }
}
