//! Upstream ingestion pipeline: pull each country's source feed, summarize
//! and tag the entries, stamp batch/sequence ordinals, and write the batch
//! through the article sink.

pub mod feeds;
pub mod http;
pub mod summarizer;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};
use url::Url;

use crate::store::ArticleSink;
use crate::types::{AggregatorError, RawArticle, RawTimestamp, Result};

pub use feeds::{FeedSet, FeedSpec, PromptKind};
pub use http::{FetchConfig, HttpFetcher};
pub use summarizer::{ArticleSummary, GeminiSummarizer, MockSummarizer, Summarizer};

#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Leading characters used for near-duplicate title suppression.
    pub title_prefix_len: usize,
    /// Pause between feeds, to avoid hammering the upstream host.
    pub feed_pause: Duration,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            title_prefix_len: 30,
            feed_pause: Duration::from_secs(1),
        }
    }
}

pub struct NewsCollector {
    fetcher: HttpFetcher,
    summarizer: Arc<dyn Summarizer>,
    sink: Arc<dyn ArticleSink>,
    config: CollectorConfig,
}

impl NewsCollector {
    pub fn new(
        fetcher: HttpFetcher,
        summarizer: Arc<dyn Summarizer>,
        sink: Arc<dyn ArticleSink>,
    ) -> Self {
        Self {
            fetcher,
            summarizer,
            sink,
            config: CollectorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: CollectorConfig) -> Self {
        self.config = config;
        self
    }

    /// Run one collection pass over the roster. Each feed is independent: a
    /// failing feed is logged and skipped, never fatal to the run. Returns
    /// the number of records written.
    pub async fn collect(&self, feed_set: &FeedSet) -> Result<usize> {
        // One batch id per run groups the whole pass for ordering.
        let batch_id = Utc::now().timestamp();
        let mut seen_prefixes: HashSet<String> = HashSet::new();
        let mut collected: Vec<RawArticle> = Vec::new();

        for feed in &feed_set.feeds {
            if let Err(e) = Url::parse(&feed.url) {
                warn!("feed '{}' has an invalid URL, skipped: {}", feed.country_name, e);
                continue;
            }

            info!("collecting '{}' articles", feed.country_name);
            let body = match self.fetcher.fetch_text(&feed.url).await {
                Ok(body) => body,
                Err(e) => {
                    warn!("feed '{}' fetch failed, skipped: {}", feed.country_name, e);
                    continue;
                }
            };
            let parsed = match feed_rs::parser::parse(body.as_bytes())
                .map_err(|e| AggregatorError::Parse(e.to_string()))
            {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!("feed '{}' failed to parse, skipped: {}", feed.country_name, e);
                    continue;
                }
            };

            let mut sequence: i64 = 0;
            for entry in parsed.entries.into_iter().take(feed.max_items) {
                // A skipped or failed record still consumes its sequence slot.
                let seq = sequence;
                sequence += 1;

                let title = entry
                    .title
                    .map(|t| t.content)
                    .unwrap_or_else(|| "Untitled".to_string());
                let link = match entry.links.first() {
                    Some(l) => l.href.clone(),
                    None => continue,
                };

                let prefix = title_prefix(&title, self.config.title_prefix_len);
                if !seen_prefixes.insert(prefix) {
                    debug!("skipping near-duplicate title: {}", title);
                    continue;
                }

                let final_url = self.fetcher.resolve_final_url(&link).await;
                let id = article_id(&final_url);
                let published = entry
                    .published
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(Utc::now);

                let summary = match self
                    .summarizer
                    .summarize(feed.prompt, &title, &link, &feed_set.allowed_tags)
                    .await
                {
                    Ok(summary) => summary,
                    Err(e) => {
                        warn!("summarization failed for '{}', skipped: {}", title, e);
                        continue;
                    }
                };

                collected.push(RawArticle {
                    id,
                    title: summary.title,
                    summary: summary.summary,
                    link,
                    region: feed.region.clone(),
                    country_code: feed.country_code.clone(),
                    country_name: feed.country_name.clone(),
                    published_at: Some(RawTimestamp::Structured(published)),
                    fetched_at: Some(RawTimestamp::Structured(Utc::now())),
                    batch_id: Some(batch_id),
                    sequence_id: Some(seq),
                    tags: summary.tags,
                });
            }

            tokio::time::sleep(self.config.feed_pause).await;
        }

        if collected.is_empty() {
            info!("no new articles collected");
            return Ok(0);
        }

        let stored = self.sink.store_articles(&collected).await?;
        info!("committed {} articles in batch {}", stored, batch_id);
        Ok(stored)
    }
}

/// Identity key: hex SHA-256 of the resolved final URL. Stable across runs,
/// so re-collected articles upsert instead of duplicating.
fn article_id(final_url: &str) -> String {
    hex::encode(Sha256::digest(final_url.as_bytes()))
}

fn title_prefix(title: &str, len: usize) -> String {
    title.chars().take(len).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn article_id_is_stable_and_hex() {
        let a = article_id("https://example.com/story");
        let b = article_id("https://example.com/story");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn different_urls_get_different_ids() {
        assert_ne!(
            article_id("https://example.com/a"),
            article_id("https://example.com/b")
        );
    }

    #[test]
    fn title_prefix_respects_character_boundaries() {
        // Multi-byte titles must not be sliced mid-character.
        let title = "コーヒーの最新ニュースが届きました、今日も世界のどこかで豆が焙煎されています";
        let prefix = title_prefix(title, 30);
        assert_eq!(prefix.chars().count(), 30);
        assert!(title.starts_with(&prefix));
    }

    #[test]
    fn short_titles_pass_through_whole() {
        assert_eq!(title_prefix("short", 30), "short");
    }
}
