//! Store capability the aggregator consumes. The core depends only on these
//! traits, never on a concrete storage technology.

use std::cmp::Reverse;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::timestamp;
use crate::types::{RawArticle, Result};

/// Ordering key for a partition query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleOrder {
    /// Descending collection batch, ascending sequence within a batch.
    /// Stores fall back to [`ArticleOrder::PublishedDesc`] when the batch
    /// fields are not populated.
    BatchSequence,
    /// Publish time, newest first.
    PublishedDesc,
}

/// Read side: one region-scoped, ordered, capped retrieval per call.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    async fn fetch_partition(
        &self,
        region: &str,
        order: ArticleOrder,
        limit: usize,
    ) -> Result<Vec<RawArticle>>;
}

/// Write side, used by the collector. Identity upsert by article id.
#[async_trait]
pub trait ArticleSink: Send + Sync {
    async fn store_articles(&self, articles: &[RawArticle]) -> Result<usize>;
}

/// In-memory store for tests and offline demos.
#[derive(Default)]
pub struct MemoryStore {
    articles: RwLock<Vec<RawArticle>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_articles(articles: Vec<RawArticle>) -> Self {
        Self {
            articles: RwLock::new(articles),
        }
    }

    pub fn len(&self) -> usize {
        self.articles.read().expect("store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ArticleStore for MemoryStore {
    async fn fetch_partition(
        &self,
        region: &str,
        order: ArticleOrder,
        limit: usize,
    ) -> Result<Vec<RawArticle>> {
        let mut rows: Vec<RawArticle> = self
            .articles
            .read()
            .expect("store lock poisoned")
            .iter()
            .filter(|a| a.region == region)
            .cloned()
            .collect();

        let batch_ordered = order == ArticleOrder::BatchSequence
            && rows
                .iter()
                .all(|a| a.batch_id.is_some() && a.sequence_id.is_some());

        if batch_ordered {
            rows.sort_by_key(|a| (Reverse(a.batch_id), a.sequence_id));
        } else {
            rows.sort_by_key(|a| Reverse(timestamp::instant(a.published_at.as_ref())));
        }

        rows.truncate(limit);
        Ok(rows)
    }
}

#[async_trait]
impl ArticleSink for MemoryStore {
    async fn store_articles(&self, articles: &[RawArticle]) -> Result<usize> {
        let mut stored = self.articles.write().expect("store lock poisoned");
        for article in articles {
            match stored.iter_mut().find(|a| a.id == article.id) {
                Some(existing) => *existing = article.clone(),
                None => stored.push(article.clone()),
            }
        }
        Ok(articles.len())
    }
}
