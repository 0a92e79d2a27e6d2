//! Partitioned article retrieval and normalization.
//!
//! One query per region partition, all fired concurrently so total latency
//! tracks the slowest partition. The domestic partition is essential: its
//! failure fails the whole aggregation. A failed overseas partition degrades
//! to zero records and is flagged in diagnostics.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::plan::PartitionPlan;
use crate::store::{ArticleOrder, ArticleStore};
use crate::timestamp;
use crate::types::{
    AggregatedFeed, AggregatorError, Article, FetchDiagnostics, RawArticle, Result,
    FETCH_TIME_UNKNOWN, PUBLISH_TIME_UNKNOWN,
};

const DEFAULT_PARTITION_TIMEOUT: Duration = Duration::from_secs(10);

pub struct NewsAggregator {
    store: Arc<dyn ArticleStore>,
    plan: PartitionPlan,
    partition_timeout: Duration,
}

impl NewsAggregator {
    pub fn new(store: Arc<dyn ArticleStore>, plan: PartitionPlan) -> Self {
        Self {
            store,
            plan,
            partition_timeout: DEFAULT_PARTITION_TIMEOUT,
        }
    }

    /// Timeout applied to each partition query independently. Expiry is
    /// handled exactly like a partition failure.
    pub fn with_partition_timeout(mut self, timeout: Duration) -> Self {
        self.partition_timeout = timeout;
        self
    }

    /// Fetch all partitions, normalize, merge, and de-duplicate.
    pub async fn fetch_articles(&self) -> Result<AggregatedFeed> {
        // Slot 0 is the domestic partition, the rest follow plan order.
        let mut partitions = vec![self.plan.domestic.clone()];
        partitions.extend(self.plan.overseas.iter().cloned());

        let mut join_set = JoinSet::new();
        for (idx, partition) in partitions.iter().cloned().enumerate() {
            let store = Arc::clone(&self.store);
            let timeout = self.partition_timeout;
            join_set.spawn(async move {
                let fetched = tokio::time::timeout(
                    timeout,
                    store.fetch_partition(&partition.region, ArticleOrder::BatchSequence, partition.max_items),
                )
                .await
                .unwrap_or_else(|_| {
                    Err(AggregatorError::PartitionFetch {
                        region: partition.region.clone(),
                        detail: format!("timed out after {timeout:?}"),
                    })
                });
                (idx, fetched)
            });
        }

        let mut slots: Vec<Option<Result<Vec<RawArticle>>>> = Vec::new();
        slots.resize_with(partitions.len(), || None);
        while let Some(joined) = join_set.join_next().await {
            let (idx, fetched) = joined
                .map_err(|e| AggregatorError::General(format!("partition task join error: {e}")))?;
            slots[idx] = Some(fetched);
        }

        let mut diagnostics = FetchDiagnostics::default();

        // Domestic failure is fatal to the page render.
        let domestic_raw = match slots[0].take() {
            Some(Ok(rows)) => rows,
            Some(Err(e)) => {
                return Err(match e {
                    AggregatorError::PartitionFetch { .. } => e,
                    other => AggregatorError::PartitionFetch {
                        region: self.plan.domestic.region.clone(),
                        detail: other.to_string(),
                    },
                })
            }
            None => Vec::new(),
        };
        diagnostics.domestic_raw_count = domestic_raw.len();

        // Overseas partitions merge in plan order; a failed one contributes
        // zero records and is flagged, never fatal.
        let mut overseas_raw = Vec::new();
        for (slot, partition) in slots.into_iter().skip(1).zip(&self.plan.overseas) {
            match slot {
                Some(Ok(rows)) => {
                    diagnostics.overseas_raw_count += rows.len();
                    overseas_raw.extend(rows);
                }
                Some(Err(e)) => {
                    warn!("overseas partition '{}' degraded: {}", partition.region, e);
                    diagnostics.failed_partitions.push(partition.region.clone());
                }
                None => {
                    warn!("overseas partition '{}' returned no result", partition.region);
                    diagnostics.failed_partitions.push(partition.region.clone());
                }
            }
        }

        let domestic = dedup_by_id(domestic_raw.into_iter().map(normalize).collect());
        let overseas = dedup_by_id(overseas_raw.into_iter().map(normalize).collect());

        info!(
            "aggregated {} domestic / {} overseas articles (raw {}/{})",
            domestic.len(),
            overseas.len(),
            diagnostics.domestic_raw_count,
            diagnostics.overseas_raw_count,
        );

        Ok(AggregatedFeed {
            domestic,
            overseas,
            diagnostics,
        })
    }
}

/// Resolve both timestamp fields into display strings. After this point the
/// raw timestamp shapes are gone.
fn normalize(raw: RawArticle) -> Article {
    Article {
        id: raw.id,
        title: raw.title,
        summary: raw.summary,
        link: raw.link,
        region: raw.region,
        country_code: raw.country_code,
        country_name: raw.country_name,
        published_at: timestamp::normalize(raw.published_at.as_ref(), PUBLISH_TIME_UNKNOWN),
        fetched_at: timestamp::normalize(raw.fetched_at.as_ref(), FETCH_TIME_UNKNOWN),
        batch_id: raw.batch_id,
        sequence_id: raw.sequence_id,
        tags: raw.tags,
    }
}

/// Identity de-duplication, first occurrence wins, order preserved. Guards
/// against the same record arriving through overlapping partition queries.
fn dedup_by_id(articles: Vec<Article>) -> Vec<Article> {
    let mut seen = HashSet::new();
    articles
        .into_iter()
        .filter(|a| seen.insert(a.id.clone()))
        .collect()
}
