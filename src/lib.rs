pub mod aggregator;
pub mod collector;
pub mod filter;
pub mod pg_store;
pub mod plan;
pub mod store;
pub mod timestamp;
pub mod types;

pub use aggregator::NewsAggregator;
pub use collector::{CollectorConfig, FeedSet, NewsCollector};
pub use filter::FilterState;
pub use pg_store::PgArticleStore;
pub use plan::{Partition, PartitionPlan};
pub use store::{ArticleOrder, ArticleSink, ArticleStore, MemoryStore};
pub use types::*;
