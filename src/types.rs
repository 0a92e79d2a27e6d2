use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp sentinel shown when a source never recorded a publish time.
pub const PUBLISH_TIME_UNKNOWN: &str = "publish time unknown";
/// Timestamp sentinel shown when a record carries no fetch time.
pub const FETCH_TIME_UNKNOWN: &str = "fetch time unknown";

/// A timestamp as it arrives from the store: either already structured or a
/// loosely formatted string. Resolved exactly once, at aggregation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Structured(DateTime<Utc>),
    Text(String),
}

/// An article record in the shape the store hands it to us. Timestamps are
/// still heterogeneous and the country code has not been validated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawArticle {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub link: String,
    pub region: String,
    pub country_code: String,
    pub country_name: String,
    pub published_at: Option<RawTimestamp>,
    pub fetched_at: Option<RawTimestamp>,
    pub batch_id: Option<i64>,
    pub sequence_id: Option<i64>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A normalized, display-ready article. `published_at` / `fetched_at` are
/// fixed-locale display strings; raw timestamp shapes never leak past the
/// aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub link: String,
    pub region: String,
    pub country_code: String,
    pub country_name: String,
    pub published_at: String,
    pub fetched_at: String,
    pub batch_id: Option<i64>,
    pub sequence_id: Option<i64>,
    pub tags: Vec<String>,
}

/// One entry of the country picker derived for the selected region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryOption {
    pub code: String,
    pub name: String,
}

/// Per-group raw retrieval counts plus the overseas partitions that failed
/// and were degraded to empty results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchDiagnostics {
    pub domestic_raw_count: usize,
    pub overseas_raw_count: usize,
    pub failed_partitions: Vec<String>,
}

/// The aggregator's output: two normalized collections plus diagnostics.
#[derive(Debug, Clone, Default)]
pub struct AggregatedFeed {
    pub domestic: Vec<Article>,
    pub overseas: Vec<Article>,
    pub diagnostics: FetchDiagnostics,
}

#[derive(Debug, thiserror::Error)]
pub enum AggregatorError {
    #[error("partition fetch failed for region '{region}': {detail}")]
    PartitionFetch { region: String, detail: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("feed parse error: {0}")]
    Parse(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("summarization failed: {0}")]
    Summarization(String),

    #[error("{0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, AggregatorError>;
