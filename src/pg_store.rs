//! PostgreSQL-backed article store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Pool, Postgres, Row};
use tracing::info;

use crate::store::{ArticleOrder, ArticleSink, ArticleStore};
use crate::types::{AggregatorError, RawArticle, RawTimestamp, Result};

pub struct PgArticleStore {
    db: Pool<Postgres>,
}

impl PgArticleStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let db = PgPool::connect(database_url).await?;
        Ok(Self { db })
    }

    /// Apply the schema under `migrations/`.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.db)
            .await
            .map_err(|e| AggregatorError::General(format!("migration failed: {e}")))?;
        Ok(())
    }
}

fn row_to_raw(row: &PgRow) -> RawArticle {
    let published: Option<DateTime<Utc>> = row.try_get("published_at").unwrap_or_default();
    let fetched: Option<DateTime<Utc>> = row.try_get("fetched_at").unwrap_or_default();

    RawArticle {
        id: row.try_get("id").unwrap_or_default(),
        title: row.try_get("title").unwrap_or_default(),
        summary: row.try_get("summary").unwrap_or_default(),
        link: row.try_get("link").unwrap_or_default(),
        region: row.try_get("region").unwrap_or_default(),
        country_code: row.try_get("country_code").unwrap_or_default(),
        country_name: row.try_get("country_name").unwrap_or_default(),
        published_at: published.map(RawTimestamp::Structured),
        fetched_at: fetched.map(RawTimestamp::Structured),
        batch_id: row.try_get("batch_id").unwrap_or_default(),
        sequence_id: row.try_get("sequence_id").unwrap_or_default(),
        tags: row
            .try_get::<Option<Vec<String>>, _>("tags")
            .unwrap_or_default()
            .unwrap_or_default(),
    }
}

#[async_trait]
impl ArticleStore for PgArticleStore {
    async fn fetch_partition(
        &self,
        region: &str,
        order: ArticleOrder,
        limit: usize,
    ) -> Result<Vec<RawArticle>> {
        let sql = match order {
            ArticleOrder::BatchSequence => {
                r#"
                SELECT id, title, summary, link, region, country_code, country_name,
                       published_at, fetched_at, batch_id, sequence_id, tags
                FROM articles
                WHERE region = $1
                ORDER BY batch_id DESC NULLS LAST,
                         sequence_id ASC NULLS LAST,
                         published_at DESC NULLS LAST
                LIMIT $2
                "#
            }
            ArticleOrder::PublishedDesc => {
                r#"
                SELECT id, title, summary, link, region, country_code, country_name,
                       published_at, fetched_at, batch_id, sequence_id, tags
                FROM articles
                WHERE region = $1
                ORDER BY published_at DESC NULLS LAST
                LIMIT $2
                "#
            }
        };

        let rows = sqlx::query(sql)
            .bind(region)
            .bind(limit as i64)
            .fetch_all(&self.db)
            .await?;

        Ok(rows.iter().map(row_to_raw).collect())
    }
}

#[async_trait]
impl ArticleSink for PgArticleStore {
    async fn store_articles(&self, articles: &[RawArticle]) -> Result<usize> {
        let mut stored = 0usize;
        for article in articles {
            let published = match &article.published_at {
                Some(RawTimestamp::Structured(dt)) => Some(*dt),
                _ => None,
            };
            let fetched = match &article.fetched_at {
                Some(RawTimestamp::Structured(dt)) => Some(*dt),
                _ => None,
            };

            sqlx::query(
                r#"
                INSERT INTO articles (id, title, summary, link, region, country_code,
                                      country_name, published_at, fetched_at,
                                      batch_id, sequence_id, tags)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                ON CONFLICT (id) DO UPDATE SET
                    title = EXCLUDED.title,
                    summary = EXCLUDED.summary,
                    link = EXCLUDED.link,
                    region = EXCLUDED.region,
                    country_code = EXCLUDED.country_code,
                    country_name = EXCLUDED.country_name,
                    published_at = EXCLUDED.published_at,
                    fetched_at = EXCLUDED.fetched_at,
                    batch_id = EXCLUDED.batch_id,
                    sequence_id = EXCLUDED.sequence_id,
                    tags = EXCLUDED.tags
                "#,
            )
            .bind(&article.id)
            .bind(&article.title)
            .bind(&article.summary)
            .bind(&article.link)
            .bind(&article.region)
            .bind(&article.country_code)
            .bind(&article.country_name)
            .bind(published)
            .bind(fetched)
            .bind(article.batch_id)
            .bind(article.sequence_id)
            .bind(&article.tags)
            .execute(&self.db)
            .await?;

            stored += 1;
        }

        info!("stored {} articles", stored);
        Ok(stored)
    }
}
