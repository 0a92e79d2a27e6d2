//! Full pipeline over the in-memory store: sink a collected batch, aggregate
//! it into the two feeds, then drive the filter engine the way a view would.

use std::sync::Arc;

use chrono::{TimeZone, Utc};

use coffee_news_aggregator::filter::{country_options, tag_vocabulary, valid_records};
use coffee_news_aggregator::store::ArticleSink;
use coffee_news_aggregator::types::{RawArticle, RawTimestamp};
use coffee_news_aggregator::{
    FilterState, MemoryStore, NewsAggregator, Partition, PartitionPlan,
};

fn raw(
    id: &str,
    region: &str,
    code: &str,
    name: &str,
    seq: i64,
    tags: &[&str],
) -> RawArticle {
    RawArticle {
        id: id.to_string(),
        title: format!("title {id}"),
        summary: format!("summary {id}"),
        link: format!("https://example.com/{id}"),
        region: region.to_string(),
        country_code: code.to_string(),
        country_name: name.to_string(),
        published_at: Some(RawTimestamp::Structured(
            Utc.with_ymd_and_hms(2024, 1, 5, 10, 0, seq as u32).unwrap(),
        )),
        fetched_at: Some(RawTimestamp::Structured(
            Utc.with_ymd_and_hms(2024, 1, 5, 11, 0, 0).unwrap(),
        )),
        batch_id: Some(7),
        sequence_id: Some(seq),
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

#[tokio::test]
async fn collected_batch_flows_through_aggregation_and_filtering() {
    let store = Arc::new(MemoryStore::new());

    let collected = vec![
        raw("jp-0", "japan", "jp", "Japan", 0, &["beans", "events"]),
        raw("jp-1", "japan", "jp", "Japan", 1, &["cafe"]),
        raw("us-0", "us", "us", "United States", 0, &["beans"]),
        raw("fr-0", "europe", "fr", "France", 0, &["cafe", "beans"]),
        raw("de-0", "europe", "de", "Germany", 1, &["business"]),
        // Malformed country code: displays nowhere after the validity gate.
        raw("xx-0", "europe", "unknown", "Unknown", 2, &["beans"]),
    ];
    store.store_articles(&collected).await.unwrap();

    let plan = PartitionPlan {
        domestic: Partition::new("japan", 15),
        overseas: vec![Partition::new("us", 15), Partition::new("europe", 50)],
    };
    let aggregator = NewsAggregator::new(store, plan);
    let feed = aggregator.fetch_articles().await.unwrap();

    assert_eq!(feed.diagnostics.domestic_raw_count, 2);
    assert_eq!(feed.diagnostics.overseas_raw_count, 4);
    // Normalized display strings, never raw shapes.
    assert_eq!(feed.domestic[0].published_at, "2024/01/05 19:00:00");

    let domestic = valid_records(&feed.domestic);
    let overseas = valid_records(&feed.overseas);
    assert_eq!(overseas.len(), 3); // the malformed record is gone

    let vocabulary = tag_vocabulary(&domestic, &overseas);
    assert!(vocabulary.iter().any(|t| t == "business"));
    // The malformed record's tags never reach the vocabulary.
    assert_eq!(
        vocabulary.len(),
        ["beans", "events", "cafe", "business"].len()
    );

    // Region pane: europe selected, country picker derived and sorted.
    let state = FilterState::default().with_region("europe");
    let countries = country_options(&overseas, &state.selected_region);
    let codes: Vec<&str> = countries.iter().map(|c| c.code.as_str()).collect();
    assert_eq!(codes, ["fr", "de"]); // France sorts before Germany by name

    // Tag narrowing applies to both panes; country narrowing only overseas.
    let state = state.toggle_tag("beans");
    let visible_domestic = state.apply_domestic(&domestic);
    let visible_overseas = state.apply_overseas(&overseas);
    assert_eq!(visible_domestic.len(), 1);
    assert_eq!(visible_domestic[0].id, "jp-0");
    assert_eq!(visible_overseas.len(), 1);
    assert_eq!(visible_overseas[0].id, "fr-0");

    // Switching region drops the country narrowing with it.
    let state = state.toggle_country("fr").with_region("us");
    assert!(state.selected_countries.is_empty());
    let visible_overseas = state.apply_overseas(&overseas);
    assert_eq!(visible_overseas.len(), 1);
    assert_eq!(visible_overseas[0].id, "us-0");
}
