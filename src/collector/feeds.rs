//! Collection roster: which source feed each country is pulled from, and the
//! tag vocabulary the summarizer may assign. Data, not logic: operators edit
//! this (or load JSON) to add countries without touching pipeline code.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::types::Result;

/// Which prompt the summarizer uses for a feed's articles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptKind {
    /// Summarize as-is for domestic readers.
    Domestic,
    /// Translate the title, then summarize.
    Overseas,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSpec {
    pub region: String,
    pub country_code: String,
    pub country_name: String,
    pub url: String,
    pub max_items: usize,
    pub prompt: PromptKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSet {
    pub allowed_tags: Vec<String>,
    pub feeds: Vec<FeedSpec>,
}

impl FeedSet {
    /// Load a roster from JSON, rejecting specs whose URL does not parse.
    pub fn from_json(json: &str) -> Result<Self> {
        let set: FeedSet = serde_json::from_str(json)?;
        for feed in &set.feeds {
            Url::parse(&feed.url)?;
        }
        Ok(set)
    }
}

fn news_search(query: &str, hl: &str, gl: &str, ceid: &str) -> String {
    format!("https://news.google.com/rss/search?q={query}&hl={hl}&gl={gl}&ceid={ceid}")
}

fn feed(
    region: &str,
    code: &str,
    name: &str,
    url: String,
    max_items: usize,
    prompt: PromptKind,
) -> FeedSpec {
    FeedSpec {
        region: region.to_string(),
        country_code: code.to_string(),
        country_name: name.to_string(),
        url,
        max_items,
        prompt,
    }
}

impl Default for FeedSet {
    fn default() -> Self {
        use PromptKind::{Domestic, Overseas};

        let allowed_tags = [
            "beans",
            "cafe",
            "events",
            "sustainability",
            "health",
            "research",
            "business",
            "culture",
            "recipes",
            "specialty coffee",
            "origin",
            "hand drip",
            "espresso",
            "cold brew",
            "trends",
            "history",
        ]
        .into_iter()
        .map(str::to_string)
        .collect();

        let feeds = vec![
            feed("japan", "jp", "Japan", news_search("coffee", "ja", "JP", "JP:ja"), 15, Domestic),
            // Asia-Pacific
            feed("asia", "cn", "China", news_search("咖啡", "zh-CN", "CN", "CN:zh-CN"), 5, Overseas),
            feed("asia", "tw", "Taiwan", news_search("咖啡", "zh-TW", "TW", "TW:zh-TW"), 5, Overseas),
            feed("asia", "kr", "South Korea", news_search("커피", "ko", "KR", "KR:ko"), 5, Overseas),
            feed("asia", "vn", "Vietnam", news_search("cà phê", "vi", "VN", "VN:vi"), 5, Overseas),
            feed("asia", "sg", "Singapore", news_search("coffee", "en-SG", "SG", "SG:en-SG"), 5, Overseas),
            feed("asia", "au", "Australia", news_search("coffee", "en-AU", "AU", "AU:en"), 5, Overseas),
            // United States
            feed("us", "us", "United States", news_search("coffee", "en-US", "US", "US:en"), 15, Overseas),
            // Europe
            feed("europe", "it", "Italy", news_search("caffè", "it", "IT", "IT:it"), 5, Overseas),
            feed("europe", "de", "Germany", news_search("kaffee", "de", "DE", "DE:de"), 5, Overseas),
            feed("europe", "gb", "United Kingdom", news_search("coffee", "en-GB", "GB", "GB:en"), 5, Overseas),
            feed("europe", "fr", "France", news_search("café", "fr", "FR", "FR:fr"), 5, Overseas),
            feed("europe", "es", "Spain", news_search("café", "es", "ES", "ES:es"), 5, Overseas),
            feed("europe", "pt", "Portugal", news_search("café", "pt-PT", "PT", "PT:pt-PT"), 5, Overseas),
            // Latin America
            feed("latin_america", "br", "Brazil", news_search("café", "pt-BR", "BR", "BR:pt-BR"), 5, Overseas),
            feed("latin_america", "co", "Colombia", news_search("café", "es-419", "CO", "CO:es-419"), 5, Overseas),
            feed("latin_america", "cr", "Costa Rica", news_search("café", "es-419", "CR", "CR:es-419"), 5, Overseas),
            feed("latin_america", "pa", "Panama", news_search("café", "es-419", "PA", "PA:es-419"), 5, Overseas),
            feed("latin_america", "sv", "El Salvador", news_search("café", "es-419", "SV", "SV:es-419"), 5, Overseas),
            feed("latin_america", "gt", "Guatemala", news_search("café", "es-419", "GT", "GT:es-419"), 5, Overseas),
            feed("latin_america", "mx", "Mexico", news_search("café", "es-419", "MX", "MX:es-419"), 5, Overseas),
            feed("latin_america", "pe", "Peru", news_search("café", "es-419", "PE", "PE:es-419"), 5, Overseas),
            // Africa
            feed("africa", "et", "Ethiopia", news_search("coffee", "en-ET", "ET", "ET:en"), 5, Overseas),
            feed("africa", "ke", "Kenya", news_search("coffee", "en-KE", "KE", "KE:en"), 5, Overseas),
            feed("africa", "ug", "Uganda", news_search("coffee", "en-UG", "UG", "UG:en"), 5, Overseas),
            feed("africa", "rw", "Rwanda", news_search("coffee", "en-RW", "RW", "RW:en"), 5, Overseas),
        ];

        Self { allowed_tags, feeds }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_roster_uses_two_character_codes() {
        let set = FeedSet::default();
        assert!(set
            .feeds
            .iter()
            .all(|f| f.country_code.chars().count() == 2));
    }

    #[test]
    fn default_roster_urls_all_parse() {
        let set = FeedSet::default();
        for feed in &set.feeds {
            assert!(Url::parse(&feed.url).is_ok(), "bad URL for {}", feed.country_name);
        }
    }

    #[test]
    fn from_json_rejects_invalid_urls() {
        let json = r#"{
            "allowed_tags": ["beans"],
            "feeds": [{
                "region": "us",
                "country_code": "us",
                "country_name": "United States",
                "url": "not a url",
                "max_items": 5,
                "prompt": "overseas"
            }]
        }"#;
        assert!(FeedSet::from_json(json).is_err());
    }
}
