//! Summarization seam: rewrite or translate a headline, produce a short
//! summary, and pick tags from the allowed vocabulary.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::collector::feeds::PromptKind;
use crate::types::{AggregatorError, Result};

const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_MODEL: &str = "gemini-2.5-flash-lite";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleSummary {
    pub title: String,
    pub summary: String,
    pub tags: Vec<String>,
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    fn name(&self) -> String;

    async fn summarize(
        &self,
        kind: PromptKind,
        title: &str,
        link: &str,
        allowed_tags: &[String],
    ) -> Result<ArticleSummary>;
}

fn build_prompt(kind: PromptKind, title: &str, link: &str, allowed_tags: &[String]) -> String {
    let tag_list = allowed_tags.join(", ");
    let task = match kind {
        PromptKind::Domestic => {
            "Summarize the following news article for coffee enthusiasts in about 150 characters, \
             in a friendly tone."
        }
        PromptKind::Overseas => {
            "Translate the title of the following foreign news article, then summarize its content \
             in about 150 characters."
        }
    };
    format!(
        "{task} Additionally, pick at most 3 tags most relevant to the article from the list \
         below; if none fit, return an empty array.\n\nTag list: [{tag_list}]\n\n\
         Reply strictly as JSON:\n{{\n  \"title\": \"...\",\n  \"summary\": \"...\",\n  \
         \"tags\": [\"...\"]\n}}\n\nTitle: {title}\nArticle link: {link}"
    )
}

/// Parse the model's JSON reply. Model output sometimes arrives wrapped in
/// markdown code fences, and sometimes is not valid JSON at all; the fallback
/// keeps the record rather than failing it.
fn parse_summary(response: &str, original_title: &str, allowed_tags: &[String]) -> ArticleSummary {
    let cleaned = response
        .trim()
        .replace("```json", "")
        .replace("```", "");

    match serde_json::from_str::<Value>(cleaned.trim()) {
        Ok(value) => {
            let title = value
                .get("title")
                .and_then(Value::as_str)
                .unwrap_or(original_title)
                .to_string();
            let summary = value
                .get("summary")
                .and_then(Value::as_str)
                .unwrap_or("Summary unavailable.")
                .to_string();
            let mut tags: Vec<String> = value
                .get("tags")
                .and_then(Value::as_array)
                .map(|arr| {
                    arr.iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();
            tags.retain(|t| allowed_tags.contains(t));
            tags.truncate(3);
            ArticleSummary { title, summary, tags }
        }
        Err(e) => {
            warn!("summary response was not valid JSON: {e}");
            ArticleSummary {
                title: format!("{original_title} (processing failed)"),
                summary: "Could not process this article; see the original link.".to_string(),
                tags: Vec::new(),
            }
        }
    }
}

/// Summarizer backed by the Generative Language REST API.
pub struct GeminiSummarizer {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiSummarizer {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[async_trait]
impl Summarizer for GeminiSummarizer {
    fn name(&self) -> String {
        format!("gemini ({})", self.model)
    }

    async fn summarize(
        &self,
        kind: PromptKind,
        title: &str,
        link: &str,
        allowed_tags: &[String],
    ) -> Result<ArticleSummary> {
        let prompt = build_prompt(kind, title, link, allowed_tags);
        let url = format!(
            "{GEMINI_ENDPOINT}/{}:generateContent?key={}",
            self.model, self.api_key
        );
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        let value: Value = response.json().await?;

        let text = value
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                AggregatorError::Summarization("response carried no candidate text".to_string())
            })?;

        debug!("summarized '{}' via {}", title, self.name());
        Ok(parse_summary(text, title, allowed_tags))
    }
}

/// Deterministic summarizer for tests and offline runs.
pub struct MockSummarizer;

#[async_trait]
impl Summarizer for MockSummarizer {
    fn name(&self) -> String {
        "mock".to_string()
    }

    async fn summarize(
        &self,
        _kind: PromptKind,
        title: &str,
        _link: &str,
        allowed_tags: &[String],
    ) -> Result<ArticleSummary> {
        let lowered = title.to_lowercase();
        let tags = allowed_tags
            .iter()
            .filter(|t| lowered.contains(&t.to_lowercase()))
            .take(3)
            .cloned()
            .collect();
        Ok(ArticleSummary {
            title: title.to_string(),
            summary: format!("Automated digest of \"{title}\"."),
            tags,
        })
    }
}
