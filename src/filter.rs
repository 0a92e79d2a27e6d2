//! Cascading filter engine: region → country → tag narrowing.
//!
//! Every operation here is a pure function of its inputs. Selection state is
//! an explicit immutable value owned by the caller and re-applied on every
//! interaction; nothing in this module does I/O or holds hidden state.

use std::collections::BTreeSet;

use crate::types::{Article, CountryOption};

/// Region shown in the overseas pane before the user picks one.
pub const DEFAULT_REGION: &str = "us";

/// Country-filter eligibility requires an exact two-character code.
const COUNTRY_CODE_LEN: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub selected_region: String,
    pub selected_countries: BTreeSet<String>,
    pub selected_tags: BTreeSet<String>,
}

impl FilterState {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            selected_region: region.into(),
            selected_countries: BTreeSet::new(),
            selected_tags: BTreeSet::new(),
        }
    }

    /// Select a region. Always clears the country selection so a pick from
    /// the previous region is never carried over.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.selected_region = region.into();
        self.selected_countries.clear();
        self
    }

    pub fn toggle_country(mut self, code: &str) -> Self {
        if !self.selected_countries.remove(code) {
            self.selected_countries.insert(code.to_string());
        }
        self
    }

    pub fn toggle_tag(mut self, tag: &str) -> Self {
        if !self.selected_tags.remove(tag) {
            self.selected_tags.insert(tag.to_string());
        }
        self
    }

    fn matches_tags(&self, article: &Article) -> bool {
        self.selected_tags
            .iter()
            .all(|tag| article.tags.iter().any(|t| t == tag))
    }

    /// Domestic records are never narrowed by region or country.
    pub fn apply_domestic<'a>(&self, articles: &[&'a Article]) -> Vec<&'a Article> {
        articles
            .iter()
            .filter(|a| self.matches_tags(a))
            .copied()
            .collect()
    }

    /// Overseas records must match the selected region, pass the optional
    /// country narrowing, and carry every selected tag.
    pub fn apply_overseas<'a>(&self, articles: &[&'a Article]) -> Vec<&'a Article> {
        articles
            .iter()
            .filter(|a| a.region == self.selected_region)
            .filter(|a| {
                self.selected_countries.is_empty()
                    || self.selected_countries.contains(&a.country_code)
            })
            .filter(|a| self.matches_tags(a))
            .copied()
            .collect()
    }
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new(DEFAULT_REGION)
    }
}

/// Display-eligibility gate, applied before any derivation or user filtering:
/// records with a malformed country code are excluded outright.
pub fn valid_records(articles: &[Article]) -> Vec<&Article> {
    articles
        .iter()
        .filter(|a| a.country_code.chars().count() == COUNTRY_CODE_LEN)
        .collect()
}

/// All distinct tags across both valid collections. Presentation order is the
/// caller's concern; first-seen order is returned.
pub fn tag_vocabulary(domestic: &[&Article], overseas: &[&Article]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut tags = Vec::new();
    for article in domestic.iter().chain(overseas.iter()) {
        for tag in &article.tags {
            if seen.insert(tag.clone()) {
                tags.push(tag.clone());
            }
        }
    }
    tags
}

/// Country picker options for the selected region: one entry per distinct
/// code (first-seen name wins), sorted ascending by display name. Zero or one
/// entries tell the caller no picker is needed.
pub fn country_options(overseas: &[&Article], selected_region: &str) -> Vec<CountryOption> {
    let mut options: Vec<CountryOption> = Vec::new();
    for article in overseas.iter().filter(|a| a.region == selected_region) {
        if !options.iter().any(|c| c.code == article.country_code) {
            options.push(CountryOption {
                code: article.country_code.clone(),
                name: article.country_name.clone(),
            });
        }
    }
    options.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.code.cmp(&b.code)));
    options
}
