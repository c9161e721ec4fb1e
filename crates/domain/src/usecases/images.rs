//! Festival image use case

use rand::seq::IndexedRandom;
use time::Date;

use crate::{
    model::{CacheEntry, CacheKey, CacheKind, Category},
    ports::{GenerationCache, ImageCandidate, ImageSearch},
};

/// Query templates per category; `{name}` is replaced with the event name
pub const HINDU_QUERIES: &[&str] = &[
    "{name} festival India celebration",
    "{name} diya lights",
    "{name} rangoli colorful",
];
pub const MUSLIM_QUERIES: &[&str] = &[
    "{name} mosque celebration",
    "{name} crescent moon lanterns",
    "{name} festive sweets family",
];
pub const CHRISTIAN_QUERIES: &[&str] = &[
    "{name} church celebration",
    "{name} candles decorations",
    "{name} festive lights",
];
pub const GENERIC_QUERIES: &[&str] = &["{name} festival celebration", "{name} festive lights"];

/// Number of candidates requested per search
pub const DEFAULT_PER_PAGE: u32 = 10;

/// Use case resolving an illustrative image URL for an event
pub struct FestivalImages<S, C> {
    search: S,
    cache: C,
    per_page: u32,
}

impl<S: ImageSearch, C: GenerationCache> FestivalImages<S, C> {
    pub fn new(search: S, cache: C) -> Self {
        Self {
            search,
            cache,
            per_page: DEFAULT_PER_PAGE,
        }
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.max(1);
        self
    }

    /// Image URL for `name` on `date`, or an empty string when none was found
    pub async fn festival_image(&self, date: Date, name: &str, category: Option<Category>) -> String {
        let key = CacheKey::new(date, CacheKind::Image, name);

        match self.cache.get(&key).await {
            Ok(Some(entry)) if !entry.value.is_empty() => return entry.value,
            Ok(_) => {}
            Err(e) => tracing::warn!(event = %name, error = %e, "Cache read failed, searching"),
        }

        let query = pick_query(name, category);
        tracing::debug!(event = %name, query = %query, "Searching festival image");

        let candidates = match self.search.search(&query, self.per_page).await {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::warn!(event = %name, error = %e, "Image search failed");
                return String::new();
            }
        };

        let url = choose_candidate(&candidates)
            .map(|c| c.url.clone())
            .unwrap_or_default();

        if !url.is_empty() {
            if let Err(e) = self.cache.put(&key, CacheEntry::generated(url.clone())).await {
                tracing::error!(event = %name, error = %e, "Failed to persist image cache entry");
            }
        }

        url
    }
}

/// Templates for a category
pub fn query_templates(category: Option<Category>) -> &'static [&'static str] {
    match category {
        Some(Category::Hindu) => HINDU_QUERIES,
        Some(Category::Muslim) => MUSLIM_QUERIES,
        Some(Category::Christian) => CHRISTIAN_QUERIES,
        None => GENERIC_QUERIES,
    }
}

/// Uniformly pick a template and fill in the event name
pub fn pick_query(name: &str, category: Option<Category>) -> String {
    let templates = query_templates(category);
    let template = templates
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or("{name}");
    template.replace("{name}", name)
}

/// First landscape candidate, else the first candidate
pub fn choose_candidate(candidates: &[ImageCandidate]) -> Option<&ImageCandidate> {
    candidates
        .iter()
        .find(|c| c.is_landscape())
        .or_else(|| candidates.first())
}
