//! Wish text use case: cached, validated generation with a static fallback

use time::Date;

use crate::{
    model::{CacheEntry, CacheKey, CacheKind, Category, Origin},
    ports::{GenerationCache, TextGenerator},
};

/// Configuration for wish generation
#[derive(Debug, Clone)]
pub struct WishConfig {
    /// Shortest accepted provider output, in characters
    pub min_chars: usize,
    /// Keep serving a cached fallback instead of retrying the provider
    pub pin_fallback: bool,
}

impl Default for WishConfig {
    fn default() -> Self {
        Self {
            min_chars: 220,
            pin_fallback: false,
        }
    }
}

/// Generated (or fallback) wish text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WishText {
    pub text: String,
    pub origin: Origin,
}

/// Use case producing the celebratory message for an event
pub struct WishWriter<G, C> {
    generator: G,
    cache: C,
    config: WishConfig,
}

impl<G: TextGenerator, C: GenerationCache> WishWriter<G, C> {
    pub fn new(generator: G, cache: C, config: WishConfig) -> Self {
        Self {
            generator,
            cache,
            config,
        }
    }

    /// Wish text for `name` on `date`, consulting the cache first
    pub async fn make_wish_text(
        &self,
        date: Date,
        name: &str,
        category: Option<Category>,
    ) -> WishText {
        let key = CacheKey::new(date, CacheKind::Wish, name);

        let cached = match self.cache.get(&key).await {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(event = %name, error = %e, "Cache read failed, generating");
                None
            }
        };

        if let Some(entry) = &cached {
            if entry.origin == Origin::Generated || self.config.pin_fallback {
                tracing::debug!(event = %name, origin = ?entry.origin, "Wish cache hit");
                return WishText {
                    text: entry.value.clone(),
                    origin: entry.origin,
                };
            }
        }

        let prompt = build_wish_prompt(name, category);
        let entry = match self.generator.generate(&prompt).await {
            Ok(text) => {
                let text = text.trim().to_string();
                let length = text.chars().count();
                if length >= self.config.min_chars {
                    CacheEntry::generated(text)
                } else {
                    tracing::warn!(
                        event = %name,
                        length = length,
                        min_chars = self.config.min_chars,
                        "Generated wish too short, using fallback"
                    );
                    self.fallback_entry(cached.as_ref(), name)
                }
            }
            Err(e) => {
                tracing::warn!(event = %name, error = %e, "Wish generation failed, using fallback");
                self.fallback_entry(cached.as_ref(), name)
            }
        };

        if let Err(e) = self.cache.put(&key, entry.clone()).await {
            tracing::error!(event = %name, error = %e, "Failed to persist wish cache entry");
        }

        WishText {
            text: entry.value,
            origin: entry.origin,
        }
    }

    fn fallback_entry(&self, cached: Option<&CacheEntry>, name: &str) -> CacheEntry {
        // An earlier fallback for the same key is reused verbatim.
        match cached {
            Some(entry) => entry.clone(),
            None => CacheEntry::fallback(fallback_wish(name)),
        }
    }
}

/// Instruction sent to the text provider
pub fn build_wish_prompt(name: &str, category: Option<Category>) -> String {
    let audience = match category {
        Some(Category::Hindu) => "the Hindu community and everyone celebrating",
        Some(Category::Muslim) => "the Muslim community and everyone celebrating",
        Some(Category::Christian) => "the Christian community and everyone celebrating",
        None => "everyone celebrating",
    };

    let category = category.map(|c| c.as_str()).unwrap_or("general");

    format!(
        "Write a festive greeting for {name}, addressed to {audience} in an online community.\n\
         \n\
         Festival: {name}\n\
         Category: {category}\n\
         \n\
         Requirements:\n\
         - Length: roughly 300 to 400 characters.\n\
         - Tone: warm, joyful and inclusive; do not preach or proselytize.\n\
         - Mention what the day means in a sentence, then wish people well.\n\
         - Use between 1 and 3 emoji.\n\
         - Output plain text only: no markdown, no headings, no quotes around the message."
    )
}

/// Static message used when generation fails or is rejected
pub fn fallback_wish(name: &str) -> String {
    format!(
        "🎉 Happy {name}! Wishing everyone in our community joy, peace and good health \
         on this special day. May the celebrations bring you closer to the people you love \
         and fill your home with light and warmth. Warm wishes from all of us!"
    )
}
