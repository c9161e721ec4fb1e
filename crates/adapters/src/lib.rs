//! festival-notifier adapters crate
//!
//! This crate contains infrastructure adapters implementing the domain ports:
//! - `events`: Calendarific holidays API
//! - `llm`: Generative-text providers (Gemini, OpenAI, stub)
//! - `images`: Photo search providers (Pexels, Unsplash, disabled)
//! - `discord`: Discord REST messenger
//! - `outbox`: JSONL review file standing in for live delivery
//! - `store`: JSON file and in-memory settings/cache stores
//! - `schedule`: Timezone-aware clock and cron schedule

pub mod discord;
pub mod events;
pub mod images;
pub mod llm;
pub mod outbox;
pub mod schedule;
mod store_json;
mod store_memory;

/// Re-exports for store adapters
pub mod store {
    pub use crate::store_json::{DEFAULT_MAX_ENTRIES, JsonFileGenerationCache, JsonFileSettingsStore};
    pub use crate::store_memory::{InMemoryGenerationCache, InMemorySettingsStore};
}
