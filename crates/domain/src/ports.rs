//! Port definitions (traits) for external dependencies
//!
//! These traits define the boundaries between the domain and external systems.
//! Adapters implement these traits to connect to real infrastructure.

use async_trait::async_trait;
use thiserror::Error;
use time::{Date, OffsetDateTime};

use crate::model::{
    CacheEntry, CacheKey, Channel, DeliveryReceipt, DestinationSettings, FestivalEvent, Guild,
    NotificationPayload,
};

/// Error type for event source operations
#[derive(Debug, Error)]
pub enum EventSourceError {
    #[error("API error: {0}")]
    Api(String),
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Port for looking up the festivals that fall on a date
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Fetch the events for `country` (ISO 3166 alpha-2) on `date`.
    ///
    /// An empty vector means the provider reported no events; an error means
    /// the provider could not be asked.
    async fn events_on(
        &self,
        country: &str,
        date: Date,
    ) -> Result<Vec<FestivalEvent>, EventSourceError>;
}

/// Error type for text generation
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("LLM API error: {0}")]
    Api(String),
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),
    #[error("Rate limited")]
    RateLimited,
    #[error("Timeout")]
    Timeout,
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Port for a single prompt-completion call
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Complete `prompt`, returning plain text
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Error type for image search
#[derive(Debug, Error)]
pub enum ImageSearchError {
    #[error("API error: {0}")]
    Api(String),
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("Rate limited")]
    RateLimited,
    #[error("Network error: {0}")]
    Network(String),
}

/// A photo returned by the image provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCandidate {
    pub width: u32,
    pub height: u32,
    pub url: String,
}

impl ImageCandidate {
    pub fn is_landscape(&self) -> bool {
        self.width >= self.height
    }
}

/// Port for photo search
#[async_trait]
pub trait ImageSearch: Send + Sync {
    /// Search photos matching `query`, at most `per_page` results
    async fn search(
        &self,
        query: &str,
        per_page: u32,
    ) -> Result<Vec<ImageCandidate>, ImageSearchError>;
}

/// Error type for messenger operations
#[derive(Debug, Error)]
pub enum MessengerError {
    #[error("API error: {0}")]
    Api(String),
    #[error("Rate limited")]
    RateLimited,
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("Missing permissions: {0}")]
    Forbidden(String),
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Port for the chat platform
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Communities the bot has joined
    async fn guilds(&self) -> Result<Vec<Guild>, MessengerError>;

    /// Channels of a guild, in platform order
    async fn channels(&self, guild_id: &str) -> Result<Vec<Channel>, MessengerError>;

    /// Post a rich message, optionally preceded by a mention
    async fn send(
        &self,
        channel_id: &str,
        mention: Option<&str>,
        payload: &NotificationPayload,
    ) -> Result<DeliveryReceipt, MessengerError>;
}

/// Error type for the file-backed stores
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Lock poisoned: {0}")]
    Poisoned(String),
}

/// Port for per-guild settings
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Settings for a guild; defaults when nothing is stored
    async fn get(&self, guild_id: &str) -> DestinationSettings;

    /// Replace a guild's settings and persist
    async fn set(&self, guild_id: &str, settings: &DestinationSettings) -> Result<(), StoreError>;

    /// Persist the whole mapping
    async fn flush(&self) -> Result<(), StoreError>;
}

/// Port for the per-day generation cache
#[async_trait]
pub trait GenerationCache: Send + Sync {
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, StoreError>;

    /// Insert or replace an entry and persist
    async fn put(&self, key: &CacheKey, entry: CacheEntry) -> Result<(), StoreError>;

    /// Drop every entry dated before `oldest_kept`, returning how many were removed
    async fn prune(&self, oldest_kept: Date) -> Result<usize, StoreError>;
}

/// Port for time/clock operations (enables deterministic testing)
pub trait Clock: Send + Sync {
    /// Current instant, expressed in the configured local offset
    fn now(&self) -> OffsetDateTime;
}

/// UTC clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

// Forwarding impls so use cases can hold either `Arc<dyn Port>` or `&Port`.

#[async_trait]
impl<T: TextGenerator + ?Sized> TextGenerator for &T {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        (**self).generate(prompt).await
    }
}

#[async_trait]
impl<T: ImageSearch + ?Sized> ImageSearch for &T {
    async fn search(
        &self,
        query: &str,
        per_page: u32,
    ) -> Result<Vec<ImageCandidate>, ImageSearchError> {
        (**self).search(query, per_page).await
    }
}

#[async_trait]
impl<T: GenerationCache + ?Sized> GenerationCache for &T {
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, StoreError> {
        (**self).get(key).await
    }

    async fn put(&self, key: &CacheKey, entry: CacheEntry) -> Result<(), StoreError> {
        (**self).put(key, entry).await
    }

    async fn prune(&self, oldest_kept: Date) -> Result<usize, StoreError> {
        (**self).prune(oldest_kept).await
    }
}

#[async_trait]
impl<T: SettingsStore + ?Sized> SettingsStore for &T {
    async fn get(&self, guild_id: &str) -> DestinationSettings {
        (**self).get(guild_id).await
    }

    async fn set(&self, guild_id: &str, settings: &DestinationSettings) -> Result<(), StoreError> {
        (**self).set(guild_id, settings).await
    }

    async fn flush(&self) -> Result<(), StoreError> {
        (**self).flush().await
    }
}
