//! In-memory stores for testing and offline mode

use async_trait::async_trait;
use festival_notifier_domain::{
    CacheEntry, CacheKey, DestinationSettings, GenerationCache, SettingsStore, StoreError,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;
use time::Date;

use crate::store_json::{DEFAULT_MAX_ENTRIES, evict_overflow, prune_before};

/// In-memory settings store
#[derive(Default)]
pub struct InMemorySettingsStore {
    settings: RwLock<HashMap<String, DestinationSettings>>,
}

impl InMemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn get(&self, guild_id: &str) -> DestinationSettings {
        self.settings
            .read()
            .ok()
            .and_then(|settings| settings.get(guild_id).cloned())
            .unwrap_or_default()
    }

    async fn set(&self, guild_id: &str, settings: &DestinationSettings) -> Result<(), StoreError> {
        let mut all = self
            .settings
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))?;
        all.insert(guild_id.to_string(), settings.clone());
        Ok(())
    }

    async fn flush(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// In-memory generation cache with the same capacity rules as the file cache
pub struct InMemoryGenerationCache {
    max_entries: usize,
    entries: RwLock<BTreeMap<String, CacheEntry>>,
}

impl InMemoryGenerationCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_ENTRIES)
    }

    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            max_entries: max_entries.max(1),
            entries: RwLock::new(BTreeMap::new()),
        }
    }
}

impl Default for InMemoryGenerationCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationCache for InMemoryGenerationCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, StoreError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| StoreError::Poisoned(e.to_string()))?;
        Ok(entries.get(&key.encode()).cloned())
    }

    async fn put(&self, key: &CacheKey, entry: CacheEntry) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))?;
        let encoded = key.encode();
        entries.insert(encoded.clone(), entry);
        evict_overflow(&mut entries, self.max_entries, &encoded);
        Ok(())
    }

    async fn prune(&self, oldest_kept: Date) -> Result<usize, StoreError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))?;
        Ok(prune_before(&mut entries, oldest_kept))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use festival_notifier_domain::{CacheKind, NotificationStyle};
    use time::macros::date;

    #[tokio::test]
    async fn test_settings_default_then_set() {
        let store = InMemorySettingsStore::new();
        assert_eq!(store.get("g1").await, DestinationSettings::default());

        let settings = DestinationSettings {
            mention: NotificationStyle::None,
            ..Default::default()
        };
        store.set("g1", &settings).await.unwrap();

        assert_eq!(store.get("g1").await, settings);
    }

    #[tokio::test]
    async fn test_cache_put_get_and_prune() {
        let cache = InMemoryGenerationCache::new();
        let key = CacheKey::new(date!(2026 - 04 - 05), CacheKind::Wish, "Easter");

        cache.put(&key, CacheEntry::generated("He is risen")).await.unwrap();
        assert!(cache.get(&key).await.unwrap().is_some());

        assert_eq!(cache.prune(date!(2026 - 04 - 05)).await.unwrap(), 0);
        assert_eq!(cache.prune(date!(2026 - 04 - 06)).await.unwrap(), 1);
        assert!(cache.get(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cache_capacity() {
        let cache = InMemoryGenerationCache::with_capacity(1);
        let first = CacheKey::new(date!(2026 - 04 - 05), CacheKind::Wish, "Easter");
        let second = CacheKey::new(date!(2026 - 04 - 06), CacheKind::Wish, "Easter Monday");

        cache.put(&first, CacheEntry::generated("a")).await.unwrap();
        cache.put(&second, CacheEntry::generated("b")).await.unwrap();

        assert!(cache.get(&first).await.unwrap().is_none());
        assert!(cache.get(&second).await.unwrap().is_some());
    }
}
