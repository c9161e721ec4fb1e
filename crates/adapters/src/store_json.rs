//! JSON file stores for guild settings and the generation cache
//!
//! Both stores keep the whole mapping in memory and rewrite the file on every
//! change. Files are written to a sibling temp file and renamed into place.

use async_trait::async_trait;
use festival_notifier_domain::{
    CacheEntry, CacheKey, DestinationSettings, GenerationCache, SettingsStore, StoreError,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use time::Date;

/// Default capacity of the generation cache
pub const DEFAULT_MAX_ENTRIES: usize = 2000;

async fn read_map<T: for<'de> Deserialize<'de>>(
    path: &Path,
) -> Result<Option<BTreeMap<String, T>>, StoreError> {
    match tokio::fs::read_to_string(path).await {
        Ok(raw) if raw.trim().is_empty() => Ok(Some(BTreeMap::new())),
        Ok(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StoreError::Serialization(format!("{}: {}", path.display(), e))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StoreError::Io(e)),
    }
}

async fn write_map<T: Serialize>(path: &Path, map: &BTreeMap<String, T>) -> Result<(), StoreError> {
    let json =
        serde_json::to_string_pretty(map).map_err(|e| StoreError::Serialization(e.to_string()))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    tokio::fs::write(&tmp, json).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

fn poisoned<E: std::fmt::Display>(e: E) -> StoreError {
    StoreError::Poisoned(e.to_string())
}

/// Per-guild settings persisted as `{guild_id: settings}`
pub struct JsonFileSettingsStore {
    path: PathBuf,
    settings: RwLock<BTreeMap<String, DestinationSettings>>,
}

impl JsonFileSettingsStore {
    /// Load the file, or start empty when it does not exist yet
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let settings = read_map(&path).await?.unwrap_or_default();
        tracing::debug!(path = %path.display(), guilds = settings.len(), "Opened settings store");

        Ok(Self {
            path,
            settings: RwLock::new(settings),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn snapshot(&self) -> Result<BTreeMap<String, DestinationSettings>, StoreError> {
        Ok(self.settings.read().map_err(poisoned)?.clone())
    }
}

#[async_trait]
impl SettingsStore for JsonFileSettingsStore {
    async fn get(&self, guild_id: &str) -> DestinationSettings {
        match self.settings.read() {
            Ok(settings) => settings.get(guild_id).cloned().unwrap_or_default(),
            Err(e) => {
                tracing::error!(guild_id = %guild_id, error = %e, "Settings lock poisoned, using defaults");
                DestinationSettings::default()
            }
        }
    }

    async fn set(&self, guild_id: &str, settings: &DestinationSettings) -> Result<(), StoreError> {
        self.settings
            .write()
            .map_err(poisoned)?
            .insert(guild_id.to_string(), settings.clone());
        self.flush().await
    }

    async fn flush(&self) -> Result<(), StoreError> {
        let snapshot = self.snapshot()?;
        write_map(&self.path, &snapshot).await
    }
}

/// Stored cache value; bare strings are read as generated entries
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredEntry {
    Plain(String),
    Entry(CacheEntry),
}

impl From<StoredEntry> for CacheEntry {
    fn from(stored: StoredEntry) -> Self {
        match stored {
            StoredEntry::Plain(value) => CacheEntry::generated(value),
            StoredEntry::Entry(entry) => entry,
        }
    }
}

/// Generation cache persisted as `{"<date>|<kind>|<name>": entry}`
pub struct JsonFileGenerationCache {
    path: PathBuf,
    max_entries: usize,
    entries: RwLock<BTreeMap<String, CacheEntry>>,
}

impl JsonFileGenerationCache {
    /// Load the file; an unreadable cache is discarded rather than failing startup
    pub async fn open(path: impl Into<PathBuf>, max_entries: usize) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = match read_map::<StoredEntry>(&path).await {
            Ok(stored) => stored
                .unwrap_or_default()
                .into_iter()
                .map(|(key, value)| (key, CacheEntry::from(value)))
                .collect(),
            Err(StoreError::Serialization(e)) => {
                tracing::warn!(error = %e, "Discarding unreadable generation cache");
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        tracing::debug!(path = %path.display(), entries = entries.len(), "Opened generation cache");

        Ok(Self {
            path,
            max_entries: max_entries.max(1),
            entries: RwLock::new(entries),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    async fn persist(&self) -> Result<(), StoreError> {
        let snapshot = self.entries.read().map_err(poisoned)?.clone();
        write_map(&self.path, &snapshot).await
    }
}

/// Keys ordered oldest first; undecodable keys sort before everything
fn oldest_first(entries: &BTreeMap<String, CacheEntry>) -> Vec<String> {
    let mut keys: Vec<(Option<Date>, &String)> = entries
        .keys()
        .map(|raw| (CacheKey::decode(raw).map(|k| k.date), raw))
        .collect();
    keys.sort();
    keys.into_iter().map(|(_, raw)| raw.clone()).collect()
}

/// Drop the oldest entries until at most `max_entries` remain, never evicting `keep`
pub(crate) fn evict_overflow(
    entries: &mut BTreeMap<String, CacheEntry>,
    max_entries: usize,
    keep: &str,
) -> usize {
    let overflow = entries.len().saturating_sub(max_entries);
    if overflow == 0 {
        return 0;
    }
    let victims: Vec<String> = oldest_first(entries)
        .into_iter()
        .filter(|raw| raw != keep)
        .take(overflow)
        .collect();
    for key in &victims {
        entries.remove(key);
    }
    victims.len()
}

/// Drop entries dated before `oldest_kept`, and any undecodable keys
pub(crate) fn prune_before(entries: &mut BTreeMap<String, CacheEntry>, oldest_kept: Date) -> usize {
    let before = entries.len();
    entries.retain(|raw, _| {
        CacheKey::decode(raw)
            .map(|key| key.date >= oldest_kept)
            .unwrap_or(false)
    });
    before - entries.len()
}

#[async_trait]
impl GenerationCache for JsonFileGenerationCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, StoreError> {
        Ok(self
            .entries
            .read()
            .map_err(poisoned)?
            .get(&key.encode())
            .cloned())
    }

    async fn put(&self, key: &CacheKey, entry: CacheEntry) -> Result<(), StoreError> {
        {
            let mut entries = self.entries.write().map_err(poisoned)?;
            let encoded = key.encode();
            entries.insert(encoded.clone(), entry);
            let evicted = evict_overflow(&mut entries, self.max_entries, &encoded);
            if evicted > 0 {
                tracing::debug!(evicted = evicted, "Evicted oldest cache entries");
            }
        }
        self.persist().await
    }

    async fn prune(&self, oldest_kept: Date) -> Result<usize, StoreError> {
        let removed = {
            let mut entries = self.entries.write().map_err(poisoned)?;
            prune_before(&mut entries, oldest_kept)
        };
        if removed > 0 {
            self.persist().await?;
        }
        Ok(removed)
    }
}
