//! Domain models and value objects

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use time::Date;
use time::macros::format_description;

/// A festival or holiday reported by the event provider for a given day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FestivalEvent {
    /// Display name (e.g. "Diwali/Deepavali")
    pub name: String,
    /// Provider description, may be empty
    #[serde(default)]
    pub description: String,
    /// Provider type tags (e.g. "National holiday", "Observance")
    #[serde(default)]
    pub type_tags: Vec<String>,
    /// Provider primary type (e.g. "Hinduism", "Gazetted Holiday")
    #[serde(default)]
    pub primary_type: String,
}

impl FestivalEvent {
    /// Convenience constructor for an event with only a name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            type_tags: vec![],
            primary_type: String::new(),
        }
    }
}

/// Topic category, a closed three-item vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Hindu,
    Muslim,
    Christian,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Hindu, Category::Muslim, Category::Christian];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Hindu => "hindu",
            Category::Muslim => "muslim",
            Category::Christian => "christian",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hindu" => Ok(Category::Hindu),
            "muslim" => Ok(Category::Muslim),
            "christian" => Ok(Category::Christian),
            other => Err(format!("unknown category '{}'", other)),
        }
    }
}

/// How a delivered notification pings the community
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotificationStyle {
    /// Ping every member
    #[default]
    Everyone,
    /// Ping members currently online
    Here,
    /// No ping
    None,
}

impl NotificationStyle {
    /// Mention prefix placed before the message body, if any
    pub fn mention_prefix(&self) -> Option<&'static str> {
        match self {
            NotificationStyle::Everyone => Some("@everyone"),
            NotificationStyle::Here => Some("@here"),
            NotificationStyle::None => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationStyle::Everyone => "everyone",
            NotificationStyle::Here => "here",
            NotificationStyle::None => "none",
        }
    }
}

impl FromStr for NotificationStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "everyone" => Ok(NotificationStyle::Everyone),
            "here" => Ok(NotificationStyle::Here),
            "none" => Ok(NotificationStyle::None),
            other => Err(format!("unknown notification style '{}'", other)),
        }
    }
}

/// Per-guild delivery preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationSettings {
    /// Explicitly bound channel; falls back to a channel by name when unset
    #[serde(default)]
    pub channel_id: Option<String>,
    /// Enabled categories
    #[serde(default = "all_categories")]
    pub categories: BTreeSet<Category>,
    /// Notification style
    #[serde(default)]
    pub mention: NotificationStyle,
    /// Only deliver major festivals
    #[serde(default = "default_major_only")]
    pub major_only: bool,
}

fn all_categories() -> BTreeSet<Category> {
    Category::ALL.into_iter().collect()
}

fn default_major_only() -> bool {
    true
}

impl Default for DestinationSettings {
    fn default() -> Self {
        Self {
            channel_id: None,
            categories: all_categories(),
            mention: NotificationStyle::default(),
            major_only: default_major_only(),
        }
    }
}

/// Kind of generated artifact held in the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheKind {
    Wish,
    Image,
}

impl CacheKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheKind::Wish => "wish",
            CacheKind::Image => "image",
        }
    }
}

/// Composite cache key: one entry per day, kind and event name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub date: Date,
    pub kind: CacheKind,
    pub name: String,
}

impl CacheKey {
    pub fn new(date: Date, kind: CacheKind, name: impl Into<String>) -> Self {
        Self {
            date,
            kind,
            name: name.into(),
        }
    }

    /// Flat string form used by file-backed stores: `2026-11-08|wish|Diwali`
    pub fn encode(&self) -> String {
        format!("{}|{}|{}", iso_date(self.date), self.kind.as_str(), self.name)
    }

    /// Inverse of [`CacheKey::encode`]
    pub fn decode(raw: &str) -> Option<Self> {
        let mut parts = raw.splitn(3, '|');
        let date = parse_iso_date(parts.next()?)?;
        let kind = match parts.next()? {
            "wish" => CacheKind::Wish,
            "image" => CacheKind::Image,
            _ => return None,
        };
        let name = parts.next()?.to_string();
        Some(Self { date, kind, name })
    }
}

/// Where a cached value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Produced by the provider and accepted
    #[default]
    Generated,
    /// Static template used after a provider failure or rejection
    Fallback,
}

/// A cached generation result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub value: String,
    #[serde(default)]
    pub origin: Origin,
}

impl CacheEntry {
    pub fn generated(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            origin: Origin::Generated,
        }
    }

    pub fn fallback(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            origin: Origin::Fallback,
        }
    }
}

/// Rich message handed to the messenger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub title: String,
    pub description: String,
    /// 24-bit RGB accent color
    pub color: u32,
    pub footer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// A community the bot has joined
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guild {
    pub id: String,
    pub name: String,
}

/// Channel kinds as far as delivery cares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    Text,
    Announcement,
    Voice,
    Category,
    Other,
}

/// A channel inside a guild
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub name: String,
    pub kind: ChannelKind,
}

impl Channel {
    /// Whether messages can be posted to this channel
    pub fn is_text_capable(&self) -> bool {
        matches!(self.kind, ChannelKind::Text | ChannelKind::Announcement)
    }
}

/// Result of a delivered message
#[derive(Debug, Clone)]
pub struct DeliveryReceipt {
    pub message_id: String,
}

/// Outcome for one event in one guild
#[derive(Debug, Clone)]
pub enum DeliveryOutcome {
    Delivered { message_id: String },
    /// Payload rendered but not sent (dry run)
    DryRun,
    Failed { error: String },
}

/// Per-event record in a run report
#[derive(Debug, Clone)]
pub struct DeliveryRecord {
    pub guild_id: String,
    pub channel_id: String,
    pub event_name: String,
    pub category: Category,
    pub outcome: DeliveryOutcome,
}

/// Summary of a daily run
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub date: Option<Date>,
    pub events_fetched: usize,
    pub guilds_seen: usize,
    pub guilds_skipped: usize,
    pub deliveries: Vec<DeliveryRecord>,
}

impl RunReport {
    pub fn delivered(&self) -> usize {
        self.deliveries
            .iter()
            .filter(|d| matches!(d.outcome, DeliveryOutcome::Delivered { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.deliveries
            .iter()
            .filter(|d| matches!(d.outcome, DeliveryOutcome::Failed { .. }))
            .count()
    }
}

/// ISO-8601 calendar date (`YYYY-MM-DD`)
pub fn iso_date(date: Date) -> String {
    let format = format_description!("[year]-[month]-[day]");
    date.format(&format).unwrap_or_else(|_| date.to_string())
}

/// Parse an ISO-8601 calendar date
pub fn parse_iso_date(raw: &str) -> Option<Date> {
    let format = format_description!("[year]-[month]-[day]");
    Date::parse(raw, &format).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn test_default_settings_enable_everything() {
        let settings = DestinationSettings::default();
        assert_eq!(settings.channel_id, None);
        assert_eq!(settings.categories.len(), 3);
        assert_eq!(settings.mention, NotificationStyle::Everyone);
        assert!(settings.major_only);
    }

    #[test]
    fn test_settings_missing_fields_take_defaults() {
        let settings: DestinationSettings =
            serde_json::from_str(r#"{"channel_id": "42", "major_only": false}"#).unwrap();
        assert_eq!(settings.channel_id.as_deref(), Some("42"));
        assert_eq!(settings.categories.len(), 3);
        assert!(!settings.major_only);
    }

    #[test]
    fn test_settings_reject_unknown_category() {
        let result: Result<DestinationSettings, _> =
            serde_json::from_str(r#"{"categories": ["hindu", "jedi"]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_cache_key_encoding() {
        let key = CacheKey::new(date!(2026 - 11 - 08), CacheKind::Wish, "Diwali|Deepavali");
        let encoded = key.encode();
        assert_eq!(encoded, "2026-11-08|wish|Diwali|Deepavali");
        assert_eq!(CacheKey::decode(&encoded), Some(key));
        assert_eq!(CacheKey::decode("garbage"), None);
    }

    #[test]
    fn test_mention_prefix() {
        assert_eq!(NotificationStyle::Everyone.mention_prefix(), Some("@everyone"));
        assert_eq!(NotificationStyle::Here.mention_prefix(), Some("@here"));
        assert_eq!(NotificationStyle::None.mention_prefix(), None);
    }

    #[test]
    fn test_cache_entry_without_origin_is_generated() {
        let entry: CacheEntry = serde_json::from_str(r#"{"value": "hello"}"#).unwrap();
        assert_eq!(entry.origin, Origin::Generated);
    }
}
