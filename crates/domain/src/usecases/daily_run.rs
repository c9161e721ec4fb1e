//! Daily run use case - fetches today's festivals and delivers wishes to every guild

use std::sync::Arc;
use time::Duration;
use uuid::Uuid;

use crate::{
    model::{
        Category, Channel, DeliveryOutcome, DeliveryRecord, FestivalEvent, Guild, RunReport,
        iso_date,
    },
    policy,
    ports::{
        Clock, EventSource, GenerationCache, ImageSearch, Messenger, SettingsStore, TextGenerator,
    },
    usecases::{
        images::{DEFAULT_PER_PAGE, FestivalImages},
        render::render_notification,
        wishes::{WishConfig, WishWriter},
    },
};

/// Channel names tried, in order, when no channel is configured
pub const FALLBACK_CHANNEL_NAMES: &[&str] = &["announcements", "general"];

/// Configuration for the daily run
#[derive(Debug, Clone)]
pub struct DailyRunConfig {
    /// ISO 3166 alpha-2 country passed to the event source
    pub country: String,
    /// Render and log payloads instead of sending them
    pub dry_run: bool,
    /// Cache entries older than this many days are pruned at the start of a run
    pub cache_retention_days: u32,
    /// Candidates requested from the image provider
    pub image_per_page: u32,
    pub wish_config: WishConfig,
}

impl Default for DailyRunConfig {
    fn default() -> Self {
        Self {
            country: "IN".to_string(),
            dry_run: false,
            cache_retention_days: 7,
            image_per_page: DEFAULT_PER_PAGE,
            wish_config: WishConfig::default(),
        }
    }
}

/// Festivals selected for one guild, as shown by a preview
#[derive(Debug, Clone)]
pub struct GuildPreview {
    pub guild: Guild,
    pub channel: Option<Channel>,
    pub festivals: Vec<(FestivalEvent, Category)>,
}

/// Daily orchestrator
#[derive(Clone)]
pub struct DailyRun<E, G, I, M, St, Ca, Cl>
where
    E: EventSource + ?Sized,
    G: TextGenerator + ?Sized,
    I: ImageSearch + ?Sized,
    M: Messenger + ?Sized,
    St: SettingsStore + ?Sized,
    Ca: GenerationCache + ?Sized,
    Cl: Clock + ?Sized,
{
    event_source: Arc<E>,
    generator: Arc<G>,
    image_search: Arc<I>,
    messenger: Arc<M>,
    settings: Arc<St>,
    cache: Arc<Ca>,
    clock: Arc<Cl>,
    config: DailyRunConfig,
}

impl<E, G, I, M, St, Ca, Cl> DailyRun<E, G, I, M, St, Ca, Cl>
where
    E: EventSource + ?Sized,
    G: TextGenerator + ?Sized,
    I: ImageSearch + ?Sized,
    M: Messenger + ?Sized,
    St: SettingsStore + ?Sized,
    Ca: GenerationCache + ?Sized,
    Cl: Clock + ?Sized,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        event_source: Arc<E>,
        generator: Arc<G>,
        image_search: Arc<I>,
        messenger: Arc<M>,
        settings: Arc<St>,
        cache: Arc<Ca>,
        clock: Arc<Cl>,
        config: DailyRunConfig,
    ) -> Self {
        Self {
            event_source,
            generator,
            image_search,
            messenger,
            settings,
            cache,
            clock,
            config,
        }
    }

    /// Run one full pass: every guild, every selected festival
    pub async fn run_once(&self) -> Result<RunReport, DailyRunError> {
        let run_id = Uuid::new_v4();
        let now = self.clock.now();
        let today = now.date();

        tracing::info!(
            run_id = %run_id,
            date = %iso_date(today),
            country = %self.config.country,
            dry_run = self.config.dry_run,
            "Starting daily run"
        );

        let oldest_kept = today - Duration::days(i64::from(self.config.cache_retention_days));
        match self.cache.prune(oldest_kept).await {
            Ok(0) => {}
            Ok(removed) => tracing::info!(removed = removed, "Pruned generation cache"),
            Err(e) => tracing::warn!(error = %e, "Failed to prune generation cache"),
        }

        let events = self.fetch_events(today).await;
        let mut report = RunReport {
            date: Some(today),
            events_fetched: events.len(),
            ..Default::default()
        };

        let guilds = self
            .messenger
            .guilds()
            .await
            .map_err(|e| DailyRunError::Messenger(e.to_string()))?;

        let wishes = WishWriter::new(
            self.generator.as_ref(),
            self.cache.as_ref(),
            self.config.wish_config.clone(),
        );
        let images = FestivalImages::new(self.image_search.as_ref(), self.cache.as_ref())
            .with_per_page(self.config.image_per_page);

        for guild in guilds {
            report.guilds_seen += 1;
            let settings = self.settings.get(&guild.id).await;
            let festivals = policy::select_for(&events, &settings);
            if festivals.is_empty() {
                tracing::debug!(guild_id = %guild.id, "No festivals for guild today");
                report.guilds_skipped += 1;
                continue;
            }

            let Some(channel) = self.resolve_channel(&guild, settings.channel_id.as_deref()).await
            else {
                tracing::warn!(guild_id = %guild.id, guild = %guild.name, "No deliverable channel");
                report.guilds_skipped += 1;
                continue;
            };

            let mention = settings.mention.mention_prefix();

            for (event, category) in festivals {
                let wish = wishes
                    .make_wish_text(today, &event.name, Some(category))
                    .await;
                let image_url = images
                    .festival_image(today, &event.name, Some(category))
                    .await;
                let payload =
                    render_notification(&event.name, Some(category), &wish.text, &image_url, now);

                let outcome = if self.config.dry_run {
                    tracing::info!(
                        guild_id = %guild.id,
                        channel_id = %channel.id,
                        event = %event.name,
                        title = %payload.title,
                        mention = ?mention,
                        "[DRY RUN] Would deliver"
                    );
                    DeliveryOutcome::DryRun
                } else {
                    match self.messenger.send(&channel.id, mention, &payload).await {
                        Ok(receipt) => {
                            tracing::info!(
                                guild_id = %guild.id,
                                channel_id = %channel.id,
                                event = %event.name,
                                message_id = %receipt.message_id,
                                "Delivered festival wishes"
                            );
                            DeliveryOutcome::Delivered {
                                message_id: receipt.message_id,
                            }
                        }
                        Err(e) => {
                            tracing::error!(
                                guild_id = %guild.id,
                                channel_id = %channel.id,
                                event = %event.name,
                                error = %e,
                                "Delivery failed"
                            );
                            DeliveryOutcome::Failed {
                                error: e.to_string(),
                            }
                        }
                    }
                };

                report.deliveries.push(DeliveryRecord {
                    guild_id: guild.id.clone(),
                    channel_id: channel.id.clone(),
                    event_name: event.name.clone(),
                    category,
                    outcome,
                });
            }

            if let Err(e) = self.settings.set(&guild.id, &settings).await {
                tracing::error!(guild_id = %guild.id, error = %e, "Failed to persist settings");
            }
        }

        tracing::info!(
            run_id = %run_id,
            events = report.events_fetched,
            guilds = report.guilds_seen,
            skipped = report.guilds_skipped,
            delivered = report.delivered(),
            failed = report.failed(),
            "Daily run complete"
        );

        Ok(report)
    }

    /// Which festivals each guild would receive today, without generating or sending
    pub async fn preview(&self) -> Result<Vec<GuildPreview>, DailyRunError> {
        let today = self.clock.now().date();
        let events = self.fetch_events(today).await;

        let guilds = self
            .messenger
            .guilds()
            .await
            .map_err(|e| DailyRunError::Messenger(e.to_string()))?;

        let mut previews = Vec::with_capacity(guilds.len());
        for guild in guilds {
            let settings = self.settings.get(&guild.id).await;
            let festivals = policy::select_for(&events, &settings);
            let channel = if festivals.is_empty() {
                None
            } else {
                self.resolve_channel(&guild, settings.channel_id.as_deref())
                    .await
            };

            tracing::debug!(
                guild_id = %guild.id,
                channel = ?channel.as_ref().map(|c| &c.name),
                festivals = ?festivals.iter().map(|(e, c)| format!("{} ({})", e.name, c)).collect::<Vec<_>>(),
                "Guild preview"
            );

            previews.push(GuildPreview {
                guild,
                channel,
                festivals,
            });
        }

        Ok(previews)
    }

    /// Today's events; provider failures are logged and treated as an empty day
    async fn fetch_events(&self, today: time::Date) -> Vec<FestivalEvent> {
        match self
            .event_source
            .events_on(&self.config.country, today)
            .await
        {
            Ok(events) => {
                tracing::info!(
                    count = events.len(),
                    events = ?events.iter().map(|e| &e.name).collect::<Vec<_>>(),
                    "Fetched today's events"
                );
                events
            }
            Err(e) => {
                tracing::error!(error = %e, "Event source failed, treating today as empty");
                vec![]
            }
        }
    }

    /// Configured channel if usable, else the first fallback channel by name
    async fn resolve_channel(&self, guild: &Guild, configured: Option<&str>) -> Option<Channel> {
        let channels = match self.messenger.channels(&guild.id).await {
            Ok(channels) => channels,
            Err(e) => {
                tracing::error!(guild_id = %guild.id, error = %e, "Failed to list channels");
                return None;
            }
        };

        pick_channel(&channels, configured).cloned()
    }
}

/// Channel selection rule, separated for testing
pub fn pick_channel<'a>(channels: &'a [Channel], configured: Option<&str>) -> Option<&'a Channel> {
    if let Some(id) = configured {
        if let Some(channel) = channels
            .iter()
            .find(|c| c.id == id && c.is_text_capable())
        {
            return Some(channel);
        }
        tracing::warn!(channel_id = %id, "Configured channel missing or not text-capable");
    }

    channels.iter().find(|c| {
        c.is_text_capable() && FALLBACK_CHANNEL_NAMES.contains(&c.name.as_str())
    })
}

/// Errors from the daily run
#[derive(Debug, thiserror::Error)]
pub enum DailyRunError {
    #[error("Messenger error: {0}")]
    Messenger(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        CacheEntry, CacheKey, ChannelKind, DeliveryReceipt, DestinationSettings,
        NotificationPayload, NotificationStyle,
    };
    use crate::ports::{
        EventSourceError, GenerationError, ImageCandidate, ImageSearchError, MessengerError,
        StoreError,
    };
    use crate::usecases::render::HINDU_COLOR;
    use async_trait::async_trait;
    use std::collections::{BTreeSet, HashMap};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use time::macros::datetime;
    use time::{Date, OffsetDateTime};

    struct FakeEventSource {
        result: Mutex<Option<Result<Vec<FestivalEvent>, EventSourceError>>>,
        calls: AtomicUsize,
    }

    impl FakeEventSource {
        fn with_events(events: Vec<FestivalEvent>) -> Self {
            Self {
                result: Mutex::new(Some(Ok(events))),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                result: Mutex::new(Some(Err(EventSourceError::Network("down".to_string())))),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl EventSource for FakeEventSource {
        async fn events_on(
            &self,
            _country: &str,
            _date: Date,
        ) -> Result<Vec<FestivalEvent>, EventSourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.lock().unwrap().take().unwrap_or(Ok(vec![]))
        }
    }

    struct FakeGenerator {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TextGenerator for FakeGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok("🪔 Wishing everyone a radiant festival full of light. ".repeat(6))
        }
    }

    struct FakeImageSearch {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ImageSearch for FakeImageSearch {
        async fn search(
            &self,
            _query: &str,
            _per_page: u32,
        ) -> Result<Vec<ImageCandidate>, ImageSearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![ImageCandidate {
                width: 1600,
                height: 900,
                url: "https://img/festival.jpg".to_string(),
            }])
        }
    }

    struct Sent {
        channel_id: String,
        mention: Option<String>,
        payload: NotificationPayload,
    }

    struct FakeMessenger {
        guilds: Vec<Guild>,
        channels: HashMap<String, Vec<Channel>>,
        fail_first_send: bool,
        sent: Mutex<Vec<Sent>>,
        attempts: AtomicUsize,
        channel_calls: AtomicUsize,
    }

    impl FakeMessenger {
        fn new(guilds: Vec<(Guild, Vec<Channel>)>) -> Self {
            let channels = guilds
                .iter()
                .map(|(g, c)| (g.id.clone(), c.clone()))
                .collect();
            Self {
                guilds: guilds.into_iter().map(|(g, _)| g).collect(),
                channels,
                fail_first_send: false,
                sent: Mutex::new(vec![]),
                attempts: AtomicUsize::new(0),
                channel_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Messenger for FakeMessenger {
        async fn guilds(&self) -> Result<Vec<Guild>, MessengerError> {
            Ok(self.guilds.clone())
        }

        async fn channels(&self, guild_id: &str) -> Result<Vec<Channel>, MessengerError> {
            self.channel_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.channels.get(guild_id).cloned().unwrap_or_default())
        }

        async fn send(
            &self,
            channel_id: &str,
            mention: Option<&str>,
            payload: &NotificationPayload,
        ) -> Result<DeliveryReceipt, MessengerError> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
            if self.fail_first_send && attempt == 0 {
                return Err(MessengerError::Forbidden("missing send permission".to_string()));
            }
            self.sent.lock().unwrap().push(Sent {
                channel_id: channel_id.to_string(),
                mention: mention.map(String::from),
                payload: payload.clone(),
            });
            Ok(DeliveryReceipt {
                message_id: format!("msg-{}", attempt),
            })
        }
    }

    #[derive(Default)]
    struct FakeSettings {
        settings: Mutex<HashMap<String, DestinationSettings>>,
        writes: Mutex<Vec<String>>,
    }

    impl FakeSettings {
        fn with(guild_id: &str, settings: DestinationSettings) -> Self {
            let store = Self::default();
            store
                .settings
                .lock()
                .unwrap()
                .insert(guild_id.to_string(), settings);
            store
        }
    }

    #[async_trait]
    impl SettingsStore for FakeSettings {
        async fn get(&self, guild_id: &str) -> DestinationSettings {
            self.settings
                .lock()
                .unwrap()
                .get(guild_id)
                .cloned()
                .unwrap_or_default()
        }

        async fn set(
            &self,
            guild_id: &str,
            settings: &DestinationSettings,
        ) -> Result<(), StoreError> {
            self.writes.lock().unwrap().push(guild_id.to_string());
            self.settings
                .lock()
                .unwrap()
                .insert(guild_id.to_string(), settings.clone());
            Ok(())
        }

        async fn flush(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeCache {
        entries: Mutex<HashMap<String, CacheEntry>>,
        pruned_before: Mutex<Option<Date>>,
    }

    #[async_trait]
    impl GenerationCache for FakeCache {
        async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, StoreError> {
            Ok(self.entries.lock().unwrap().get(&key.encode()).cloned())
        }

        async fn put(&self, key: &CacheKey, entry: CacheEntry) -> Result<(), StoreError> {
            self.entries.lock().unwrap().insert(key.encode(), entry);
            Ok(())
        }

        async fn prune(&self, oldest_kept: Date) -> Result<usize, StoreError> {
            *self.pruned_before.lock().unwrap() = Some(oldest_kept);
            Ok(0)
        }
    }

    struct FakeClock {
        time: OffsetDateTime,
    }

    impl Clock for FakeClock {
        fn now(&self) -> OffsetDateTime {
            self.time
        }
    }

    fn diwali() -> FestivalEvent {
        FestivalEvent {
            name: "Diwali".to_string(),
            description: "Festival of lights".to_string(),
            type_tags: vec!["Gazetted Holiday".to_string()],
            primary_type: "Gazetted Holiday".to_string(),
        }
    }

    fn guild(id: &str) -> Guild {
        Guild {
            id: id.to_string(),
            name: format!("Guild {}", id),
        }
    }

    fn channel(id: &str, name: &str, kind: ChannelKind) -> Channel {
        Channel {
            id: id.to_string(),
            name: name.to_string(),
            kind,
        }
    }

    struct Harness {
        events: Arc<FakeEventSource>,
        generator: Arc<FakeGenerator>,
        images: Arc<FakeImageSearch>,
        messenger: Arc<FakeMessenger>,
        settings: Arc<FakeSettings>,
        cache: Arc<FakeCache>,
    }

    impl Harness {
        fn new(events: FakeEventSource, messenger: FakeMessenger, settings: FakeSettings) -> Self {
            Self {
                events: Arc::new(events),
                generator: Arc::new(FakeGenerator {
                    calls: AtomicUsize::new(0),
                }),
                images: Arc::new(FakeImageSearch {
                    calls: AtomicUsize::new(0),
                }),
                messenger: Arc::new(messenger),
                settings: Arc::new(settings),
                cache: Arc::new(FakeCache::default()),
            }
        }

        fn run(
            &self,
            config: DailyRunConfig,
        ) -> DailyRun<
            FakeEventSource,
            FakeGenerator,
            FakeImageSearch,
            FakeMessenger,
            FakeSettings,
            FakeCache,
            FakeClock,
        > {
            DailyRun::new(
                Arc::clone(&self.events),
                Arc::clone(&self.generator),
                Arc::clone(&self.images),
                Arc::clone(&self.messenger),
                Arc::clone(&self.settings),
                Arc::clone(&self.cache),
                Arc::new(FakeClock {
                    time: datetime!(2026-11-08 09:00 +05:30),
                }),
                config,
            )
        }
    }

    #[tokio::test]
    async fn test_diwali_delivered_with_everyone_mention() {
        let messenger = FakeMessenger::new(vec![(
            guild("g1"),
            vec![
                channel("1", "voice", ChannelKind::Voice),
                channel("2", "general", ChannelKind::Text),
            ],
        )]);
        let settings = FakeSettings::with(
            "g1",
            DestinationSettings {
                categories: [Category::Hindu].into_iter().collect::<BTreeSet<_>>(),
                mention: NotificationStyle::Everyone,
                major_only: true,
                channel_id: None,
            },
        );
        let harness = Harness::new(FakeEventSource::with_events(vec![diwali()]), messenger, settings);

        let report = harness.run(DailyRunConfig::default()).run_once().await.unwrap();

        assert_eq!(report.delivered(), 1);
        let sent = harness.messenger.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].channel_id, "2");
        assert_eq!(sent[0].mention.as_deref(), Some("@everyone"));
        assert_eq!(sent[0].payload.color, HINDU_COLOR);
        assert_eq!(sent[0].payload.title, "Diwali — Wishes");
        assert!(sent[0].payload.description.chars().count() >= 220);
        assert_eq!(
            sent[0].payload.image_url.as_deref(),
            Some("https://img/festival.jpg")
        );
        assert_eq!(*harness.settings.writes.lock().unwrap(), vec!["g1".to_string()]);
    }

    #[tokio::test]
    async fn test_events_fetched_once_and_generation_shared_across_guilds() {
        let messenger = FakeMessenger::new(vec![
            (guild("g1"), vec![channel("10", "announcements", ChannelKind::Announcement)]),
            (guild("g2"), vec![channel("20", "general", ChannelKind::Text)]),
        ]);
        let harness = Harness::new(
            FakeEventSource::with_events(vec![diwali()]),
            messenger,
            FakeSettings::default(),
        );

        let report = harness.run(DailyRunConfig::default()).run_once().await.unwrap();

        assert_eq!(report.delivered(), 2);
        assert_eq!(harness.events.calls.load(Ordering::SeqCst), 1);
        assert_eq!(harness.generator.calls.load(Ordering::SeqCst), 1);
        assert_eq!(harness.images.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_guild_without_channel_gets_nothing() {
        let messenger = FakeMessenger::new(vec![(
            guild("g1"),
            vec![channel("1", "random", ChannelKind::Text)],
        )]);
        let harness = Harness::new(
            FakeEventSource::with_events(vec![diwali()]),
            messenger,
            FakeSettings::default(),
        );

        let report = harness.run(DailyRunConfig::default()).run_once().await.unwrap();

        assert_eq!(report.guilds_skipped, 1);
        assert!(harness.messenger.sent.lock().unwrap().is_empty());
        assert_eq!(harness.generator.calls.load(Ordering::SeqCst), 0);
        assert_eq!(harness.images.calls.load(Ordering::SeqCst), 0);
        assert!(harness.settings.writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_guild_without_festivals_is_skipped_without_io() {
        let messenger = FakeMessenger::new(vec![(
            guild("g1"),
            vec![channel("2", "general", ChannelKind::Text)],
        )]);
        let harness = Harness::new(
            FakeEventSource::with_events(vec![]),
            messenger,
            FakeSettings::default(),
        );

        let report = harness.run(DailyRunConfig::default()).run_once().await.unwrap();

        assert_eq!(report.guilds_skipped, 1);
        assert!(harness.settings.writes.lock().unwrap().is_empty());
        assert!(harness.messenger.sent.lock().unwrap().is_empty());
        assert_eq!(harness.messenger.channel_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_configured_channel_wins_over_fallback() {
        let messenger = FakeMessenger::new(vec![(
            guild("g1"),
            vec![
                channel("1", "general", ChannelKind::Text),
                channel("7", "festivals", ChannelKind::Text),
            ],
        )]);
        let settings = FakeSettings::with(
            "g1",
            DestinationSettings {
                channel_id: Some("7".to_string()),
                mention: NotificationStyle::None,
                ..Default::default()
            },
        );
        let harness = Harness::new(FakeEventSource::with_events(vec![diwali()]), messenger, settings);

        harness.run(DailyRunConfig::default()).run_once().await.unwrap();

        let sent = harness.messenger.sent.lock().unwrap();
        assert_eq!(sent[0].channel_id, "7");
        assert_eq!(sent[0].mention, None);
    }

    #[tokio::test]
    async fn test_delivery_failure_does_not_stop_other_events() {
        let christmas = FestivalEvent {
            name: "Christmas".to_string(),
            description: String::new(),
            type_tags: vec!["Gazetted Holiday".to_string()],
            primary_type: "Christian".to_string(),
        };
        let mut messenger = FakeMessenger::new(vec![(
            guild("g1"),
            vec![channel("2", "general", ChannelKind::Text)],
        )]);
        messenger.fail_first_send = true;
        let harness = Harness::new(
            FakeEventSource::with_events(vec![diwali(), christmas]),
            messenger,
            FakeSettings::default(),
        );

        let report = harness.run(DailyRunConfig::default()).run_once().await.unwrap();

        assert_eq!(report.failed(), 1);
        assert_eq!(report.delivered(), 1);
        assert_eq!(harness.messenger.sent.lock().unwrap()[0].payload.title, "Christmas — Wishes");
    }

    #[tokio::test]
    async fn test_event_source_failure_sends_nothing() {
        let messenger = FakeMessenger::new(vec![(
            guild("g1"),
            vec![channel("2", "general", ChannelKind::Text)],
        )]);
        let harness = Harness::new(FakeEventSource::failing(), messenger, FakeSettings::default());

        let report = harness.run(DailyRunConfig::default()).run_once().await.unwrap();

        assert_eq!(report.events_fetched, 0);
        assert_eq!(report.guilds_skipped, 1);
        assert!(harness.messenger.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dry_run_renders_without_sending() {
        let messenger = FakeMessenger::new(vec![(
            guild("g1"),
            vec![channel("2", "general", ChannelKind::Text)],
        )]);
        let harness = Harness::new(
            FakeEventSource::with_events(vec![diwali()]),
            messenger,
            FakeSettings::default(),
        );

        let report = harness
            .run(DailyRunConfig {
                dry_run: true,
                ..Default::default()
            })
            .run_once()
            .await
            .unwrap();

        assert!(matches!(report.deliveries[0].outcome, DeliveryOutcome::DryRun));
        assert_eq!(harness.messenger.attempts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cache_pruned_to_retention_window() {
        let messenger = FakeMessenger::new(vec![]);
        let harness = Harness::new(
            FakeEventSource::with_events(vec![]),
            messenger,
            FakeSettings::default(),
        );

        harness
            .run(DailyRunConfig {
                cache_retention_days: 3,
                ..Default::default()
            })
            .run_once()
            .await
            .unwrap();

        assert_eq!(
            *harness.cache.pruned_before.lock().unwrap(),
            Some(time::macros::date!(2026 - 11 - 05))
        );
    }

    #[tokio::test]
    async fn test_preview_does_not_generate_or_send() {
        let messenger = FakeMessenger::new(vec![(
            guild("g1"),
            vec![channel("2", "general", ChannelKind::Text)],
        )]);
        let harness = Harness::new(
            FakeEventSource::with_events(vec![diwali()]),
            messenger,
            FakeSettings::default(),
        );

        let previews = harness.run(DailyRunConfig::default()).preview().await.unwrap();

        assert_eq!(previews.len(), 1);
        assert_eq!(previews[0].festivals.len(), 1);
        assert_eq!(previews[0].channel.as_ref().map(|c| c.id.as_str()), Some("2"));
        assert_eq!(harness.generator.calls.load(Ordering::SeqCst), 0);
        assert_eq!(harness.messenger.attempts.load(Ordering::SeqCst), 0);
        assert!(harness.settings.writes.lock().unwrap().is_empty());
    }

    #[test]
    fn test_pick_channel_ignores_non_text_configured_channel() {
        let channels = vec![
            channel("1", "stage", ChannelKind::Voice),
            channel("2", "announcements", ChannelKind::Announcement),
        ];
        assert_eq!(pick_channel(&channels, Some("1")).unwrap().id, "2");
        assert_eq!(pick_channel(&channels, Some("404")).unwrap().id, "2");
        assert!(pick_channel(&channels[..1], None).is_none());
    }
}
