//! Run command - scheduled daily delivery loop

use anyhow::{Context, Result, bail};
use chrono::Utc;
use festival_notifier_adapters::{
    discord::DiscordMessenger,
    events::CalendarificEventSource,
    images::{DisabledImageSearch, PexelsImageSearch, UnsplashImageSearch},
    llm::{GeminiTextGenerator, LlmConfig, OpenAiTextGenerator, StubTextGenerator},
    outbox::{OutboxMessenger, OutboxWriter},
    schedule::{DailySchedule, ZonedClock, parse_timezone},
    store::{JsonFileGenerationCache, JsonFileSettingsStore},
};
use festival_notifier_domain::{
    Clock, DeliveryOutcome, EventSource, GenerationCache, ImageSearch, Messenger, RunReport,
    SettingsStore, TextGenerator, iso_date,
    usecases::{DailyRun, DailyRunConfig, WishConfig},
};
use secrecy::SecretString;
use std::path::PathBuf;
use std::sync::Arc;

use crate::args::RunArgs;
use crate::commands::preview::log_previews;
use crate::config::AppConfig;

/// Orchestrator wired with trait objects
pub(crate) type AppDailyRun = DailyRun<
    dyn EventSource,
    dyn TextGenerator,
    dyn ImageSearch,
    dyn Messenger,
    dyn SettingsStore,
    dyn GenerationCache,
    dyn Clock,
>;

pub async fn execute(args: RunArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    let mut dry_run = args.dry_run || config.general.dry_run;
    if args.outbox.is_some() && dry_run {
        tracing::info!("--outbox overrides dry-run");
        dry_run = false;
    }

    tracing::info!(
        dry_run = dry_run,
        once = args.once,
        outbox = ?args.outbox,
        country = %config.general.country,
        timezone = %config.general.timezone,
        schedule = %config.general.schedule,
        "Starting festival-notifier run"
    );

    let tz = parse_timezone(&config.general.timezone)?;
    let schedule = DailySchedule::new(&config.general.schedule, tz)?;

    let discord: Arc<dyn Messenger> = Arc::new(build_discord(&config)?);
    let messenger: Arc<dyn Messenger> = match &args.outbox {
        Some(path) => {
            let writer = OutboxWriter::new(path.clone())
                .await
                .context("Failed to initialize outbox writer")?;
            tracing::info!(outbox = %path.display(), "Writing messages to outbox");
            Arc::new(OutboxMessenger::new(writer, discord))
        }
        None => discord,
    };

    let generator: Arc<dyn TextGenerator> = Arc::from(build_text_generator(&config)?);
    let images: Arc<dyn ImageSearch> = Arc::from(build_image_search(&config)?);
    let daily_run = build_daily_run(&config, messenger, generator, images, dry_run).await?;

    if config.general.preview_on_start {
        match daily_run.preview().await {
            Ok(previews) => log_previews(&previews),
            Err(e) => tracing::warn!(error = %e, "Startup preview failed"),
        }
    }

    if args.once {
        let report = daily_run.run_once().await?;
        log_report(&report);
        return Ok(());
    }

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        tracing::info!("Shutdown signal received");
    };
    tokio::pin!(shutdown);

    loop {
        let Some((next, wait)) = schedule.until_next(Utc::now()) else {
            bail!(
                "Schedule '{}' has no upcoming run",
                schedule.expression()
            );
        };
        tracing::info!(next_run = %next, wait_secs = wait.as_secs(), "Waiting for next run");

        tokio::select! {
            _ = tokio::time::sleep(wait) => {
                match daily_run.run_once().await {
                    Ok(report) => log_report(&report),
                    Err(e) => tracing::error!(error = %e, "Daily run failed"),
                }
            }
            _ = &mut shutdown => {
                tracing::info!("Shutting down gracefully");
                break;
            }
        }
    }

    tracing::info!("festival-notifier run completed");
    Ok(())
}

/// Wire the orchestrator from configuration and the given providers
pub(crate) async fn build_daily_run(
    config: &AppConfig,
    messenger: Arc<dyn Messenger>,
    generator: Arc<dyn TextGenerator>,
    images: Arc<dyn ImageSearch>,
    dry_run: bool,
) -> Result<AppDailyRun> {
    let tz = parse_timezone(&config.general.timezone)?;
    let clock: Arc<dyn Clock> = Arc::new(ZonedClock::new(tz));

    let events: Arc<dyn EventSource> = Arc::new(build_event_source(config)?);

    let settings: Arc<dyn SettingsStore> = Arc::new(
        JsonFileSettingsStore::open(&config.general.settings_path)
            .await
            .with_context(|| {
                format!(
                    "Failed to open settings store: {}",
                    config.general.settings_path.display()
                )
            })?,
    );

    let cache: Arc<dyn GenerationCache> = Arc::new(
        JsonFileGenerationCache::open(&config.general.cache_path, config.cache.max_entries)
            .await
            .with_context(|| {
                format!(
                    "Failed to open generation cache: {}",
                    config.general.cache_path.display()
                )
            })?,
    );

    let run_config = DailyRunConfig {
        country: config.general.country.clone(),
        dry_run,
        cache_retention_days: config.cache.retention_days,
        image_per_page: config.images.per_page,
        wish_config: WishConfig {
            min_chars: config.wishes.min_chars,
            pin_fallback: config.wishes.pin_fallback,
        },
    };

    Ok(DailyRun::new(
        events, generator, images, messenger, settings, cache, clock, run_config,
    ))
}

pub(crate) fn build_event_source(config: &AppConfig) -> Result<CalendarificEventSource> {
    let api_key = load_api_key(&config.events.api_key_env, "calendarific")?;
    Ok(CalendarificEventSource::with_base_url(
        api_key,
        config.events.base_url.clone(),
    ))
}

pub(crate) fn build_discord(config: &AppConfig) -> Result<DiscordMessenger> {
    let token = load_api_key(&config.discord.token_env, "discord")?;
    Ok(DiscordMessenger::with_base_url(
        token,
        config.discord.base_url.clone(),
    ))
}

pub(crate) fn build_text_generator(config: &AppConfig) -> Result<Box<dyn TextGenerator>> {
    let llm_config = LlmConfig {
        model: config.llm.model.clone(),
        temperature: config.llm.temperature,
        max_output_tokens: config.llm.max_output_tokens,
        timeout_secs: config.llm.timeout_secs,
    };

    match config.llm.provider.as_str() {
        "gemini" => {
            let api_key = load_api_key(&config.llm.gemini.api_key_env, "gemini")?;
            Ok(Box::new(GeminiTextGenerator::with_base_url(
                api_key,
                config.llm.gemini.base_url.clone(),
                llm_config,
            )))
        }
        "openai" => {
            let api_key = load_api_key(&config.llm.openai.api_key_env, "openai")?;
            Ok(Box::new(OpenAiTextGenerator::with_base_url(
                api_key,
                config.llm.openai.base_url.clone(),
                llm_config,
            )))
        }
        "stub" => Ok(Box::new(StubTextGenerator::festive())),
        other => bail!("Unknown LLM provider: {}", other),
    }
}

pub(crate) fn build_image_search(config: &AppConfig) -> Result<Box<dyn ImageSearch>> {
    let images = &config.images;

    match images.provider.as_str() {
        "pexels" => {
            let api_key = load_api_key(&images.pexels.api_key_env, "pexels")?;
            Ok(Box::new(PexelsImageSearch::with_base_url(
                api_key,
                images.pexels.base_url.clone(),
                images.timeout_secs,
            )))
        }
        "unsplash" => {
            let access_key = load_api_key(&images.unsplash.access_key_env, "unsplash")?;
            Ok(Box::new(UnsplashImageSearch::with_base_url(
                access_key,
                images.unsplash.base_url.clone(),
                images.timeout_secs,
            )))
        }
        "none" => Ok(Box::new(DisabledImageSearch)),
        other => bail!("Unknown image provider: {}", other),
    }
}

pub(crate) fn load_api_key(env_var: &str, provider: &str) -> Result<SecretString> {
    if env_var.trim().is_empty() {
        bail!("No API key env var configured for provider {}", provider);
    }

    let key = std::env::var(env_var).with_context(|| {
        format!(
            "Missing API key env var {} for provider {}",
            env_var, provider
        )
    })?;

    if key.trim().is_empty() {
        bail!(
            "API key env var {} is empty for provider {}",
            env_var,
            provider
        );
    }

    Ok(SecretString::new(key.into()))
}

fn log_report(report: &RunReport) {
    for delivery in &report.deliveries {
        match &delivery.outcome {
            DeliveryOutcome::Delivered { message_id } => tracing::debug!(
                guild_id = %delivery.guild_id,
                event = %delivery.event_name,
                category = %delivery.category,
                message_id = %message_id,
                "Delivered"
            ),
            DeliveryOutcome::DryRun => tracing::debug!(
                guild_id = %delivery.guild_id,
                event = %delivery.event_name,
                "Rendered (dry run)"
            ),
            DeliveryOutcome::Failed { error } => tracing::warn!(
                guild_id = %delivery.guild_id,
                channel_id = %delivery.channel_id,
                event = %delivery.event_name,
                error = %error,
                "Not delivered"
            ),
        }
    }

    tracing::info!(
        date = ?report.date.map(iso_date),
        events = report.events_fetched,
        guilds = report.guilds_seen,
        delivered = report.delivered(),
        failed = report.failed(),
        "Run summary"
    );
}
