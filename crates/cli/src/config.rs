//! Configuration loading and management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Prefix for environment overrides, e.g. `FESTIVAL_NOTIFIER__GENERAL__DRY_RUN=true`
pub const ENV_PREFIX: &str = "FESTIVAL_NOTIFIER";

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub wishes: WishesConfig,

    #[serde(default)]
    pub events: EventsConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub images: ImagesConfig,

    #[serde(default)]
    pub discord: DiscordConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_settings_path")]
    pub settings_path: PathBuf,

    #[serde(default = "default_cache_path")]
    pub cache_path: PathBuf,

    #[serde(default = "default_country")]
    pub country: String,

    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Cron expression, seconds field first
    #[serde(default = "default_schedule")]
    pub schedule: String,

    #[serde(default)]
    pub dry_run: bool,

    #[serde(default)]
    pub preview_on_start: bool,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,

    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WishesConfig {
    #[serde(default = "default_min_chars")]
    pub min_chars: usize,

    #[serde(default)]
    pub pin_fallback: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsConfig {
    #[serde(default = "default_calendarific_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_calendarific_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// gemini, openai or stub
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub gemini: GeminiConfig,

    #[serde(default)]
    pub openai: OpenAiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(default = "default_gemini_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default = "default_openai_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagesConfig {
    /// pexels, unsplash or none
    #[serde(default = "default_image_provider")]
    pub provider: String,

    #[serde(default = "default_per_page")]
    pub per_page: u32,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub pexels: PexelsConfig,

    #[serde(default)]
    pub unsplash: UnsplashConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PexelsConfig {
    #[serde(default = "default_pexels_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_pexels_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnsplashConfig {
    #[serde(default = "default_unsplash_access_key_env")]
    pub access_key_env: String,

    #[serde(default = "default_unsplash_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    #[serde(default = "default_discord_token_env")]
    pub token_env: String,

    #[serde(default = "default_discord_base_url")]
    pub base_url: String,
}

// Default value functions
fn default_settings_path() -> PathBuf {
    PathBuf::from("./settings.json")
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("./cache.json")
}

fn default_country() -> String {
    "IN".to_string()
}

fn default_timezone() -> String {
    "Asia/Kolkata".to_string()
}

fn default_schedule() -> String {
    "0 0 9 * * *".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_retention_days() -> u32 {
    7
}

fn default_max_entries() -> usize {
    festival_notifier_adapters::store::DEFAULT_MAX_ENTRIES
}

fn default_min_chars() -> usize {
    220
}

fn default_calendarific_api_key_env() -> String {
    "CALENDARIFIC_API_KEY".to_string()
}

fn default_calendarific_base_url() -> String {
    "https://calendarific.com/api/v2".to_string()
}

fn default_provider() -> String {
    "gemini".to_string()
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_temperature() -> f64 {
    0.9
}

fn default_max_output_tokens() -> u32 {
    400
}

fn default_timeout() -> u64 {
    30
}

fn default_gemini_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_openai_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_image_provider() -> String {
    "pexels".to_string()
}

fn default_per_page() -> u32 {
    10
}

fn default_pexels_api_key_env() -> String {
    "PEXELS_API_KEY".to_string()
}

fn default_pexels_base_url() -> String {
    "https://api.pexels.com/v1".to_string()
}

fn default_unsplash_access_key_env() -> String {
    "UNSPLASH_ACCESS_KEY".to_string()
}

fn default_unsplash_base_url() -> String {
    "https://api.unsplash.com".to_string()
}

fn default_discord_token_env() -> String {
    "DISCORD_BOT_TOKEN".to_string()
}

fn default_discord_base_url() -> String {
    "https://discord.com/api/v10".to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            settings_path: default_settings_path(),
            cache_path: default_cache_path(),
            country: default_country(),
            timezone: default_timezone(),
            schedule: default_schedule(),
            dry_run: false,
            preview_on_start: false,
            log_level: default_log_level(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            retention_days: default_retention_days(),
            max_entries: default_max_entries(),
        }
    }
}

impl Default for WishesConfig {
    fn default() -> Self {
        Self {
            min_chars: default_min_chars(),
            pin_fallback: false,
        }
    }
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_calendarific_api_key_env(),
            base_url: default_calendarific_base_url(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            timeout_secs: default_timeout(),
            gemini: GeminiConfig::default(),
            openai: OpenAiConfig::default(),
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_gemini_api_key_env(),
            base_url: default_gemini_base_url(),
        }
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_openai_api_key_env(),
            base_url: default_openai_base_url(),
        }
    }
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            provider: default_image_provider(),
            per_page: default_per_page(),
            timeout_secs: default_timeout(),
            pexels: PexelsConfig::default(),
            unsplash: UnsplashConfig::default(),
        }
    }
}

impl Default for PexelsConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_pexels_api_key_env(),
            base_url: default_pexels_base_url(),
        }
    }
}

impl Default for UnsplashConfig {
    fn default() -> Self {
        Self {
            access_key_env: default_unsplash_access_key_env(),
            base_url: default_unsplash_base_url(),
        }
    }
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token_env: default_discord_token_env(),
            base_url: default_discord_base_url(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Try default config path if none specified
        let default_path = PathBuf::from("./config.toml");
        let path = config_path.unwrap_or(&default_path);

        if path.exists() {
            builder = builder.add_source(config::File::from(path));
        } else if config_path.is_some() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Generate example configuration as TOML string
    pub fn example_toml() -> String {
        r#"# festival-notifier configuration
# Secrets are never stored here: each *_env key names the environment variable to read.

[general]
settings_path = "./settings.json"
cache_path = "./cache.json"
country = "IN"
timezone = "Asia/Kolkata"
# sec min hour day-of-month month day-of-week
schedule = "0 0 9 * * *"
dry_run = false
preview_on_start = false
log_level = "info"

[cache]
retention_days = 7
max_entries = 2000

[wishes]
min_chars = 220
# Keep serving a cached fallback wish for the rest of the day instead of retrying
pin_fallback = false

[events]
api_key_env = "CALENDARIFIC_API_KEY"
base_url = "https://calendarific.com/api/v2"

[llm]
provider = "gemini"  # gemini, openai, stub
model = "gemini-2.0-flash"
temperature = 0.9
max_output_tokens = 400
timeout_secs = 30

[llm.gemini]
api_key_env = "GEMINI_API_KEY"
base_url = "https://generativelanguage.googleapis.com/v1beta"

[llm.openai]
api_key_env = "OPENAI_API_KEY"
base_url = "https://api.openai.com/v1"

[images]
provider = "pexels"  # pexels, unsplash, none
per_page = 10
timeout_secs = 30

[images.pexels]
api_key_env = "PEXELS_API_KEY"
base_url = "https://api.pexels.com/v1"

[images.unsplash]
access_key_env = "UNSPLASH_ACCESS_KEY"
base_url = "https://api.unsplash.com"

[discord]
token_env = "DISCORD_BOT_TOKEN"
base_url = "https://discord.com/api/v10"
"#
        .to_string()
    }
}
