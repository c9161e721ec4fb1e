//! Preview command - show what today's run would post, without generating or sending

use anyhow::Result;
use festival_notifier_adapters::{images::DisabledImageSearch, llm::StubTextGenerator};
use festival_notifier_domain::{ImageSearch, Messenger, TextGenerator, usecases::GuildPreview};
use std::path::PathBuf;
use std::sync::Arc;

use crate::args::PreviewArgs;
use crate::commands::run::{build_daily_run, build_discord};
use crate::config::AppConfig;

pub async fn execute(args: PreviewArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    // Preview never calls the text or image providers
    let messenger: Arc<dyn Messenger> = Arc::new(build_discord(&config)?);
    let generator: Arc<dyn TextGenerator> = Arc::new(StubTextGenerator::festive());
    let images: Arc<dyn ImageSearch> = Arc::new(DisabledImageSearch);
    let daily_run = build_daily_run(&config, messenger, generator, images, true).await?;

    let previews = daily_run.preview().await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&previews_json(&previews))?);
    } else {
        print_previews(&previews);
    }

    Ok(())
}

fn previews_json(previews: &[GuildPreview]) -> serde_json::Value {
    let guilds: Vec<_> = previews
        .iter()
        .map(|p| {
            serde_json::json!({
                "guild_id": p.guild.id,
                "guild_name": p.guild.name,
                "channel": p.channel.as_ref().map(|c| serde_json::json!({
                    "id": c.id,
                    "name": c.name,
                })),
                "festivals": p.festivals.iter().map(|(event, category)| serde_json::json!({
                    "name": event.name,
                    "category": category.as_str(),
                })).collect::<Vec<_>>(),
            })
        })
        .collect();

    serde_json::json!({ "guilds": guilds })
}

fn print_previews(previews: &[GuildPreview]) {
    if previews.is_empty() {
        println!("No guilds found.");
        return;
    }

    for preview in previews {
        let channel = preview
            .channel
            .as_ref()
            .map(|c| format!("#{}", c.name))
            .unwrap_or_else(|| "(no channel)".to_string());
        println!("{} ({}) -> {}", preview.guild.name, preview.guild.id, channel);

        if preview.festivals.is_empty() {
            println!("  nothing to announce today");
        }
        for (event, category) in &preview.festivals {
            println!("  [{}] {}", category, event.name);
        }
    }
}

/// Log a preview at info level, used at startup
pub(crate) fn log_previews(previews: &[GuildPreview]) {
    for preview in previews {
        let festivals: Vec<&str> = preview
            .festivals
            .iter()
            .map(|(event, _)| event.name.as_str())
            .collect();

        tracing::info!(
            guild_id = %preview.guild.id,
            guild = %preview.guild.name,
            channel = ?preview.channel.as_ref().map(|c| c.name.as_str()),
            festivals = ?festivals,
            "Preview"
        );
    }
}
