//! Destination command - per-guild delivery settings

use anyhow::{Context, Result, bail};
use festival_notifier_adapters::store::JsonFileSettingsStore;
use festival_notifier_domain::{
    Messenger,
    usecases::{
        CommandReply, DestinationCommand, DestinationCommands, commands::ChannelRef,
        commands::command_definitions,
    },
};
use std::path::PathBuf;

use crate::args::{DestinationArgs, DestinationCommands as Subcommand};
use crate::commands::run::build_discord;
use crate::config::AppConfig;

pub async fn execute(args: DestinationArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    let (guild, command) = match args.command {
        Subcommand::SetChannel {
            guild,
            channel,
            kind,
            name,
        } => {
            let channel = match kind {
                Some(kind) => ChannelRef {
                    name: name.unwrap_or_else(|| channel.clone()),
                    id: channel,
                    kind: kind.into(),
                },
                None => lookup_channel(&config, &guild, &channel).await?,
            };
            (guild, DestinationCommand::SetChannel(channel))
        }
        Subcommand::SetCategories { guild, categories } => {
            (guild, DestinationCommand::SetCategories(categories))
        }
        Subcommand::SetMention { guild, style } => {
            (guild, DestinationCommand::SetNotificationStyle(style))
        }
        Subcommand::SetMajorOnly { guild, enabled } => {
            (guild, DestinationCommand::SetMajorOnly(enabled))
        }
        Subcommand::Show { guild } => (guild, DestinationCommand::Show),
        Subcommand::Definitions => {
            println!("{}", serde_json::to_string_pretty(&command_definitions())?);
            return Ok(());
        }
    };

    let store = JsonFileSettingsStore::open(&config.general.settings_path)
        .await
        .with_context(|| {
            format!(
                "Failed to open settings store: {}",
                config.general.settings_path.display()
            )
        })?;

    let is_show = matches!(command, DestinationCommand::Show);
    let reply = DestinationCommands::new(&store).handle(&guild, command).await;
    report(reply, is_show)
}

/// Print the reply; a command that changed nothing is a failure unless it was `show`
fn report(reply: CommandReply, is_show: bool) -> Result<()> {
    if !reply.applied && !is_show {
        bail!("{}", reply.content);
    }
    println!("{}", reply.content);
    Ok(())
}

async fn lookup_channel(config: &AppConfig, guild_id: &str, channel_id: &str) -> Result<ChannelRef> {
    let messenger = build_discord(config)?;
    let channels = messenger
        .channels(guild_id)
        .await
        .with_context(|| format!("Failed to list channels of guild {}", guild_id))?;

    let Some(channel) = channels.into_iter().find(|c| c.id == channel_id) else {
        bail!("Channel {} not found in guild {}", channel_id, guild_id);
    };

    Ok(ChannelRef {
        id: channel.id,
        name: channel.name,
        kind: channel.kind,
    })
}
