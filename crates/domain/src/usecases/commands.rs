//! Destination commands - per-guild configuration issued by community members

use serde::Serialize;
use std::collections::BTreeSet;
use std::str::FromStr;

use crate::{
    model::{Category, ChannelKind, DestinationSettings, NotificationStyle},
    ports::SettingsStore,
};

/// Channel argument as resolved by the platform
#[derive(Debug, Clone)]
pub struct ChannelRef {
    pub id: String,
    pub name: String,
    pub kind: ChannelKind,
}

/// A configuration command scoped to one guild
#[derive(Debug, Clone)]
pub enum DestinationCommand {
    SetChannel(ChannelRef),
    /// Free text, comma and/or space separated
    SetCategories(String),
    SetNotificationStyle(String),
    SetMajorOnly(bool),
    Show,
}

/// Reply shown to the invoking user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReply {
    pub content: String,
    /// Only visible to the invoking user
    pub ephemeral: bool,
    /// Whether settings were changed
    pub applied: bool,
}

impl CommandReply {
    fn applied(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ephemeral: false,
            applied: true,
        }
    }

    fn rejected(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ephemeral: true,
            applied: false,
        }
    }

    fn info(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ephemeral: true,
            applied: false,
        }
    }
}

/// Handler for destination commands
pub struct DestinationCommands<St> {
    store: St,
}

impl<St: SettingsStore> DestinationCommands<St> {
    pub fn new(store: St) -> Self {
        Self { store }
    }

    /// Validate and apply a command; rejections leave settings untouched
    pub async fn handle(&self, guild_id: &str, command: DestinationCommand) -> CommandReply {
        let mut settings = self.store.get(guild_id).await;

        let reply = match command {
            DestinationCommand::SetChannel(channel) => {
                if !matches!(channel.kind, ChannelKind::Text | ChannelKind::Announcement) {
                    return CommandReply::rejected(format!(
                        "#{} is not a text channel. Pick a text or announcement channel.",
                        channel.name
                    ));
                }
                settings.channel_id = Some(channel.id.clone());
                CommandReply::applied(format!("Festival wishes will be posted in <#{}>.", channel.id))
            }
            DestinationCommand::SetCategories(raw) => {
                let categories = parse_categories(&raw);
                if categories.is_empty() {
                    return CommandReply::rejected(format!(
                        "No valid categories given. Choose from: {}.",
                        vocabulary()
                    ));
                }
                let listed = join_categories(&categories);
                settings.categories = categories;
                CommandReply::applied(format!("Categories set to: {}.", listed))
            }
            DestinationCommand::SetNotificationStyle(raw) => match NotificationStyle::from_str(&raw) {
                Ok(style) => {
                    settings.mention = style;
                    CommandReply::applied(format!("Notification style set to {}.", style.as_str()))
                }
                Err(_) => {
                    return CommandReply::rejected(
                        "Notification style must be one of: everyone, here, none.",
                    );
                }
            },
            DestinationCommand::SetMajorOnly(major_only) => {
                settings.major_only = major_only;
                if major_only {
                    CommandReply::applied("Only major festivals will be announced.")
                } else {
                    CommandReply::applied("All matching festivals will be announced.")
                }
            }
            DestinationCommand::Show => return CommandReply::info(describe(&settings)),
        };

        if let Err(e) = self.store.set(guild_id, &settings).await {
            tracing::error!(guild_id = %guild_id, error = %e, "Failed to persist settings");
            return CommandReply::rejected("Could not save settings, please try again later.");
        }

        tracing::info!(guild_id = %guild_id, settings = ?settings, "Destination settings updated");
        reply
    }
}

/// Parse a free-text category list against the vocabulary
pub fn parse_categories(raw: &str) -> BTreeSet<Category> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .filter_map(|token| Category::from_str(token).ok())
        .collect()
}

fn vocabulary() -> String {
    Category::ALL
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_categories(categories: &BTreeSet<Category>) -> String {
    categories
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Human-readable summary of a guild's settings
pub fn describe(settings: &DestinationSettings) -> String {
    let channel = settings
        .channel_id
        .as_ref()
        .map(|id| format!("<#{}>", id))
        .unwrap_or_else(|| "auto (#announcements or #general)".to_string());

    format!(
        "Channel: {}\nCategories: {}\nNotification style: {}\nMajor festivals only: {}",
        channel,
        join_categories(&settings.categories),
        settings.mention.as_str(),
        if settings.major_only { "yes" } else { "no" }
    )
}

/// Slash-command option types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionKind {
    String,
    Boolean,
    Channel,
}

/// One option of a slash command
#[derive(Debug, Clone, Serialize)]
pub struct CommandOption {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: OptionKind,
    pub required: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<&'static str>,
}

/// Declarative description of a slash command
#[derive(Debug, Clone, Serialize)]
pub struct CommandDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub options: Vec<CommandOption>,
}

/// The four configuration commands exposed to communities
pub fn command_definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition {
            name: "setchannel",
            description: "Choose the channel for festival wishes",
            options: vec![CommandOption {
                name: "channel",
                description: "Text channel to post in",
                kind: OptionKind::Channel,
                required: true,
                choices: vec![],
            }],
        },
        CommandDefinition {
            name: "setcategories",
            description: "Choose which festival categories to announce",
            options: vec![CommandOption {
                name: "categories",
                description: "Comma or space separated: hindu, muslim, christian",
                kind: OptionKind::String,
                required: true,
                choices: vec![],
            }],
        },
        CommandDefinition {
            name: "setmention",
            description: "Choose how announcements ping members",
            options: vec![CommandOption {
                name: "style",
                description: "everyone, here or none",
                kind: OptionKind::String,
                required: true,
                choices: vec!["everyone", "here", "none"],
            }],
        },
        CommandDefinition {
            name: "majoronly",
            description: "Only announce major festivals",
            options: vec![CommandOption {
                name: "enabled",
                description: "true to skip minor observances",
                kind: OptionKind::Boolean,
                required: true,
                choices: vec![],
            }],
        },
    ]
}
