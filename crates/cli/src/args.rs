//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use festival_notifier_domain::ChannelKind;
use std::path::PathBuf;

/// festival-notifier: daily festival wishes for Discord communities
#[derive(Parser, Debug)]
#[command(name = "festival-notifier")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Deliver festival wishes on the configured daily schedule
    Run(RunArgs),

    /// Show which festivals each guild would receive today
    Preview(PreviewArgs),

    /// Inspect or change a guild's delivery settings
    Destination(DestinationArgs),

    /// Configuration management
    Config(ConfigArgs),

    /// Validate configuration and show status
    Doctor(DoctorArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Render and log messages without sending them
    #[arg(long)]
    pub dry_run: bool,

    /// Run one delivery pass immediately and exit
    #[arg(long)]
    pub once: bool,

    /// Write messages to this JSONL file for review instead of sending them
    #[arg(long)]
    pub outbox: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct DestinationArgs {
    #[command(subcommand)]
    pub command: DestinationCommands,
}

#[derive(Subcommand, Debug)]
pub enum DestinationCommands {
    /// Choose the channel festival wishes are posted in
    SetChannel {
        /// Guild ID
        #[arg(long)]
        guild: String,

        /// Channel ID
        #[arg(long)]
        channel: String,

        /// Channel kind; looked up on Discord when omitted
        #[arg(long, value_enum)]
        kind: Option<ChannelKindArg>,

        /// Channel name used in replies when --kind is given
        #[arg(long)]
        name: Option<String>,
    },

    /// Choose festival categories (comma or space separated: hindu, muslim, christian)
    SetCategories {
        /// Guild ID
        #[arg(long)]
        guild: String,

        categories: String,
    },

    /// Choose how announcements ping members (everyone, here, none)
    SetMention {
        /// Guild ID
        #[arg(long)]
        guild: String,

        style: String,
    },

    /// Only announce major festivals
    SetMajorOnly {
        /// Guild ID
        #[arg(long)]
        guild: String,

        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },

    /// Show a guild's current settings
    Show {
        /// Guild ID
        #[arg(long)]
        guild: String,
    },

    /// Print the slash-command definitions as JSON
    Definitions,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ChannelKindArg {
    Text,
    Announcement,
    Voice,
    Category,
}

impl From<ChannelKindArg> for ChannelKind {
    fn from(kind: ChannelKindArg) -> Self {
        match kind {
            ChannelKindArg::Text => ChannelKind::Text,
            ChannelKindArg::Announcement => ChannelKind::Announcement,
            ChannelKindArg::Voice => ChannelKind::Voice,
            ChannelKindArg::Category => ChannelKind::Category,
        }
    }
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Init {
        /// Path to write config file
        #[arg(long, default_value = "./config.toml")]
        path: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration (file plus environment overrides)
    Show,
}

#[derive(Args, Debug)]
pub struct DoctorArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
