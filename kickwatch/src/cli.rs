use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use kickwatch::view::{SortMode, ViewOptions, ViewState};

#[derive(Parser, Debug)]
#[command(
    name = "kickwatch",
    version,
    about = "Live status dashboard for a roster of Kick streamers"
)]
pub struct Args {
    /// Configuration file (TOML)
    #[arg(short, long, global = true, env = "KICKWATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Poll once and print the channel list
    Check {
        #[command(flatten)]
        view: ViewArgs,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
        output: OutputFormat,
    },

    /// Poll continuously, printing the list and sending live notifications
    Watch {
        #[command(flatten)]
        view: ViewArgs,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
        output: OutputFormat,
    },

    /// List roster tags with the number of streamers carrying each
    Tags,

    /// Print links of the filtered channels, one per line
    Links {
        #[command(flatten)]
        view: ViewArgs,
    },

    /// Show or change the notification preference of a streamer
    Notify {
        /// Streamer username or profile URL
        username: String,

        #[arg(value_enum)]
        action: Option<NotifyAction>,
    },

    /// Print the effective configuration
    Config,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct ViewArgs {
    /// Search username, first character name or live title
    #[arg(short, long, default_value = "")]
    pub search: String,

    /// Keep streamers carrying any of these tags
    #[arg(short, long = "tag")]
    pub tags: Vec<String>,

    /// Keep live streamers in this category
    #[arg(long)]
    pub category: Option<String>,

    /// Sort mode: status, viewers_desc, live_duration_desc or last_seen_desc
    #[arg(long, default_value_t = SortMode::Status)]
    pub sort: SortMode,

    /// Mark a streamer as favorite
    #[arg(long = "favorite")]
    pub favorites: Vec<String>,

    /// Only show favorites
    #[arg(long)]
    pub favorites_only: bool,
}

impl ViewArgs {
    pub fn state(&self) -> ViewState {
        ViewState {
            search: self.search.clone(),
            tags: self.tags.iter().cloned().collect(),
            category: self.category.clone(),
            sort: self.sort,
            favorites_only: self.favorites_only,
        }
    }

    pub fn options(&self) -> ViewOptions {
        ViewOptions::full(
            self.favorites
                .iter()
                .map(|f| kick_api::extract_username(f))
                .collect(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored, human readable
    Pretty,
    /// Box-drawn table
    Table,
    /// JSON
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NotifyAction {
    On,
    Off,
    Toggle,
}
