//! Command line argument parsing

use clap::{Parser, Subcommand, ValueEnum};
use std::time::Duration;

use crate::extractor::SearchFilter;
use crate::model::channel::ChannelTab;

/// tubetap - video platform metadata and stream extractor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Emit results as JSON instead of formatted text
    #[arg(long, global = true)]
    pub json: bool,

    /// HTTP timeout in seconds
    #[arg(long, global = true, default_value = "30", value_name = "SECS")]
    pub timeout: u64,

    /// HTTP retries for transient errors
    #[arg(long, global = true, default_value = "3")]
    pub retries: u32,

    /// Pages of list results to fetch
    #[arg(long, global = true, default_value = "1", value_name = "N")]
    pub pages: u32,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show metadata and stream variants for a video
    Info {
        /// Watch URL or bare video ID
        url: String,

        /// Also list the resolved stream URLs
        #[arg(long)]
        streams: bool,
    },

    /// Search for videos, channels and playlists
    Search {
        /// Search query
        query: String,

        /// Restrict results to one kind
        #[arg(long, value_enum, default_value = "all")]
        filter: FilterArg,
    },

    /// List a channel's metadata and tab items
    Channel {
        /// Channel URL, `UC…` ID or `@handle`
        url: String,

        /// Tab to list items from
        #[arg(long, value_enum, default_value = "videos")]
        tab: TabArg,
    },

    /// List a playlist's metadata and videos
    Playlist {
        /// Playlist URL or ID
        url: String,
    },

    /// List comments of a video
    Comments {
        /// Watch URL or bare video ID
        url: String,
    },

    /// List the trending feed
    Trending,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum FilterArg {
    All,
    Videos,
    Channels,
    Playlists,
}

impl From<FilterArg> for SearchFilter {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::All => SearchFilter::All,
            FilterArg::Videos => SearchFilter::Videos,
            FilterArg::Channels => SearchFilter::Channels,
            FilterArg::Playlists => SearchFilter::Playlists,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum TabArg {
    Videos,
    Shorts,
    Live,
    Playlists,
}

impl From<TabArg> for ChannelTab {
    fn from(arg: TabArg) -> Self {
        match arg {
            TabArg::Videos => ChannelTab::Videos,
            TabArg::Shorts => ChannelTab::Shorts,
            TabArg::Live => ChannelTab::Live,
            TabArg::Playlists => ChannelTab::Playlists,
        }
    }
}

impl Args {
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_info_command() {
        let args = Args::parse_from(["tubetap", "info", "dQw4w9WgXcQ", "--streams"]);
        match args.command {
            Command::Info { ref url, streams } => {
                assert_eq!(url, "dQw4w9WgXcQ");
                assert!(streams);
            }
            _ => panic!("wrong command"),
        }
        assert_eq!(args.timeout_duration(), Duration::from_secs(30));
    }

    #[test]
    fn test_parse_search_with_filter() {
        let args = Args::parse_from(["tubetap", "search", "rust", "--filter", "channels"]);
        match args.command {
            Command::Search { query, filter } => {
                assert_eq!(query, "rust");
                assert!(matches!(SearchFilter::from(filter), SearchFilter::Channels));
            }
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn test_global_flags() {
        let args = Args::parse_from(["tubetap", "--json", "--pages", "3", "trending"]);
        assert!(args.json);
        assert_eq!(args.pages, 3);
    }
}
