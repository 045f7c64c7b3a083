//! Channel records

use serde::{Deserialize, Serialize};

use crate::model::item::Image;

/// Tabs a channel page can expose. Each maps to an opaque browse `params`
/// value understood by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelTab {
    Videos,
    Shorts,
    Live,
    Playlists,
}

impl ChannelTab {
    /// Browse params selecting this tab
    pub fn params(&self) -> &'static str {
        match self {
            ChannelTab::Videos => "EgZ2aWRlb3PyBgQKAjoA",
            ChannelTab::Shorts => "EgZzaG9ydHPyBgUKA5oBAA%3D%3D",
            ChannelTab::Live => "EgdzdHJlYW1z8gYECgJ6AA%3D%3D",
            ChannelTab::Playlists => "EglwbGF5bGlzdHPyBgQKAkIA",
        }
    }

    /// URL path suffix for this tab
    pub fn path(&self) -> &'static str {
        match self {
            ChannelTab::Videos => "videos",
            ChannelTab::Shorts => "shorts",
            ChannelTab::Live => "streams",
            ChannelTab::Playlists => "playlists",
        }
    }
}

/// Channel-level information from the browse response header
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelInfo {
    /// Stable `UC…` channel ID
    pub id: String,
    pub name: String,
    pub url: String,
    /// `@handle` when the channel has one
    pub handle: Option<String>,
    pub description: Option<String>,
    pub subscriber_count: Option<u64>,
    pub verified: bool,
    pub avatars: Vec<Image>,
    pub banners: Vec<Image>,
    /// Tabs actually present on this channel
    pub tabs: Vec<ChannelTab>,
}

impl ChannelInfo {
    pub fn new(id: String, name: String) -> Self {
        let url = crate::utils::url::channel_url(&id);
        Self {
            id,
            name,
            url,
            handle: None,
            description: None,
            subscriber_count: None,
            verified: false,
            avatars: Vec::new(),
            banners: Vec::new(),
            tabs: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_tab_paths() {
        assert_eq!(ChannelTab::Videos.path(), "videos");
        assert_eq!(ChannelTab::Live.path(), "streams");
    }

    #[test]
    fn test_channel_info_url() {
        let info = ChannelInfo::new("UCYO_jab_esuFRV4b17AJtAw".to_string(), "3b1b".to_string());
        assert_eq!(
            info.url,
            "https://www.youtube.com/channel/UCYO_jab_esuFRV4b17AJtAw"
        );
        assert!(info.tabs.is_empty());
    }
}
