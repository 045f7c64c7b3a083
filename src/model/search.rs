//! Search result records

use serde::{Deserialize, Serialize};

use crate::extractor::Page;
use crate::model::item::{ChannelInfoItem, PlaylistInfoItem, StreamInfoItem};

/// One search hit; the platform mixes entity kinds in a single result list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SearchItem {
    Stream(StreamInfoItem),
    Channel(ChannelInfoItem),
    Playlist(PlaylistInfoItem),
}

impl SearchItem {
    /// Display name regardless of kind
    pub fn name(&self) -> &str {
        match self {
            SearchItem::Stream(s) => &s.title,
            SearchItem::Channel(c) => &c.name,
            SearchItem::Playlist(p) => &p.name,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            SearchItem::Stream(s) => &s.url,
            SearchItem::Channel(c) => &c.url,
            SearchItem::Playlist(p) => &p.url,
        }
    }
}

/// First page of search results plus query-level metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The query as submitted
    pub query: String,
    /// Correction applied or suggested by the service
    /// (did-you-mean / showing-results-for)
    pub corrected_query: Option<String>,
    /// Whether the service silently searched for the corrected query
    pub is_corrected: bool,
    pub items: Vec<SearchItem>,
    pub next_page: Option<Page>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_item_accessors() {
        let item = SearchItem::Stream(StreamInfoItem::new(
            "dQw4w9WgXcQ".to_string(),
            "A video".to_string(),
        ));
        assert_eq!(item.name(), "A video");
        assert_eq!(item.url(), "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
    }
}
