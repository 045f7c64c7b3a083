//! Search extraction: mixed-kind results, query correction and pagination

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::error::ExtractError;
use crate::model::search::{SearchItem, SearchResult};
use crate::platform::innertube::InnerTube;
use crate::platform::renderer::{self, array_at, text_at};

use super::{items, ListExtractor, ListPage, Page};

/// Result-kind filter, sent as an opaque `params` blob
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchFilter {
    All,
    Videos,
    Channels,
    Playlists,
}

impl SearchFilter {
    pub fn params(&self) -> Option<&'static str> {
        match self {
            SearchFilter::All => None,
            SearchFilter::Videos => Some("EgIQAQ%3D%3D"),
            SearchFilter::Channels => Some("EgIQAg%3D%3D"),
            SearchFilter::Playlists => Some("EgIQAw%3D%3D"),
        }
    }
}

/// Extractor for a search query
pub struct SearchExtractor {
    tube: InnerTube,
    query: String,
    filter: SearchFilter,
}

impl SearchExtractor {
    pub fn new(query: &str) -> Self {
        Self::with_innertube(InnerTube::new(), query)
    }

    pub fn with_innertube(tube: InnerTube, query: &str) -> Self {
        Self {
            tube,
            query: query.to_string(),
            filter: SearchFilter::All,
        }
    }

    pub fn with_filter(mut self, filter: SearchFilter) -> Self {
        self.filter = filter;
        self
    }

    fn results_url(&self) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(self.query.as_bytes()).collect();
        format!("https://www.youtube.com/results?search_query={encoded}")
    }

    /// Run the search, returning the first page together with query-level
    /// metadata (correction info)
    pub async fn fetch(&mut self) -> Result<SearchResult, ExtractError> {
        let response = self
            .tube
            .search(&self.query, self.filter.params())
            .await?;

        let sections = array_at(
            &response,
            &[
                "contents",
                "twoColumnSearchResultsRenderer",
                "primaryContents",
                "sectionListRenderer",
                "contents",
            ],
        )
        .ok_or(ExtractError::NothingFound)?;

        let mut result = SearchResult {
            query: self.query.clone(),
            corrected_query: None,
            is_corrected: false,
            items: Vec::new(),
            next_page: None,
        };
        collect_sections(sections, &mut result);
        result.next_page = renderer::continuation_token(sections)
            .map(|t| Page::for_token(&self.results_url(), &t));

        if result.items.is_empty() && result.corrected_query.is_none() {
            return Err(ExtractError::NothingFound);
        }
        Ok(result)
    }
}

#[async_trait]
impl ListExtractor for SearchExtractor {
    type Item = SearchItem;

    async fn initial_page(&mut self) -> Result<ListPage<Self::Item>, ExtractError> {
        let result = self.fetch().await?;
        Ok(ListPage::new(result.items, result.next_page))
    }

    async fn page(&mut self, page: &Page) -> Result<ListPage<Self::Item>, ExtractError> {
        let token = page.token_or_err()?;
        let response = self.tube.search_continuation(token).await?;

        let sections = continuation_sections(&response).ok_or(ExtractError::NothingFound)?;
        let mut result = SearchResult {
            query: self.query.clone(),
            corrected_query: None,
            is_corrected: false,
            items: Vec::new(),
            next_page: None,
        };
        collect_sections(sections, &mut result);

        Ok(ListPage::new(
            result.items,
            renderer::continuation_token(sections).map(|t| Page::for_token(&page.url, &t)),
        ))
    }
}

fn continuation_sections(response: &Value) -> Option<&Vec<Value>> {
    let actions = array_at(response, &["onResponseReceivedCommands"])
        .or_else(|| array_at(response, &["onResponseReceivedActions"]))?;
    actions.iter().find_map(|action| {
        renderer::path(
            action,
            &["appendContinuationItemsAction", "continuationItems"],
        )?
        .as_array()
    })
}

/// Walk section-list entries, collecting result tiles and correction
/// notices into the result
fn collect_sections(sections: &[Value], result: &mut SearchResult) {
    for section in sections {
        let Some(entries) = array_at(section, &["itemSectionRenderer", "contents"]) else {
            continue;
        };
        for entry in entries {
            if let Some(item) = parse_result_entry(entry) {
                result.items.push(item);
                continue;
            }
            // The service either silently corrects the query or merely
            // suggests a correction; callers need to tell the two apart
            if let Some(corrected) = entry.get("showingResultsForRenderer") {
                result.corrected_query = text_at(corrected, &["correctedQuery"]);
                result.is_corrected = true;
            } else if let Some(suggestion) = entry.get("didYouMeanRenderer") {
                if result.corrected_query.is_none() {
                    result.corrected_query = text_at(suggestion, &["correctedQuery"]);
                    result.is_corrected = false;
                }
            } else {
                debug!("Unrecognized search result entry");
            }
        }
    }
}

fn parse_result_entry(entry: &Value) -> Option<SearchItem> {
    if let Some(r) = entry.get("videoRenderer") {
        return items::video_item(r).map(SearchItem::Stream);
    }
    if let Some(r) = entry.get("channelRenderer") {
        return items::channel_item(r).map(SearchItem::Channel);
    }
    if let Some(r) = entry.get("playlistRenderer") {
        return items::playlist_item(r).map(SearchItem::Playlist);
    }
    None
}
