//! Trending page extraction

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ExtractError;
use crate::model::item::StreamInfoItem;
use crate::platform::innertube::InnerTube;
use crate::platform::renderer::{self, array_at, first_of};

use super::channel::continuation_items;
use super::{items, ListExtractor, ListPage, Page};

const TRENDING_BROWSE_ID: &str = "FEtrending";
const TRENDING_URL: &str = "https://www.youtube.com/feed/trending";

/// Extractor for the trending feed
pub struct TrendingExtractor {
    tube: InnerTube,
}

impl TrendingExtractor {
    pub fn new() -> Self {
        Self::with_innertube(InnerTube::new())
    }

    pub fn with_innertube(tube: InnerTube) -> Self {
        Self { tube }
    }
}

impl Default for TrendingExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ListExtractor for TrendingExtractor {
    type Item = StreamInfoItem;

    async fn initial_page(&mut self) -> Result<ListPage<Self::Item>, ExtractError> {
        let response = self.tube.browse(TRENDING_BROWSE_ID, None).await?;
        let collected = collect_trending_items(&response);
        if collected.items.is_empty() {
            return Err(ExtractError::NothingFound);
        }
        Ok(collected)
    }

    async fn page(&mut self, page: &Page) -> Result<ListPage<Self::Item>, ExtractError> {
        let token = page.token_or_err()?;
        let response = self.tube.browse_continuation(token).await?;

        let contents = continuation_items(&response).ok_or(ExtractError::NothingFound)?;
        Ok(ListPage::new(
            items::collect_video_items(contents),
            renderer::continuation_token(contents).map(|t| Page::for_token(&page.url, &t)),
        ))
    }
}

/// The trending feed nests videos inside section shelves; flatten all of
/// them into one list
fn collect_trending_items(response: &Value) -> ListPage<StreamInfoItem> {
    let mut collected = Vec::new();
    let mut next_page = None;

    let sections = array_at(
        response,
        &["contents", "twoColumnBrowseResultsRenderer", "tabs"],
    )
    .and_then(|tabs| tabs.first())
    .and_then(|tab| {
        first_of(
            tab,
            &[
                &["tabRenderer", "content", "sectionListRenderer", "contents"],
                &["tabRenderer", "content", "richGridRenderer", "contents"],
            ],
        )
    })
    .and_then(Value::as_array);

    let Some(sections) = sections else {
        return ListPage::new(collected, None);
    };

    // Grid pages hold tiles directly, section lists hold shelves of tiles
    collected.extend(items::collect_video_items(sections));
    for section in sections {
        if let Some(shelf_items) = first_of(
            section,
            &[
                &[
                    "itemSectionRenderer",
                    "contents",
                ],
                &[
                    "shelfRenderer",
                    "content",
                    "expandedShelfContentsRenderer",
                    "items",
                ],
            ],
        )
        .and_then(Value::as_array)
        {
            collected.extend(items::collect_video_items(shelf_items));
            for entry in shelf_items {
                if let Some(nested) = first_of(
                    entry,
                    &[
                        &["shelfRenderer", "content", "expandedShelfContentsRenderer", "items"],
                        &["reelShelfRenderer", "items"],
                    ],
                )
                .and_then(Value::as_array)
                {
                    collected.extend(items::collect_video_items(nested));
                }
            }
        }
    }

    if let Some(token) = renderer::continuation_token(sections) {
        next_page = Some(Page::for_token(TRENDING_URL, &token));
    }

    ListPage::new(collected, next_page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn trending_response() -> Value {
        json!({"contents": {"twoColumnBrowseResultsRenderer": {"tabs": [
            {"tabRenderer": {"content": {"sectionListRenderer": {"contents": [
                {"itemSectionRenderer": {"contents": [
                    {"shelfRenderer": {"content": {"expandedShelfContentsRenderer": {"items": [
                        {"videoRenderer": {
                            "videoId": "aaaaaaaaaaa",
                            "title": {"simpleText": "Trending 1"}
                        }},
                        {"videoRenderer": {
                            "videoId": "bbbbbbbbbbb",
                            "title": {"simpleText": "Trending 2"}
                        }}
                    ]}}}}
                ]}}
            ]}}}}
        ]}}})
    }

    #[test]
    fn test_collect_trending_items() {
        let page = collect_trending_items(&trending_response());
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].title, "Trending 1");
        assert!(page.next_page.is_none());
    }

    #[test]
    fn test_collect_trending_items_grid_shape() {
        let response = json!({"contents": {"twoColumnBrowseResultsRenderer": {"tabs": [
            {"tabRenderer": {"content": {"richGridRenderer": {"contents": [
                {"richItemRenderer": {"content": {"videoRenderer": {
                    "videoId": "ccccccccccc", "title": {"simpleText": "Grid"}
                }}}}
            ]}}}}
        ]}}});
        let page = collect_trending_items(&response);
        assert_eq!(page.items.len(), 1);
    }

    #[tokio::test]
    async fn test_initial_page_via_mock() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/youtubei/v1/browse")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(trending_response().to_string())
            .create_async()
            .await;

        let tube = InnerTube::new().with_base_url(&server.url());
        let mut extractor = TrendingExtractor::with_innertube(tube);

        let page = extractor.initial_page().await.unwrap();
        assert_eq!(page.items.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_feed_is_nothing_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/youtubei/v1/browse")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{}")
            .create_async()
            .await;

        let tube = InnerTube::new().with_base_url(&server.url());
        let mut extractor = TrendingExtractor::with_innertube(tube);
        assert!(matches!(
            extractor.initial_page().await,
            Err(ExtractError::NothingFound)
        ));
    }
}
