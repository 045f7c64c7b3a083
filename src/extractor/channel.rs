//! Channel extraction: header metadata, tab discovery and tab item lists

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::error::ExtractError;
use crate::model::channel::{ChannelInfo, ChannelTab};
use crate::model::item::StreamInfoItem;
use crate::platform::innertube::InnerTube;
use crate::platform::renderer::{
    self, array_at, first_of, string_at, text_at, text_of, thumbnails_of,
};
use crate::utils::{text, url};

use super::{items, ListExtractor, ListPage, Page};

/// Extractor for a channel page and one of its tabs
pub struct ChannelExtractor {
    tube: InnerTube,
    target: String,
    tab: ChannelTab,
    // Resolving a handle costs a request, so the result is kept
    browse_id: Option<String>,
}

impl ChannelExtractor {
    pub fn new(url_or_id: &str) -> Self {
        Self::with_innertube(InnerTube::new(), url_or_id)
    }

    pub fn with_innertube(tube: InnerTube, url_or_id: &str) -> Self {
        Self {
            tube,
            target: url_or_id.to_string(),
            tab: ChannelTab::Videos,
            browse_id: None,
        }
    }

    /// Select the tab whose items the list methods return
    pub fn with_tab(mut self, tab: ChannelTab) -> Self {
        self.tab = tab;
        self
    }

    /// Resolve the target to a stable `UC…` browse id
    async fn browse_id(&mut self) -> Result<String, ExtractError> {
        if let Some(id) = &self.browse_id {
            return Ok(id.clone());
        }
        let id = match url::extract_channel_id(&self.target)? {
            url::ChannelId::Id(id) => id,
            url::ChannelId::Handle(handle) => {
                debug!("Resolving channel handle: {}", handle);
                self.tube.resolve_channel(&handle).await?
            }
        };
        self.browse_id = Some(id.clone());
        Ok(id)
    }

    /// Fetch channel-level metadata (name, avatars, subscriber count, tabs)
    pub async fn fetch_info(&mut self) -> Result<ChannelInfo, ExtractError> {
        let id = self.browse_id().await?;
        let response = self.tube.browse(&id, None).await?;
        parse_channel_info(&id, &response)
    }

    /// First page of the playlists tab. The list methods of this extractor
    /// yield videos, so playlist tiles get their own entry point.
    pub async fn playlists(
        &mut self,
    ) -> Result<ListPage<crate::model::item::PlaylistInfoItem>, ExtractError> {
        let id = self.browse_id().await?;
        let response = self
            .tube
            .browse(&id, Some(ChannelTab::Playlists.params()))
            .await?;

        let contents =
            selected_tab_contents(&response, ChannelTab::Playlists).ok_or_else(|| {
                ExtractError::ContentUnavailable("Channel has no playlists tab".to_string())
            })?;

        // Older responses wrap the playlist grid one level deeper
        let contents = grid_items(contents).unwrap_or(contents);

        let page_url = format!("{}/playlists", url::channel_url(&id));
        Ok(ListPage::new(
            items::collect_playlist_items(contents),
            renderer::continuation_token(contents).map(|t| Page::for_token(&page_url, &t)),
        ))
    }

    /// Follow a cursor produced by [`Self::playlists`]
    pub async fn playlists_page(
        &mut self,
        page: &Page,
    ) -> Result<ListPage<crate::model::item::PlaylistInfoItem>, ExtractError> {
        let token = page.token_or_err()?;
        let response = self.tube.browse_continuation(token).await?;

        let contents = continuation_items(&response).ok_or(ExtractError::NothingFound)?;
        Ok(ListPage::new(
            items::collect_playlist_items(contents),
            renderer::continuation_token(contents).map(|t| Page::for_token(&page.url, &t)),
        ))
    }
}

#[async_trait]
impl ListExtractor for ChannelExtractor {
    type Item = StreamInfoItem;

    async fn initial_page(&mut self) -> Result<ListPage<Self::Item>, ExtractError> {
        let id = self.browse_id().await?;
        let response = self.tube.browse(&id, Some(self.tab.params())).await?;

        let contents = selected_tab_contents(&response, self.tab).ok_or_else(|| {
            ExtractError::ContentUnavailable(format!(
                "Channel has no {} tab",
                self.tab.path()
            ))
        })?;

        let page_url = format!("{}/{}", url::channel_url(&id), self.tab.path());
        Ok(ListPage::new(
            items::collect_video_items(contents),
            renderer::continuation_token(contents).map(|t| Page::for_token(&page_url, &t)),
        ))
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

/// Grid items nested inside a section list
fn grid_items(contents: &[Value]) -> Option<&Vec<Value>> {
    contents.iter().find_map(|entry| {
        array_at(entry, &["itemSectionRenderer", "contents"])?
            .iter()
            .find_map(|c| array_at(c, &["gridRenderer", "items"]))
    })
}

/// Items appended by a continuation response
pub(super) fn continuation_items(response: &Value) -> Option<&Vec<Value>> {
    let actions = array_at(response, &["onResponseReceivedActions"])
        .or_else(|| array_at(response, &["onResponseReceivedEndpoints"]))?;
    actions.iter().find_map(|action| {
        first_of(
            action,
            &[
                &["appendContinuationItemsAction", "continuationItems"],
                &["reloadContinuationItemsCommand", "continuationItems"],
            ],
        )?
        .as_array()
    })
}

/// Contents of the currently selected tab in a browse response
fn selected_tab_contents(response: &Value, tab: ChannelTab) -> Option<&Vec<Value>> {
    let tabs = array_at(
        response,
        &["contents", "twoColumnBrowseResultsRenderer", "tabs"],
    )?;
    // The service marks the home tab selected when the channel lacks the
    // requested one, so `selected` is only trusted for tabs without a URL
    let tab_renderer = tabs
        .iter()
        .filter_map(|t| t.get("tabRenderer"))
        .find(|t| tab_url_matches(t, tab))
        .or_else(|| {
            tabs.iter()
                .filter_map(|t| t.get("tabRenderer"))
                .filter(|t| tab_endpoint_url(t).is_none())
                .find(|t| t.get("selected").and_then(Value::as_bool).unwrap_or(false))
        })?;

    first_of(
        tab_renderer,
        &[
            &["content", "richGridRenderer", "contents"],
            &[
                "content",
                "sectionListRenderer",
                "contents",
            ],
        ],
    )?
    .as_array()
}

fn tab_endpoint_url(tab_renderer: &Value) -> Option<&str> {
    string_at(
        tab_renderer,
        &["endpoint", "commandMetadata", "webCommandMetadata", "url"],
    )
}

fn tab_url_matches(tab_renderer: &Value, tab: ChannelTab) -> bool {
    tab_endpoint_url(tab_renderer)
        .map(|u| u.ends_with(&format!("/{}", tab.path())))
        .unwrap_or(false)
}

/// Parse channel metadata from the header and metadata renderers, covering
/// the tabbed-header and page-header shapes
fn parse_channel_info(id: &str, response: &Value) -> Result<ChannelInfo, ExtractError> {
    let mut name = String::new();
    let mut info = ChannelInfo::new(id.to_string(), String::new());

    if let Some(metadata) = renderer::path(response, &["metadata", "channelMetadataRenderer"]) {
        if let Some(title) = string_at(metadata, &["title"]) {
            name = title.to_string();
        }
        info.description = string_at(metadata, &["description"]).map(|s| s.to_string());
        if let Some(vanity) = string_at(metadata, &["vanityChannelUrl"]) {
            if let Some(handle) = vanity.rsplit('/').next().filter(|s| s.starts_with('@')) {
                info.handle = Some(handle.to_string());
            }
        }
        if let Some(avatar) = metadata.get("avatar") {
            info.avatars = thumbnails_of(avatar);
        }
    }

    if let Some(header) = renderer::path(response, &["header", "c4TabbedHeaderRenderer"]) {
        if name.is_empty() {
            if let Some(title) = text_at(header, &["title"]) {
                name = title;
            }
        }
        info.verified = renderer::is_verified(header);
        info.subscriber_count = text_at(header, &["subscriberCountText"])
            .and_then(|t| text::parse_mixed_number(&t).ok());
        if info.handle.is_none() {
            info.handle = text_at(header, &["channelHandleText"]);
        }
        if info.avatars.is_empty() {
            if let Some(avatar) = header.get("avatar") {
                info.avatars = thumbnails_of(avatar);
            }
        }
        if let Some(banner) = header.get("banner") {
            info.banners = thumbnails_of(banner);
        }
    } else if let Some(view_model) = renderer::path(
        response,
        &["header", "pageHeaderRenderer", "content", "pageHeaderViewModel"],
    ) {
        if name.is_empty() {
            if let Some(title) = renderer::path(view_model, &["title", "dynamicTextViewModel", "text"])
                .and_then(text_of)
            {
                name = title;
            }
        }
        // The view model flattens handle and subscriber count into rows of
        // plain text parts
        for part in metadata_parts(view_model) {
            if part.starts_with('@') {
                if info.handle.is_none() {
                    info.handle = Some(part);
                }
            } else if part.contains("subscriber") {
                info.subscriber_count = text::parse_mixed_number(&part).ok();
            }
        }
        if let Some(sources) = renderer::path(
            view_model,
            &[
                "image",
                "decoratedAvatarViewModel",
                "avatar",
                "avatarViewModel",
                "image",
                "sources",
            ],
        ) {
            info.avatars = thumbnails_of(sources);
        }
        if let Some(sources) = renderer::path(
            view_model,
            &["banner", "imageBannerViewModel", "image", "sources"],
        ) {
            info.banners = thumbnails_of(sources);
        }
    }

    if name.is_empty() {
        return Err(ExtractError::Parse(
            "Channel response has no recognizable header".to_string(),
        ));
    }
    info.name = name;
    info.tabs = available_tabs(response);
    Ok(info)
}

fn metadata_parts(view_model: &Value) -> Vec<String> {
    let Some(rows) = array_at(
        view_model,
        &["metadata", "contentMetadataViewModel", "metadataRows"],
    ) else {
        return Vec::new();
    };
    rows.iter()
        .filter_map(|row| row.get("metadataParts").and_then(Value::as_array))
        .flatten()
        .filter_map(|part| text_at(part, &["text"]))
        .collect()
}

/// Tabs the channel actually exposes, by URL suffix
fn available_tabs(response: &Value) -> Vec<ChannelTab> {
    let Some(tabs) = array_at(
        response,
        &["contents", "twoColumnBrowseResultsRenderer", "tabs"],
    ) else {
        return Vec::new();
    };
    let known = [
        ChannelTab::Videos,
        ChannelTab::Shorts,
        ChannelTab::Live,
        ChannelTab::Playlists,
    ];
    tabs.iter()
        .filter_map(|t| t.get("tabRenderer"))
        .filter_map(|t| known.into_iter().find(|tab| tab_url_matches(t, *tab)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn browse_response() -> Value {
        json!({
            "metadata": {"channelMetadataRenderer": {
                "title": "3Blue1Brown",
                "description": "Animated math",
                "vanityChannelUrl": "http://www.youtube.com/@3blue1brown",
                "avatar": {"thumbnails": [{"url": "https://yt3.ggpht.com/a", "width": 900}]}
            }},
            "header": {"c4TabbedHeaderRenderer": {
                "channelId": "UCYO_jab_esuFRV4b17AJtAw",
                "title": "3Blue1Brown",
                "subscriberCountText": {"simpleText": "6.8M subscribers"},
                "badges": [{"metadataBadgeRenderer": {"style": "BADGE_STYLE_TYPE_VERIFIED"}}],
                "banner": {"thumbnails": [{"url": "https://yt3.ggpht.com/banner"}]}
            }},
            "contents": {"twoColumnBrowseResultsRenderer": {"tabs": [
                {"tabRenderer": {
                    "selected": true,
                    "endpoint": {"commandMetadata": {"webCommandMetadata":
                        {"url": "/@3blue1brown/videos"}}},
                    "content": {"richGridRenderer": {"contents": [
                        {"richItemRenderer": {"content": {"videoRenderer": {
                            "videoId": "aaaaaaaaaaa",
                            "title": {"simpleText": "A video"}
                        }}}},
                        {"continuationItemRenderer": {"continuationEndpoint":
                            {"continuationCommand": {"token": "chan-tok"}}}}
                    ]}}
                }},
                {"tabRenderer": {"endpoint": {"commandMetadata": {"webCommandMetadata":
                    {"url": "/@3blue1brown/playlists"}}}}}
            ]}}
        })
    }

    #[test]
    fn test_parse_channel_info() {
        let info = parse_channel_info("UCYO_jab_esuFRV4b17AJtAw", &browse_response()).unwrap();
        assert_eq!(info.name, "3Blue1Brown");
        assert_eq!(info.handle.as_deref(), Some("@3blue1brown"));
        assert_eq!(info.subscriber_count, Some(6_800_000));
        assert!(info.verified);
        assert_eq!(info.banners.len(), 1);
        assert_eq!(info.tabs, vec![ChannelTab::Videos, ChannelTab::Playlists]);
    }

    #[test]
    fn test_parse_channel_info_page_header_shape() {
        let response = json!({
            "header": {"pageHeaderRenderer": {"content": {"pageHeaderViewModel": {
                "title": {"dynamicTextViewModel": {"text": {"content": "Some Channel"}}},
                "metadata": {"contentMetadataViewModel": {"metadataRows": [
                    {"metadataParts": [{"text": {"content": "@somechannel"}}]},
                    {"metadataParts": [
                        {"text": {"content": "1.5M subscribers"}},
                        {"text": {"content": "321 videos"}}
                    ]}
                ]}},
                "image": {"decoratedAvatarViewModel": {"avatar": {"avatarViewModel":
                    {"image": {"sources": [{"url": "https://yt3.ggpht.com/new"}]}}}}}
            }}}}
        });
        let info = parse_channel_info("UCx", &response).unwrap();
        assert_eq!(info.name, "Some Channel");
        assert_eq!(info.handle.as_deref(), Some("@somechannel"));
        assert_eq!(info.subscriber_count, Some(1_500_000));
        assert_eq!(info.avatars[0].url, "https://yt3.ggpht.com/new");
    }

    #[test]
    fn test_parse_channel_info_without_header_fails() {
        assert!(parse_channel_info("UCx", &json!({})).is_err());
    }

    #[test]
    fn test_selected_home_tab_does_not_stand_in_for_missing_tab() {
        // A channel without shorts answers the shorts params with its home
        // tab marked selected
        let response = json!({"contents": {"twoColumnBrowseResultsRenderer": {"tabs": [
            {"tabRenderer": {
                "selected": true,
                "endpoint": {"commandMetadata": {"webCommandMetadata":
                    {"url": "/@3blue1brown/featured"}}},
                "content": {"richGridRenderer": {"contents": [
                    {"richItemRenderer": {"content": {"videoRenderer": {
                        "videoId": "aaaaaaaaaaa",
                        "title": {"simpleText": "A home video"}
                    }}}}
                ]}}
            }}
        ]}}});
        assert!(selected_tab_contents(&response, ChannelTab::Shorts).is_none());
        assert!(selected_tab_contents(&response, ChannelTab::Videos).is_none());
    }

    #[test]
    fn test_selected_tab_with_matching_url_is_used() {
        let response = browse_response();
        let contents = selected_tab_contents(&response, ChannelTab::Videos).unwrap();
        assert_eq!(items::collect_video_items(contents).len(), 1);
    }

    #[test]
    fn test_continuation_items() {
        let response = json!({"onResponseReceivedActions": [
            {"appendContinuationItemsAction": {"continuationItems": [
                {"richItemRenderer": {"content": {"videoRenderer": {
                    "videoId": "bbbbbbbbbbb", "title": {"simpleText": "B"}
                }}}}
            ]}}
        ]});
        let contents = continuation_items(&response).unwrap();
        assert_eq!(items::collect_video_items(contents).len(), 1);
    }

    #[tokio::test]
    async fn test_initial_page_via_mock() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/youtubei/v1/browse")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(browse_response().to_string())
            .create_async()
            .await;

        let tube = InnerTube::new().with_base_url(&server.url());
        let mut extractor =
            ChannelExtractor::with_innertube(tube, "https://www.youtube.com/channel/UCYO_jab_esuFRV4b17AJtAw");

        let page = extractor.initial_page().await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, "aaaaaaaaaaa");
        assert_eq!(page.next_page.unwrap().token.as_deref(), Some("chan-tok"));
    }
}
