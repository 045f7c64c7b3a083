//! Playlist extraction: header metadata and the video list

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ExtractError;
use crate::model::item::StreamInfoItem;
use crate::model::playlist::PlaylistInfo;
use crate::platform::innertube::InnerTube;
use crate::platform::renderer::{
    self, array_at, first_of, text_at, text_of, thumbnails_of,
};
use crate::utils::{text, url};

use super::channel::continuation_items;
use super::{ListExtractor, ListPage, Page};

/// Playlists are browsed under a `VL`-prefixed id
fn browse_id_of(playlist_id: &str) -> String {
    if playlist_id.starts_with("VL") {
        playlist_id.to_string()
    } else {
        format!("VL{playlist_id}")
    }
}

/// Extractor for a playlist page
pub struct PlaylistExtractor {
    tube: InnerTube,
    target: String,
}

impl PlaylistExtractor {
    pub fn new(url_or_id: &str) -> Self {
        Self::with_innertube(InnerTube::new(), url_or_id)
    }

    pub fn with_innertube(tube: InnerTube, url_or_id: &str) -> Self {
        Self {
            tube,
            target: url_or_id.to_string(),
        }
    }

    /// Fetch playlist-level metadata together with the first page of videos
    pub async fn fetch_info(&mut self) -> Result<(PlaylistInfo, ListPage<StreamInfoItem>), ExtractError> {
        let playlist_id = url::extract_playlist_id(&self.target)?;
        let response = self.tube.browse(&browse_id_of(&playlist_id), None).await?;

        let info = parse_playlist_info(&playlist_id, &response)?;
        let page = parse_video_list(&playlist_id, &response);
        Ok((info, page))
    }
}

#[async_trait]
impl ListExtractor for PlaylistExtractor {
    type Item = StreamInfoItem;

    async fn initial_page(&mut self) -> Result<ListPage<Self::Item>, ExtractError> {
        let (_, page) = self.fetch_info().await?;
        Ok(page)
    }

    async fn page(&mut self, page: &Page) -> Result<ListPage<Self::Item>, ExtractError> {
        let token = page.token_or_err()?;
        let response = self.tube.browse_continuation(token).await?;

        let contents = continuation_items(&response).ok_or(ExtractError::NothingFound)?;
        Ok(ListPage::new(
            collect_playlist_videos(contents),
            renderer::continuation_token(contents).map(|t| Page::for_token(&page.url, &t)),
        ))
    }
}

fn collect_playlist_videos(contents: &[Value]) -> Vec<StreamInfoItem> {
    contents
        .iter()
        .filter_map(|entry| entry.get("playlistVideoRenderer"))
        .filter_map(super::items::playlist_video_item)
        .collect()
}

fn parse_video_list(playlist_id: &str, response: &Value) -> ListPage<StreamInfoItem> {
    let contents = first_of(
        response,
        &[
            &[
                "contents",
                "twoColumnBrowseResultsRenderer",
                "tabs",
            ],
            &["contents"],
        ],
    )
    .and_then(video_list_contents);

    let Some(contents) = contents else {
        return ListPage::new(Vec::new(), None);
    };

    let page_url = url::playlist_url(playlist_id);
    ListPage::new(
        collect_playlist_videos(contents),
        renderer::continuation_token(contents).map(|t| Page::for_token(&page_url, &t)),
    )
}

/// Dig through the single browse tab down to the playlist item list
fn video_list_contents(tabs: &Value) -> Option<&Vec<Value>> {
    let tab = tabs.as_array()?.first()?;
    array_at(
        tab,
        &[
            "tabRenderer",
            "content",
            "sectionListRenderer",
            "contents",
        ],
    )?
    .iter()
    .find_map(|section| {
        array_at(section, &["itemSectionRenderer", "contents"])?
            .iter()
            .find_map(|item| {
                array_at(item, &["playlistVideoListRenderer", "contents"])
            })
    })
}

/// Playlist metadata from the header or sidebar, whichever shape is served
fn parse_playlist_info(playlist_id: &str, response: &Value) -> Result<PlaylistInfo, ExtractError> {
    let mut info = PlaylistInfo::new(playlist_id.to_string(), String::new());

    if let Some(header) = renderer::path(response, &["header", "playlistHeaderRenderer"]) {
        info.name = text_at(header, &["title"]).unwrap_or_default();
        info.description = header.get("descriptionText").and_then(text_of);
        info.uploader_name = text_at(header, &["ownerText"]);
        if let Some(endpoint) = renderer::path(header, &["ownerEndpoint"]) {
            info.uploader_url = renderer::navigation_url(endpoint);
        }
        info.stream_count = header
            .get("numVideosText")
            .and_then(text_of)
            .and_then(|t| text::parse_mixed_number(&t).ok());
        info.view_count = header
            .get("viewCountText")
            .and_then(text_of)
            .and_then(|t| text::parse_mixed_number(&t).ok());
        if let Some(banner) = renderer::path(
            header,
            &["playlistHeaderBanner", "heroPlaylistThumbnailRenderer", "thumbnail"],
        ) {
            info.thumbnails = thumbnails_of(banner);
        }
    } else if let Some(microformat) = renderer::path(
        response,
        &["microformat", "microformatDataRenderer"],
    ) {
        info.name = text_at(microformat, &["title"]).unwrap_or_default();
        info.description = text_at(microformat, &["description"]);
        if let Some(thumbnail) = microformat.get("thumbnail") {
            info.thumbnails = thumbnails_of(thumbnail);
        }
    }

    if info.name.is_empty() {
        return Err(ExtractError::ContentUnavailable(format!(
            "Playlist not found: {playlist_id}"
        )));
    }
    Ok(info)
}
