//! Parsing of the tile renderers shared across list pages
//!
//! Search results, channel tabs, trending and related-item lists all reuse
//! a small set of tile shapes (`videoRenderer`, `gridVideoRenderer`,
//! `compactVideoRenderer`, …). The parsers here accept whichever of the
//! known field variants the tile carries and return `None` for tiles that
//! lack the fields an item cannot exist without.

use serde_json::Value;
use tracing::trace;

use crate::model::item::{ChannelInfoItem, PlaylistInfoItem, StreamInfoItem};
use crate::model::stream::StreamType;
use crate::platform::renderer::{
    self, first_of, string_at, text_at, text_of, thumbnails_of, u64_at,
};
use crate::utils::{text, timeago, url};

/// Parse a video tile (`videoRenderer`, `gridVideoRenderer` or
/// `compactVideoRenderer` all share enough structure for one parser)
pub fn video_item(r: &Value) -> Option<StreamInfoItem> {
    let id = string_at(r, &["videoId"])?.to_string();
    let title = first_of(r, &[&["title"], &["headline"]])
        .and_then(text_of)
        .unwrap_or_default();
    if title.is_empty() {
        trace!("Skipping video tile without title: {}", id);
        return None;
    }

    let mut item = StreamInfoItem::new(id, title);

    // Uploader line differs per tile kind
    if let Some(owner) = first_of(
        r,
        &[&["ownerText"], &["longBylineText"], &["shortBylineText"]],
    ) {
        item.uploader_name = text_of(owner);
        item.uploader_url = owner
            .get("runs")
            .and_then(Value::as_array)
            .and_then(|runs| runs.first())
            .and_then(|run| run.get("navigationEndpoint"))
            .and_then(renderer::navigation_url);
    }
    item.uploader_verified = renderer::is_verified(r);

    item.stream_type = stream_type_of(r);
    if item.stream_type == StreamType::Video {
        item.duration = text_at(r, &["lengthText"])
            .and_then(|t| text::parse_duration(&t).ok())
            .or_else(|| u64_at(r, &["lengthSeconds"]));
    }

    item.view_count = first_of(r, &[&["viewCountText"], &["shortViewCountText"]])
        .and_then(text_of)
        .and_then(|t| text::parse_mixed_number(&t).ok());

    if let Some(published) = text_at(r, &["publishedTimeText"]) {
        item.upload_date = timeago::parse_relative(&published).ok();
        item.upload_date_text = Some(published);
    }

    if let Some(thumbnail) = r.get("thumbnail") {
        item.thumbnails = thumbnails_of(thumbnail);
    }

    Some(item)
}

/// Parse a `playlistVideoRenderer` tile from a playlist page
pub fn playlist_video_item(r: &Value) -> Option<StreamInfoItem> {
    let id = string_at(r, &["videoId"])?.to_string();
    let title = text_at(r, &["title"])?;

    let mut item = StreamInfoItem::new(id, title);
    item.duration = u64_at(r, &["lengthSeconds"]);
    if let Some(owner) = r.get("shortBylineText") {
        item.uploader_name = text_of(owner);
        item.uploader_url = owner
            .get("runs")
            .and_then(Value::as_array)
            .and_then(|runs| runs.first())
            .and_then(|run| run.get("navigationEndpoint"))
            .and_then(renderer::navigation_url);
    }
    if let Some(thumbnail) = r.get("thumbnail") {
        item.thumbnails = thumbnails_of(thumbnail);
    }
    Some(item)
}

/// Parse a `channelRenderer` tile
pub fn channel_item(r: &Value) -> Option<ChannelInfoItem> {
    let id = string_at(r, &["channelId"])?.to_string();
    let name = text_at(r, &["title"])?;

    let item_url = r
        .get("navigationEndpoint")
        .and_then(renderer::navigation_url)
        .unwrap_or_else(|| url::channel_url(&id));

    // Newer responses moved the subscriber count into videoCountText and
    // repurposed subscriberCountText for the handle
    let subscriber_count = [&["subscriberCountText"], &["videoCountText"]]
        .iter()
        .filter_map(|keys| text_at(r, *keys))
        .filter(|t| t.contains("subscriber"))
        .find_map(|t| text::parse_mixed_number(&t).ok());

    Some(ChannelInfoItem {
        id,
        name,
        url: item_url,
        description: r.get("descriptionSnippet").and_then(text_of),
        subscriber_count,
        verified: renderer::is_verified(r),
        avatars: r.get("thumbnail").map(thumbnails_of).unwrap_or_default(),
    })
}

/// Parse a `playlistRenderer` or `gridPlaylistRenderer` tile
pub fn playlist_item(r: &Value) -> Option<PlaylistInfoItem> {
    let id = string_at(r, &["playlistId"])?.to_string();
    let name = text_at(r, &["title"])?;

    let thumbnails = first_of(
        r,
        &[
            &["thumbnails"],
            &["thumbnail"],
            &["thumbnailRenderer", "playlistVideoThumbnailRenderer", "thumbnail"],
        ],
    )
    .map(|v| {
        // playlistRenderer wraps per-video thumbnail sets in an array
        if let Some(sets) = v.as_array() {
            sets.first().map(thumbnails_of).unwrap_or_default()
        } else {
            thumbnails_of(v)
        }
    })
    .unwrap_or_default();

    Some(PlaylistInfoItem {
        id: id.clone(),
        name,
        url: url::playlist_url(&id),
        uploader_name: first_of(r, &[&["shortBylineText"], &["longBylineText"]])
            .and_then(text_of),
        stream_count: first_of(r, &[&["videoCount"], &["videoCountText"]])
            .and_then(text_of)
            .and_then(|t| text::parse_mixed_number(&t).ok()),
        thumbnails,
    })
}

/// Classify a video tile as VOD, live or ended live stream
pub fn stream_type_of(r: &Value) -> StreamType {
    if renderer::has_badge(r, "badges", "LIVE") {
        return StreamType::Live;
    }
    if let Some(overlays) = r.get("thumbnailOverlays").and_then(Value::as_array) {
        for overlay in overlays {
            if let Some(style) = string_at(
                overlay,
                &["thumbnailOverlayTimeStatusRenderer", "style"],
            ) {
                if style == "LIVE" {
                    return StreamType::Live;
                }
            }
        }
    }
    StreamType::Video
}

/// Walk a contents array, collecting every video tile it holds. Tiles may
/// be wrapped in `richItemRenderer` (grid pages) or appear bare.
pub fn collect_video_items(contents: &[Value]) -> Vec<StreamInfoItem> {
    contents
        .iter()
        .filter_map(|entry| {
            let tile = first_of(
                entry,
                &[
                    &["videoRenderer"],
                    &["gridVideoRenderer"],
                    &["compactVideoRenderer"],
                    &["richItemRenderer", "content", "videoRenderer"],
                    &["richItemRenderer", "content", "reelItemRenderer"],
                    &[
                        "richItemRenderer",
                        "content",
                        "shortsLockupViewModel",
                    ],
                ],
            )?;
            video_item(tile).or_else(|| shorts_lockup_item(tile))
        })
        .collect()
}

/// Collect playlist tiles from a contents array (channel playlists tab,
/// search sections)
pub fn collect_playlist_items(contents: &[Value]) -> Vec<PlaylistInfoItem> {
    contents
        .iter()
        .filter_map(|entry| {
            first_of(
                entry,
                &[
                    &["playlistRenderer"],
                    &["gridPlaylistRenderer"],
                    &["richItemRenderer", "content", "playlistRenderer"],
                ],
            )
        })
        .filter_map(playlist_item)
        .collect()
}

/// Newer shorts tiles use a view-model shape with entirely different keys
fn shorts_lockup_item(r: &Value) -> Option<StreamInfoItem> {
    let id = string_at(
        r,
        &[
            "onTap",
            "innertubeCommand",
            "reelWatchEndpoint",
            "videoId",
        ],
    )?
    .to_string();
    let title = first_of(
        r,
        &[
            &["overlayMetadata", "primaryText"],
            &["accessibilityText"],
        ],
    )
    .and_then(text_of)?;

    let mut item = StreamInfoItem::new(id, title);
    if let Some(thumbnail) = renderer::path(r, &["thumbnail"]) {
        item.thumbnails = thumbnails_of(thumbnail);
    }
    Some(item)
}
