//! URL utilities for extracting video, playlist and channel IDs from
//! the various link formats the platform uses

use crate::error::ExtractError;
use url::Url;

/// Identifier for a channel page, as accepted by the browse endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelId {
    /// Stable `UC…` channel ID
    Id(String),
    /// `@handle`, `/c/name` or `/user/name`, resolved server-side
    Handle(String),
}

/// Extract a video ID from the supported watch URL formats
pub fn extract_video_id(url: &str) -> Result<String, ExtractError> {
    // Accept raw 11-character video IDs as-is
    if url.len() == 11 && url.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Ok(url.to_string());
    }

    let parsed = Url::parse(url)?;

    match parsed.host_str().map(|h| h.to_lowercase()).as_deref() {
        Some("youtu.be") => {
            let path = parsed.path().trim_start_matches('/');
            if path.is_empty() {
                return Err(ExtractError::InvalidUrl("Missing video ID".to_string()));
            }
            Ok(path.to_string())
        }
        Some("youtube.com") | Some("www.youtube.com") | Some("m.youtube.com")
        | Some("music.youtube.com") => {
            if parsed.path().starts_with("/watch") {
                parsed
                    .query_pairs()
                    .find(|(key, _)| key == "v")
                    .map(|(_, value)| value.to_string())
                    .ok_or_else(|| ExtractError::InvalidUrl("Missing v parameter".to_string()))
            } else if let Some(id) = parsed
                .path()
                .strip_prefix("/shorts/")
                .or_else(|| parsed.path().strip_prefix("/embed/"))
                .or_else(|| parsed.path().strip_prefix("/live/"))
                .or_else(|| parsed.path().strip_prefix("/v/"))
            {
                if id.is_empty() {
                    return Err(ExtractError::InvalidUrl(
                        "Missing video ID in path".to_string(),
                    ));
                }
                Ok(id.trim_end_matches('/').to_string())
            } else {
                Err(ExtractError::InvalidUrl(
                    "Unsupported video URL format".to_string(),
                ))
            }
        }
        _ => Err(ExtractError::InvalidUrl(
            "Not a supported video platform URL".to_string(),
        )),
    }
}

/// Extract a playlist ID from a playlist URL or raw ID
pub fn extract_playlist_id(url: &str) -> Result<String, ExtractError> {
    // Accept raw playlist IDs as-is
    if !url.is_empty()
        && (url.starts_with("PL")
            || url.starts_with("UU")
            || url.starts_with("RD")
            || url.starts_with("OLAK5uy_"))
        && !url.contains('/')
    {
        return Ok(url.to_string());
    }

    let parsed = Url::parse(url)?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == "list")
        .map(|(_, value)| value.to_string())
        .ok_or_else(|| ExtractError::InvalidUrl("Playlist ID not found".to_string()))
}

/// Extract a channel identifier from a channel URL, handle or raw ID
pub fn extract_channel_id(url: &str) -> Result<ChannelId, ExtractError> {
    // Raw channel IDs and handles
    if url.starts_with("UC") && url.len() == 24 && !url.contains('/') {
        return Ok(ChannelId::Id(url.to_string()));
    }
    if let Some(handle) = url.strip_prefix('@') {
        if !handle.is_empty() && !handle.contains('/') {
            return Ok(ChannelId::Handle(format!("@{handle}")));
        }
    }

    let parsed = Url::parse(url)?;
    if !matches!(
        parsed.host_str().map(|h| h.to_lowercase()).as_deref(),
        Some("youtube.com") | Some("www.youtube.com") | Some("m.youtube.com")
    ) {
        return Err(ExtractError::InvalidUrl(
            "Not a supported channel URL".to_string(),
        ));
    }

    let mut segments = parsed
        .path_segments()
        .ok_or_else(|| ExtractError::InvalidUrl("Empty channel path".to_string()))?;

    match segments.next() {
        Some("channel") => {
            let id = segments
                .next()
                .filter(|s| !s.is_empty())
                .ok_or_else(|| ExtractError::InvalidUrl("Missing channel ID".to_string()))?;
            Ok(ChannelId::Id(id.to_string()))
        }
        Some("c") | Some("user") => {
            let name = segments
                .next()
                .filter(|s| !s.is_empty())
                .ok_or_else(|| ExtractError::InvalidUrl("Missing channel name".to_string()))?;
            Ok(ChannelId::Handle(name.to_string()))
        }
        Some(seg) if seg.starts_with('@') => Ok(ChannelId::Handle(seg.to_string())),
        _ => Err(ExtractError::InvalidUrl(
            "Unsupported channel URL format".to_string(),
        )),
    }
}

/// Check if a URL points to a single video
pub fn is_video_url(url: &str) -> bool {
    extract_video_id(url).is_ok()
}

/// Check if a URL points to a playlist
pub fn is_playlist_url(url: &str) -> bool {
    extract_playlist_id(url).is_ok()
}

/// Canonical watch URL for a video ID
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

/// Canonical channel URL for a channel ID
pub fn channel_url(channel_id: &str) -> String {
    format!("https://www.youtube.com/channel/{channel_id}")
}

/// Canonical playlist URL for a playlist ID
pub fn playlist_url(playlist_id: &str) -> String {
    format!("https://www.youtube.com/playlist?list={playlist_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_video_id() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ").unwrap(),
            "dQw4w9WgXcQ"
        );
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ").unwrap(),
            "dQw4w9WgXcQ"
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/shorts/brZCOVlyPPo").unwrap(),
            "brZCOVlyPPo"
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ").unwrap(),
            "dQw4w9WgXcQ"
        );
        assert_eq!(extract_video_id("dQw4w9WgXcQ").unwrap(), "dQw4w9WgXcQ");

        assert!(extract_video_id("https://www.youtube.com/watch").is_err());
        assert!(extract_video_id("https://example.com").is_err());
        assert!(extract_video_id("https://youtu.be/").is_err());
    }

    #[test]
    fn test_extract_video_id_keeps_query_out() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=10s").unwrap(),
            "dQw4w9WgXcQ"
        );
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ?t=10").unwrap(),
            "dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_extract_playlist_id() {
        assert_eq!(
            extract_playlist_id("https://www.youtube.com/playlist?list=PLxxxx").unwrap(),
            "PLxxxx"
        );
        assert_eq!(extract_playlist_id("PLxxxx").unwrap(), "PLxxxx");
        assert_eq!(extract_playlist_id("OLAK5uy_abc").unwrap(), "OLAK5uy_abc");
        assert_eq!(
            extract_playlist_id("https://www.youtube.com/watch?v=xxx&list=PLyyyy").unwrap(),
            "PLyyyy"
        );

        assert!(extract_playlist_id("https://www.youtube.com/watch?v=xxx").is_err());
        assert!(extract_playlist_id("").is_err());
    }

    #[test]
    fn test_extract_channel_id() {
        assert_eq!(
            extract_channel_id("https://www.youtube.com/channel/UCYO_jab_esuFRV4b17AJtAw").unwrap(),
            ChannelId::Id("UCYO_jab_esuFRV4b17AJtAw".to_string())
        );
        assert_eq!(
            extract_channel_id("UCYO_jab_esuFRV4b17AJtAw").unwrap(),
            ChannelId::Id("UCYO_jab_esuFRV4b17AJtAw".to_string())
        );
        assert_eq!(
            extract_channel_id("https://www.youtube.com/@3blue1brown").unwrap(),
            ChannelId::Handle("@3blue1brown".to_string())
        );
        assert_eq!(
            extract_channel_id("@3blue1brown").unwrap(),
            ChannelId::Handle("@3blue1brown".to_string())
        );
        assert_eq!(
            extract_channel_id("https://www.youtube.com/c/3blue1brown").unwrap(),
            ChannelId::Handle("3blue1brown".to_string())
        );
        assert_eq!(
            extract_channel_id("https://www.youtube.com/user/vsauce").unwrap(),
            ChannelId::Handle("vsauce".to_string())
        );

        assert!(extract_channel_id("https://example.com/channel/UCx").is_err());
        assert!(extract_channel_id("https://www.youtube.com/watch?v=xxx").is_err());
    }

    #[test]
    fn test_url_builders() {
        assert_eq!(
            watch_url("dQw4w9WgXcQ"),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
        assert_eq!(
            channel_url("UCYO_jab_esuFRV4b17AJtAw"),
            "https://www.youtube.com/channel/UCYO_jab_esuFRV4b17AJtAw"
        );
    }
}
