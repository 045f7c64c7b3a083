//! Single-video extraction: player response, stream variants, watch-next
//! metadata and related items

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ExtractError;
use crate::model::stream::{AudioStream, StreamInfo, StreamType, VideoStream};
use crate::platform::deobfuscate::{parse_signature_cipher, Deobfuscator};
use crate::platform::innertube::{FormatData, InnerTube, PlayerResponse};
use crate::platform::itags::{self, ItagType};
use crate::platform::renderer::{self, string_at, text_at, text_of, thumbnails_of};
use crate::utils::{text, timeago, url};

use super::items;

// One switch to another API client per restriction kind is usually enough;
// more just burns requests
const MAX_CLIENT_SWITCHES: u32 = 2;

/// Extractor for a single watch page
pub struct StreamExtractor {
    tube: InnerTube,
    deob: Deobfuscator,
}

impl StreamExtractor {
    pub fn new() -> Self {
        let tube = InnerTube::new();
        let deob = Deobfuscator::with_cache(tube.cache().clone());
        Self { tube, deob }
    }

    pub fn with_innertube(tube: InnerTube) -> Self {
        let deob = Deobfuscator::with_cache(tube.cache().clone());
        Self { tube, deob }
    }

    pub fn innertube(&self) -> &InnerTube {
        &self.tube
    }

    /// Fetch full stream information for a watch URL or bare video id
    pub async fn fetch(&mut self, url_or_id: &str) -> Result<StreamInfo, ExtractError> {
        let video_id = url::extract_video_id(url_or_id)?;

        if let Err(e) = self.tube.ensure_visitor_data().await {
            debug!("Visitor data unavailable: {e}");
        }

        let player = self.fetch_playable(&video_id).await?;
        let mut info = self.build_info(&video_id, &player).await?;

        // Watch-next carries related items and engagement metadata; losing
        // it should not fail the whole extraction
        match self.tube.next(&video_id).await {
            Ok(next) => apply_watch_next(&mut info, &next),
            Err(e) => warn!("Watch-next request failed: {e}"),
        }

        Ok(info)
    }

    /// Fetch the player response, switching API clients around restrictions
    async fn fetch_playable(&mut self, video_id: &str) -> Result<PlayerResponse, ExtractError> {
        let mut switches = 0;
        loop {
            let sts = self.signature_timestamp_if_needed().await;
            let player = self.tube.player(video_id, sts).await?;
            match player.check_playability() {
                Ok(()) => return Ok(player),
                Err(e) if e.is_retryable() && switches < MAX_CLIENT_SWITCHES => {
                    warn!("Playability check failed ({e}), switching client");
                    self.tube.http_mut().switch_for_error(&e);
                    switches += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// The web clients only get usable cipher data when the request carries
    /// the player script's signature timestamp
    async fn signature_timestamp_if_needed(&self) -> Option<u64> {
        if self.tube.http().current_client().has_direct_urls() {
            return None;
        }
        match self.deob.signature_timestamp().await {
            Ok(sts) => Some(sts),
            Err(e) => {
                warn!("Signature timestamp unavailable: {e}");
                None
            }
        }
    }

    async fn build_info(
        &self,
        video_id: &str,
        player: &PlayerResponse,
    ) -> Result<StreamInfo, ExtractError> {
        let details = player.video_details.as_ref().ok_or_else(|| {
            ExtractError::Parse("Player response has no video details".to_string())
        })?;

        let title = details.title.clone().unwrap_or_default();
        let mut info = StreamInfo::new(video_id.to_string(), title);

        info.description = details.short_description.clone();
        info.duration = details
            .length_seconds
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);
        info.view_count = details.view_count.as_deref().and_then(|s| s.parse().ok());
        info.uploader_name = details.author.clone();
        info.uploader_id = details.channel_id.clone();
        info.uploader_url = details.channel_id.as_deref().map(url::channel_url);
        info.tags = details.keywords.clone().unwrap_or_default();
        if let Some(thumbnail) = &details.thumbnail {
            info.thumbnails = thumbnails_of(thumbnail);
        }

        info.stream_type = if details.is_live.unwrap_or(false) {
            StreamType::Live
        } else if details.is_live_content.unwrap_or(false) {
            StreamType::PostLive
        } else {
            StreamType::Video
        };

        if let Some(micro) = player
            .microformat
            .as_ref()
            .and_then(|m| m.get("playerMicroformatRenderer"))
        {
            info.category = string_at(micro, &["category"]).map(|s| s.to_string());
            if let Some(published) = string_at(micro, &["publishDate"]) {
                info.upload_date_text = Some(published.to_string());
                info.upload_date = parse_publish_date(published);
            }
        }

        if let Some(streaming) = &player.streaming_data {
            info.hls_url = streaming.hls_manifest_url.clone();
            info.dash_mpd_url = streaming.dash_manifest_url.clone();

            let formats = streaming
                .formats
                .iter()
                .flatten()
                .chain(streaming.adaptive_formats.iter().flatten());
            for format in formats {
                self.add_stream(&mut info, format).await;
            }
        } else {
            warn!("No streaming data for {video_id}");
        }

        Ok(info)
    }

    /// Resolve a format's URL and append it to the matching stream list.
    /// Formats with unknown itags or unrecoverable ciphers are skipped.
    async fn add_stream(&self, info: &mut StreamInfo, format: &FormatData) {
        let itag = match itags::get_itag(format.itag) {
            Ok(itag) => itag,
            Err(_) => {
                debug!("Skipping unsupported itag {}", format.itag);
                return;
            }
        };

        let Some(stream_url) = self.resolve_format_url(format).await else {
            return;
        };

        let codec = codec_of(format.mime_type.as_deref());
        let content_length = format
            .content_length
            .as_deref()
            .and_then(|s| s.parse().ok());

        match itag.itag_type {
            ItagType::Audio => {
                let mut stream = AudioStream::from_itag(stream_url, &itag);
                stream.bitrate = format.average_bitrate.or(format.bitrate).unwrap_or(0);
                stream.codec = codec;
                stream.audio_sample_rate = format
                    .audio_sample_rate
                    .as_ref()
                    .and_then(sample_rate_of);
                stream.audio_channels = format.audio_channels;
                stream.content_length = content_length;
                info.audio_streams.push(stream);
            }
            ItagType::Video | ItagType::VideoOnly => {
                let video_only = itag.itag_type == ItagType::VideoOnly;
                let mut stream = VideoStream::from_itag(stream_url, &itag, video_only);
                stream.bitrate = format.bitrate.unwrap_or(0);
                stream.codec = codec;
                stream.width = format.width;
                stream.height = format.height;
                stream.fps = format.fps;
                stream.content_length = content_length;
                if let Some(label) = &format.quality_label {
                    stream.resolution = label.clone();
                }
                info.video_streams.push(stream);
            }
        }
    }

    /// Direct URL, or cipher deobfuscation. The throttling parameter is
    /// rewritten best-effort; a failed signature makes the format unusable.
    async fn resolve_format_url(&self, format: &FormatData) -> Option<String> {
        if let Some(direct) = &format.url {
            return Some(self.deob.fix_throttling(direct).await);
        }

        let cipher = format
            .signature_cipher
            .as_deref()
            .or(format.cipher.as_deref())?;
        let parsed = parse_signature_cipher(cipher)?;

        match self.deob.deobfuscate_signature(&parsed.signature).await {
            Ok(signature) => {
                let separator = if parsed.url.contains('?') { '&' } else { '?' };
                let signed = format!(
                    "{}{}{}={}",
                    parsed.url, separator, parsed.signature_param, signature
                );
                Some(self.deob.fix_throttling(&signed).await)
            }
            Err(e) => {
                warn!("Signature deobfuscation failed for itag {}: {e}", format.itag);
                None
            }
        }
    }
}

impl Default for StreamExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Merge related items and engagement metadata from the watch-next response
fn apply_watch_next(info: &mut StreamInfo, next: &Value) {
    if let Some(results) = renderer::array_at(
        next,
        &[
            "contents",
            "twoColumnWatchNextResults",
            "secondaryResults",
            "secondaryResults",
            "results",
        ],
    ) {
        info.related_items = items::collect_video_items(results);
    }

    let Some(contents) = renderer::array_at(
        next,
        &[
            "contents",
            "twoColumnWatchNextResults",
            "results",
            "results",
            "contents",
        ],
    ) else {
        return;
    };

    for entry in contents {
        if let Some(primary) = entry.get("videoPrimaryInfoRenderer") {
            if info.like_count.is_none() {
                info.like_count = like_count_of(primary);
            }
        }
        if let Some(owner) = renderer::path(
            entry,
            &["videoSecondaryInfoRenderer", "owner", "videoOwnerRenderer"],
        ) {
            info.uploader_verified = renderer::is_verified(owner);
            if let Some(thumbnail) = owner.get("thumbnail") {
                info.uploader_avatars = thumbnails_of(thumbnail);
            }
            info.uploader_subscriber_count = text_at(owner, &["subscriberCountText"])
                .and_then(|t| text::parse_mixed_number(&t).ok());
        }
    }
}

/// Like count from the primary info renderer, trying the segmented button
/// and the older toggle-button shape
fn like_count_of(primary: &Value) -> Option<u64> {
    let buttons = renderer::array_at(
        primary,
        &["videoActions", "menuRenderer", "topLevelButtons"],
    )?;
    for button in buttons {
        let toggle = renderer::first_of(
            button,
            &[
                &[
                    "segmentedLikeDislikeButtonViewModel",
                    "likeButtonViewModel",
                    "likeButtonViewModel",
                    "toggleButtonViewModel",
                    "toggleButtonViewModel",
                    "defaultButtonViewModel",
                    "buttonViewModel",
                    "accessibilityText",
                ],
                &[
                    "segmentedLikeDislikeButtonRenderer",
                    "likeButton",
                    "toggleButtonRenderer",
                    "defaultText",
                ],
                &["toggleButtonRenderer", "defaultText"],
            ],
        );
        if let Some(label) = toggle.and_then(label_text) {
            if let Ok(count) = text::parse_mixed_number(&label) {
                return Some(count);
            }
        }
    }
    None
}

/// Text from a label that may be a plain string, a text object or carry an
/// accessibility label with the full count
fn label_text(value: &Value) -> Option<String> {
    if let Some(label) = string_at(
        value,
        &["accessibility", "accessibilityData", "label"],
    ) {
        return Some(label.to_string());
    }
    text_of(value)
}

/// The codec list inside a mime type: `video/mp4; codecs="avc1.640028"`
fn codec_of(mime_type: Option<&str>) -> Option<String> {
    let mime = mime_type?;
    let start = mime.find("codecs=\"")? + "codecs=\"".len();
    let end = mime[start..].find('"')? + start;
    Some(mime[start..end].to_string())
}

/// Sample rate is served as either a number or a numeric string
fn sample_rate_of(value: &Value) -> Option<u32> {
    value
        .as_u64()
        .or_else(|| value.as_str()?.parse().ok())
        .map(|v| v as u32)
}

/// `publishDate` is a plain date on older responses and an ISO timestamp
/// with offset on newer ones
fn parse_publish_date(published: &str) -> Option<timeago::UploadDate> {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(published) {
        return Some(timeago::UploadDate::exact(datetime.with_timezone(&Utc)));
    }
    NaiveDate::parse_from_str(published, "%Y-%m-%d")
        .ok()?
        .and_hms_opt(0, 0, 0)
        .map(|naive| timeago::UploadDate::exact(naive.and_utc()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::client::ClientType;
    use serde_json::json;

    #[test]
    fn test_codec_extraction() {
        assert_eq!(
            codec_of(Some(r#"video/mp4; codecs="avc1.640028""#)),
            Some("avc1.640028".to_string())
        );
        assert_eq!(
            codec_of(Some(r#"audio/webm; codecs="opus""#)),
            Some("opus".to_string())
        );
        assert_eq!(codec_of(Some("video/mp4")), None);
        assert_eq!(codec_of(None), None);
    }

    #[test]
    fn test_parse_publish_date_forms() {
        let plain = parse_publish_date("2009-10-25").unwrap();
        assert!(!plain.is_approximation);
        assert_eq!(plain.date.format("%Y-%m-%d").to_string(), "2009-10-25");

        let iso = parse_publish_date("2023-05-01T08:00:00-07:00").unwrap();
        assert_eq!(iso.date.format("%H").to_string(), "15");

        assert!(parse_publish_date("last tuesday").is_none());
    }

    #[test]
    fn test_like_count_from_toggle_button() {
        let primary = json!({"videoActions": {"menuRenderer": {"topLevelButtons": [
            {"segmentedLikeDislikeButtonRenderer": {"likeButton": {"toggleButtonRenderer": {
                "defaultText": {
                    "accessibility": {"accessibilityData": {"label": "123,456 likes"}},
                    "simpleText": "123K"
                }
            }}}}
        ]}}});
        assert_eq!(like_count_of(&primary), Some(123_456));
    }

    #[test]
    fn test_like_count_from_view_model() {
        let primary = json!({"videoActions": {"menuRenderer": {"topLevelButtons": [
            {"segmentedLikeDislikeButtonViewModel": {"likeButtonViewModel": {"likeButtonViewModel": {
                "toggleButtonViewModel": {"toggleButtonViewModel": {
                    "defaultButtonViewModel": {"buttonViewModel": {
                        "accessibilityText": "like this video along with 98,765 other people"
                    }}
                }}
            }}}}
        ]}}});
        assert_eq!(like_count_of(&primary), Some(98_765));
    }

    #[test]
    fn test_apply_watch_next_related_items() {
        let mut info = StreamInfo::new("dQw4w9WgXcQ".to_string(), "Test".to_string());
        let next = json!({"contents": {"twoColumnWatchNextResults": {
            "secondaryResults": {"secondaryResults": {"results": [
                {"compactVideoRenderer": {
                    "videoId": "aaaaaaaaaaa",
                    "title": {"simpleText": "Related"},
                    "longBylineText": {"runs": [{"text": "Someone"}]}
                }}
            ]}},
            "results": {"results": {"contents": [
                {"videoSecondaryInfoRenderer": {"owner": {"videoOwnerRenderer": {
                    "subscriberCountText": {"simpleText": "3.4M subscribers"},
                    "thumbnail": {"thumbnails": [{"url": "https://yt3.ggpht.com/a"}]},
                    "badges": [{"metadataBadgeRenderer": {"style": "BADGE_STYLE_TYPE_VERIFIED"}}]
                }}}}
            ]}}
        }}});

        apply_watch_next(&mut info, &next);
        assert_eq!(info.related_items.len(), 1);
        assert_eq!(info.related_items[0].uploader_name.as_deref(), Some("Someone"));
        assert_eq!(info.uploader_subscriber_count, Some(3_400_000));
        assert!(info.uploader_verified);
        assert_eq!(info.uploader_avatars.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_rejects_invalid_url() {
        let mut extractor = StreamExtractor::new();
        let result = extractor.fetch("https://example.com/not-a-video").await;
        assert!(matches!(result, Err(ExtractError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_fetch_with_mock_server() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/")
            .with_status(200)
            .with_body(r#"{"visitorData":"CgtX"}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/youtubei/v1/player")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                "playabilityStatus": {"status": "OK"},
                "videoDetails": {
                    "videoId": "dQw4w9WgXcQ",
                    "title": "Never Gonna Give You Up",
                    "author": "Rick Astley",
                    "channelId": "UCuAXFkgsw1L7xaCfnd5JJOw",
                    "lengthSeconds": "213",
                    "viewCount": "1456123456"
                },
                "streamingData": {
                    "formats": [{
                        "itag": 18,
                        "url": "https://example.com/videoplayback?itag=18",
                        "bitrate": 500000,
                        "mimeType": "video/mp4; codecs=\"avc1.42001E, mp4a.40.2\"",
                        "width": 640, "height": 360
                    }],
                    "adaptiveFormats": [{
                        "itag": 251,
                        "url": "https://example.com/videoplayback?itag=251",
                        "averageBitrate": 130000,
                        "mimeType": "audio/webm; codecs=\"opus\""
                    }, {
                        "itag": 9999,
                        "url": "https://example.com/videoplayback?itag=9999"
                    }]
                }
            }"#,
            )
            .create_async()
            .await;
        server
            .mock("POST", "/youtubei/v1/next")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{}")
            .create_async()
            .await;

        // Android client skips the signature-timestamp path, which would
        // otherwise try to reach the real player script host
        let mut config = crate::platform::client::HttpClientConfig::default();
        config.client_type = ClientType::Android;
        let tube = InnerTube::with_client(crate::platform::PlatformClient::with_config(config))
            .with_base_url(&server.url());
        let mut extractor = StreamExtractor::with_innertube(tube);

        let info = extractor.fetch("dQw4w9WgXcQ").await.unwrap();
        assert_eq!(info.title, "Never Gonna Give You Up");
        assert_eq!(info.duration, 213);
        assert_eq!(info.video_streams.len(), 1);
        assert_eq!(info.audio_streams.len(), 1);
        assert_eq!(info.audio_streams[0].codec.as_deref(), Some("opus"));
        // The unknown itag is dropped
        assert_eq!(info.best_video().unwrap().itag, 18);
    }
}
