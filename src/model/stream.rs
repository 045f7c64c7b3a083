//! Stream (single video) records

use serde::{Deserialize, Serialize};

use crate::model::item::{Image, StreamInfoItem};
use crate::platform::itags::{ItagItem, MediaFormat};
use crate::utils::timeago::UploadDate;

/// Kind of stream a watch page resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamType {
    /// Normal video on demand
    Video,
    /// Currently running live stream
    Live,
    /// Ended live stream served as a video
    PostLive,
}

impl Default for StreamType {
    fn default() -> Self {
        StreamType::Video
    }
}

/// An audio-only stream variant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioStream {
    /// Playable URL (deobfuscated when possible)
    pub url: String,
    /// Encoding profile id
    pub itag: u32,
    /// Container/codec format
    pub format: MediaFormat,
    /// Average bitrate in kbit/s, -1 when unknown
    pub average_bitrate: i32,
    /// Actual bitrate from the response, bits/s
    pub bitrate: u32,
    pub codec: Option<String>,
    pub audio_sample_rate: Option<u32>,
    pub audio_channels: Option<u32>,
    pub content_length: Option<u64>,
}

/// A video stream variant, possibly without audio
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoStream {
    /// Playable URL (deobfuscated when possible)
    pub url: String,
    /// Encoding profile id
    pub itag: u32,
    /// Container/codec format
    pub format: MediaFormat,
    /// Resolution label ("720p", "1080p60")
    pub resolution: String,
    /// Video without an audio track
    pub is_video_only: bool,
    pub bitrate: u32,
    pub codec: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fps: Option<u32>,
    pub content_length: Option<u64>,
}

/// Full information for a single stream, assembled from the player and
/// watch-next responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamInfo {
    pub id: String,
    pub title: String,
    pub url: String,
    pub stream_type: StreamType,
    pub description: Option<String>,
    /// Duration in seconds; 0 for live streams
    pub duration: u64,
    pub view_count: Option<u64>,
    pub like_count: Option<u64>,
    pub upload_date_text: Option<String>,
    pub upload_date: Option<UploadDate>,
    pub uploader_name: Option<String>,
    pub uploader_id: Option<String>,
    pub uploader_url: Option<String>,
    pub uploader_verified: bool,
    pub uploader_subscriber_count: Option<u64>,
    pub uploader_avatars: Vec<Image>,
    pub thumbnails: Vec<Image>,
    pub tags: Vec<String>,
    pub category: Option<String>,
    pub audio_streams: Vec<AudioStream>,
    pub video_streams: Vec<VideoStream>,
    /// HLS manifest for live content
    pub hls_url: Option<String>,
    /// DASH manifest as returned by the service (not generated)
    pub dash_mpd_url: Option<String>,
    pub related_items: Vec<StreamInfoItem>,
}

impl StreamInfo {
    pub fn new(id: String, title: String) -> Self {
        let url = crate::utils::url::watch_url(&id);
        Self {
            id,
            title,
            url,
            stream_type: StreamType::Video,
            description: None,
            duration: 0,
            view_count: None,
            like_count: None,
            upload_date_text: None,
            upload_date: None,
            uploader_name: None,
            uploader_id: None,
            uploader_url: None,
            uploader_verified: false,
            uploader_subscriber_count: None,
            uploader_avatars: Vec::new(),
            thumbnails: Vec::new(),
            tags: Vec::new(),
            category: None,
            audio_streams: Vec::new(),
            video_streams: Vec::new(),
            hls_url: None,
            dash_mpd_url: None,
            related_items: Vec::new(),
        }
    }

    /// Best audio stream by average bitrate
    pub fn best_audio(&self) -> Option<&AudioStream> {
        self.audio_streams.iter().max_by_key(|s| s.bitrate)
    }

    /// Best video stream by height, then bitrate
    pub fn best_video(&self) -> Option<&VideoStream> {
        self.video_streams
            .iter()
            .max_by_key(|s| (s.height.unwrap_or(0), s.bitrate))
    }

    /// Whether this is live content
    pub fn is_live(&self) -> bool {
        self.stream_type == StreamType::Live
    }
}

/// Helpers for carrying itag catalog data into stream variants
impl AudioStream {
    pub fn from_itag(url: String, itag: &ItagItem) -> Self {
        Self {
            url,
            itag: itag.id,
            format: itag.format,
            average_bitrate: itag.avg_bitrate,
            bitrate: 0,
            codec: None,
            audio_sample_rate: None,
            audio_channels: None,
            content_length: None,
        }
    }
}

impl VideoStream {
    pub fn from_itag(url: String, itag: &ItagItem, is_video_only: bool) -> Self {
        Self {
            url,
            itag: itag.id,
            format: itag.format,
            resolution: itag.resolution.unwrap_or("").to_string(),
            is_video_only,
            bitrate: 0,
            codec: None,
            width: None,
            height: None,
            fps: None,
            content_length: None,
        }
    }
}
