//! Catalog of the platform's numeric encoding-profile ids ("itags")
//!
//! The table mirrors the ids the service is known to hand out; ids not in
//! the table are treated as unsupported and skipped by the stream extractor.

use serde::{Deserialize, Serialize};

use crate::error::ExtractError;

/// What kind of media an itag carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItagType {
    Audio,
    /// Progressive video with an audio track
    Video,
    /// Adaptive video without audio
    VideoOnly,
}

/// Container/codec format for an itag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaFormat {
    Mpeg4,
    V3gpp,
    Webm,
    M4a,
    Webma,
    WebmaOpus,
}

impl MediaFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            MediaFormat::Mpeg4 => "video/mp4",
            MediaFormat::V3gpp => "video/3gpp",
            MediaFormat::Webm => "video/webm",
            MediaFormat::M4a => "audio/mp4",
            MediaFormat::Webma | MediaFormat::WebmaOpus => "audio/webm",
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            MediaFormat::Mpeg4 => "mp4",
            MediaFormat::V3gpp => "3gp",
            MediaFormat::Webm => "webm",
            MediaFormat::M4a => "m4a",
            MediaFormat::Webma | MediaFormat::WebmaOpus => "webm",
        }
    }
}

pub const AVERAGE_BITRATE_UNKNOWN: i32 = -1;

/// One row of the itag catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItagItem {
    pub id: u32,
    pub itag_type: ItagType,
    pub format: MediaFormat,
    /// Resolution label for video itags
    pub resolution: Option<&'static str>,
    /// Frame rate for video itags, 30 unless the profile says otherwise
    pub fps: u32,
    /// Average bitrate in kbit/s for audio itags
    pub avg_bitrate: i32,
}

const fn video(id: u32, format: MediaFormat, resolution: &'static str) -> ItagItem {
    ItagItem {
        id,
        itag_type: ItagType::Video,
        format,
        resolution: Some(resolution),
        fps: 30,
        avg_bitrate: AVERAGE_BITRATE_UNKNOWN,
    }
}

const fn video_only(id: u32, format: MediaFormat, resolution: &'static str, fps: u32) -> ItagItem {
    ItagItem {
        id,
        itag_type: ItagType::VideoOnly,
        format,
        resolution: Some(resolution),
        fps,
        avg_bitrate: AVERAGE_BITRATE_UNKNOWN,
    }
}

const fn audio(id: u32, format: MediaFormat, avg_bitrate: i32) -> ItagItem {
    ItagItem {
        id,
        itag_type: ItagType::Audio,
        format,
        resolution: None,
        fps: 0,
        avg_bitrate,
    }
}

const ITAG_LIST: &[ItagItem] = &[
    // Progressive video
    video(17, MediaFormat::V3gpp, "144p"),
    video(36, MediaFormat::V3gpp, "240p"),
    video(18, MediaFormat::Mpeg4, "360p"),
    video(34, MediaFormat::Mpeg4, "360p"),
    video(35, MediaFormat::Mpeg4, "480p"),
    video(59, MediaFormat::Mpeg4, "480p"),
    video(78, MediaFormat::Mpeg4, "480p"),
    video(22, MediaFormat::Mpeg4, "720p"),
    video(37, MediaFormat::Mpeg4, "1080p"),
    video(38, MediaFormat::Mpeg4, "1080p"),
    video(43, MediaFormat::Webm, "360p"),
    video(44, MediaFormat::Webm, "480p"),
    video(45, MediaFormat::Webm, "720p"),
    video(46, MediaFormat::Webm, "1080p"),
    // Audio
    audio(171, MediaFormat::Webma, 128),
    audio(172, MediaFormat::Webma, 256),
    audio(139, MediaFormat::M4a, 48),
    audio(140, MediaFormat::M4a, 128),
    audio(141, MediaFormat::M4a, 256),
    audio(249, MediaFormat::WebmaOpus, 50),
    audio(250, MediaFormat::WebmaOpus, 70),
    audio(251, MediaFormat::WebmaOpus, 160),
    // Video only
    video_only(160, MediaFormat::Mpeg4, "144p", 30),
    video_only(133, MediaFormat::Mpeg4, "240p", 30),
    video_only(134, MediaFormat::Mpeg4, "360p", 30),
    video_only(135, MediaFormat::Mpeg4, "480p", 30),
    video_only(212, MediaFormat::Mpeg4, "480p", 30),
    video_only(136, MediaFormat::Mpeg4, "720p", 30),
    video_only(298, MediaFormat::Mpeg4, "720p60", 60),
    video_only(137, MediaFormat::Mpeg4, "1080p", 30),
    video_only(299, MediaFormat::Mpeg4, "1080p60", 60),
    video_only(266, MediaFormat::Mpeg4, "2160p", 30),
    video_only(278, MediaFormat::Webm, "144p", 30),
    video_only(242, MediaFormat::Webm, "240p", 30),
    video_only(243, MediaFormat::Webm, "360p", 30),
    video_only(244, MediaFormat::Webm, "480p", 30),
    video_only(245, MediaFormat::Webm, "480p", 30),
    video_only(246, MediaFormat::Webm, "480p", 30),
    video_only(247, MediaFormat::Webm, "720p", 30),
    video_only(248, MediaFormat::Webm, "1080p", 30),
    video_only(271, MediaFormat::Webm, "1440p", 30),
    // 272 is served as either 4K or 8K depending on the video
    video_only(272, MediaFormat::Webm, "2160p", 30),
    video_only(302, MediaFormat::Webm, "720p60", 60),
    video_only(303, MediaFormat::Webm, "1080p60", 60),
    video_only(308, MediaFormat::Webm, "1440p60", 60),
    video_only(313, MediaFormat::Webm, "2160p", 30),
    video_only(315, MediaFormat::Webm, "2160p60", 60),
];

/// Check whether an itag is in the catalog
pub fn is_supported(itag: u32) -> bool {
    ITAG_LIST.iter().any(|item| item.id == itag)
}

/// Look up an itag, failing for ids the catalog does not know
pub fn get_itag(itag: u32) -> Result<ItagItem, ExtractError> {
    ITAG_LIST
        .iter()
        .find(|item| item.id == itag)
        .copied()
        .ok_or(ExtractError::UnsupportedItag(itag))
}
