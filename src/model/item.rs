//! List-page tiles: the small records produced by list extractors

use serde::{Deserialize, Serialize};

use crate::model::stream::StreamType;
use crate::utils::timeago::UploadDate;

/// A thumbnail or avatar variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// A single video tile on a list page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamInfoItem {
    /// Video ID
    pub id: String,
    /// Video title
    pub title: String,
    /// Canonical watch URL
    pub url: String,
    /// Uploader display name
    pub uploader_name: Option<String>,
    /// Uploader channel URL
    pub uploader_url: Option<String>,
    /// Uploader carries a verified badge
    pub uploader_verified: bool,
    /// Duration in seconds, absent for live content
    pub duration: Option<u64>,
    /// View count if the tile exposes one
    pub view_count: Option<u64>,
    /// Textual upload date as shown ("3 weeks ago")
    pub upload_date_text: Option<String>,
    /// Approximated upload date parsed from the textual one
    pub upload_date: Option<UploadDate>,
    /// Thumbnail variants
    pub thumbnails: Vec<Image>,
    /// Video or live stream
    pub stream_type: StreamType,
}

impl StreamInfoItem {
    pub fn new(id: String, title: String) -> Self {
        let url = crate::utils::url::watch_url(&id);
        Self {
            id,
            title,
            url,
            uploader_name: None,
            uploader_url: None,
            uploader_verified: false,
            duration: None,
            view_count: None,
            upload_date_text: None,
            upload_date: None,
            thumbnails: Vec::new(),
            stream_type: StreamType::Video,
        }
    }
}

/// A channel tile on a list page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelInfoItem {
    pub id: String,
    pub name: String,
    pub url: String,
    pub description: Option<String>,
    pub subscriber_count: Option<u64>,
    pub verified: bool,
    pub avatars: Vec<Image>,
}

/// A playlist tile on a list page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistInfoItem {
    pub id: String,
    pub name: String,
    pub url: String,
    pub uploader_name: Option<String>,
    pub stream_count: Option<u64>,
    pub thumbnails: Vec<Image>,
}
