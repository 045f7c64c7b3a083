//! Playlist records

use serde::{Deserialize, Serialize};

use crate::model::item::Image;

/// Playlist-level information from the browse response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistInfo {
    pub id: String,
    pub name: String,
    pub url: String,
    pub description: Option<String>,
    pub uploader_name: Option<String>,
    pub uploader_url: Option<String>,
    pub stream_count: Option<u64>,
    pub view_count: Option<u64>,
    pub thumbnails: Vec<Image>,
}

impl PlaylistInfo {
    pub fn new(id: String, name: String) -> Self {
        let url = format!("https://www.youtube.com/playlist?list={id}");
        Self {
            id,
            name,
            url,
            description: None,
            uploader_name: None,
            uploader_url: None,
            stream_count: None,
            view_count: None,
            thumbnails: Vec::new(),
        }
    }
}
