//! Comment records

use serde::{Deserialize, Serialize};

use crate::model::item::Image;
use crate::utils::timeago::UploadDate;

/// A single comment from the comments section of a watch page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentInfo {
    /// Service-issued comment ID
    pub id: String,
    /// Comment text, with text runs joined
    pub text: String,
    pub author_name: Option<String>,
    pub author_id: Option<String>,
    pub author_url: Option<String>,
    pub author_avatars: Vec<Image>,
    /// The comment author is the video's uploader
    pub author_is_uploader: bool,
    pub like_count: Option<u64>,
    pub reply_count: Option<u64>,
    /// Textual published date as shown ("2 days ago")
    pub published_text: Option<String>,
    /// Approximated published date
    pub published: Option<UploadDate>,
    pub is_pinned: bool,
    /// The uploader marked the comment with a heart
    pub is_hearted: bool,
}

impl CommentInfo {
    pub fn new(id: String, text: String) -> Self {
        Self {
            id,
            text,
            author_name: None,
            author_id: None,
            author_url: None,
            author_avatars: Vec::new(),
            author_is_uploader: false,
            like_count: None,
            reply_count: None,
            published_text: None,
            published: None,
            is_pinned: false,
            is_hearted: false,
        }
    }
}
