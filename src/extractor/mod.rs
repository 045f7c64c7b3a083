//! Extractors: one per entity kind, all built on the InnerTube client
//!
//! List extractors share the same pagination contract: `initial_page`
//! fetches the entity and its first batch of items, `page` follows an
//! opaque [`Page`] cursor produced by a previous call. Cursors are only
//! valid against the extractor kind that produced them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ExtractError;

pub mod channel;
pub mod comments;
pub mod items;
pub mod playlist;
pub mod search;
pub mod stream;
pub mod trending;

pub use channel::ChannelExtractor;
pub use comments::CommentsExtractor;
pub use playlist::PlaylistExtractor;
pub use search::{SearchExtractor, SearchFilter};
pub use stream::StreamExtractor;
pub use trending::TrendingExtractor;

/// Opaque cursor to the next page of a list. Callers pass it back verbatim;
/// its contents carry no meaning outside the extractor that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Page URL, informational
    pub url: String,
    /// Continuation token posted back to the API
    pub token: Option<String>,
}

impl Page {
    pub fn for_token(url: &str, token: &str) -> Self {
        Self {
            url: url.to_string(),
            token: Some(token.to_string()),
        }
    }

    fn token_or_err(&self) -> Result<&str, ExtractError> {
        self.token
            .as_deref()
            .ok_or_else(|| ExtractError::Parse("Page cursor has no continuation token".to_string()))
    }
}

/// One batch of items plus the cursor to the next batch, if any
#[derive(Debug, Clone)]
pub struct ListPage<T> {
    pub items: Vec<T>,
    pub next_page: Option<Page>,
}

impl<T> ListPage<T> {
    pub fn new(items: Vec<T>, next_page: Option<Page>) -> Self {
        Self { items, next_page }
    }

    pub fn has_next_page(&self) -> bool {
        self.next_page.is_some()
    }
}

/// Common pagination surface of list-producing extractors
#[async_trait]
pub trait ListExtractor {
    type Item;

    /// Fetch the first page of items
    async fn initial_page(&mut self) -> Result<ListPage<Self::Item>, ExtractError>;

    /// Follow a cursor from a previous page
    async fn page(&mut self, page: &Page) -> Result<ListPage<Self::Item>, ExtractError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_cursor_roundtrip() {
        let page = Page::for_token("https://www.youtube.com/results?q=x", "4qmFsgK");
        let json = serde_json::to_string(&page).unwrap();
        let back: Page = serde_json::from_str(&json).unwrap();
        assert_eq!(page, back);
        assert_eq!(back.token_or_err().unwrap(), "4qmFsgK");
    }

    #[test]
    fn test_page_without_token_is_rejected() {
        let page = Page {
            url: "https://www.youtube.com".to_string(),
            token: None,
        };
        assert!(matches!(page.token_or_err(), Err(ExtractError::Parse(_))));
    }

    #[test]
    fn test_list_page() {
        let page: ListPage<u32> = ListPage::new(vec![1, 2], None);
        assert!(!page.has_next_page());
        assert_eq!(page.items.len(), 2);
    }
}
