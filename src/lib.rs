//! # tubetap
//!
//! Content-extraction library for a large video platform: maps the
//! platform's internal JSON API and its volatile renderer trees onto a
//! stable domain model of streams, channels, playlists, comments and
//! search results.
//!
//! ## Example
//!
//! ```rust,no_run
//! use tubetap::extractor::StreamExtractor;
//!
//! #[tokio::main]
//! async fn main() -> tubetap::Result<()> {
//!     let mut extractor = StreamExtractor::new();
//!     let info = extractor.fetch("https://www.youtube.com/watch?v=dQw4w9WgXcQ").await?;
//!
//!     println!("{} by {:?}", info.title, info.uploader_name);
//!     if let Some(audio) = info.best_audio() {
//!         println!("best audio: itag {} at {}", audio.itag, audio.url);
//!     }
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod error;
pub mod extractor;
pub mod model;
pub mod platform;
pub mod utils;

pub use error::ExtractError;
pub use extractor::{
    ChannelExtractor, CommentsExtractor, ListExtractor, ListPage, Page, PlaylistExtractor,
    SearchExtractor, SearchFilter, StreamExtractor, TrendingExtractor,
};
pub use model::{ChannelInfo, CommentInfo, PlaylistInfo, SearchResult, StreamInfo};

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, ExtractError>;
