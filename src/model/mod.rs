//! Domain model: service-agnostic records assembled from whatever the
//! platform currently returns. Constructed once per page fetch, no lifecycle.

pub mod channel;
pub mod comment;
pub mod item;
pub mod playlist;
pub mod search;
pub mod stream;

pub use channel::{ChannelInfo, ChannelTab};
pub use comment::CommentInfo;
pub use item::{ChannelInfoItem, Image, PlaylistInfoItem, StreamInfoItem};
pub use playlist::PlaylistInfo;
pub use search::{SearchItem, SearchResult};
pub use stream::{AudioStream, StreamInfo, StreamType, VideoStream};
