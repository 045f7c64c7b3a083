//! Shared utilities

pub mod cache;
pub mod text;
pub mod timeago;
pub mod url;
