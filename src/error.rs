//! Error types for tubetap

use thiserror::Error;

/// Main error type for extraction operations
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Content unavailable: {0}")]
    ContentUnavailable(String),

    #[error("Content is private")]
    Private,

    #[error("Content is age-restricted")]
    AgeRestricted,

    #[error("Content is not available in this region: {0}")]
    GeoRestricted(String),

    #[error("Content requires payment")]
    PaidContent,

    #[error("Rate limited or recaptcha challenge")]
    RateLimited,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unsupported itag: {0}")]
    UnsupportedItag(u32),

    #[error("Deobfuscation failed: {0}")]
    Deobfuscation(String),

    #[error("Nothing found")]
    NothingFound,

    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Number parsing error: {0}")]
    ParseInt(#[from] std::num::ParseIntError),
}

impl ExtractError {
    /// Check if the error is worth retrying, possibly with a different client
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ExtractError::Network(_) | ExtractError::RateLimited | ExtractError::AgeRestricted
        )
    }

    /// Check if the error describes the state of the remote content rather
    /// than a failure of the extraction itself
    pub fn is_content_error(&self) -> bool {
        matches!(
            self,
            ExtractError::ContentUnavailable(_)
                | ExtractError::Private
                | ExtractError::AgeRestricted
                | ExtractError::GeoRestricted(_)
                | ExtractError::PaidContent
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(ExtractError::RateLimited.is_retryable());
        assert!(ExtractError::AgeRestricted.is_retryable());
        assert!(!ExtractError::Private.is_retryable());
        assert!(!ExtractError::Parse("x".to_string()).is_retryable());
    }

    #[test]
    fn test_content_errors() {
        assert!(ExtractError::Private.is_content_error());
        assert!(ExtractError::PaidContent.is_content_error());
        assert!(ExtractError::GeoRestricted("DE".to_string()).is_content_error());
        assert!(!ExtractError::NothingFound.is_content_error());
        assert!(!ExtractError::RateLimited.is_content_error());
    }
}
