//! Textual relative-date parsing ("3 weeks ago") into approximate timestamps
//!
//! The platform only exposes coarse relative dates on list pages, so the
//! resulting timestamps are approximations and flagged as such.

use chrono::{DateTime, Duration, Utc};

use crate::error::ExtractError;
use crate::utils::text::strip_approximation;

/// An upload date, either exact (from a watch page) or approximated from a
/// textual relative date
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UploadDate {
    pub date: DateTime<Utc>,
    pub is_approximation: bool,
}

impl UploadDate {
    pub fn exact(date: DateTime<Utc>) -> Self {
        Self {
            date,
            is_approximation: false,
        }
    }

    pub fn approximated(date: DateTime<Utc>) -> Self {
        Self {
            date,
            is_approximation: true,
        }
    }
}

/// Parse an English relative date label relative to `now`
pub fn parse_relative_at(text: &str, now: DateTime<Utc>) -> Result<UploadDate, ExtractError> {
    let cleaned = strip_approximation(text).to_lowercase();
    let cleaned = cleaned
        .trim_start_matches("streamed ")
        .trim_start_matches("premiered ")
        .trim_end_matches(" ago")
        .trim();

    if cleaned == "just now" || cleaned == "moments" || cleaned == "now" {
        return Ok(UploadDate::approximated(now));
    }

    let mut parts = cleaned.split_whitespace();
    let amount_str = parts
        .next()
        .ok_or_else(|| ExtractError::Parse(format!("Empty relative date: {text}")))?;
    let unit = parts
        .next()
        .ok_or_else(|| ExtractError::Parse(format!("Missing time unit: {text}")))?;

    let amount: i64 = match amount_str {
        "a" | "an" | "one" => 1,
        n => n
            .parse()
            .map_err(|_| ExtractError::Parse(format!("Invalid amount: {text}")))?,
    };

    let offset = match unit.trim_end_matches('s') {
        "second" | "sec" => Duration::seconds(amount),
        "minute" | "min" => Duration::minutes(amount),
        "hour" => Duration::hours(amount),
        "day" => Duration::days(amount),
        "week" => Duration::weeks(amount),
        "month" => Duration::days(amount * 30),
        "year" => Duration::days(amount * 365),
        other => {
            return Err(ExtractError::Parse(format!(
                "Unknown time unit '{other}' in: {text}"
            )))
        }
    };

    Ok(UploadDate::approximated(now - offset))
}

/// Parse an English relative date label relative to the current time
pub fn parse_relative(text: &str) -> Result<UploadDate, ExtractError> {
    parse_relative_at(text, Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_relative_units() {
        let base = now();
        assert_eq!(
            parse_relative_at("5 seconds ago", base).unwrap().date,
            base - Duration::seconds(5)
        );
        assert_eq!(
            parse_relative_at("10 minutes ago", base).unwrap().date,
            base - Duration::minutes(10)
        );
        assert_eq!(
            parse_relative_at("2 hours ago", base).unwrap().date,
            base - Duration::hours(2)
        );
        assert_eq!(
            parse_relative_at("3 weeks ago", base).unwrap().date,
            base - Duration::weeks(3)
        );
        assert_eq!(
            parse_relative_at("4 months ago", base).unwrap().date,
            base - Duration::days(120)
        );
        assert_eq!(
            parse_relative_at("2 years ago", base).unwrap().date,
            base - Duration::days(730)
        );
    }

    #[test]
    fn test_parse_relative_word_amounts() {
        let base = now();
        assert_eq!(
            parse_relative_at("a day ago", base).unwrap().date,
            base - Duration::days(1)
        );
        assert_eq!(
            parse_relative_at("an hour ago", base).unwrap().date,
            base - Duration::hours(1)
        );
    }

    #[test]
    fn test_parse_relative_prefixes() {
        let base = now();
        assert_eq!(
            parse_relative_at("Streamed 2 days ago", base).unwrap().date,
            base - Duration::days(2)
        );
        assert_eq!(
            parse_relative_at("Premiered 1 week ago", base).unwrap().date,
            base - Duration::weeks(1)
        );
    }

    #[test]
    fn test_parse_relative_is_approximation() {
        assert!(parse_relative_at("1 hour ago", now()).unwrap().is_approximation);
    }

    #[test]
    fn test_parse_relative_invalid() {
        assert!(parse_relative_at("", now()).is_err());
        assert!(parse_relative_at("yesterday-ish", now()).is_err());
        assert!(parse_relative_at("5 fortnights ago", now()).is_err());
    }
}
