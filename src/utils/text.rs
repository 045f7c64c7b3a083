//! Parsing helpers for the textual scalar fields the platform returns

use crate::error::ExtractError;

/// Parse a mixed number word like "1.2M", "346K", "3,456" or "12 456" into
/// an absolute count. Returns an error for strings with no digits at all.
pub fn parse_mixed_number(text: &str) -> Result<u64, ExtractError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ExtractError::Parse("Empty number string".to_string()));
    }

    // Letters before the first digit belong to a leading phrase ("like this
    // video along with 98,765 other people"); letters after it are either a
    // magnitude suffix or the start of a trailing word ("views", ...)
    let mut digits = String::new();
    let mut multiplier = 1u64;
    for c in trimmed.chars() {
        match c {
            '0'..='9' => digits.push(c),
            '.' if !digits.is_empty() => digits.push(c),
            ',' | ' ' | '\u{a0}' => {}
            'k' | 'K' if !digits.is_empty() => {
                multiplier = 1_000;
                break;
            }
            'm' | 'M' if !digits.is_empty() => {
                multiplier = 1_000_000;
                break;
            }
            'b' | 'B' if !digits.is_empty() => {
                multiplier = 1_000_000_000;
                break;
            }
            c if c.is_alphabetic() && !digits.is_empty() => break,
            _ => {}
        }
    }

    if digits.is_empty() {
        return Err(ExtractError::Parse(format!(
            "No digits in number string: {trimmed}"
        )));
    }

    let value: f64 = digits
        .parse()
        .map_err(|_| ExtractError::Parse(format!("Invalid number: {digits}")))?;
    Ok((value * multiplier as f64).round() as u64)
}

/// Parse a `H:MM:SS`, `M:SS` or `D:HH:MM:SS` duration label into seconds
pub fn parse_duration(text: &str) -> Result<u64, ExtractError> {
    let parts: Vec<&str> = text.trim().split(':').collect();
    if parts.is_empty() || parts.len() > 4 {
        return Err(ExtractError::Parse(format!("Invalid duration: {text}")));
    }

    let mut seconds = 0u64;
    for part in &parts {
        let n: u64 = part
            .trim()
            .parse()
            .map_err(|_| ExtractError::Parse(format!("Invalid duration: {text}")))?;
        seconds = seconds * 60 + n;
    }
    // A four-part label is days:hours:minutes:seconds, so the first factor
    // was 60 where it should have been 24
    if parts.len() == 4 {
        let days: u64 = parts[0].trim().parse()?;
        seconds = seconds - days * 60 * 60 * 60 + days * 24 * 60 * 60;
    }
    Ok(seconds)
}

/// Strip a leading "about", "approximately" etc. that some counters carry
pub fn strip_approximation(text: &str) -> &str {
    text.trim()
        .trim_start_matches("about ")
        .trim_start_matches("About ")
        .trim_start_matches('~')
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mixed_number_plain() {
        assert_eq!(parse_mixed_number("3456").unwrap(), 3456);
        assert_eq!(parse_mixed_number("3,456").unwrap(), 3456);
        assert_eq!(parse_mixed_number("12 456").unwrap(), 12456);
        assert_eq!(parse_mixed_number("1,234,567 views").unwrap(), 1_234_567);
    }

    #[test]
    fn test_parse_mixed_number_abbreviated() {
        assert_eq!(parse_mixed_number("1.2M").unwrap(), 1_200_000);
        assert_eq!(parse_mixed_number("346K subscribers").unwrap(), 346_000);
        assert_eq!(parse_mixed_number("1.5B views").unwrap(), 1_500_000_000);
        assert_eq!(parse_mixed_number("12 K").unwrap(), 12_000);
    }

    #[test]
    fn test_parse_mixed_number_with_leading_words() {
        assert_eq!(
            parse_mixed_number("like this video along with 98,765 other people").unwrap(),
            98_765
        );
        // The 'b' in the leading word must not be read as a magnitude suffix
        assert_eq!(parse_mixed_number("Subscribe 1.2M").unwrap(), 1_200_000);
    }

    #[test]
    fn test_parse_mixed_number_invalid() {
        assert!(parse_mixed_number("").is_err());
        assert!(parse_mixed_number("no numbers here").is_err());
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("0:45").unwrap(), 45);
        assert_eq!(parse_duration("3:21").unwrap(), 201);
        assert_eq!(parse_duration("1:02:03").unwrap(), 3723);
        assert_eq!(parse_duration("12").unwrap(), 12);
        // 1 day, 1 hour
        assert_eq!(parse_duration("1:01:00:00").unwrap(), 25 * 3600);

        assert!(parse_duration("a:bc").is_err());
        assert!(parse_duration("1:2:3:4:5").is_err());
    }

    #[test]
    fn test_strip_approximation() {
        assert_eq!(strip_approximation("about 2 hours ago"), "2 hours ago");
        assert_eq!(strip_approximation("~150"), "150");
        assert_eq!(strip_approximation("  3 weeks ago "), "3 weeks ago");
    }
}
