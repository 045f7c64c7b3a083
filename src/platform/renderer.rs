//! Defensive navigation over the platform's renderer trees
//!
//! Renderer objects are undocumented JSON templates that change without
//! notice, so every lookup here returns `Option` and callers try several
//! known shapes in order. None of this reflects a stable schema.

use serde_json::Value;

use crate::model::item::Image;

/// Walk a sequence of object keys, returning `None` as soon as one is absent
pub fn path<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    let mut current = value;
    for key in keys {
        current = current.get(key)?;
    }
    Some(current)
}

/// `path` ending in an array
pub fn array_at<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Vec<Value>> {
    path(value, keys)?.as_array()
}

/// `path` ending in a string
pub fn string_at<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a str> {
    path(value, keys)?.as_str()
}

/// `path` ending in a number, accepting the numeric-string form the service
/// also uses ("lengthSeconds": "212")
pub fn u64_at(value: &Value, keys: &[&str]) -> Option<u64> {
    let v = path(value, keys)?;
    v.as_u64().or_else(|| v.as_str()?.parse().ok())
}

/// Return the first of several candidate paths that resolves
pub fn first_of<'a>(value: &'a Value, candidates: &[&[&str]]) -> Option<&'a Value> {
    candidates.iter().find_map(|keys| path(value, keys))
}

/// Extract display text from a text object, which is served either as
/// `{"simpleText": …}`, `{"runs": [{"text": …}, …]}` or the attributed
/// `{"content": …}` form
pub fn text_of(value: &Value) -> Option<String> {
    if let Some(simple) = value.get("simpleText").and_then(Value::as_str) {
        return Some(simple.to_string());
    }
    if let Some(runs) = value.get("runs").and_then(Value::as_array) {
        let joined: String = runs
            .iter()
            .filter_map(|run| run.get("text").and_then(Value::as_str))
            .collect();
        if !joined.is_empty() {
            return Some(joined);
        }
    }
    if let Some(content) = value.get("content").and_then(Value::as_str) {
        return Some(content.to_string());
    }
    value.as_str().map(|s| s.to_string())
}

/// `path` ending in a text object
pub fn text_at(value: &Value, keys: &[&str]) -> Option<String> {
    text_of(path(value, keys)?)
}

/// Collect thumbnail variants from a `{"thumbnails": [...]}` object or a
/// bare thumbnail array
pub fn thumbnails_of(value: &Value) -> Vec<Image> {
    let list = value
        .get("thumbnails")
        .and_then(Value::as_array)
        .or_else(|| value.as_array());

    list.map(|entries| {
        entries
            .iter()
            .filter_map(|entry| {
                let url = entry.get("url")?.as_str()?;
                // Scheme-relative avatar URLs show up on older shapes
                let url = if url.starts_with("//") {
                    format!("https:{url}")
                } else {
                    url.to_string()
                };
                Some(Image {
                    url,
                    width: entry.get("width").and_then(Value::as_u64).map(|w| w as u32),
                    height: entry.get("height").and_then(Value::as_u64).map(|h| h as u32),
                })
            })
            .collect()
    })
    .unwrap_or_default()
}

/// Extract the URL a navigation endpoint points at, trying the browse,
/// watch and generic web-command shapes
pub fn navigation_url(endpoint: &Value) -> Option<String> {
    if let Some(base) = string_at(
        endpoint,
        &["browseEndpoint", "canonicalBaseUrl"],
    ) {
        return Some(format!("https://www.youtube.com{base}"));
    }
    if let Some(id) = string_at(endpoint, &["browseEndpoint", "browseId"]) {
        return Some(crate::utils::url::channel_url(id));
    }
    if let Some(video_id) = string_at(endpoint, &["watchEndpoint", "videoId"]) {
        return Some(crate::utils::url::watch_url(video_id));
    }
    if let Some(url) = string_at(
        endpoint,
        &["commandMetadata", "webCommandMetadata", "url"],
    ) {
        return Some(format!("https://www.youtube.com{url}"));
    }
    None
}

/// Extract a continuation token from a list of contents, trying the shapes
/// the service has used over time
pub fn continuation_token(contents: &[Value]) -> Option<String> {
    // Current shape: a trailing continuationItemRenderer
    for entry in contents.iter().rev() {
        if let Some(token) = string_at(
            entry,
            &[
                "continuationItemRenderer",
                "continuationEndpoint",
                "continuationCommand",
                "token",
            ],
        ) {
            return Some(token.to_string());
        }
        // Button-style continuation used by some comment shapes
        if let Some(token) = string_at(
            entry,
            &[
                "continuationItemRenderer",
                "button",
                "buttonRenderer",
                "command",
                "continuationCommand",
                "token",
            ],
        ) {
            return Some(token.to_string());
        }
    }
    None
}

/// Legacy continuation shape: a sibling `continuations` array with
/// `nextContinuationData`
pub fn legacy_continuation_token(renderer: &Value) -> Option<String> {
    array_at(renderer, &["continuations"])?
        .iter()
        .find_map(|c| string_at(c, &["nextContinuationData", "continuation"]))
        .map(|s| s.to_string())
}

/// Whether a renderer's badge list contains a badge whose style or icon
/// contains the given marker (verified ticks, live badges, …)
pub fn has_badge(renderer: &Value, badge_key: &str, marker: &str) -> bool {
    let Some(badges) = renderer.get(badge_key).and_then(Value::as_array) else {
        return false;
    };
    badges.iter().any(|badge| {
        string_at(badge, &["metadataBadgeRenderer", "style"])
            .or_else(|| string_at(badge, &["metadataBadgeRenderer", "icon", "iconType"]))
            .map(|s| s.contains(marker))
            .unwrap_or(false)
    })
}

/// Whether a channel owner badge list marks the owner as verified
pub fn is_verified(renderer: &Value) -> bool {
    has_badge(renderer, "ownerBadges", "VERIFIED")
        || has_badge(renderer, "badges", "VERIFIED")
        || has_badge(renderer, "ownerBadges", "CHECK")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_path_walking() {
        let v = json!({"a": {"b": {"c": 42}}});
        assert_eq!(path(&v, &["a", "b", "c"]).and_then(Value::as_u64), Some(42));
        assert!(path(&v, &["a", "x"]).is_none());
        assert!(path(&v, &["a", "b", "c", "d"]).is_none());
    }

    #[test]
    fn test_u64_accepts_numeric_strings() {
        let v = json!({"lengthSeconds": "212", "viewCount": 1000});
        assert_eq!(u64_at(&v, &["lengthSeconds"]), Some(212));
        assert_eq!(u64_at(&v, &["viewCount"]), Some(1000));
        assert_eq!(u64_at(&v, &["missing"]), None);
    }

    #[test]
    fn test_text_of_simple_text() {
        let v = json!({"simpleText": "Hello"});
        assert_eq!(text_of(&v), Some("Hello".to_string()));
    }

    #[test]
    fn test_text_of_runs() {
        let v = json!({"runs": [{"text": "Hello "}, {"text": "world"}]});
        assert_eq!(text_of(&v), Some("Hello world".to_string()));
    }

    #[test]
    fn test_text_of_attributed() {
        let v = json!({"content": "Attributed text"});
        assert_eq!(text_of(&v), Some("Attributed text".to_string()));
    }

    #[test]
    fn test_first_of() {
        let v = json!({"newShape": {"title": "t"}});
        let hit = first_of(
            &v,
            &[&["oldShape", "title"], &["newShape", "title"]],
        );
        assert_eq!(hit.and_then(Value::as_str), Some("t"));
    }

    #[test]
    fn test_thumbnails() {
        let v = json!({"thumbnails": [
            {"url": "https://i.example/1.jpg", "width": 120, "height": 90},
            {"url": "//i.example/2.jpg"}
        ]});
        let thumbs = thumbnails_of(&v);
        assert_eq!(thumbs.len(), 2);
        assert_eq!(thumbs[0].width, Some(120));
        assert_eq!(thumbs[1].url, "https://i.example/2.jpg");
        assert_eq!(thumbs[1].width, None);
    }

    #[test]
    fn test_continuation_token_current_shape() {
        let contents = vec![
            json!({"videoRenderer": {"videoId": "a"}}),
            json!({"continuationItemRenderer": {"continuationEndpoint": {
                "continuationCommand": {"token": "4qmFsgK…"}
            }}}),
        ];
        assert_eq!(continuation_token(&contents), Some("4qmFsgK…".to_string()));
    }

    #[test]
    fn test_continuation_token_button_shape() {
        let contents = vec![json!({"continuationItemRenderer": {"button": {
            "buttonRenderer": {"command": {"continuationCommand": {"token": "tok"}}}
        }}})];
        assert_eq!(continuation_token(&contents), Some("tok".to_string()));
    }

    #[test]
    fn test_continuation_token_absent() {
        let contents = vec![json!({"videoRenderer": {}})];
        assert_eq!(continuation_token(&contents), None);
    }

    #[test]
    fn test_legacy_continuation_token() {
        let renderer = json!({"continuations": [
            {"nextContinuationData": {"continuation": "legacy-tok"}}
        ]});
        assert_eq!(
            legacy_continuation_token(&renderer),
            Some("legacy-tok".to_string())
        );
    }

    #[test]
    fn test_navigation_url_shapes() {
        let browse = json!({"browseEndpoint": {
            "browseId": "UCx", "canonicalBaseUrl": "/@handle"
        }});
        assert_eq!(
            navigation_url(&browse),
            Some("https://www.youtube.com/@handle".to_string())
        );

        let browse_id_only = json!({"browseEndpoint": {"browseId": "UCx"}});
        assert_eq!(
            navigation_url(&browse_id_only),
            Some("https://www.youtube.com/channel/UCx".to_string())
        );

        let watch = json!({"watchEndpoint": {"videoId": "dQw4w9WgXcQ"}});
        assert_eq!(
            navigation_url(&watch),
            Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string())
        );

        assert_eq!(navigation_url(&json!({})), None);
    }

    #[test]
    fn test_verified_badge() {
        let owner = json!({"ownerBadges": [{"metadataBadgeRenderer": {
            "style": "BADGE_STYLE_TYPE_VERIFIED"
        }}]});
        assert!(is_verified(&owner));

        let artist = json!({"badges": [{"metadataBadgeRenderer": {
            "style": "BADGE_STYLE_TYPE_VERIFIED_ARTIST"
        }}]});
        assert!(is_verified(&artist));

        assert!(!is_verified(&json!({})));
    }
}
