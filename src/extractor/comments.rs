//! Comment extraction from the watch-next comments section
//!
//! Comments are only reachable through a continuation: the watch-next
//! response carries the section token, and every comment batch is a
//! continuation response. Two payload generations are in circulation, the
//! legacy `commentRenderer` tree and the newer entity-payload batch.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::error::ExtractError;
use crate::model::comment::CommentInfo;
use crate::model::item::Image;
use crate::platform::innertube::InnerTube;
use crate::platform::renderer::{
    self, array_at, first_of, string_at, text_at, text_of, thumbnails_of, u64_at,
};
use crate::utils::{text, timeago, url};

use super::{ListExtractor, ListPage, Page};

/// Extractor for the comments of a single video
pub struct CommentsExtractor {
    tube: InnerTube,
    target: String,
}

impl CommentsExtractor {
    pub fn new(url_or_id: &str) -> Self {
        Self::with_innertube(InnerTube::new(), url_or_id)
    }

    pub fn with_innertube(tube: InnerTube, url_or_id: &str) -> Self {
        Self {
            tube,
            target: url_or_id.to_string(),
        }
    }
}

#[async_trait]
impl ListExtractor for CommentsExtractor {
    type Item = CommentInfo;

    async fn initial_page(&mut self) -> Result<ListPage<Self::Item>, ExtractError> {
        let video_id = url::extract_video_id(&self.target)?;
        let next = self.tube.next(&video_id).await?;

        let token = comments_section_token(&next).ok_or_else(|| {
            ExtractError::ContentUnavailable(
                "Comments are unavailable for this video".to_string(),
            )
        })?;

        let page = Page::for_token(&url::watch_url(&video_id), &token);
        self.page(&page).await
    }

    async fn page(&mut self, page: &Page) -> Result<ListPage<Self::Item>, ExtractError> {
        let token = page.token_or_err()?;
        let response = self.tube.next_continuation(token).await?;

        let contents = continuation_items(&response).unwrap_or_default();
        let entities = entity_payloads(&response);
        debug!(
            "Comment batch: {} thread entries, {} entity payloads",
            contents.len(),
            entities.len()
        );

        let comments = contents
            .iter()
            .filter_map(|entry| parse_thread(entry, &entities))
            .collect();
        Ok(ListPage::new(
            comments,
            renderer::continuation_token(&contents).map(|t| Page::for_token(&page.url, &t)),
        ))
    }
}

/// Continuation token of the comment section inside a watch-next response
fn comments_section_token(next: &Value) -> Option<String> {
    let contents = array_at(
        next,
        &[
            "contents",
            "twoColumnWatchNextResults",
            "results",
            "results",
            "contents",
        ],
    )?;
    contents.iter().find_map(|entry| {
        let section = entry.get("itemSectionRenderer")?;
        // The watch page has several item sections; only the comments one
        // carries this identifier
        let identifier = string_at(section, &["sectionIdentifier"])?;
        if identifier != "comment-item-section" {
            return None;
        }
        section
            .get("contents")?
            .as_array()?
            .iter()
            .find_map(|c| {
                string_at(
                    c,
                    &[
                        "continuationItemRenderer",
                        "continuationEndpoint",
                        "continuationCommand",
                        "token",
                    ],
                )
            })
            .map(|s| s.to_string())
    })
}

fn continuation_items(response: &Value) -> Option<Vec<Value>> {
    let actions = array_at(response, &["onResponseReceivedEndpoints"])
        .or_else(|| array_at(response, &["onResponseReceivedActions"]))?;
    let mut collected = Vec::new();
    for action in actions {
        if let Some(entries) = first_of(
            action,
            &[
                &["reloadContinuationItemsCommand", "continuationItems"],
                &["appendContinuationItemsAction", "continuationItems"],
            ],
        )
        .and_then(Value::as_array)
        {
            collected.extend(entries.iter().cloned());
        }
    }
    Some(collected)
}

/// Entity payloads from the framework-update batch, keyed by comment id
fn entity_payloads(response: &Value) -> Vec<Value> {
    array_at(
        response,
        &["frameworkUpdates", "entityBatchUpdate", "mutations"],
    )
    .map(|mutations| {
        mutations
            .iter()
            .filter_map(|m| m.get("payload")?.get("commentEntityPayload"))
            .cloned()
            .collect()
    })
    .unwrap_or_default()
}

/// Parse one thread entry, resolving view-model references against the
/// entity batch when the legacy renderer is absent
fn parse_thread(entry: &Value, entities: &[Value]) -> Option<CommentInfo> {
    let thread = entry.get("commentThreadRenderer")?;

    if let Some(comment) = renderer::path(thread, &["comment", "commentRenderer"]) {
        return parse_comment_renderer(comment, thread);
    }

    let comment_id = first_of(
        thread,
        &[
            &["commentViewModel", "commentViewModel", "commentId"],
            &["commentViewModel", "commentId"],
        ],
    )?
    .as_str()?;
    let payload = entities
        .iter()
        .find(|e| string_at(e, &["properties", "commentId"]) == Some(comment_id))?;
    parse_entity_payload(payload)
}

/// Legacy `commentRenderer` shape
fn parse_comment_renderer(comment: &Value, thread: &Value) -> Option<CommentInfo> {
    let id = string_at(comment, &["commentId"])?.to_string();
    let body = comment.get("contentText").and_then(text_of)?;

    let mut info = CommentInfo::new(id, body);
    info.author_name = comment.get("authorText").and_then(text_of);
    info.author_id = string_at(
        comment,
        &["authorEndpoint", "browseEndpoint", "browseId"],
    )
    .map(|s| s.to_string());
    info.author_url = comment
        .get("authorEndpoint")
        .and_then(renderer::navigation_url);
    if let Some(avatar) = comment.get("authorThumbnail") {
        info.author_avatars = thumbnails_of(avatar);
    }
    info.author_is_uploader = comment
        .get("authorIsChannelOwner")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    info.like_count = text_at(comment, &["voteCount"])
        .and_then(|t| text::parse_mixed_number(&t).ok());
    info.reply_count = u64_at(comment, &["replyCount"]).or_else(|| {
        u64_at(thread, &["replies", "commentRepliesRenderer", "replyCount"])
    });

    if let Some(published) = comment.get("publishedTimeText").and_then(text_of) {
        info.published = timeago::parse_relative(&published).ok();
        info.published_text = Some(published);
    }

    info.is_pinned = comment.get("pinnedCommentBadge").is_some();
    info.is_hearted = renderer::path(
        comment,
        &["actionButtons", "commentActionButtonsRenderer", "creatorHeart"],
    )
    .is_some();
    Some(info)
}

/// Newer `commentEntityPayload` shape
fn parse_entity_payload(payload: &Value) -> Option<CommentInfo> {
    let properties = payload.get("properties")?;
    let id = string_at(properties, &["commentId"])?.to_string();
    let body = properties.get("content").and_then(text_of)?;

    let mut info = CommentInfo::new(id, body);
    if let Some(author) = payload.get("author") {
        info.author_name = string_at(author, &["displayName"]).map(|s| s.to_string());
        info.author_id = string_at(author, &["channelId"]).map(|s| s.to_string());
        info.author_url = info.author_id.as_deref().map(url::channel_url);
        if let Some(avatar_url) = string_at(author, &["avatarThumbnailUrl"]) {
            info.author_avatars = vec![Image {
                url: avatar_url.to_string(),
                width: None,
                height: None,
            }];
        }
        info.author_is_uploader = author
            .get("isCreator")
            .and_then(Value::as_bool)
            .unwrap_or(false);
    }

    if let Some(toolbar) = payload.get("toolbar") {
        info.like_count = string_at(toolbar, &["likeCountNotliked"])
            .and_then(|t| text::parse_mixed_number(t).ok())
            .or(Some(0));
        info.reply_count = string_at(toolbar, &["replyCount"])
            .and_then(|t| text::parse_mixed_number(t).ok());
    }

    if let Some(published) = string_at(properties, &["publishedTime"]) {
        info.published = timeago::parse_relative(published).ok();
        info.published_text = Some(published.to_string());
    }
    Some(info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_comments_section_token() {
        let next = json!({"contents": {"twoColumnWatchNextResults": {"results": {"results": {
            "contents": [
                {"itemSectionRenderer": {
                    "sectionIdentifier": "related-items",
                    "contents": []
                }},
                {"itemSectionRenderer": {
                    "sectionIdentifier": "comment-item-section",
                    "contents": [{"continuationItemRenderer": {"continuationEndpoint":
                        {"continuationCommand": {"token": "comments-tok"}}}}]
                }}
            ]
        }}}}});
        assert_eq!(
            comments_section_token(&next),
            Some("comments-tok".to_string())
        );
        assert_eq!(comments_section_token(&json!({})), None);
    }

    #[test]
    fn test_parse_legacy_comment() {
        let entry = json!({"commentThreadRenderer": {
            "comment": {"commentRenderer": {
                "commentId": "UgzK7",
                "contentText": {"runs": [{"text": "Great "}, {"text": "video"}]},
                "authorText": {"simpleText": "@someone"},
                "authorEndpoint": {"browseEndpoint": {"browseId": "UCabc"}},
                "authorThumbnail": {"thumbnails": [{"url": "https://yt3.ggpht.com/c"}]},
                "authorIsChannelOwner": true,
                "voteCount": {"simpleText": "1.2K"},
                "publishedTimeText": {"runs": [{"text": "2 days ago"}]},
                "pinnedCommentBadge": {},
                "actionButtons": {"commentActionButtonsRenderer": {"creatorHeart": {}}}
            }},
            "replies": {"commentRepliesRenderer": {"replyCount": 14}}
        }});
        let comment = parse_thread(&entry, &[]).unwrap();
        assert_eq!(comment.id, "UgzK7");
        assert_eq!(comment.text, "Great video");
        assert_eq!(comment.author_name.as_deref(), Some("@someone"));
        assert!(comment.author_is_uploader);
        assert_eq!(comment.like_count, Some(1200));
        assert_eq!(comment.reply_count, Some(14));
        assert!(comment.is_pinned);
        assert!(comment.is_hearted);
        assert!(comment.published.unwrap().is_approximation);
    }

    #[test]
    fn test_parse_entity_payload_comment() {
        let entry = json!({"commentThreadRenderer": {
            "commentViewModel": {"commentViewModel": {"commentId": "UgxNew"}}
        }});
        let entities = vec![json!({
            "properties": {
                "commentId": "UgxNew",
                "content": {"content": "Entity comment"},
                "publishedTime": "3 weeks ago"
            },
            "author": {
                "displayName": "@author",
                "channelId": "UCdef",
                "avatarThumbnailUrl": "https://yt3.ggpht.com/d",
                "isCreator": false
            },
            "toolbar": {"likeCountNotliked": "42", "replyCount": "3"}
        })];
        let comment = parse_thread(&entry, &entities).unwrap();
        assert_eq!(comment.text, "Entity comment");
        assert_eq!(comment.author_url.as_deref(), Some("https://www.youtube.com/channel/UCdef"));
        assert_eq!(comment.like_count, Some(42));
        assert_eq!(comment.reply_count, Some(3));
        assert!(!comment.author_is_uploader);
    }

    #[tokio::test]
    async fn test_comments_flow_via_mock() {
        let mut server = mockito::Server::new_async().await;
        let next_body = json!({"contents": {"twoColumnWatchNextResults": {"results": {"results": {
            "contents": [{"itemSectionRenderer": {
                "sectionIdentifier": "comment-item-section",
                "contents": [{"continuationItemRenderer": {"continuationEndpoint":
                    {"continuationCommand": {"token": "comments-tok"}}}}]
            }}]
        }}}}});
        let batch_body = json!({"onResponseReceivedEndpoints": [
            {"reloadContinuationItemsCommand": {"continuationItems": [
                {"commentThreadRenderer": {"comment": {"commentRenderer": {
                    "commentId": "Ugz1",
                    "contentText": {"simpleText": "First"}
                }}}},
                {"continuationItemRenderer": {"continuationEndpoint":
                    {"continuationCommand": {"token": "more-tok"}}}}
            ]}}
        ]});

        server
            .mock("POST", "/youtubei/v1/next")
            .match_query(mockito::Matcher::Any)
            .match_body(mockito::Matcher::PartialJson(json!({"videoId": "dQw4w9WgXcQ"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(next_body.to_string())
            .create_async()
            .await;
        server
            .mock("POST", "/youtubei/v1/next")
            .match_query(mockito::Matcher::Any)
            .match_body(mockito::Matcher::PartialJson(json!({"continuation": "comments-tok"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(batch_body.to_string())
            .create_async()
            .await;

        let tube = InnerTube::new().with_base_url(&server.url());
        let mut extractor = CommentsExtractor::with_innertube(tube, "dQw4w9WgXcQ");

        let page = extractor.initial_page().await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].text, "First");
        assert_eq!(page.next_page.unwrap().token.as_deref(), Some("more-tok"));
    }
}
