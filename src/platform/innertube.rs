//! InnerTube API client: the platform's internal JSON RPC-style endpoints
//!
//! All list endpoints speak the same continuation protocol: the previous
//! response carries an opaque token which is posted back verbatim to fetch
//! the next page.

use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::ExtractError;
use crate::platform::client::{ClientType, PlatformClient};
use crate::utils::cache::PlatformCache;

const WEB_BASE: &str = "https://www.youtube.com";

/// InnerTube API client
pub struct InnerTube {
    http: PlatformClient,
    cache: PlatformCache,
    base_url: String,
}

impl InnerTube {
    pub fn new() -> Self {
        Self::with_client(PlatformClient::new())
    }

    pub fn with_client(http: PlatformClient) -> Self {
        Self {
            http,
            cache: PlatformCache::new(),
            base_url: WEB_BASE.to_string(),
        }
    }

    /// Override the API base URL (test servers)
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn http(&self) -> &PlatformClient {
        &self.http
    }

    pub fn http_mut(&mut self) -> &mut PlatformClient {
        &mut self.http
    }

    pub fn cache(&self) -> &PlatformCache {
        &self.cache
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/youtubei/v1/{}?prettyPrint=false", self.base_url, name)
    }

    /// Client context object included in every request body
    fn context(&self) -> Value {
        let client_type = self.http.current_client();
        let mut client = json!({
            "clientName": client_type.client_name(),
            "clientVersion": client_type.client_version(),
            "hl": "en",
            "gl": "US",
            "utcOffsetMinutes": 0,
        });
        match client_type {
            ClientType::Android => {
                client["androidSdkVersion"] = json!(30);
                client["osName"] = json!("Android");
                client["osVersion"] = json!("11");
            }
            ClientType::Ios => {
                client["deviceModel"] = json!("iPhone14,3");
                client["osName"] = json!("iOS");
                client["osVersion"] = json!("15.6.0.19G71");
            }
            _ => {}
        }
        json!({ "client": client })
    }

    async fn post(&self, endpoint: &str, mut body: Value) -> Result<Value, ExtractError> {
        body["context"] = self.context();
        let url = self.endpoint(endpoint);
        debug!("POST {} ({})", url, self.http.current_client().client_name());

        let mut request = self.http.create_api_request(&url);
        if let Some(visitor_data) = self.cache.get_visitor_data("default").await {
            request = request.header("X-Goog-Visitor-Id", visitor_data);
        }

        self.http.execute_with_retry(request.json(&body)).await
    }

    /// Fetch the player response for a video. `signature_timestamp` is the
    /// `sts` value from the current player script; sending it makes the web
    /// client return usable cipher data.
    pub async fn player(
        &self,
        video_id: &str,
        signature_timestamp: Option<u64>,
    ) -> Result<PlayerResponse, ExtractError> {
        let mut body = json!({
            "videoId": video_id,
            "contentCheckOk": true,
            "racyCheckOk": true,
        });
        if let Some(sts) = signature_timestamp {
            body["playbackContext"] = json!({
                "contentPlaybackContext": { "signatureTimestamp": sts }
            });
        }
        if self.http.current_client() == ClientType::TvEmbed {
            body["thirdParty"] = json!({
                "embedUrl": format!("{WEB_BASE}/watch?v={video_id}")
            });
        }

        let value = self.post("player", body).await?;
        let response: PlayerResponse = serde_json::from_value(value)?;
        Ok(response)
    }

    /// Watch-next response for a video (related items, comments token)
    pub async fn next(&self, video_id: &str) -> Result<Value, ExtractError> {
        self.post("next", json!({ "videoId": video_id })).await
    }

    /// Follow a continuation token on the next endpoint
    pub async fn next_continuation(&self, token: &str) -> Result<Value, ExtractError> {
        self.post("next", json!({ "continuation": token })).await
    }

    /// Browse a channel, playlist or kiosk page
    pub async fn browse(
        &self,
        browse_id: &str,
        params: Option<&str>,
    ) -> Result<Value, ExtractError> {
        let mut body = json!({ "browseId": browse_id });
        if let Some(params) = params {
            body["params"] = json!(params);
        }
        self.post("browse", body).await
    }

    /// Follow a continuation token on the browse endpoint
    pub async fn browse_continuation(&self, token: &str) -> Result<Value, ExtractError> {
        self.post("browse", json!({ "continuation": token })).await
    }

    /// Search; `params` is the opaque filter blob selecting the result kind
    pub async fn search(
        &self,
        query: &str,
        params: Option<&str>,
    ) -> Result<Value, ExtractError> {
        let mut body = json!({ "query": query });
        if let Some(params) = params {
            body["params"] = json!(params);
        }
        self.post("search", body).await
    }

    /// Follow a continuation token on the search endpoint
    pub async fn search_continuation(&self, token: &str) -> Result<Value, ExtractError> {
        self.post("search", json!({ "continuation": token })).await
    }

    /// Resolve a handle/vanity URL to a `UC…` browse id
    pub async fn resolve_channel(&self, handle_or_name: &str) -> Result<String, ExtractError> {
        let url = if handle_or_name.starts_with('@') {
            format!("{WEB_BASE}/{handle_or_name}")
        } else {
            format!("{WEB_BASE}/c/{handle_or_name}")
        };
        let value = self
            .post("navigation/resolve_url", json!({ "url": url }))
            .await?;

        crate::platform::renderer::string_at(&value, &["endpoint", "browseEndpoint", "browseId"])
            .map(|s| s.to_string())
            .ok_or_else(|| {
                ExtractError::ContentUnavailable(format!(
                    "Could not resolve channel: {handle_or_name}"
                ))
            })
    }

    /// Scrape visitor data from the main page; cached for subsequent calls
    pub async fn ensure_visitor_data(&self) -> Result<Option<String>, ExtractError> {
        if let Some(cached) = self.cache.get_visitor_data("default").await {
            return Ok(Some(cached));
        }

        let html = self.http.fetch_text(&self.base_url).await?;
        let visitor_regex = Regex::new(r#""visitorData":"([^"]+)""#)?;
        if let Some(captures) = visitor_regex.captures(&html) {
            if let Some(visitor_data) = captures.get(1) {
                let value = visitor_data.as_str().to_string();
                self.cache.set_visitor_data("default", value.clone()).await;
                return Ok(Some(value));
            }
        }

        warn!("Visitor data not found on main page");
        Ok(None)
    }
}

impl Default for InnerTube {
    fn default() -> Self {
        Self::new()
    }
}

/// Player response envelope. Only the stable outer fields are typed; the
/// volatile renderer trees stay as raw values.
#[derive(Debug, Deserialize)]
pub struct PlayerResponse {
    #[serde(rename = "playabilityStatus")]
    pub playability_status: Option<PlayabilityStatus>,
    #[serde(rename = "videoDetails")]
    pub video_details: Option<VideoDetails>,
    #[serde(rename = "streamingData")]
    pub streaming_data: Option<StreamingData>,
    pub microformat: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct PlayabilityStatus {
    pub status: String,
    pub reason: Option<String>,
    #[serde(rename = "errorScreen")]
    pub error_screen: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct VideoDetails {
    #[serde(rename = "videoId")]
    pub video_id: String,
    pub title: Option<String>,
    pub author: Option<String>,
    #[serde(rename = "channelId")]
    pub channel_id: Option<String>,
    #[serde(rename = "lengthSeconds")]
    pub length_seconds: Option<String>,
    #[serde(rename = "shortDescription")]
    pub short_description: Option<String>,
    pub keywords: Option<Vec<String>>,
    #[serde(rename = "viewCount")]
    pub view_count: Option<String>,
    #[serde(rename = "isLiveContent")]
    pub is_live_content: Option<bool>,
    #[serde(rename = "isLive")]
    pub is_live: Option<bool>,
    pub thumbnail: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct StreamingData {
    pub formats: Option<Vec<FormatData>>,
    #[serde(rename = "adaptiveFormats")]
    pub adaptive_formats: Option<Vec<FormatData>>,
    #[serde(rename = "hlsManifestUrl")]
    pub hls_manifest_url: Option<String>,
    #[serde(rename = "dashManifestUrl")]
    pub dash_manifest_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FormatData {
    pub itag: u32,
    pub url: Option<String>,
    #[serde(rename = "mimeType")]
    pub mime_type: Option<String>,
    pub bitrate: Option<u32>,
    #[serde(rename = "averageBitrate")]
    pub average_bitrate: Option<u32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fps: Option<u32>,
    #[serde(rename = "qualityLabel")]
    pub quality_label: Option<String>,
    #[serde(rename = "contentLength")]
    pub content_length: Option<String>,
    #[serde(rename = "signatureCipher")]
    pub signature_cipher: Option<String>,
    // Very old responses used "cipher" for the same field
    pub cipher: Option<String>,
    #[serde(rename = "audioSampleRate")]
    pub audio_sample_rate: Option<Value>,
    #[serde(rename = "audioChannels")]
    pub audio_channels: Option<u32>,
}

impl PlayerResponse {
    /// Map the playability status onto the error model. `Ok(())` means the
    /// content is playable and extraction may proceed.
    pub fn check_playability(&self) -> Result<(), ExtractError> {
        let Some(status) = &self.playability_status else {
            return Ok(());
        };
        let reason = status.reason.clone().unwrap_or_default();
        match status.status.as_str() {
            "OK" => Ok(()),
            "LOGIN_REQUIRED" => {
                let reason_lower = reason.to_lowercase();
                if reason_lower.contains("age") || reason_lower.contains("sign in to confirm") {
                    Err(ExtractError::AgeRestricted)
                } else {
                    Err(ExtractError::Private)
                }
            }
            "UNPLAYABLE" => {
                let reason_lower = reason.to_lowercase();
                if reason_lower.contains("members") || reason_lower.contains("purchase") {
                    Err(ExtractError::PaidContent)
                } else if reason_lower.contains("private") {
                    Err(ExtractError::Private)
                } else {
                    Err(ExtractError::ContentUnavailable(reason))
                }
            }
            "ERROR" => {
                let reason_lower = reason.to_lowercase();
                if reason_lower.contains("country") || reason_lower.contains("geograph") {
                    Err(ExtractError::GeoRestricted(reason))
                } else {
                    Err(ExtractError::ContentUnavailable(reason))
                }
            }
            "AGE_CHECK_REQUIRED" => Err(ExtractError::AgeRestricted),
            other => {
                warn!("Unknown playability status: {}", other);
                Err(ExtractError::ContentUnavailable(reason))
            }
        }
    }
}
