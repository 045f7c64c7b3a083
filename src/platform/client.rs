//! HTTP client for platform page and API requests

use std::time::Duration;

use rand::Rng;
use reqwest::{Client, ClientBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::error::ExtractError;

/// API clients the platform distinguishes; each gets different responses
/// and different obfuscation requirements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientType {
    Web,
    Android,
    Ios,
    /// Embedded TV player, useful around age restrictions
    TvEmbed,
}

impl ClientType {
    pub fn all() -> Vec<ClientType> {
        vec![
            ClientType::Web,
            ClientType::Android,
            ClientType::Ios,
            ClientType::TvEmbed,
        ]
    }

    /// InnerTube client name
    pub fn client_name(&self) -> &'static str {
        match self {
            ClientType::Web => "WEB",
            ClientType::Android => "ANDROID",
            ClientType::Ios => "IOS",
            ClientType::TvEmbed => "TVHTML5_SIMPLY_EMBEDDED_PLAYER",
        }
    }

    /// InnerTube client version
    pub fn client_version(&self) -> &'static str {
        match self {
            ClientType::Web => "2.20240509.00.00",
            ClientType::Android => "19.09.37",
            ClientType::Ios => "19.09.3",
            ClientType::TvEmbed => "2.0",
        }
    }

    /// Numeric id sent in the `X-YouTube-Client-Name` header
    pub fn client_id(&self) -> &'static str {
        match self {
            ClientType::Web => "1",
            ClientType::Android => "3",
            ClientType::Ios => "5",
            ClientType::TvEmbed => "85",
        }
    }

    pub fn user_agent(&self) -> &'static str {
        match self {
            ClientType::Web | ClientType::TvEmbed => {
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36"
            }
            ClientType::Android => {
                "com.google.android.youtube/19.09.37 (Linux; U; Android 11) gzip"
            }
            ClientType::Ios => {
                "com.google.ios.youtube/19.09.3 (iPhone14,3; U; CPU iOS 15_6 like Mac OS X)"
            }
        }
    }

    /// Whether stream URLs from this client come pre-signed (no signature
    /// deobfuscation needed)
    pub fn has_direct_urls(&self) -> bool {
        matches!(self, ClientType::Android | ClientType::Ios)
    }
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub timeout: Duration,
    pub max_retries: u32,
    pub proxy_url: Option<String>,
    pub client_type: ClientType,
    pub enable_client_switching: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 3,
            proxy_url: None,
            client_type: ClientType::Web,
            enable_client_switching: true,
        }
    }
}

/// Platform HTTP client with realistic header emulation
pub struct PlatformClient {
    client: Client,
    config: HttpClientConfig,
    switch_count: u32,
}

impl PlatformClient {
    pub fn new() -> Self {
        Self::with_config(HttpClientConfig::default())
    }

    pub fn with_config(config: HttpClientConfig) -> Self {
        let mut builder = ClientBuilder::new()
            .timeout(config.timeout)
            .gzip(true)
            .brotli(true)
            .cookie_store(true)
            .user_agent(config.client_type.user_agent());

        if let Some(proxy_url) = &config.proxy_url {
            if let Ok(proxy) = reqwest::Proxy::all(proxy_url) {
                builder = builder.proxy(proxy);
            }
        }

        let client = builder.build().expect("Failed to build HTTP client");

        Self {
            client,
            config,
            switch_count: 0,
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn current_client(&self) -> ClientType {
        self.config.client_type
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Switch to a specific client type
    pub fn switch_to(&mut self, client_type: ClientType) {
        if self.config.client_type == client_type {
            return;
        }
        self.config.client_type = client_type;
        self.switch_count += 1;
        info!(
            "Switched to client {:?} (switch #{})",
            client_type, self.switch_count
        );
    }

    /// Pick a replacement client after an error. Restrictions tied to the
    /// web client are often absent on mobile and TV clients.
    pub fn switch_for_error(&mut self, error: &ExtractError) {
        if !self.config.enable_client_switching {
            return;
        }
        match error {
            ExtractError::AgeRestricted => self.switch_to(ClientType::TvEmbed),
            ExtractError::RateLimited | ExtractError::Network(_) => {
                let candidates: Vec<ClientType> = ClientType::all()
                    .into_iter()
                    .filter(|c| *c != self.config.client_type)
                    .collect();
                let pick = candidates[rand::thread_rng().gen_range(0..candidates.len())];
                self.switch_to(pick);
            }
            ExtractError::GeoRestricted(_) | ExtractError::ContentUnavailable(_) => {
                self.switch_to(ClientType::Android)
            }
            _ => {}
        }
    }

    pub fn switch_count(&self) -> u32 {
        self.switch_count
    }

    /// Browser-like GET request for HTML pages and the player script
    pub fn create_page_request(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .header("Accept", "*/*")
            .header("Accept-Language", "en-US,en;q=0.9")
            .header("Connection", "keep-alive")
            // Skips the consent interstitial served in some regions
            .header("Cookie", "SOCS=CAE=; CONSENT=YES+")
    }

    /// POST request against an InnerTube API endpoint
    pub fn create_api_request(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .post(url)
            .header("Content-Type", "application/json")
            .header("Accept-Language", "en-US,en;q=0.9")
            .header("Origin", "https://www.youtube.com")
            .header("Referer", "https://www.youtube.com/")
            .header("X-YouTube-Client-Name", self.config.client_type.client_id())
            .header(
                "X-YouTube-Client-Version",
                self.config.client_type.client_version(),
            )
            .header("Cookie", "SOCS=CAE=; CONSENT=YES+")
    }

    /// Execute a request and deserialize the JSON body, retrying transient
    /// failures with exponential backoff
    pub async fn execute_with_retry<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ExtractError> {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let backoff = Duration::from_millis(500 * 2u64.pow(attempt - 1));
                debug!("Retry attempt {} after {:?}", attempt, backoff);
                tokio::time::sleep(backoff).await;
            }

            let Some(cloned) = request.try_clone() else {
                // Streaming bodies cannot be retried
                let response = request.send().await?;
                return Ok(response.error_for_status()?.json().await?);
            };

            match cloned.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.as_u16() == 429 {
                        warn!("Rate limited (429)");
                        last_error = Some(ExtractError::RateLimited);
                        continue;
                    }
                    if !status.is_success() {
                        if let Err(e) = response.error_for_status() {
                            // 4xx other than 429 will not change on retry
                            if status.is_client_error() {
                                return Err(ExtractError::Network(e));
                            }
                            last_error = Some(ExtractError::Network(e));
                        }
                        continue;
                    }
                    return Ok(response.json().await?);
                }
                Err(e) => {
                    warn!("Request failed: {}", e);
                    last_error = Some(ExtractError::Network(e));
                }
            }
        }

        Err(last_error.unwrap_or(ExtractError::NothingFound))
    }

    /// Fetch a page body as text, without retry
    pub async fn fetch_text(&self, url: &str) -> Result<String, ExtractError> {
        let response = self.create_page_request(url).send().await?;
        Ok(response.error_for_status()?.text().await?)
    }
}

impl Default for PlatformClient {
    fn default() -> Self {
        Self::new()
    }
}
