//! Signature and throttling-parameter deobfuscation
//!
//! The service gates stream URLs behind transformations defined in its
//! player script. The script is downloaded, the relevant functions are
//! located by trying the known historical source forms, and the extracted
//! snippet is evaluated in an embedded JS runtime. All of this is fragile
//! by nature; callers fall back to the untransformed value on failure.

use deno_core::{FastString, JsRuntime, RuntimeOptions};
use regex::Regex;
use tracing::{debug, warn};

use crate::error::ExtractError;
use crate::platform::client::PlatformClient;
use crate::utils::cache::PlatformCache;

const WEB_BASE: &str = "https://www.youtube.com";
// Stable video used for the embed-page fallback; the id does not influence
// the player script that gets referenced
const FALLBACK_VIDEO_ID: &str = "dQw4w9WgXcQ";

// Historical source forms of the signature function reference, newest first
const SIG_FUNCTION_PATTERNS: &[&str] = &[
    r#"\bm=([a-zA-Z0-9$]{2,})\(decodeURIComponent\(h\.s\)\)"#,
    r#"\bc&&\(c=([a-zA-Z0-9$]{2,})\(decodeURIComponent\(c\)\)"#,
    r#"(?:\b|[^a-zA-Z0-9$])([a-zA-Z0-9$]{2,})\s*=\s*function\(\s*a\s*\)\s*\{\s*a\s*=\s*a\.split\(\s*""\s*\)"#,
    r#"([\w$]+)\s*=\s*function\((\w+)\)\{\s*\w+=\s*\w+\.split\(""\)\s*;"#,
];

// The throttling function is referenced where the "n" query parameter is
// read back out of the URL
const N_FUNCTION_PATTERNS: &[&str] = &[
    r#"\.get\("n"\)\)&&\(b=([a-zA-Z0-9$]+)(\[\d+\])?\([a-zA-Z0-9]\)"#,
    r#"\bb=String\.fromCharCode\(110\),c=a\.get\(b\)\)&&\(c=([a-zA-Z0-9$]+)(\[\d+\])?\(c\)"#,
];

const STS_PATTERN: &str = r#"signatureTimestamp[=:](\d+)"#;

/// Deobfuscator for signature and n-parameter transformations
pub struct Deobfuscator {
    http: PlatformClient,
    cache: PlatformCache,
    base_url: String,
}

impl Deobfuscator {
    pub fn new() -> Self {
        Self::with_cache(PlatformCache::new())
    }

    pub fn with_cache(cache: PlatformCache) -> Self {
        Self {
            http: PlatformClient::new(),
            cache,
            base_url: WEB_BASE.to_string(),
        }
    }

    /// Override the base URL (test servers)
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Locate the current player script URL. The iframe API carries the
    /// player hash; the embed page is the older fallback source.
    pub async fn player_js_url(&self) -> Result<String, ExtractError> {
        let iframe_url = format!("{}/iframe_api", self.base_url);
        if let Ok(body) = self.http.fetch_text(&iframe_url).await {
            let hash_regex = Regex::new(r#"player\\?/([a-z0-9]{8})\\?/"#)?;
            if let Some(captures) = hash_regex.captures(&body) {
                if let Some(hash) = captures.get(1) {
                    return Ok(format!(
                        "{}/s/player/{}/player_ias.vflset/en_US/base.js",
                        self.base_url,
                        hash.as_str()
                    ));
                }
            }
        }

        let embed_url = format!("{}/embed/{}", self.base_url, FALLBACK_VIDEO_ID);
        let body = self.http.fetch_text(&embed_url).await?;
        let js_url_regex = Regex::new(r#""jsUrl":"([^"]+)""#)?;
        if let Some(captures) = js_url_regex.captures(&body) {
            if let Some(js_url) = captures.get(1) {
                return Ok(clean_player_js_url(js_url.as_str(), &self.base_url));
            }
        }

        Err(ExtractError::Deobfuscation(
            "Player script URL not found".to_string(),
        ))
    }

    /// Fetch (and cache) the player script code
    pub async fn player_js(&self) -> Result<String, ExtractError> {
        let url = self.player_js_url().await?;
        if let Some(cached) = self.cache.get_player_js(&url).await {
            return Ok(cached);
        }

        debug!("Fetching player script: {}", url);
        let code = self.http.fetch_text(&url).await?;
        self.cache.set_player_js(&url, code.clone()).await;
        Ok(code)
    }

    /// Signature timestamp (`sts`) of the current player script. The player
    /// endpoint needs it to return usable cipher data to web clients.
    pub async fn signature_timestamp(&self) -> Result<u64, ExtractError> {
        let url = self.player_js_url().await?;
        if let Some(sts) = self.cache.get_signature_timestamp(&url).await {
            return Ok(sts);
        }

        let code = self.player_js().await?;
        let sts_regex = Regex::new(STS_PATTERN)?;
        let sts = sts_regex
            .captures(&code)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
            .ok_or_else(|| {
                ExtractError::Deobfuscation("Signature timestamp not found".to_string())
            })?;

        self.cache.set_signature_timestamp(&url, sts).await;
        Ok(sts)
    }

    /// Transform an obfuscated signature by evaluating the player script's
    /// signature function
    pub async fn deobfuscate_signature(&self, signature: &str) -> Result<String, ExtractError> {
        let cache_key = format!("sig:{signature}");
        if let Some(cached) = self.cache.get_signature(&cache_key).await {
            debug!("Signature cache hit");
            return Ok(cached);
        }

        let code = self.player_js().await?;
        let snippet = extract_signature_snippet(&code)?;
        let result = run_js(&format!(
            "{snippet}deobfuscate({});",
            js_quote(signature)
        ))?;

        self.cache.set_signature(&cache_key, result.clone()).await;
        Ok(result)
    }

    /// Transform the throttling `n` parameter
    pub async fn deobfuscate_n_param(&self, n_param: &str) -> Result<String, ExtractError> {
        let cache_key = format!("n:{n_param}");
        if let Some(cached) = self.cache.get_signature(&cache_key).await {
            debug!("N-parameter cache hit");
            return Ok(cached);
        }

        let code = self.player_js().await?;
        let snippet = extract_n_snippet(&code)?;
        let result = run_js(&format!(
            "{snippet}transform({});",
            js_quote(n_param)
        ))?;

        // Some player revisions return an enhanced-except marker instead of
        // failing; treat it as a failure so callers keep the original value
        if result.starts_with("enhanced_except") || result == n_param {
            return Err(ExtractError::Deobfuscation(
                "N-parameter transformation had no effect".to_string(),
            ));
        }

        self.cache.set_signature(&cache_key, result.clone()).await;
        Ok(result)
    }

    /// Rewrite a stream URL's `n` query parameter. Non-fatal: the original
    /// URL is returned when the transformation fails.
    pub async fn fix_throttling(&self, url: &str) -> String {
        let Some(n_value) = query_param(url, "n") else {
            return url.to_string();
        };
        match self.deobfuscate_n_param(&n_value).await {
            Ok(transformed) => replace_query_param(url, "n", &transformed),
            Err(e) => {
                warn!("N-parameter deobfuscation failed, keeping original URL: {e}");
                url.to_string()
            }
        }
    }
}

impl Default for Deobfuscator {
    fn default() -> Self {
        Self::new()
    }
}

/// A parsed `signatureCipher` field: the base URL, the obfuscated signature
/// and the query parameter the deobfuscated value must be appended as
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureCipher {
    pub url: String,
    pub signature: String,
    pub signature_param: String,
}

/// Parse the url-encoded `signatureCipher`/`cipher` field of a format
pub fn parse_signature_cipher(cipher: &str) -> Option<SignatureCipher> {
    let mut url = None;
    let mut signature = None;
    let mut signature_param = "signature".to_string();

    for (key, value) in url::form_urlencoded::parse(cipher.as_bytes()) {
        match key.as_ref() {
            "url" => url = Some(value.into_owned()),
            "s" => signature = Some(value.into_owned()),
            "sp" => signature_param = value.into_owned(),
            _ => {}
        }
    }

    Some(SignatureCipher {
        url: url?,
        signature: signature?,
        signature_param,
    })
}

fn clean_player_js_url(url: &str, base: &str) -> String {
    if let Some(rest) = url.strip_prefix("//") {
        format!("https://{rest}")
    } else if url.starts_with('/') {
        format!("{base}{url}")
    } else {
        url.to_string()
    }
}

/// Build a self-contained snippet defining `deobfuscate(sig)` from the
/// player script's signature function and its helper object
fn extract_signature_snippet(player_js: &str) -> Result<String, ExtractError> {
    let name = find_function_name(player_js, SIG_FUNCTION_PATTERNS)?;
    debug!("Signature function: {}", name);
    let function = extract_function(player_js, &name)?;

    // The function dispatches through a helper object holding the actual
    // reverse/splice/swap operations
    let helper_regex = Regex::new(r#"([a-zA-Z0-9$]{2,})\.[a-zA-Z0-9$]+\(a,\d+\)"#)?;
    let helper_name = helper_regex
        .captures(&function)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| {
            ExtractError::Deobfuscation("Signature helper object not referenced".to_string())
        })?;
    let helper = extract_object(player_js, &helper_name)?;

    Ok(format!("{helper};var deobfuscate={function};"))
}

/// Build a snippet defining `transform(n)` from the throttling function
fn extract_n_snippet(player_js: &str) -> Result<String, ExtractError> {
    let mut name = None;
    for pattern in N_FUNCTION_PATTERNS {
        let regex = Regex::new(pattern)?;
        if let Some(captures) = regex.captures(player_js) {
            let candidate = captures
                .get(1)
                .map(|m| m.as_str().to_string())
                .ok_or_else(|| {
                    ExtractError::Deobfuscation("Empty throttling function name".to_string())
                })?;
            // The reference may go through a one-element array indirection:
            // b=XX[0](c) with var XX=[actualName]
            if captures.get(2).is_some() {
                let array_regex = Regex::new(&format!(
                    r#"var\s+{}\s*=\s*\[([a-zA-Z0-9$]+)\]"#,
                    regex::escape(&candidate)
                ))?;
                if let Some(array_captures) = array_regex.captures(player_js) {
                    name = array_captures.get(1).map(|m| m.as_str().to_string());
                }
            } else {
                name = Some(candidate);
            }
            if name.is_some() {
                break;
            }
        }
    }

    let name = name.ok_or_else(|| {
        ExtractError::Deobfuscation("Throttling function not found".to_string())
    })?;
    debug!("Throttling function: {}", name);
    let function = extract_function(player_js, &name)?;
    Ok(format!("var transform={function};"))
}

/// Locate the signature function name by trying the known source forms
fn find_function_name(
    player_js: &str,
    patterns: &[&str],
) -> Result<String, ExtractError> {
    for pattern in patterns {
        let regex = Regex::new(pattern)?;
        if let Some(captures) = regex.captures(player_js) {
            if let Some(name) = captures.get(1) {
                return Ok(name.as_str().to_string());
            }
        }
    }
    Err(ExtractError::Deobfuscation(
        "Signature function not found in player script".to_string(),
    ))
}

/// Extract `function(…){…}` for a named function, matching braces instead
/// of trusting a regex to find the end
fn extract_function(player_js: &str, name: &str) -> Result<String, ExtractError> {
    let escaped = regex::escape(name);
    let patterns = [
        format!(r#"{escaped}\s*=\s*function\s*\("#),
        format!(r#"function\s+{escaped}\s*\("#),
    ];

    for pattern in &patterns {
        let regex = Regex::new(pattern)?;
        if let Some(found) = regex.find(player_js) {
            let fn_start = player_js[found.start()..]
                .find("function")
                .map(|i| found.start() + i)
                .unwrap_or(found.start());
            let brace = player_js[fn_start..]
                .find('{')
                .map(|i| fn_start + i)
                .ok_or_else(|| {
                    ExtractError::Deobfuscation(format!("No body for function {name}"))
                })?;
            let end = match_closing_brace(player_js, brace)?;
            return Ok(player_js[fn_start..=end].to_string());
        }
    }

    Err(ExtractError::Deobfuscation(format!(
        "Function {name} not found in player script"
    )))
}

/// Extract `var NAME={…};` for a helper object
fn extract_object(player_js: &str, name: &str) -> Result<String, ExtractError> {
    let regex = Regex::new(&format!(
        r#"(?:var\s+|[,;\n]\s*){}\s*=\s*\{{"#,
        regex::escape(name)
    ))?;
    let found = regex.find(player_js).ok_or_else(|| {
        ExtractError::Deobfuscation(format!("Helper object {name} not found"))
    })?;
    let brace = player_js[found.start()..]
        .find('{')
        .map(|i| found.start() + i)
        .ok_or_else(|| ExtractError::Deobfuscation(format!("No body for object {name}")))?;
    let end = match_closing_brace(player_js, brace)?;
    Ok(format!("var {}={};", name, &player_js[brace..=end]))
}

/// Index of the brace closing the one at `open`, skipping string literals
fn match_closing_brace(source: &str, open: usize) -> Result<usize, ExtractError> {
    let bytes = source.as_bytes();
    let mut depth = 0usize;
    let mut in_string: Option<u8> = None;
    let mut escaped = false;

    for (offset, &byte) in bytes[open..].iter().enumerate() {
        if let Some(quote) = in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == quote {
                in_string = None;
            }
            continue;
        }
        match byte {
            b'"' | b'\'' | b'`' => in_string = Some(byte),
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(open + offset);
                }
            }
            _ => {}
        }
    }

    Err(ExtractError::Deobfuscation(
        "Unbalanced braces in player script".to_string(),
    ))
}

/// Evaluate a snippet in an embedded JS runtime and return the resulting
/// string value
fn run_js(script: &str) -> Result<String, ExtractError> {
    let mut runtime = JsRuntime::new(RuntimeOptions::default());
    let result = runtime
        .execute_script("<deobfuscate>", FastString::from(script.to_string()))
        .map_err(|e| ExtractError::Deobfuscation(format!("Script evaluation failed: {e:?}")))?;

    let scope = &mut runtime.handle_scope();
    let local = result.open(scope);
    Ok(local.to_rust_string_lossy(scope))
}

/// Quote a value as a JS string literal
fn js_quote(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{value}\""))
}

fn query_param(url: &str, name: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

fn replace_query_param(url: &str, name: &str, new_value: &str) -> String {
    let Ok(parsed) = url::Url::parse(url) else {
        return url.to_string();
    };
    let mut replaced = parsed.clone();
    replaced.query_pairs_mut().clear();
    for (key, value) in parsed.query_pairs() {
        if key == name {
            replaced.query_pairs_mut().append_pair(&key, new_value);
        } else {
            replaced.query_pairs_mut().append_pair(&key, &value);
        }
    }
    replaced.to_string()
}
