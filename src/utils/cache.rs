//! Caching for platform data that is expensive to re-fetch

use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

/// Create a new async cache with TTL
pub fn new_async_cache<K, V>(ttl: Duration) -> Cache<K, V>
where
    K: std::hash::Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    Cache::builder().time_to_live(ttl).build()
}

/// Process-wide caches shared between the API client and the deobfuscator
#[derive(Clone)]
pub struct PlatformCache {
    /// Player script code, keyed by script URL (30 minutes)
    player_js_cache: Arc<Cache<String, String>>,
    /// Deobfuscated signatures and n-parameters (1 hour)
    signature_cache: Arc<Cache<String, String>>,
    /// Visitor data scraped from the main page (10 hours)
    visitor_data_cache: Arc<Cache<String, String>>,
    /// Signature timestamp per player script URL (30 minutes)
    sts_cache: Arc<Cache<String, u64>>,
}

impl PlatformCache {
    pub fn new() -> Self {
        Self {
            player_js_cache: Arc::new(new_async_cache(Duration::from_secs(1800))),
            signature_cache: Arc::new(new_async_cache(Duration::from_secs(3600))),
            visitor_data_cache: Arc::new(new_async_cache(Duration::from_secs(36000))),
            sts_cache: Arc::new(new_async_cache(Duration::from_secs(1800))),
        }
    }

    pub async fn get_player_js(&self, url: &str) -> Option<String> {
        self.player_js_cache.get(url).await
    }

    pub async fn set_player_js(&self, url: &str, content: String) {
        self.player_js_cache.insert(url.to_string(), content).await;
    }

    pub async fn get_signature(&self, key: &str) -> Option<String> {
        self.signature_cache.get(key).await
    }

    pub async fn set_signature(&self, key: &str, deobfuscated: String) {
        self.signature_cache
            .insert(key.to_string(), deobfuscated)
            .await;
    }

    pub async fn get_visitor_data(&self, key: &str) -> Option<String> {
        self.visitor_data_cache.get(key).await
    }

    pub async fn set_visitor_data(&self, key: &str, visitor_data: String) {
        self.visitor_data_cache
            .insert(key.to_string(), visitor_data)
            .await;
    }

    pub async fn get_signature_timestamp(&self, url: &str) -> Option<u64> {
        self.sts_cache.get(url).await
    }

    pub async fn set_signature_timestamp(&self, url: &str, sts: u64) {
        self.sts_cache.insert(url.to_string(), sts).await;
    }

    /// Clear all caches, forcing re-fetch on next use
    pub async fn clear_all(&self) {
        self.player_js_cache.invalidate_all();
        self.signature_cache.invalidate_all();
        self.visitor_data_cache.invalidate_all();
        self.sts_cache.invalidate_all();
    }
}

impl Default for PlatformCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_platform_cache_roundtrip() {
        let cache = PlatformCache::new();

        cache
            .set_player_js("https://example.com/base.js", "var x = 1;".to_string())
            .await;
        assert_eq!(
            cache.get_player_js("https://example.com/base.js").await,
            Some("var x = 1;".to_string())
        );

        cache.set_signature("abc", "cba".to_string()).await;
        assert_eq!(cache.get_signature("abc").await, Some("cba".to_string()));
        assert_eq!(cache.get_signature("missing").await, None);

        cache
            .set_signature_timestamp("https://example.com/base.js", 19834)
            .await;
        assert_eq!(
            cache
                .get_signature_timestamp("https://example.com/base.js")
                .await,
            Some(19834)
        );

        cache.clear_all().await;
        assert_eq!(cache.get_signature("abc").await, None);
    }

    #[tokio::test]
    async fn test_async_cache_expiry() {
        let cache: Cache<String, u32> = new_async_cache(Duration::from_millis(50));
        cache.insert("k".to_string(), 1).await;
        assert_eq!(cache.get("k").await, Some(1));

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(cache.get("k").await, None);
    }
}
