use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::token::CachedToken;
use crate::helpers::time::{Clock, SystemClock};

/// Storage for access tokens with per-entry time-to-live.
#[async_trait]
pub trait TokenStore: Send + Sync + Debug {
    /// Token stored under `key`, if present and not expired.
    async fn get(&self, key: &str) -> Option<CachedToken>;

    /// Store `token` under `key`; it reads as absent once `ttl` has elapsed.
    async fn put(&self, key: &str, token: CachedToken, ttl: Duration);
}

#[derive(Debug, Clone)]
struct CacheEntry {
    token: CachedToken,
    expires_at_ms: i64,
}

/// In-memory TTL cache: cache key -> token
#[derive(Debug, Clone)]
pub struct TokenCache {
    inner: Arc<RwLock<HashMap<String, CacheEntry>>>,
    clock: Arc<dyn Clock>,
}

static SHARED_TOKEN_CACHE: OnceLock<TokenCache> = OnceLock::new();

impl Default for TokenCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self { inner: Arc::new(RwLock::new(HashMap::new())), clock }
    }

    /// Process-lifetime cache used by clients built without an explicit store.
    pub fn shared() -> TokenCache {
        SHARED_TOKEN_CACHE.get_or_init(TokenCache::new).clone()
    }

    /// Expiry (clock millis) of the live entry under `key`.
    pub async fn expires_at(&self, key: &str) -> Option<i64> {
        let now = self.clock.now_millis();
        self.inner
            .read()
            .await
            .get(key)
            .filter(|entry| now < entry.expires_at_ms)
            .map(|entry| entry.expires_at_ms)
    }

    /// Number of live entries.
    pub async fn len(&self) -> usize {
        let now = self.clock.now_millis();
        self.inner.read().await.values().filter(|entry| now < entry.expires_at_ms).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl TokenStore for TokenCache {
    async fn get(&self, key: &str) -> Option<CachedToken> {
        let now = self.clock.now_millis();
        {
            let map = self.inner.read().await;
            match map.get(key) {
                None => return None,
                Some(entry) if now < entry.expires_at_ms => return Some(entry.token.clone()),
                Some(_) => {}
            }
        }

        // expired: evict unless a fresher entry landed in between
        let mut map = self.inner.write().await;
        if map.get(key).is_some_and(|entry| now >= entry.expires_at_ms) {
            map.remove(key);
            debug!("evicted expired token entry '{}'", key);
        }
        None
    }

    async fn put(&self, key: &str, token: CachedToken, ttl: Duration) {
        let expires_at_ms = self.clock.now_millis().saturating_add(ttl.as_millis() as i64);
        let mut map = self.inner.write().await;
        map.insert(key.to_owned(), CacheEntry { token, expires_at_ms });
    }
}
