//! TTL response cache and the read-through fetch layer in front of it.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde_json::Value;

use super::{Fetcher, reject_error_payload};
use crate::error::RemoteError;

/// One cached response with its expiry deadline.
#[derive(Debug, Clone)]
struct CacheEntry {
    payload: Arc<Value>,
    expires_at: Instant,
}

/// Concurrent TTL store over remote responses, keyed by full request URL.
///
/// Entries live in memory only and vanish on expiry or process exit.
/// Expired entries are dropped lazily, on the next lookup of their key.
#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: DashMap<String, CacheEntry>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Look up a live entry for a URL.
    pub fn get(&self, url: &str) -> Option<Arc<Value>> {
        {
            let hit = self.entries.get(url)?;
            if hit.expires_at > Instant::now() {
                return Some(Arc::clone(&hit.payload));
            }
            // Guard must drop before the remove below touches the same shard.
        }
        self.entries.remove(url);
        None
    }

    /// Insert or replace the entry for a URL.
    pub fn put(&self, url: &str, payload: Arc<Value>, ttl: Duration) {
        self.entries.insert(
            url.to_string(),
            CacheEntry {
                payload,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    /// Number of entries currently held, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }
}

/// Read-through memoizer in front of a transport fetcher.
///
/// Successful payloads are cached under the full request URL for the
/// configured TTL. Payloads carrying an endpoint error field and transport
/// failures are not cached, so the next call retries the remote. Concurrent
/// misses on the same key may fetch twice; the remote endpoints are
/// read-only, so the duplicate request is merely wasted work and the later
/// insert wins.
pub struct CachedFetcher {
    inner: Arc<dyn Fetcher>,
    cache: Arc<ResponseCache>,
    ttl: Duration,
}

impl CachedFetcher {
    pub fn new(inner: Arc<dyn Fetcher>, cache: Arc<ResponseCache>, ttl: Duration) -> Self {
        Self { inner, cache, ttl }
    }

    /// Handle to the underlying cache, for inspection and manual clearing.
    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }
}

impl Fetcher for CachedFetcher {
    fn fetch_json(&self, url: &str) -> Result<Arc<Value>, RemoteError> {
        if let Some(hit) = self.cache.get(url) {
            tracing::trace!(url, "cache hit");
            return Ok(hit);
        }
        tracing::trace!(url, "cache miss");
        let payload = self.inner.fetch_json(url)?;
        reject_error_payload(url, &payload)?;
        self.cache.put(url, Arc::clone(&payload), self.ttl);
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingFetcher {
        payload: Value,
        calls: AtomicUsize,
    }

    impl CountingFetcher {
        fn new(payload: Value) -> Arc<Self> {
            Arc::new(Self {
                payload,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Fetcher for CountingFetcher {
        fn fetch_json(&self, _url: &str) -> Result<Arc<Value>, RemoteError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(self.payload.clone()))
        }
    }

    #[test]
    fn put_then_get_returns_the_payload() {
        let cache = ResponseCache::new();
        cache.put(
            "http://wiki.test/a",
            Arc::new(json!({"ok": true})),
            Duration::from_secs(60),
        );
        let hit = cache.get("http://wiki.test/a").unwrap();
        assert_eq!(*hit, json!({"ok": true}));
    }

    #[test]
    fn expired_entries_are_dropped_on_access() {
        let cache = ResponseCache::new();
        cache.put(
            "http://wiki.test/a",
            Arc::new(json!(1)),
            Duration::from_millis(10),
        );
        std::thread::sleep(Duration::from_millis(30));
        assert!(cache.get("http://wiki.test/a").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn second_fetch_within_ttl_is_served_from_cache() {
        let inner = CountingFetcher::new(json!({"results": {"bindings": []}}));
        let cached = CachedFetcher::new(
            inner.clone(),
            Arc::new(ResponseCache::new()),
            Duration::from_secs(60),
        );
        cached.fetch_json("http://wiki.test/q").unwrap();
        cached.fetch_json("http://wiki.test/q").unwrap();
        assert_eq!(inner.calls(), 1);
    }

    #[test]
    fn expiry_triggers_a_refetch() {
        let inner = CountingFetcher::new(json!({"entities": {}}));
        let cached = CachedFetcher::new(
            inner.clone(),
            Arc::new(ResponseCache::new()),
            Duration::from_millis(10),
        );
        cached.fetch_json("http://wiki.test/e").unwrap();
        std::thread::sleep(Duration::from_millis(30));
        cached.fetch_json("http://wiki.test/e").unwrap();
        assert_eq!(inner.calls(), 2);
    }

    #[test]
    fn error_payloads_fail_and_are_not_cached() {
        let inner = CountingFetcher::new(json!({"error": {"code": "maxlag"}}));
        let cached = CachedFetcher::new(
            inner.clone(),
            Arc::new(ResponseCache::new()),
            Duration::from_secs(60),
        );
        assert!(cached.fetch_json("http://wiki.test/q").is_err());
        assert!(cached.fetch_json("http://wiki.test/q").is_err());
        assert_eq!(inner.calls(), 2);
        assert!(cached.cache().is_empty());
    }

    #[test]
    fn distinct_urls_cache_independently() {
        let inner = CountingFetcher::new(json!({}));
        let cached = CachedFetcher::new(
            inner.clone(),
            Arc::new(ResponseCache::new()),
            Duration::from_secs(60),
        );
        cached.fetch_json("http://wiki.test/a").unwrap();
        cached.fetch_json("http://wiki.test/b").unwrap();
        cached.fetch_json("http://wiki.test/a").unwrap();
        assert_eq!(inner.calls(), 2);
        assert_eq!(cached.cache().len(), 2);
    }
}
