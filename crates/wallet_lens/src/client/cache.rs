//! Bounded in-memory response cache: fixed TTL, LRU eviction, content-hash keys.

use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::debug;

pub const DEFAULT_CAPACITY: usize = 100;
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// Cache key: operation name plus SHA-256 of the normalized request JSON.
/// Identical call parameters hash identically; any differing optional
/// parameter produces a distinct key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(operation: &str, request: &Value) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(request.to_string().as_bytes());
        CacheKey(format!("{operation}:{}", hex::encode(hasher.finalize())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

struct Entry {
    /// `None` is the cacheable "no data" sentinel, distinct from a miss.
    value: Option<Value>,
    expires_at: Instant,
}

struct Inner {
    entries: HashMap<String, Entry>,
    /// Access order: front = most recently used, back = eviction candidate.
    order: VecDeque<String>,
}

enum Probe {
    Miss,
    Expired,
    Hit(Option<Value>),
}

/// Memoizes upstream responses for a short window. Process-local, no I/O;
/// entries exist only for keys that were actually requested.
pub struct ResponseCache {
    inner: std::sync::Mutex<Inner>,
    capacity: usize,
    ttl: Duration,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TTL)
    }
}

impl ResponseCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            inner: std::sync::Mutex::new(Inner {
                entries: HashMap::new(),
                order: VecDeque::new(),
            }),
            capacity,
            ttl,
        }
    }

    /// Return the live value for `key`, or invoke `fetch` exactly once and
    /// store its result under a fresh expiry. Fetch errors are propagated and
    /// never cached, so the next call retries against the upstream.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: &CacheKey, fetch: F) -> Result<Option<Value>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<Value>, E>>,
    {
        if let Some(hit) = self.lookup(key) {
            debug!(key = key.as_str(), "cache hit");
            return Ok(hit);
        }
        let fetched = fetch().await?;
        self.store(key, fetched.clone());
        Ok(fetched)
    }

    /// Drop every entry immediately, regardless of expiry.
    pub fn clear(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.entries.clear();
        inner.order.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, key: &CacheKey) -> Option<Option<Value>> {
        let now = Instant::now();
        let mut inner = self.inner.lock().unwrap();
        let probe = match inner.entries.get(key.as_str()) {
            None => Probe::Miss,
            Some(entry) if now >= entry.expires_at => Probe::Expired,
            Some(entry) => Probe::Hit(entry.value.clone()),
        };
        match probe {
            Probe::Miss => None,
            Probe::Expired => {
                inner.entries.remove(key.as_str());
                let stale = key.as_str();
                inner.order.retain(|k| k != stale);
                debug!(key = key.as_str(), "cache entry expired");
                None
            }
            Probe::Hit(value) => {
                touch(&mut inner, key.as_str());
                Some(value)
            }
        }
    }

    fn store(&self, key: &CacheKey, value: Option<Value>) {
        let mut inner = self.inner.lock().unwrap();
        if !inner.entries.contains_key(key.as_str()) && inner.entries.len() >= self.capacity {
            if let Some(oldest) = inner.order.pop_back() {
                inner.entries.remove(&oldest);
                debug!(key = %oldest, "evicted least-recently-used entry");
            }
        }
        inner.entries.insert(
            key.as_str().to_string(),
            Entry {
                value,
                expires_at: Instant::now() + self.ttl,
            },
        );
        touch(&mut inner, key.as_str());
    }
}

/// Mark a key as most recently used. Reads and writes both count.
fn touch(inner: &mut Inner, key: &str) {
    inner.order.retain(|k| k != key);
    inner.order.push_front(key.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn key(n: u32) -> CacheKey {
        CacheKey::new("op", &json!({ "n": n }))
    }

    async fn fill(cache: &ResponseCache, k: &CacheKey, calls: &AtomicUsize, v: u32) {
        let got = cache
            .get_or_fetch(k, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, String>(Some(json!(v)))
            })
            .await
            .unwrap();
        assert_eq!(got, Some(json!(v)));
    }

    #[test]
    fn keys_deterministic_and_distinct() {
        let a = CacheKey::new("balance", &json!({ "address": "0xa", "chain": "0x1" }));
        let b = CacheKey::new("balance", &json!({ "address": "0xa", "chain": "0x1" }));
        let c = CacheKey::new("balance", &json!({ "address": "0xa", "chain": "0x89" }));
        let d = CacheKey::new("tokens", &json!({ "address": "0xa", "chain": "0x1" }));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }

    #[test]
    fn optional_params_make_distinct_keys() {
        let bare = CacheKey::new("txs", &json!({ "address": "0xa", "from_block": null }));
        let filtered = CacheKey::new("txs", &json!({ "address": "0xa", "from_block": 18_000_000 }));
        assert_ne!(bare, filtered);
    }

    #[tokio::test]
    async fn hit_within_ttl_fetches_once() {
        let cache = ResponseCache::new(10, Duration::from_secs(60));
        let calls = AtomicUsize::new(0);
        let k = key(1);
        fill(&cache, &k, &calls, 7).await;
        fill(&cache, &k, &calls, 7).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn expired_entry_refetches() {
        let cache = ResponseCache::new(10, Duration::from_millis(20));
        let calls = AtomicUsize::new(0);
        let k = key(1);
        fill(&cache, &k, &calls, 7).await;
        tokio::time::sleep(Duration::from_millis(40)).await;
        fill(&cache, &k, &calls, 7).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn capacity_evicts_least_recently_used() {
        let cache = ResponseCache::new(2, Duration::from_secs(60));
        let calls = AtomicUsize::new(0);
        let (k1, k2, k3) = (key(1), key(2), key(3));
        fill(&cache, &k1, &calls, 1).await;
        fill(&cache, &k2, &calls, 2).await;
        // Touch k1 so k2 becomes the eviction candidate.
        fill(&cache, &k1, &calls, 1).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        fill(&cache, &k3, &calls, 3).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(cache.len(), 2);
        // k1 and k3 survive; k2 was evicted and refetches.
        fill(&cache, &k1, &calls, 1).await;
        fill(&cache, &k3, &calls, 3).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        fill(&cache, &k2, &calls, 2).await;
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn clear_forces_refetch() {
        let cache = ResponseCache::new(10, Duration::from_secs(60));
        let calls = AtomicUsize::new(0);
        let k = key(1);
        fill(&cache, &k, &calls, 7).await;
        cache.clear();
        assert!(cache.is_empty());
        fill(&cache, &k, &calls, 7).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let cache = ResponseCache::new(10, Duration::from_secs(60));
        let calls = AtomicUsize::new(0);
        let k = key(1);
        let failed: Result<Option<Value>, String> = cache
            .get_or_fetch(&k, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("upstream down".to_string())
            })
            .await;
        assert!(failed.is_err());
        assert!(cache.is_empty());
        fill(&cache, &k, &calls, 7).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn no_data_sentinel_is_cached() {
        let cache = ResponseCache::new(10, Duration::from_secs(60));
        let calls = AtomicUsize::new(0);
        let k = key(1);
        for _ in 0..2 {
            let got = cache
                .get_or_fetch(&k, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, String>(None)
                })
                .await
                .unwrap();
            assert_eq!(got, None);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn write_refreshes_expiry_and_value() {
        let cache = ResponseCache::new(10, Duration::from_millis(30));
        let k = key(1);
        let first: Result<Option<Value>, String> =
            cache.get_or_fetch(&k, || async { Ok(Some(json!("old"))) }).await;
        assert_eq!(first.unwrap(), Some(json!("old")));
        tokio::time::sleep(Duration::from_millis(50)).await;
        let second: Result<Option<Value>, String> =
            cache.get_or_fetch(&k, || async { Ok(Some(json!("new"))) }).await;
        assert_eq!(second.unwrap(), Some(json!("new")));
        let third: Result<Option<Value>, String> =
            cache.get_or_fetch(&k, || async { Ok(Some(json!("stale"))) }).await;
        assert_eq!(third.unwrap(), Some(json!("new")));
    }
}
