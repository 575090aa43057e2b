//! Result cache for resolved candle series.
//!
//! The cache is an injected abstraction rather than a module-level map so
//! tests can supply isolated state and a deterministic clock per case.
//! Entries are returned regardless of freshness: the resolver judges
//! freshness itself, which is what makes the stale-serve fallback possible
//! without a second lookup path.
//!
//! There is no single-flight de-duplication: two concurrent resolves for the
//! same key may both miss and both fetch upstream before either writes. The
//! mutex only guards map access.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use candela_core::{CandleSeries, FeedKey, Interval};

/// Injectable time source.
pub trait Clock: Send + Sync {
    /// Current time in epoch milliseconds.
    fn now_ms(&self) -> i64;
}

/// Wall-clock time.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Manually advanced clock for deterministic tests.
#[derive(Debug)]
pub struct ManualClock(AtomicI64);

impl ManualClock {
    /// Create a clock frozen at `start_ms`.
    #[must_use]
    pub const fn new(start_ms: i64) -> Self {
        Self(AtomicI64::new(start_ms))
    }

    /// Advance the clock by `delta_ms`.
    pub fn advance(&self, delta_ms: i64) {
        self.0.fetch_add(delta_ms, Ordering::SeqCst);
    }

    /// Jump the clock to an absolute time.
    pub fn set(&self, now_ms: i64) {
        self.0.store(now_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Identity of one cached resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Instrument identifier the series was resolved for.
    pub subject: String,
    /// Requested bucket width.
    pub interval: Interval,
    /// Feed the payload came from.
    pub source: FeedKey,
}

/// A cached series plus the metadata needed to judge its freshness.
///
/// Entries are overwritten (never appended) on refresh; staleness is decided
/// at serve time, not stored.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The resolved series.
    pub payload: CandleSeries,
    /// When the payload was fetched, epoch milliseconds.
    pub fetched_at_ms: i64,
    /// Freshness window in milliseconds.
    pub ttl_ms: u64,
}

impl CacheEntry {
    /// Whether the entry is still inside its freshness window at `now_ms`.
    #[must_use]
    pub fn is_fresh(&self, now_ms: i64) -> bool {
        now_ms.saturating_sub(self.fetched_at_ms) < i64::try_from(self.ttl_ms).unwrap_or(i64::MAX)
    }
}

/// Pluggable store for resolved series.
#[async_trait]
pub trait ResultCache: Send + Sync {
    /// Look up an entry, fresh or not. `None` means a true miss.
    async fn get(&self, key: &CacheKey) -> Option<CacheEntry>;
    /// Insert or overwrite the entry for `key`.
    async fn put(&self, key: CacheKey, entry: CacheEntry);
}

/// In-memory store: a mutex-guarded map with TTL-on-read semantics supplied
/// by the caller. There is no eviction thread; an expired entry is simply
/// overwritten by the next successful fetch.
#[derive(Default)]
pub struct MemoryCache {
    inner: Mutex<HashMap<CacheKey, CacheEntry>>,
}

impl MemoryCache {
    /// An empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResultCache for MemoryCache {
    async fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        let guard = self.inner.lock().await;
        guard.get(key).cloned()
    }

    async fn put(&self, key: CacheKey, entry: CacheEntry) {
        let mut guard = self.inner.lock().await;
        guard.insert(key, entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(fetched_at_ms: i64, ttl_ms: u64) -> CacheEntry {
        CacheEntry {
            payload: CandleSeries::empty(),
            fetched_at_ms,
            ttl_ms,
        }
    }

    #[test]
    fn freshness_is_strict() {
        let e = entry(1_000, 500);
        assert!(e.is_fresh(1_499));
        assert!(!e.is_fresh(1_500));
    }

    #[tokio::test]
    async fn put_overwrites() {
        let cache = MemoryCache::new();
        let key = CacheKey {
            subject: "bitcoin".to_string(),
            interval: Interval::H1,
            source: FeedKey::new("mock"),
        };
        cache.put(key.clone(), entry(1, 10)).await;
        cache.put(key.clone(), entry(2, 10)).await;
        let got = cache.get(&key).await.unwrap();
        assert_eq!(got.fetched_at_ms, 2);
    }

    #[tokio::test]
    async fn expired_entries_remain_readable() {
        // Stale-serve depends on reading past-TTL entries.
        let cache = MemoryCache::new();
        let key = CacheKey {
            subject: "bitcoin".to_string(),
            interval: Interval::H1,
            source: FeedKey::new("mock"),
        };
        cache.put(key.clone(), entry(0, 1)).await;
        let got = cache.get(&key).await.unwrap();
        assert!(!got.is_fresh(5_000));
    }
}
