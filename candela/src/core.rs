use std::collections::HashMap;
use std::sync::Arc;

use candela_core::{CandelaConfig, CandelaError, FeedKey, MarketFeed, Purpose, SourcePolicy};

use crate::cache::{Clock, MemoryCache, ResultCache, SystemClock};

/// Orchestrator that resolves candle series across registered feeds.
pub struct Candela {
    pub(crate) feeds: Vec<Arc<dyn MarketFeed>>,
    pub(crate) policy: SourcePolicy,
    pub(crate) cache: Arc<dyn ResultCache>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) cfg: CandelaConfig,
}

/// Builder for constructing a `Candela` orchestrator with custom configuration.
pub struct CandelaBuilder {
    feeds: Vec<Arc<dyn MarketFeed>>,
    policy: SourcePolicy,
    cache: Option<Arc<dyn ResultCache>>,
    clock: Option<Arc<dyn Clock>>,
    cfg: CandelaConfig,
}

impl Default for CandelaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CandelaBuilder {
    /// Create a new builder with sensible defaults.
    ///
    /// Starts with no feeds registered; you must add at least one via
    /// [`with_feed`](Self::with_feed). Defaults: empty (deny-everything)
    /// policy, in-memory cache, wall clock, 5s per-feed timeout.
    #[must_use]
    pub fn new() -> Self {
        Self {
            feeds: vec![],
            policy: SourcePolicy::new(),
            cache: None,
            clock: None,
            cfg: CandelaConfig::default(),
        }
    }

    /// Register a feed. Registration order is the fallback priority for
    /// purposes without an explicit override, and the tiebreak within one.
    #[must_use]
    pub fn with_feed(mut self, feed: Arc<dyn MarketFeed>) -> Self {
        self.feeds.push(feed);
        self
    }

    /// Install the redistribution-compliance policy consulted before every
    /// non-primary fetch. Feeds without an entry are denied.
    #[must_use]
    pub fn policy(mut self, policy: SourcePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Designate the display-safe primary. The primary is exempt from policy
    /// checks; every other feed is gated per purpose.
    #[must_use]
    pub fn display_safe(mut self, key: FeedKey) -> Self {
        self.cfg.display_safe = Some(key);
        self
    }

    /// Override feed priority for one purpose. Unlisted but registered feeds
    /// remain eligible after the listed ones, in registration order.
    #[must_use]
    pub fn prefer_for_purpose(mut self, purpose: Purpose, keys: &[FeedKey]) -> Self {
        self.cfg
            .per_purpose_priority
            .insert(purpose, keys.to_vec());
        self
    }

    /// Set the per-feed request timeout.
    #[must_use]
    pub const fn feed_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.cfg.feed_timeout = timeout;
        self
    }

    /// Replace the cache TTL table.
    #[must_use]
    pub fn cache_config(mut self, cache: candela_core::CacheConfig) -> Self {
        self.cfg.cache = cache;
        self
    }

    /// Inject a cache implementation (defaults to [`MemoryCache`]).
    #[must_use]
    pub fn cache(mut self, cache: Arc<dyn ResultCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Inject a time source (defaults to [`SystemClock`]).
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Build the `Candela` orchestrator.
    ///
    /// Unknown keys in purpose priority lists are dropped and duplicates
    /// collapsed, preserving first occurrence.
    ///
    /// # Errors
    /// Returns `InvalidArg` if no feeds are registered, or if the designated
    /// display-safe primary does not match any registered feed (a typo here
    /// would silently subject the primary to deny-by-default policy checks).
    pub fn build(mut self) -> Result<Candela, CandelaError> {
        if self.feeds.is_empty() {
            return Err(CandelaError::InvalidArg(
                "no feeds registered; add at least one via with_feed(...)".to_string(),
            ));
        }

        let known: std::collections::HashSet<&'static str> =
            self.feeds.iter().map(|f| f.name()).collect();

        for keys in self.cfg.per_purpose_priority.values_mut() {
            let mut out: Vec<FeedKey> = Vec::new();
            let mut seen: std::collections::HashSet<&'static str> =
                std::collections::HashSet::new();
            for k in keys.iter().copied() {
                let n = k.as_str();
                if known.contains(n) && seen.insert(n) {
                    out.push(k);
                }
            }
            *keys = out;
        }

        if let Some(primary) = self.cfg.display_safe
            && !known.contains(primary.as_str())
        {
            return Err(CandelaError::InvalidArg(format!(
                "display-safe feed {primary} is not registered"
            )));
        }

        Ok(Candela {
            feeds: self.feeds,
            policy: self.policy,
            cache: self
                .cache
                .unwrap_or_else(|| Arc::new(MemoryCache::new()) as Arc<dyn ResultCache>),
            clock: self
                .clock
                .unwrap_or_else(|| Arc::new(SystemClock) as Arc<dyn Clock>),
            cfg: self.cfg,
        })
    }
}

/// Tag an untagged error with the feed it came from.
pub(crate) fn tag_err(source_id: &str, e: CandelaError) -> CandelaError {
    match e {
        e @ (CandelaError::Source { .. }
        | CandelaError::SourceTimeout { .. }
        | CandelaError::NotFound { .. }
        | CandelaError::InvalidInterval { .. }
        | CandelaError::UpstreamUnavailable { .. }) => e,
        other => CandelaError::source(source_id, other.to_string()),
    }
}

impl Candela {
    /// Start building a new `Candela` instance.
    ///
    /// Typical usage chains feed registration, the compliance policy, and the
    /// display-safe primary:
    ///
    /// ```rust,ignore
    /// use std::sync::Arc;
    /// use candela::{Candela, PolicyEntry, Purpose, SourcePolicy};
    ///
    /// let exchange = Arc::new(ExchangeFeed::new_default());
    /// let gecko = Arc::new(GeckoFeed::new().build());
    ///
    /// let policy = SourcePolicy::new()
    ///     .with_entry(gecko.key(), PolicyEntry::display_only()
    ///         .with_attribution("Data by CoinGecko"));
    ///
    /// let candela = Candela::builder()
    ///     .with_feed(exchange.clone())
    ///     .with_feed(gecko)
    ///     .display_safe(exchange.key())
    ///     .policy(policy)
    ///     .build()?;
    /// ```
    #[must_use]
    pub fn builder() -> CandelaBuilder {
        CandelaBuilder::new()
    }

    /// Wrap a feed future with the configured timeout and standardized
    /// timeout error mapping.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "candela::core::feed_call_with_timeout",
            skip(fut),
            fields(feed = source_id, timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)),
        )
    )]
    pub(crate) async fn feed_call_with_timeout<T, Fut>(
        source_id: &'static str,
        timeout: std::time::Duration,
        fut: Fut,
    ) -> Result<T, CandelaError>
    where
        Fut: core::future::Future<Output = Result<T, CandelaError>>,
    {
        (tokio::time::timeout(timeout, fut).await)
            .unwrap_or_else(|_| Err(CandelaError::source_timeout(source_id)))
    }

    /// Candidates for a purpose, in effective priority order.
    pub(crate) fn ordered(&self, purpose: Purpose) -> Vec<Arc<dyn MarketFeed>> {
        let out: Vec<(usize, Arc<dyn MarketFeed>)> =
            self.feeds.iter().cloned().enumerate().collect();

        if let Some(pref) = self.cfg.per_purpose_priority.get(&purpose) {
            let pos: HashMap<&'static str, usize> = pref
                .iter()
                .enumerate()
                .map(|(i, k)| (k.as_str(), i))
                .collect();
            let mut v = out;
            v.sort_by_key(|(orig_i, f)| {
                (pos.get(f.name()).copied().unwrap_or(usize::MAX), *orig_i)
            });
            return v.into_iter().map(|(_, f)| f).collect();
        }
        out.into_iter().map(|(_, f)| f).collect()
    }
}
