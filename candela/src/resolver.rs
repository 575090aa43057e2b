use std::sync::Arc;

use candela_core::feed::{FetchRange, MarketFeed};
use candela_core::{
    CandelaError, CandleSeries, FeedKey, IndicatorKind, IndicatorResult, Interval, Purpose,
    bucket_candles, bucket_ticks, compute,
};

use crate::cache::{CacheEntry, CacheKey};
use crate::core::{Candela, tag_err};

/// A validated resolve query: subject, bucket width, and window length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveRequest {
    subject: String,
    interval: Interval,
    lookback: u32,
    purpose: Purpose,
}

impl ResolveRequest {
    /// Build a request for the last `lookback` buckets of `subject` at
    /// `interval`, for the default [`Purpose::Display`].
    ///
    /// # Errors
    /// Returns `InvalidArg` when `lookback` is zero.
    pub fn new(
        subject: impl Into<String>,
        interval: Interval,
        lookback: u32,
    ) -> Result<Self, CandelaError> {
        if lookback == 0 {
            return Err(CandelaError::InvalidArg(
                "lookback must be at least one bucket".to_string(),
            ));
        }
        Ok(Self {
            subject: subject.into(),
            interval,
            lookback,
            purpose: Purpose::Display,
        })
    }

    /// Resolve under a different purpose (affects policy gating and priority).
    #[must_use]
    pub const fn with_purpose(mut self, purpose: Purpose) -> Self {
        self.purpose = purpose;
        self
    }

    /// Instrument identifier.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Requested bucket width.
    #[must_use]
    pub const fn interval(&self) -> Interval {
        self.interval
    }

    /// Number of trailing buckets the caller wants.
    #[must_use]
    pub const fn lookback(&self) -> u32 {
        self.lookback
    }

    /// Purpose the resolution serves.
    #[must_use]
    pub const fn purpose(&self) -> Purpose {
        self.purpose
    }
}

/// A successfully resolved series, tagged with its provenance.
///
/// Stale-serve is not an error: a resolution carrying `is_stale = true` is a
/// successful result, and the caller decides whether to surface a staleness
/// indicator to the end user.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The resolved candle series, newest buckets last.
    pub series: CandleSeries,
    /// Feed that produced the payload.
    pub source: FeedKey,
    /// Attribution string the source's policy entry requires, if any.
    pub attribution: Option<String>,
    /// Whether the payload was served past its freshness window.
    pub is_stale: bool,
}

/// One indicator evaluated against a resolved series, with provenance.
#[derive(Debug, Clone)]
pub struct IndicatorReport {
    /// The computed indicator.
    pub result: IndicatorResult,
    /// Feed whose series the indicator was derived from.
    pub source: FeedKey,
    /// Attribution string the source's policy entry requires, if any.
    pub attribution: Option<String>,
    /// Whether the underlying series was served stale.
    pub is_stale: bool,
}

/// How a candidate feed will satisfy the requested interval.
enum FetchPlan {
    /// The feed serves the requested interval natively.
    NativeCandles,
    /// The feed serves a finer native interval; aggregate up.
    AggregateCandles(Interval),
    /// Fetch raw ticks and bucket them at the requested width.
    Ticks,
}

impl Candela {
    /// Resolve a candle series for the request.
    ///
    /// Candidates are tried strictly in priority order; a fresh cache entry
    /// short-circuits everything, and a successful fetch short-circuits all
    /// remaining fallback cost. Policy is consulted before any network I/O
    /// for every non-primary candidate. When the whole chain fails, the most
    /// recent cache entry for the key is served with `is_stale = true`;
    /// only when no such entry exists does the call fail with
    /// `UpstreamUnavailable`.
    ///
    /// # Errors
    /// - `ComplianceBlocked` when policy denial left zero attemptable feeds.
    /// - `InvalidInterval` when no candidate can derive the requested width.
    /// - `UpstreamUnavailable` when every candidate failed and the cache is
    ///   empty for this key.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "candela::resolve",
            skip(self, req),
            fields(
                subject = req.subject(),
                interval = req.interval().as_str(),
                purpose = req.purpose().as_str(),
            ),
        )
    )]
    pub async fn resolve(&self, req: &ResolveRequest) -> Result<Resolution, CandelaError> {
        let now_ms = self.clock.now_ms();
        let width = req.interval().width_ms();
        let range = FetchRange::new(now_ms - width * i64::from(req.lookback()), now_ms)?;

        let candidates: Vec<Arc<dyn MarketFeed>> = self
            .ordered(req.purpose())
            .into_iter()
            .filter(|f| f.supports(req.subject()))
            .collect();
        if candidates.is_empty() {
            return Err(CandelaError::not_found(format!(
                "no feed recognizes subject {}",
                req.subject()
            )));
        }

        // Fresh cache wins before any network work. Cached payloads still
        // carry their source's license, so the purpose gate applies to
        // cache reads exactly as it does to fetches.
        let ttl = self.cfg.cache.ttl_for(req.interval().as_str());
        if ttl.is_some() {
            for feed in &candidates {
                if !self.usable(feed.key(), req.purpose()) {
                    continue;
                }
                let key = self.cache_key(req, feed.key());
                if let Some(entry) = self.cache.get(&key).await
                    && entry.is_fresh(now_ms)
                {
                    return Ok(self.resolution(entry.payload, feed.key(), false));
                }
            }
        }

        let mut attempts: Vec<CandelaError> = Vec::new();
        let mut attempted_any = false;
        let mut denied_any = false;

        for feed in &candidates {
            let key = feed.key();
            // Compliance gate runs before any I/O; retroactively discarding
            // fetched data would not satisfy a redistribution obligation.
            if !self.usable(key, req.purpose()) {
                denied_any = true;
                continue;
            }

            let plan = match Self::plan_for(feed.as_ref(), req.interval()) {
                Ok(plan) => plan,
                Err(e) => {
                    attempts.push(e);
                    continue;
                }
            };
            attempted_any = true;

            match self.fetch_series(feed.as_ref(), &plan, req, range).await {
                Ok(series) if !series.is_empty() => {
                    let mut series = series;
                    series.truncate_to_last(req.lookback() as usize);
                    if let Some(ttl) = ttl {
                        let entry = CacheEntry {
                            payload: series.clone(),
                            fetched_at_ms: now_ms,
                            ttl_ms: u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX),
                        };
                        self.cache.put(self.cache_key(req, key), entry).await;
                    }
                    return Ok(self.resolution(series, key, false));
                }
                Ok(_) => attempts.push(CandelaError::not_found(format!(
                    "empty result from {key} for {}",
                    req.subject()
                ))),
                Err(e) => attempts.push(tag_err(key.as_str(), e)),
            }
        }

        if !attempted_any {
            if denied_any {
                // Serving stale data from a denied source would violate the
                // same policy the gate enforces, so no cache fallback here.
                return Err(CandelaError::ComplianceBlocked {
                    purpose: req.purpose(),
                });
            }
            return Err(CandelaError::invalid_interval(
                req.interval().as_str(),
                None,
            ));
        }

        // Last-known-good fallback, regardless of TTL. Denied sources stay
        // excluded here too.
        let mut best: Option<(FeedKey, CacheEntry)> = None;
        for feed in &candidates {
            if !self.usable(feed.key(), req.purpose()) {
                continue;
            }
            let key = self.cache_key(req, feed.key());
            if let Some(entry) = self.cache.get(&key).await
                && best
                    .as_ref()
                    .is_none_or(|(_, b)| entry.fetched_at_ms > b.fetched_at_ms)
            {
                best = Some((feed.key(), entry));
            }
        }
        if let Some((source, entry)) = best {
            return Ok(self.resolution(entry.payload, source, true));
        }

        Err(CandelaError::UpstreamUnavailable {
            subject: req.subject().to_string(),
            attempts,
        })
    }

    /// Resolve a series and evaluate one indicator against its closes.
    ///
    /// Indicator results are computed fresh per request and never cached
    /// independently of the series they derive from.
    ///
    /// # Errors
    /// Propagates resolve failures and the indicator's `InsufficientData`.
    pub async fn indicator(
        &self,
        req: &ResolveRequest,
        kind: IndicatorKind,
    ) -> Result<IndicatorReport, CandelaError> {
        let resolution = self.resolve(req).await?;
        let closes = resolution.series.closes();
        let as_of_ms = resolution
            .series
            .last()
            .map_or(0, |c| c.bucket_start_ms);
        let result = compute(kind, &closes, as_of_ms)?;
        Ok(IndicatorReport {
            result,
            source: resolution.source,
            attribution: resolution.attribution,
            is_stale: resolution.is_stale,
        })
    }

    /// Whether `key` may serve `purpose`: the display-safe primary is exempt
    /// from policy checks, every other feed is gated per purpose.
    fn usable(&self, key: FeedKey, purpose: Purpose) -> bool {
        self.cfg.display_safe == Some(key) || self.policy.is_allowed(key, purpose)
    }

    fn cache_key(&self, req: &ResolveRequest, source: FeedKey) -> CacheKey {
        CacheKey {
            subject: req.subject().to_string(),
            interval: req.interval(),
            source,
        }
    }

    fn resolution(&self, series: CandleSeries, source: FeedKey, is_stale: bool) -> Resolution {
        Resolution {
            series,
            source,
            attribution: self.policy.attribution(source).map(str::to_string),
            is_stale,
        }
    }

    /// Decide how `feed` can satisfy `requested`.
    ///
    /// Native support wins; otherwise raw ticks can be bucketed to any width;
    /// otherwise the largest native interval that divides the requested one
    /// is aggregated up (largest to minimize fetched volume). A candle-only
    /// feed with no dividing interval cannot derive the width: that is an
    /// `InvalidInterval` error, never an approximation.
    fn plan_for(feed: &dyn MarketFeed, requested: Interval) -> Result<FetchPlan, CandelaError> {
        if let Some(cp) = feed.as_candle_provider()
            && cp.supported_intervals().contains(&requested)
        {
            return Ok(FetchPlan::NativeCandles);
        }
        if feed.as_tick_provider().is_some() {
            return Ok(FetchPlan::Ticks);
        }
        if let Some(cp) = feed.as_candle_provider() {
            let mut best: Option<Interval> = None;
            for &iv in cp.supported_intervals() {
                if requested.divisible_by(iv)
                    && best.is_none_or(|b| iv.width_ms() > b.width_ms())
                {
                    best = Some(iv);
                }
            }
            if let Some(finer) = best {
                return Ok(FetchPlan::AggregateCandles(finer));
            }
        }
        Err(CandelaError::invalid_interval(
            requested.as_str(),
            Some(feed.name()),
        ))
    }

    async fn fetch_series(
        &self,
        feed: &dyn MarketFeed,
        plan: &FetchPlan,
        req: &ResolveRequest,
        range: FetchRange,
    ) -> Result<CandleSeries, CandelaError> {
        let timeout = self.cfg.feed_timeout;
        let width = req.interval().width_ms();
        let candles = match plan {
            FetchPlan::NativeCandles => {
                let provider = feed
                    .as_candle_provider()
                    .expect("plan guarantees candle capability");
                Self::feed_call_with_timeout(
                    feed.name(),
                    timeout,
                    provider.candles(req.subject(), req.interval(), range),
                )
                .await?
            }
            FetchPlan::AggregateCandles(finer) => {
                let provider = feed
                    .as_candle_provider()
                    .expect("plan guarantees candle capability");
                let fine = Self::feed_call_with_timeout(
                    feed.name(),
                    timeout,
                    provider.candles(req.subject(), *finer, range),
                )
                .await?;
                bucket_candles(&fine, width)?
            }
            FetchPlan::Ticks => {
                let provider = feed
                    .as_tick_provider()
                    .expect("plan guarantees tick capability");
                let ticks = Self::feed_call_with_timeout(
                    feed.name(),
                    timeout,
                    provider.ticks(req.subject(), range),
                )
                .await?;
                bucket_ticks(&ticks, width, feed.volume_mode())?
            }
        };
        CandleSeries::new(candles)
    }
}
