use async_trait::async_trait;

use crate::{Candle, CandelaError, FeedKey, Interval, Tick, VolumeMode};

/// Half-open time range `[start_ms, end_ms)` in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRange {
    /// Inclusive range start.
    pub start_ms: i64,
    /// Exclusive range end.
    pub end_ms: i64,
}

impl FetchRange {
    /// Build a range, validating that it is non-empty.
    ///
    /// # Errors
    /// Returns `InvalidArg` when `end_ms <= start_ms`.
    pub fn new(start_ms: i64, end_ms: i64) -> Result<Self, CandelaError> {
        if end_ms <= start_ms {
            return Err(CandelaError::InvalidArg(format!(
                "empty fetch range: [{start_ms}, {end_ms})"
            )));
        }
        Ok(Self { start_ms, end_ms })
    }

    /// Range length in milliseconds.
    #[must_use]
    pub const fn span_ms(&self) -> i64 {
        self.end_ms - self.start_ms
    }
}

/// Focused role trait for feeds that expose a loose price/volume tick list.
///
/// Implementations return the raw observations inside the range, in the order
/// the upstream reports them. An empty list is a valid answer, not an error;
/// the orchestrator decides whether to fall back to another source.
#[async_trait]
pub trait TickProvider: Send + Sync {
    /// Fetch raw ticks for the subject within the range.
    async fn ticks(&self, subject: &str, range: FetchRange) -> Result<Vec<Tick>, CandelaError>;
}

/// Focused role trait for feeds that serve natively pre-bucketed OHLCV.
#[async_trait]
pub trait CandleProvider: Send + Sync {
    /// Fetch native candles for the subject at one of the supported intervals.
    async fn candles(
        &self,
        subject: &str,
        interval: Interval,
        range: FetchRange,
    ) -> Result<Vec<Candle>, CandelaError>;

    /// REQUIRED: exact intervals this feed can natively serve.
    fn supported_intervals(&self) -> &'static [Interval];
}

/// Main feed trait implemented by provider crates. Exposes capability discovery.
#[async_trait]
pub trait MarketFeed: Send + Sync {
    /// A stable identifier for priority lists and policy entries
    /// (e.g. "candela-gecko").
    fn name(&self) -> &'static str;

    /// Canonical feed key constructed from the static name.
    ///
    /// Use this helper when configuring priorities or policy entries.
    fn key(&self) -> FeedKey {
        FeedKey::new(self.name())
    }

    /// Human-friendly vendor string.
    fn vendor(&self) -> &'static str {
        "unknown"
    }

    /// Whether this feed *claims* to know the given subject.
    ///
    /// Default: accepts every subject. Feeds with a closed symbol universe
    /// should override this so the orchestrator can skip them cheaply.
    fn supports(&self, subject: &str) -> bool {
        let _ = subject;
        true
    }

    /// How volume samples from this feed combine within a bucket.
    ///
    /// Feeds reporting rolling totals (rather than per-trade deltas) must
    /// override this to [`VolumeMode::Snapshot`].
    fn volume_mode(&self) -> VolumeMode {
        VolumeMode::Sum
    }

    /// Advertise tick capability by returning a usable trait object reference
    /// when supported.
    fn as_tick_provider(&self) -> Option<&dyn TickProvider> {
        None
    }

    /// Advertise native-candle capability by returning a usable trait object
    /// reference when supported.
    fn as_candle_provider(&self) -> Option<&dyn CandleProvider> {
        None
    }
}
