//! Market observation and aggregation types.

use serde::{Deserialize, Serialize};

use crate::CandelaError;

/// A single timestamped price (and optional volume) observation.
///
/// Ticks are immutable once received. Timestamps need not be sorted or evenly
/// spaced; the bucketer derives candle boundaries from the values themselves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    /// Observation time in epoch milliseconds.
    pub ts_ms: i64,
    /// Observed price.
    pub price: f64,
    /// Observed volume, when the source reports one.
    pub volume: Option<f64>,
}

impl Tick {
    /// Convenience constructor for a tick without volume.
    #[must_use]
    pub const fn new(ts_ms: i64, price: f64) -> Self {
        Self {
            ts_ms,
            price,
            volume: None,
        }
    }

    /// Convenience constructor for a tick carrying a volume sample.
    #[must_use]
    pub const fn with_volume(ts_ms: i64, price: f64, volume: f64) -> Self {
        Self {
            ts_ms,
            price,
            volume: Some(volume),
        }
    }
}

/// OHLCV summary of the observations within one fixed-width time bucket.
///
/// A candle is derived, never directly observed. Invariants maintained by the
/// bucketer and checked by [`CandleSeries`]: `low <= min(open, close)`,
/// `high >= max(open, close)`, and `bucket_start_ms` is an exact multiple of
/// the bucket width it was produced with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Bucket start in epoch milliseconds.
    pub bucket_start_ms: i64,
    /// First observed price in the bucket.
    pub open: f64,
    /// Highest observed price in the bucket.
    pub high: f64,
    /// Lowest observed price in the bucket.
    pub low: f64,
    /// Last observed price in the bucket.
    pub close: f64,
    /// Aggregated volume, when any observation in the bucket carried one.
    pub volume: Option<f64>,
}

impl Candle {
    /// Whether this candle satisfies the OHLC range invariant.
    #[must_use]
    pub fn ohlc_valid(&self) -> bool {
        self.low <= self.open.min(self.close) && self.high >= self.open.max(self.close)
    }
}

/// How the bucketer combines per-tick volume samples within one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub enum VolumeMode {
    /// Sum tick volumes; sources report per-trade deltas.
    #[default]
    Sum,
    /// Keep the most recent volume sample per bucket; sources report rolling
    /// snapshots rather than deltas.
    Snapshot,
}

/// Validated, ordered candle sequence.
///
/// Bucket starts are strictly increasing with no duplicates; gaps are
/// permitted and never interpolated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandleSeries {
    candles: Vec<Candle>,
}

impl CandleSeries {
    /// Build a series from candles already sorted by bucket start.
    ///
    /// # Errors
    /// Returns `CandelaError::Data` if bucket starts are not strictly
    /// increasing or a candle violates the OHLC range invariant.
    pub fn new(candles: Vec<Candle>) -> Result<Self, CandelaError> {
        let mut prev: Option<i64> = None;
        for c in &candles {
            if !c.ohlc_valid() {
                return Err(CandelaError::Data(format!(
                    "candle at {} violates OHLC invariant",
                    c.bucket_start_ms
                )));
            }
            if let Some(p) = prev
                && c.bucket_start_ms <= p
            {
                return Err(CandelaError::Data(format!(
                    "bucket starts not strictly increasing at {}",
                    c.bucket_start_ms
                )));
            }
            prev = Some(c.bucket_start_ms);
        }
        Ok(Self { candles })
    }

    /// An empty series.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            candles: Vec::new(),
        }
    }

    /// Borrow the underlying candles.
    #[must_use]
    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    /// Consume the series, yielding its candles.
    #[must_use]
    pub fn into_candles(self) -> Vec<Candle> {
        self.candles
    }

    /// Number of candles in the series.
    #[must_use]
    pub fn len(&self) -> usize {
        self.candles.len()
    }

    /// Whether the series holds no candles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// The most recent candle, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    /// Closing prices, oldest to newest. This is the input every indicator
    /// consumes.
    #[must_use]
    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    /// Drop all but the last `n` candles, preserving order.
    pub fn truncate_to_last(&mut self, n: usize) {
        if self.candles.len() > n {
            self.candles.drain(..self.candles.len() - n);
        }
    }
}

/// Fixed bucket widths the engine can serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Interval {
    /// One minute.
    M1,
    /// Five minutes.
    M5,
    /// Fifteen minutes.
    M15,
    /// Thirty minutes.
    M30,
    /// One hour.
    H1,
    /// Four hours.
    H4,
    /// One day.
    D1,
    /// One week.
    W1,
}

impl Interval {
    /// Bucket width in milliseconds.
    #[must_use]
    pub const fn width_ms(self) -> i64 {
        match self {
            Self::M1 => 60_000,
            Self::M5 => 300_000,
            Self::M15 => 900_000,
            Self::M30 => 1_800_000,
            Self::H1 => 3_600_000,
            Self::H4 => 14_400_000,
            Self::D1 => 86_400_000,
            Self::W1 => 604_800_000,
        }
    }

    /// Stable kebab-case identifier used for cache namespaces and log fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::M1 => "1m",
            Self::M5 => "5m",
            Self::M15 => "15m",
            Self::M30 => "30m",
            Self::H1 => "1h",
            Self::H4 => "4h",
            Self::D1 => "1d",
            Self::W1 => "1w",
        }
    }

    /// Whether `self` can be aggregated exactly from `finer` buckets.
    ///
    /// True when `finer` is strictly narrower and divides this width evenly.
    #[must_use]
    pub const fn divisible_by(self, finer: Self) -> bool {
        let w = self.width_ms();
        let f = finer.width_ms();
        f < w && w % f == 0
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
