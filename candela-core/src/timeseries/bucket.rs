use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use crate::{Candle, CandelaError, Tick, VolumeMode};

/// Start of the fixed-width bucket containing `ts_ms`.
///
/// Euclidean floor division, so pre-epoch timestamps land on the bucket that
/// actually contains them instead of rounding toward zero.
#[must_use]
pub const fn bucket_start(ts_ms: i64, width_ms: i64) -> i64 {
    ts_ms.div_euclid(width_ms) * width_ms
}

/// In-progress aggregate for one bucket.
struct BucketAgg {
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: Option<f64>,
}

impl BucketAgg {
    const fn seed(price: f64, volume: Option<f64>) -> Self {
        Self {
            open: price,
            high: price,
            low: price,
            close: price,
            volume,
        }
    }

    fn absorb(&mut self, price: f64, volume: Option<f64>, mode: VolumeMode) {
        if price > self.high {
            self.high = price;
        }
        if price < self.low {
            self.low = price;
        }
        self.close = price;
        if let Some(v) = volume {
            self.volume = match mode {
                VolumeMode::Sum => Some(self.volume.unwrap_or(0.0) + v),
                VolumeMode::Snapshot => Some(v),
                _ => Some(self.volume.unwrap_or(0.0) + v),
            };
        }
    }

    const fn into_candle(self, bucket_start_ms: i64) -> Candle {
        Candle {
            bucket_start_ms,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
        }
    }
}

/// Group raw ticks into fixed-width OHLCV candles.
///
/// Each tick lands in the bucket `floor(ts / width) * width`. The first tick
/// seen for a bucket seeds all four price fields; every later tick raises
/// `high`, lowers `low`, and unconditionally overwrites `close`. Input must
/// therefore be presented in chronological order for `close` to be
/// meaningful; this is a documented precondition, not enforced here.
///
/// Volume handling follows `mode`: [`VolumeMode::Sum`] accumulates samples,
/// [`VolumeMode::Snapshot`] keeps the most recent sample per bucket. Buckets
/// whose ticks all lacked a volume emit `volume: None`.
///
/// Output is sorted ascending by bucket start. An empty tick list yields an
/// empty series; a single tick yields one candle with
/// `open == high == low == close`.
///
/// Already-bucketed candles must never be fed through this path: the OHLC of
/// a close stream is not the true OHLC. Use [`bucket_candles`] to coarsen
/// native candles instead.
///
/// # Errors
/// Returns `InvalidArg` when `width_ms` is not positive.
pub fn bucket_ticks(
    ticks: &[Tick],
    width_ms: i64,
    mode: VolumeMode,
) -> Result<Vec<Candle>, CandelaError> {
    if width_ms <= 0 {
        return Err(CandelaError::InvalidArg(format!(
            "bucket width must be positive, got {width_ms}"
        )));
    }

    let mut buckets: BTreeMap<i64, BucketAgg> = BTreeMap::new();
    for t in ticks {
        let start = bucket_start(t.ts_ms, width_ms);
        match buckets.entry(start) {
            Entry::Vacant(slot) => {
                slot.insert(BucketAgg::seed(t.price, t.volume));
            }
            Entry::Occupied(mut slot) => slot.get_mut().absorb(t.price, t.volume, mode),
        }
    }

    Ok(buckets
        .into_iter()
        .map(|(start, agg)| agg.into_candle(start))
        .collect())
}

/// Aggregate finer native candles into a coarser fixed width.
///
/// True OHLC-of-OHLC: within each target bucket the earliest candle's open
/// wins, highs take the maximum, lows the minimum, the latest candle's close
/// wins, and volumes are summed (`None` ignored; all-`None` stays `None`).
/// Input order does not matter; candles are sorted by their own bucket start
/// before grouping.
///
/// The caller is responsible for only coarsening: requesting a width finer
/// than the native cadence is an interval-derivability question the
/// orchestrator answers before calling here.
///
/// # Errors
/// Returns `InvalidArg` when `width_ms` is not positive.
pub fn bucket_candles(candles: &[Candle], width_ms: i64) -> Result<Vec<Candle>, CandelaError> {
    if width_ms <= 0 {
        return Err(CandelaError::InvalidArg(format!(
            "bucket width must be positive, got {width_ms}"
        )));
    }
    if candles.is_empty() {
        return Ok(Vec::new());
    }

    let mut sorted = candles.to_vec();
    sorted.sort_by_key(|c| c.bucket_start_ms);

    let mut out: Vec<Candle> = Vec::new();
    let mut iter = sorted.into_iter();
    let first = iter.next().expect("non-empty checked above");
    let mut cur_bucket = bucket_start(first.bucket_start_ms, width_ms);
    let mut agg = BucketAgg {
        open: first.open,
        high: first.high,
        low: first.low,
        close: first.close,
        volume: first.volume,
    };

    for c in iter {
        let bucket = bucket_start(c.bucket_start_ms, width_ms);
        if bucket == cur_bucket {
            if c.high > agg.high {
                agg.high = c.high;
            }
            if c.low < agg.low {
                agg.low = c.low;
            }
            agg.close = c.close;
            if let Some(v) = c.volume {
                agg.volume = Some(agg.volume.unwrap_or(0.0) + v);
            }
        } else {
            out.push(agg.into_candle(cur_bucket));
            cur_bucket = bucket;
            agg = BucketAgg {
                open: c.open,
                high: c.high,
                low: c.low,
                close: c.close,
                volume: c.volume,
            };
        }
    }
    out.push(agg.into_candle(cur_bucket));

    Ok(out)
}
