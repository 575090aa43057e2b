//! Technical indicators over closing-price series.
//!
//! Every function consumes closes ordered oldest to newest and fails with
//! [`CandelaError::InsufficientData`] when the series is shorter than the
//! indicator's minimum window; none of them silently return a placeholder.
//!
//! Two behaviors here are deliberate and must not be "corrected":
//! - [`ema`] (and therefore [`macd`]) recurses over the entire available
//!   series, seeded from the oldest close. The result is path-dependent on
//!   how much history was fetched; a trailing-window EMA produces materially
//!   different values and is not equivalent.
//! - [`rsi`] uses plain arithmetic averages of the last fourteen deltas, not
//!   Wilder smoothing.

mod momentum;
mod moving_average;
mod volatility;

use serde::{Deserialize, Serialize};

use crate::CandelaError;

pub use momentum::{RSI_PERIOD, rsi};
pub use moving_average::{MACD_FAST, MACD_SLOW, ema, macd, sma};
pub use volatility::{BOLLINGER_WINDOW, BollingerBands, bollinger};

/// Indicator selector as consumed by the query layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum IndicatorKind {
    /// Simple moving average over the given window.
    Sma(usize),
    /// Full-series exponential moving average with the given period.
    Ema(usize),
    /// Relative Strength Index over fourteen deltas.
    Rsi,
    /// `EMA(12) - EMA(26)`, both over the full series. No signal line.
    Macd,
    /// Bollinger Bands over twenty closes at two population standard deviations.
    Bollinger,
}

impl IndicatorKind {
    /// Stable kebab-case identifier for logs and errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sma(_) => "sma",
            Self::Ema(_) => "ema",
            Self::Rsi => "rsi",
            Self::Macd => "macd",
            Self::Bollinger => "bollinger",
        }
    }
}

/// Computed indicator value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum IndicatorValue {
    /// A single scalar (SMA, EMA, RSI, MACD).
    Single(f64),
    /// A band triple (Bollinger).
    Bands {
        /// `middle + k * sigma`.
        upper: f64,
        /// Arithmetic mean of the window.
        middle: f64,
        /// `middle - k * sigma`.
        lower: f64,
    },
}

/// One indicator evaluated against one candle series.
///
/// Computed fresh per request and never cached independently of the series it
/// was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorResult {
    /// Which indicator was computed.
    pub kind: IndicatorKind,
    /// The computed value(s).
    pub value: IndicatorValue,
    /// Window length the indicator consumed.
    pub window: usize,
    /// Bucket start of the newest close the value reflects.
    pub as_of_ms: i64,
}

/// Evaluate `kind` against `closes` (oldest to newest).
///
/// `as_of_ms` is threaded through unchanged; callers pass the newest candle's
/// bucket start.
///
/// # Errors
/// Propagates `InsufficientData` from the individual indicators, and
/// `InvalidArg` for a zero SMA/EMA window.
pub fn compute(
    kind: IndicatorKind,
    closes: &[f64],
    as_of_ms: i64,
) -> Result<IndicatorResult, CandelaError> {
    let (value, window) = match kind {
        IndicatorKind::Sma(n) => (IndicatorValue::Single(sma(closes, n)?), n),
        IndicatorKind::Ema(n) => (IndicatorValue::Single(ema(closes, n)?), n),
        IndicatorKind::Rsi => (IndicatorValue::Single(rsi(closes)?), RSI_PERIOD),
        IndicatorKind::Macd => (IndicatorValue::Single(macd(closes)?), MACD_SLOW),
        IndicatorKind::Bollinger => {
            let bands = bollinger(closes)?;
            (
                IndicatorValue::Bands {
                    upper: bands.upper,
                    middle: bands.middle,
                    lower: bands.lower,
                },
                BOLLINGER_WINDOW,
            )
        }
    };
    Ok(IndicatorResult {
        kind,
        value,
        window,
        as_of_ms,
    })
}
