//! Moving averages and their difference.

use crate::CandelaError;

/// Fast EMA period used by [`macd`].
pub const MACD_FAST: usize = 12;
/// Slow EMA period used by [`macd`].
pub const MACD_SLOW: usize = 26;

/// Simple moving average: arithmetic mean of the last `window` closes.
///
/// # Errors
/// `InvalidArg` for a zero window; `InsufficientData` when fewer than
/// `window` closes are available.
pub fn sma(closes: &[f64], window: usize) -> Result<f64, CandelaError> {
    if window == 0 {
        return Err(CandelaError::InvalidArg(
            "sma window must be positive".to_string(),
        ));
    }
    if closes.len() < window {
        return Err(CandelaError::insufficient_data("sma", window, closes.len()));
    }
    let tail = &closes[closes.len() - window..];
    Ok(tail.iter().sum::<f64>() / window as f64)
}

/// Exponential moving average, recursed over the entire series.
///
/// Seeded as `ema = closes[0]` with multiplier `k = 2 / (period + 1)`, then
/// `ema = (close - ema) * k + ema` for every subsequent close. For a
/// length-one series the result is that single value, for any period.
///
/// # Errors
/// `InvalidArg` for a zero period; `InsufficientData` on an empty series.
pub fn ema(closes: &[f64], period: usize) -> Result<f64, CandelaError> {
    if period == 0 {
        return Err(CandelaError::InvalidArg(
            "ema period must be positive".to_string(),
        ));
    }
    let Some((&seed, rest)) = closes.split_first() else {
        return Err(CandelaError::insufficient_data("ema", 1, 0));
    };
    let k = 2.0 / (period as f64 + 1.0);
    let mut value = seed;
    for &close in rest {
        value = (close - value) * k + value;
    }
    Ok(value)
}

/// `EMA(12) - EMA(26)`, both over the full series. No signal line or
/// histogram is derived.
///
/// # Errors
/// `InsufficientData` on an empty series.
pub fn macd(closes: &[f64]) -> Result<f64, CandelaError> {
    if closes.is_empty() {
        return Err(CandelaError::insufficient_data("macd", 1, 0));
    }
    Ok(ema(closes, MACD_FAST)? - ema(closes, MACD_SLOW)?)
}
