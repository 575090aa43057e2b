//! Volatility envelopes.

use crate::CandelaError;

/// Number of closes the Bollinger window consumes.
pub const BOLLINGER_WINDOW: usize = 20;

const BOLLINGER_K: f64 = 2.0;

/// Bollinger band triple.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerBands {
    /// `middle + 2 * sigma`.
    pub upper: f64,
    /// Arithmetic mean of the window.
    pub middle: f64,
    /// `middle - 2 * sigma`.
    pub lower: f64,
}

/// Bollinger Bands over the last twenty closes at two standard deviations.
///
/// Sigma is the population standard deviation (divide by N, not N-1). A
/// perfectly flat window collapses all three bands onto the price.
///
/// # Errors
/// `InsufficientData` when fewer than twenty closes are available.
pub fn bollinger(closes: &[f64]) -> Result<BollingerBands, CandelaError> {
    if closes.len() < BOLLINGER_WINDOW {
        return Err(CandelaError::insufficient_data(
            "bollinger",
            BOLLINGER_WINDOW,
            closes.len(),
        ));
    }

    let window = &closes[closes.len() - BOLLINGER_WINDOW..];
    let n = BOLLINGER_WINDOW as f64;
    let mean = window.iter().sum::<f64>() / n;
    let variance = window.iter().map(|p| (p - mean) * (p - mean)).sum::<f64>() / n;
    let sigma = variance.sqrt();

    Ok(BollingerBands {
        upper: mean + BOLLINGER_K * sigma,
        middle: mean,
        lower: mean - BOLLINGER_K * sigma,
    })
}
