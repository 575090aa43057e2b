//! Momentum oscillators.

use crate::CandelaError;

/// Number of successive deltas RSI consumes.
pub const RSI_PERIOD: usize = 14;

/// Relative Strength Index over the last fourteen deltas.
///
/// Positive deltas sum into gains, absolute negative deltas into losses, and
/// both are divided by fourteen (plain averages, not Wilder smoothing). When
/// the average loss is zero the oscillator saturates at 100; a series of
/// pure losses yields 0.
///
/// # Errors
/// `InsufficientData` when fewer than fifteen closes are available (fourteen
/// deltas need fifteen points).
pub fn rsi(closes: &[f64]) -> Result<f64, CandelaError> {
    let required = RSI_PERIOD + 1;
    if closes.len() < required {
        return Err(CandelaError::insufficient_data(
            "rsi",
            required,
            closes.len(),
        ));
    }

    let tail = &closes[closes.len() - required..];
    let mut gains = 0.0;
    let mut losses = 0.0;
    for pair in tail.windows(2) {
        let delta = pair[1] - pair[0];
        if delta > 0.0 {
            gains += delta;
        } else {
            losses += -delta;
        }
    }

    let avg_gain = gains / RSI_PERIOD as f64;
    let avg_loss = losses / RSI_PERIOD as f64;
    if avg_loss == 0.0 {
        return Ok(100.0);
    }
    Ok(100.0 - 100.0 / (1.0 + avg_gain / avg_loss))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strictly_increasing_saturates_at_100() {
        let closes: Vec<f64> = (0..15).map(|i| 100.0 + f64::from(i)).collect();
        assert_eq!(rsi(&closes).unwrap(), 100.0);
    }

    #[test]
    fn strictly_decreasing_is_zero() {
        let closes: Vec<f64> = (0..15).map(|i| 100.0 - f64::from(i)).collect();
        assert!(rsi(&closes).unwrap().abs() < 1e-12);
    }

    #[test]
    fn flat_series_counts_as_all_losses_of_zero() {
        // Zero deltas are non-positive, so avg_loss stays 0 and RSI pins at 100.
        let closes = [50.0; 15];
        assert_eq!(rsi(&closes).unwrap(), 100.0);
    }

    #[test]
    fn fourteen_points_are_not_enough() {
        let closes = [1.0; 14];
        let err = rsi(&closes).unwrap_err();
        assert_eq!(err.to_string(), "rsi needs >= 15 closes, got 14");
    }

    #[test]
    fn bounded_between_0_and_100() {
        let closes: Vec<f64> = (0..40)
            .map(|i| 100.0 + (f64::from(i) * 0.7).sin() * 5.0)
            .collect();
        let value = rsi(&closes).unwrap();
        assert!((0.0..=100.0).contains(&value));
    }

    #[test]
    fn only_last_fifteen_closes_matter() {
        let mut closes: Vec<f64> = (0..15).map(|i| 100.0 + f64::from(i)).collect();
        let base = rsi(&closes).unwrap();
        // Prepend noise; the window is trailing, so the value is unchanged.
        let mut noisy = vec![3.0, 250.0, 1.0];
        noisy.append(&mut closes);
        assert_eq!(rsi(&noisy).unwrap(), base);
    }
}
