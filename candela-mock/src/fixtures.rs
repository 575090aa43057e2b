//! Deterministic synthetic market data.
//!
//! Prices follow a small triangle wobble around a per-subject base so that
//! repeated fetches over the same range are byte-identical while still
//! exercising high/low/close paths in the bucketer.

use candela_core::feed::FetchRange;
use candela_core::Tick;

const STEP_MS: i64 = 60_000;

fn base_price(subject: &str) -> Option<f64> {
    match subject {
        "bitcoin" | "TIMEOUT" => Some(60_000.0),
        "ethereum" => Some(2_500.0),
        "solana" => Some(150.0),
        _ => None,
    }
}

/// One tick per minute across the range, or `None` for unknown subjects.
pub(crate) fn tick_series(subject: &str, range: FetchRange) -> Option<Vec<Tick>> {
    let base = base_price(subject)?;
    let mut ticks = Vec::new();
    let first = range.start_ms.div_euclid(STEP_MS) * STEP_MS;
    let mut ts = if first < range.start_ms {
        first + STEP_MS
    } else {
        first
    };
    while ts < range.end_ms {
        let phase = (ts / STEP_MS).rem_euclid(8);
        // Triangle wave over eight steps: 0 1 2 3 4 3 2 1, scaled to ±0.2%.
        let tri = (if phase <= 4 { phase } else { 8 - phase }) as f64;
        let price = base * (1.0 + (tri - 2.0) * 0.001);
        let volume = 10.0 + tri;
        ticks.push(Tick::with_volume(ts, price, volume));
        ts += STEP_MS;
    }
    Some(ticks)
}
