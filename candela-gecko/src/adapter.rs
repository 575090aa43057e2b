//! Response mapping from CoinGecko's market-chart payloads into domain types.

use std::collections::HashMap;

use candela_core::Tick;
use candela_core::feed::FetchRange;
use serde::Deserialize;

/// `/coins/{id}/market_chart` body: parallel `[timestamp_ms, value]` pair
/// arrays. Volumes are rolling 24h totals sampled at the same cadence as
/// prices, which is why the connector advertises snapshot volume semantics.
#[derive(Debug, Deserialize)]
pub(crate) struct MarketChart {
    pub prices: Vec<(i64, f64)>,
    #[serde(default)]
    pub total_volumes: Vec<(i64, f64)>,
}

/// Turn a chart payload into ticks inside `range`.
///
/// Price points carry the observation; a volume sample is attached when one
/// exists for the exact same timestamp. Points outside the range are dropped
/// (the API rounds the requested window up to whole days).
pub(crate) fn ticks_from_chart(chart: &MarketChart, range: FetchRange) -> Vec<Tick> {
    let volumes: HashMap<i64, f64> = chart.total_volumes.iter().copied().collect();
    chart
        .prices
        .iter()
        .filter(|(ts, _)| *ts >= range.start_ms && *ts < range.end_ms)
        .map(|&(ts_ms, price)| Tick {
            ts_ms,
            price,
            volume: volumes.get(&ts_ms).copied(),
        })
        .collect()
}

/// Whole days needed to cover `range`, rounded up, at least one.
pub(crate) fn days_for_range(range: FetchRange) -> i64 {
    const DAY_MS: i64 = 86_400_000;
    range.span_ms().div_euclid(DAY_MS)
        + i64::from(range.span_ms().rem_euclid(DAY_MS) > 0)
}
