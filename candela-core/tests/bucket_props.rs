use candela_core::{Tick, VolumeMode, bucket_candles, bucket_start, bucket_ticks};
use proptest::prelude::*;

fn arb_tick() -> impl Strategy<Value = Tick> {
    (
        -2_000_000_000_000i64..2_000_000_000_000i64,
        1i64..10_000_000i64,
        prop::option::of(0i64..1_000_000i64),
    )
        .prop_map(|(ts_ms, price_cents, vol)| Tick {
            ts_ms,
            price: price_cents as f64 / 100.0,
            volume: vol.map(|v| v as f64),
        })
}

fn arb_width() -> impl Strategy<Value = i64> {
    prop::sample::select(vec![
        60_000i64,
        300_000,
        900_000,
        3_600_000,
        14_400_000,
        86_400_000,
    ])
}

proptest! {
    #[test]
    fn bucket_starts_are_strictly_increasing_multiples(
        ticks in proptest::collection::vec(arb_tick(), 0..300),
        width in arb_width(),
    ) {
        let out = bucket_ticks(&ticks, width, VolumeMode::Sum).unwrap();
        let mut prev: Option<i64> = None;
        for c in &out {
            prop_assert_eq!(c.bucket_start_ms.rem_euclid(width), 0);
            if let Some(p) = prev {
                prop_assert!(c.bucket_start_ms > p);
            }
            prev = Some(c.bucket_start_ms);
        }
    }

    #[test]
    fn ohlc_invariant_holds(
        ticks in proptest::collection::vec(arb_tick(), 0..300),
        width in arb_width(),
    ) {
        for c in bucket_ticks(&ticks, width, VolumeMode::Sum).unwrap() {
            prop_assert!(c.low <= c.open.min(c.close));
            prop_assert!(c.high >= c.open.max(c.close));
            prop_assert!(c.low <= c.high);
        }
    }

    #[test]
    fn rebucketing_is_deterministic(
        ticks in proptest::collection::vec(arb_tick(), 0..300),
        width in arb_width(),
        mode in prop::sample::select(vec![VolumeMode::Sum, VolumeMode::Snapshot]),
    ) {
        let once = bucket_ticks(&ticks, width, mode).unwrap();
        let twice = bucket_ticks(&ticks, width, mode).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn every_tick_lands_in_its_bucket(
        ticks in proptest::collection::vec(arb_tick(), 1..200),
        width in arb_width(),
    ) {
        let out = bucket_ticks(&ticks, width, VolumeMode::Sum).unwrap();
        let starts: std::collections::BTreeSet<i64> =
            out.iter().map(|c| c.bucket_start_ms).collect();
        for t in &ticks {
            prop_assert!(starts.contains(&bucket_start(t.ts_ms, width)));
        }
        // And no bucket exists without a witness tick.
        let witnessed: std::collections::BTreeSet<i64> =
            ticks.iter().map(|t| bucket_start(t.ts_ms, width)).collect();
        prop_assert_eq!(starts, witnessed);
    }

    #[test]
    fn summed_volume_matches_slow_model(
        ticks in proptest::collection::vec(arb_tick(), 0..200),
        width in arb_width(),
    ) {
        let out = bucket_ticks(&ticks, width, VolumeMode::Sum).unwrap();
        for c in out {
            let expected: Option<f64> = ticks
                .iter()
                .filter(|t| bucket_start(t.ts_ms, width) == c.bucket_start_ms)
                .filter_map(|t| t.volume)
                .fold(None, |acc, v| Some(acc.unwrap_or(0.0) + v));
            prop_assert_eq!(c.volume, expected);
        }
    }

    #[test]
    fn extremes_match_slow_model(
        ticks in proptest::collection::vec(arb_tick(), 1..200),
        width in arb_width(),
    ) {
        let out = bucket_ticks(&ticks, width, VolumeMode::Sum).unwrap();
        for c in out {
            let group: Vec<f64> = ticks
                .iter()
                .filter(|t| bucket_start(t.ts_ms, width) == c.bucket_start_ms)
                .map(|t| t.price)
                .collect();
            let high = group.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let low = group.iter().copied().fold(f64::INFINITY, f64::min);
            prop_assert_eq!(c.high, high);
            prop_assert_eq!(c.low, low);
        }
    }

    #[test]
    fn candle_coarsening_preserves_extremes(
        ticks in proptest::collection::vec(arb_tick(), 1..200),
    ) {
        // Bucket ticks finely, then coarsen the candles; highs/lows must
        // match bucketing the ticks at the coarse width directly. Opens and
        // closes may differ when fine ordering disagrees with timestamps,
        // which is why tick input order is a documented precondition.
        let mut sorted = ticks.clone();
        sorted.sort_by_key(|t| t.ts_ms);
        let fine = bucket_ticks(&sorted, 60_000, VolumeMode::Sum).unwrap();
        let coarse_of_fine = bucket_candles(&fine, 3_600_000).unwrap();
        let coarse_direct = bucket_ticks(&sorted, 3_600_000, VolumeMode::Sum).unwrap();
        prop_assert_eq!(coarse_of_fine.len(), coarse_direct.len());
        for (a, b) in coarse_of_fine.iter().zip(coarse_direct.iter()) {
            prop_assert_eq!(a.bucket_start_ms, b.bucket_start_ms);
            prop_assert_eq!(a.high, b.high);
            prop_assert_eq!(a.low, b.low);
            prop_assert_eq!(a.open, b.open);
            prop_assert_eq!(a.close, b.close);
        }
    }
}
