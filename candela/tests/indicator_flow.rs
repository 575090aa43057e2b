use std::sync::Arc;

use candela::{
    Candela, CandelaError, IndicatorKind, IndicatorValue, Interval, MarketFeed, PolicyEntry,
    ResolveRequest, SourcePolicy,
};
use candela_core::Tick;
use candela_mock::{DynamicMockFeed, MockBehavior};

const MINUTE: i64 = 60_000;

fn rising_ticks(n: usize) -> Vec<Tick> {
    (0..n)
        .map(|i| Tick::new(i as i64 * MINUTE, 100.0 + i as f64))
        .collect()
}

async fn engine_with_ticks(ticks: Vec<Tick>) -> Candela {
    let (feed, ctl) = DynamicMockFeed::new("ticks");
    ctl.set_tick_behavior("bitcoin", MockBehavior::Return(ticks))
        .await;
    let feed = Arc::new(feed);
    let key = feed.key();
    Candela::builder()
        .with_feed(feed)
        .display_safe(key)
        .policy(SourcePolicy::new().with_entry(key, PolicyEntry::unrestricted()))
        .build()
        .unwrap()
}

#[tokio::test]
async fn rsi_over_resolved_series() {
    let candela = engine_with_ticks(rising_ticks(20)).await;
    let req = ResolveRequest::new("bitcoin", Interval::M1, 20).unwrap();

    let report = candela.indicator(&req, IndicatorKind::Rsi).await.unwrap();
    // Strictly rising closes saturate RSI.
    assert_eq!(report.result.value, IndicatorValue::Single(100.0));
    assert_eq!(report.result.window, 14);
    // as_of is the newest bucket in the resolved series.
    assert_eq!(report.result.as_of_ms, 19 * MINUTE);
    assert!(!report.is_stale);
}

#[tokio::test]
async fn insufficient_history_is_surfaced_not_clamped() {
    let candela = engine_with_ticks(rising_ticks(10)).await;
    let req = ResolveRequest::new("bitcoin", Interval::M1, 10).unwrap();

    let err = candela
        .indicator(&req, IndicatorKind::Bollinger)
        .await
        .unwrap_err();
    match err {
        CandelaError::InsufficientData { required, got, .. } => {
            assert_eq!(required, 20);
            assert_eq!(got, 10);
        }
        other => panic!("expected InsufficientData, got {other:?}"),
    }
}

#[tokio::test]
async fn lookback_bounds_the_indicator_window() {
    // Forty ticks upstream, but the request only asks for the last 16
    // buckets; the indicator sees exactly those closes.
    let candela = engine_with_ticks(rising_ticks(40)).await;
    let req = ResolveRequest::new("bitcoin", Interval::M1, 16).unwrap();

    let resolution = candela.resolve(&req).await.unwrap();
    assert_eq!(resolution.series.len(), 16);
    assert_eq!(resolution.series.candles()[0].close, 124.0);

    let sma = candela
        .indicator(&req, IndicatorKind::Sma(16))
        .await
        .unwrap();
    // Mean of 124..=139.
    assert_eq!(sma.result.value, IndicatorValue::Single(131.5));
}

#[tokio::test]
async fn macd_and_ema_share_full_series_recursion() {
    let candela = engine_with_ticks(rising_ticks(30)).await;
    let req = ResolveRequest::new("bitcoin", Interval::M1, 30).unwrap();

    let resolution = candela.resolve(&req).await.unwrap();
    let closes = resolution.series.closes();
    let expect = candela_core::indicators::ema(&closes, 12).unwrap()
        - candela_core::indicators::ema(&closes, 26).unwrap();

    let macd = candela.indicator(&req, IndicatorKind::Macd).await.unwrap();
    assert_eq!(macd.result.value, IndicatorValue::Single(expect));
}
