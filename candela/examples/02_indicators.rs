use std::sync::Arc;

use candela::{Candela, IndicatorKind, Interval, MarketFeed, PolicyEntry, ResolveRequest, SourcePolicy};
use candela_mock::MockFeed;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let feed = Arc::new(MockFeed::new());
    let key = feed.key();
    let candela = Candela::builder()
        .with_feed(feed)
        .display_safe(key)
        .policy(SourcePolicy::new().with_entry(key, PolicyEntry::unrestricted()))
        .build()?;

    // Enough lookback for the widest window (Bollinger needs 20 buckets).
    let req = ResolveRequest::new("ethereum", Interval::M15, 64)?;

    for kind in [
        IndicatorKind::Rsi,
        IndicatorKind::Sma(20),
        IndicatorKind::Ema(20),
        IndicatorKind::Macd,
        IndicatorKind::Bollinger,
    ] {
        match candela.indicator(&req, kind).await {
            Ok(report) => println!(
                "{:<10} window={:<3} as_of={} -> {:?}",
                kind.as_str(),
                report.result.window,
                report.result.as_of_ms,
                report.result.value
            ),
            Err(e) => println!("{:<10} failed: {e}", kind.as_str()),
        }
    }

    Ok(())
}
