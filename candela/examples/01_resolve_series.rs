use std::sync::Arc;

use candela::{Candela, Interval, MarketFeed, PolicyEntry, ResolveRequest, SourcePolicy};
use candela_mock::MockFeed;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    // 1. Register feeds. The mock keeps this example CI-safe; swap in a real
    //    connector (e.g. candela_gecko::GeckoFeed) for live data.
    let feed = Arc::new(MockFeed::new());
    let key = feed.key();

    // 2. Build the orchestrator: the mock is our display-safe primary.
    let candela = Candela::builder()
        .with_feed(feed)
        .display_safe(key)
        .policy(SourcePolicy::new().with_entry(key, PolicyEntry::unrestricted()))
        .build()?;

    // 3. Last 24 hourly candles for bitcoin.
    let req = ResolveRequest::new("bitcoin", Interval::H1, 24)?;
    let resolution = candela.resolve(&req).await?;

    println!(
        "{} candles from {} (stale: {})",
        resolution.series.len(),
        resolution.source,
        resolution.is_stale
    );
    for c in resolution.series.candles() {
        println!(
            "{:>15}  o={:<10} h={:<10} l={:<10} c={:<10} v={:?}",
            c.bucket_start_ms, c.open, c.high, c.low, c.close, c.volume
        );
    }

    Ok(())
}
