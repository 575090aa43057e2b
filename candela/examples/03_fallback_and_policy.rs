use std::sync::Arc;

use candela::{Candela, Interval, MarketFeed, PolicyEntry, Purpose, ResolveRequest, SourcePolicy};
use candela_gecko::GeckoFeed;
use candela_mock::MockFeed;

/// Primary exchange feed first, CoinGecko as the policy-gated fallback.
///
/// Run with a network connection; the mock stands in for the exchange API.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let exchange = Arc::new(MockFeed::new());
    let gecko = Arc::new(GeckoFeed::builder().build()?);

    // CoinGecko data may be displayed with attribution but not re-served.
    let policy = SourcePolicy::new().with_entry(
        gecko.key(),
        PolicyEntry::display_only()
            .permit(Purpose::Derivation)
            .with_attribution("Data provided by CoinGecko"),
    );

    let candela = Candela::builder()
        .with_feed(exchange.clone())
        .with_feed(gecko)
        .display_safe(exchange.key())
        .policy(policy)
        .build()?;

    // The mock exchange does not know this coin, so the resolver walks the
    // chain and the fallback serves with its required attribution attached.
    let req = ResolveRequest::new("dogecoin", Interval::H1, 24)?;
    match candela.resolve(&req).await {
        Ok(resolution) => println!(
            "served by {} ({} candles), attribution: {:?}",
            resolution.source,
            resolution.series.len(),
            resolution.attribution
        ),
        Err(e) => println!("resolve failed: {e}"),
    }

    Ok(())
}
