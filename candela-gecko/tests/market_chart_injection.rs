use candela_core::feed::{FetchRange, MarketFeed, TickProvider};
use candela_core::{CandelaError, VolumeMode};
use candela_gecko::GeckoFeed;
use httpmock::prelude::*;

fn feed_for(server: &MockServer) -> GeckoFeed {
    GeckoFeed::builder()
        .base_url(server.base_url())
        .build()
        .unwrap()
}

#[tokio::test]
async fn maps_pair_arrays_into_ticks() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v3/coins/bitcoin/market_chart")
            .query_param("vs_currency", "usd")
            .query_param("days", "1");
        then.status(200).json_body(serde_json::json!({
            "prices": [[60000, 42000.5], [120000, 42100.0], [180000, 42050.25]],
            "total_volumes": [[60000, 1.0e9], [180000, 1.1e9]]
        }));
    });

    let feed = feed_for(&server);
    let range = FetchRange::new(0, 86_400_000).unwrap();
    let ticks = feed.ticks("bitcoin", range).await.unwrap();

    mock.assert();
    assert_eq!(ticks.len(), 3);
    assert_eq!(ticks[0].ts_ms, 60_000);
    assert_eq!(ticks[0].price, 42_000.5);
    assert_eq!(ticks[0].volume, Some(1.0e9));
    // No volume sample at 120000.
    assert_eq!(ticks[1].volume, None);
    assert_eq!(ticks[2].volume, Some(1.1e9));
}

#[tokio::test]
async fn range_spanning_a_week_requests_seven_days() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v3/coins/bitcoin/market_chart")
            .query_param("days", "7");
        then.status(200)
            .json_body(serde_json::json!({"prices": [], "total_volumes": []}));
    });

    let feed = feed_for(&server);
    let range = FetchRange::new(0, 7 * 86_400_000).unwrap();
    let ticks = feed.ticks("bitcoin", range).await.unwrap();
    mock.assert();
    assert!(ticks.is_empty());
}

#[tokio::test]
async fn unknown_coin_maps_to_not_found() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/v3/coins/doesnotexist/market_chart");
        then.status(404)
            .json_body(serde_json::json!({"error": "coin not found"}));
    });

    let feed = feed_for(&server);
    let range = FetchRange::new(0, 86_400_000).unwrap();
    let err = feed.ticks("doesnotexist", range).await.unwrap_err();
    assert!(matches!(err, CandelaError::NotFound { .. }));
}

#[tokio::test]
async fn rate_limit_maps_to_source_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/v3/coins/bitcoin/market_chart");
        then.status(429).body("rate limited");
    });

    let feed = feed_for(&server);
    let range = FetchRange::new(0, 86_400_000).unwrap();
    let err = feed.ticks("bitcoin", range).await.unwrap_err();
    match err {
        CandelaError::Source { source_id, msg } => {
            assert_eq!(source_id, "candela-gecko");
            assert!(msg.contains("429"));
        }
        other => panic!("expected Source, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_body_is_a_data_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/v3/coins/bitcoin/market_chart");
        then.status(200).body("{\"prices\": \"nope\"}");
    });

    let feed = feed_for(&server);
    let range = FetchRange::new(0, 86_400_000).unwrap();
    let err = feed.ticks("bitcoin", range).await.unwrap_err();
    assert!(matches!(err, CandelaError::Data(_)));
}

#[tokio::test]
async fn api_key_header_is_sent_when_configured() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v3/coins/bitcoin/market_chart")
            .header("x-cg-demo-api-key", "CG-test");
        then.status(200)
            .json_body(serde_json::json!({"prices": [], "total_volumes": []}));
    });

    let feed = GeckoFeed::builder()
        .base_url(server.base_url())
        .api_key("CG-test")
        .build()
        .unwrap();
    let range = FetchRange::new(0, 86_400_000).unwrap();
    feed.ticks("bitcoin", range).await.unwrap();
    mock.assert();
}

#[test]
fn advertises_snapshot_volume_semantics() {
    let feed = GeckoFeed::builder().build().unwrap();
    assert_eq!(feed.volume_mode(), VolumeMode::Snapshot);
    assert!(feed.as_tick_provider().is_some());
    assert!(feed.as_candle_provider().is_none());
}
