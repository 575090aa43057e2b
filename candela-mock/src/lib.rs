//! Deterministic mock feeds for CI-safe tests and examples.

use async_trait::async_trait;

use candela_core::feed::{CandleProvider, FetchRange, MarketFeed, TickProvider};
use candela_core::{Candle, CandelaError, Interval, Tick, VolumeMode};

mod dynamic;
mod fixtures;

pub use dynamic::{DynamicMockController, DynamicMockFeed, MockBehavior};

/// Mock feed with deterministic synthetic data. Provides both raw ticks and
/// native candles so orchestrator tests can exercise either path.
pub struct MockFeed;

impl Default for MockFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFeed {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    async fn maybe_fail_or_stall(subject: &str, capability: &'static str) -> Result<(), CandelaError> {
        match subject {
            "FAIL" => Err(CandelaError::source(
                "candela-mock",
                format!("forced failure: {capability}"),
            )),
            "TIMEOUT" => {
                // Simulate latency; the orchestrator may time out depending on
                // its configured feed timeout. Keep short so tests stay fast.
                tokio::time::sleep(std::time::Duration::from_millis(200)).await;
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl MarketFeed for MockFeed {
    fn name(&self) -> &'static str {
        "candela-mock"
    }
    fn vendor(&self) -> &'static str {
        "Mock"
    }

    fn as_tick_provider(&self) -> Option<&dyn TickProvider> {
        Some(self as &dyn TickProvider)
    }
    fn as_candle_provider(&self) -> Option<&dyn CandleProvider> {
        Some(self as &dyn CandleProvider)
    }
}

#[async_trait]
impl TickProvider for MockFeed {
    async fn ticks(&self, subject: &str, range: FetchRange) -> Result<Vec<Tick>, CandelaError> {
        Self::maybe_fail_or_stall(subject, "ticks").await?;
        fixtures::tick_series(subject, range)
            .ok_or_else(|| CandelaError::not_found(format!("ticks for {subject}")))
    }
}

#[async_trait]
impl CandleProvider for MockFeed {
    async fn candles(
        &self,
        subject: &str,
        interval: Interval,
        range: FetchRange,
    ) -> Result<Vec<Candle>, CandelaError> {
        Self::maybe_fail_or_stall(subject, "candles").await?;
        if !self.supported_intervals().contains(&interval) {
            return Err(CandelaError::invalid_interval(
                interval.as_str(),
                Some("candela-mock"),
            ));
        }
        let ticks = fixtures::tick_series(subject, range)
            .ok_or_else(|| CandelaError::not_found(format!("candles for {subject}")))?;
        candela_core::bucket_ticks(&ticks, interval.width_ms(), VolumeMode::Sum)
    }

    fn supported_intervals(&self) -> &'static [Interval] {
        &[
            Interval::M1,
            Interval::M5,
            Interval::M15,
            Interval::M30,
            Interval::H1,
            Interval::H4,
            Interval::D1,
            Interval::W1,
        ]
    }
}
