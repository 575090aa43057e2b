//! CoinGecko connector for candela.
//!
//! Serves raw price/volume ticks from the `market_chart` endpoint. CoinGecko
//! reports volumes as rolling 24h totals sampled alongside prices, so the
//! feed advertises [`VolumeMode::Snapshot`]: within one bucket the most
//! recent sample wins instead of summing.
#![warn(missing_docs)]

use async_trait::async_trait;
use url::Url;

use candela_core::feed::{FetchRange, MarketFeed, TickProvider};
use candela_core::{CandelaError, Tick, VolumeMode};

mod adapter;
mod builder;

pub use builder::GeckoFeedBuilder;

const FEED_NAME: &str = "candela-gecko";

/// CoinGecko market-chart feed.
pub struct GeckoFeed {
    pub(crate) client: reqwest::Client,
    pub(crate) base_url: Url,
    pub(crate) api_key: Option<String>,
}

impl GeckoFeed {
    /// Start building a feed against the public API.
    #[must_use]
    pub fn builder() -> GeckoFeedBuilder {
        GeckoFeedBuilder::new()
    }

    fn chart_url(&self, subject: &str, days: i64) -> Result<Url, CandelaError> {
        let mut url = self
            .base_url
            .join(&format!("api/v3/coins/{subject}/market_chart"))
            .map_err(|e| CandelaError::InvalidArg(format!("bad subject path: {e}")))?;
        url.query_pairs_mut()
            .append_pair("vs_currency", "usd")
            .append_pair("days", &days.to_string());
        Ok(url)
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "gecko::fetch_chart", skip(self), fields(subject, days))
    )]
    async fn fetch_chart(
        &self,
        subject: &str,
        days: i64,
    ) -> Result<adapter::MarketChart, CandelaError> {
        let url = self.chart_url(subject, days)?;
        let mut req = self.client.get(url);
        if let Some(key) = &self.api_key {
            req = req.header("x-cg-demo-api-key", key);
        }
        let resp = req
            .send()
            .await
            .map_err(|e| CandelaError::source(FEED_NAME, e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CandelaError::not_found(format!("market chart for {subject}")));
        }
        if !status.is_success() {
            return Err(CandelaError::source(
                FEED_NAME,
                format!("http {status} for {subject}"),
            ));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| CandelaError::source(FEED_NAME, e.to_string()))?;
        serde_json::from_str(&body)
            .map_err(|e| CandelaError::Data(format!("market chart decode: {e}")))
    }
}

#[async_trait]
impl MarketFeed for GeckoFeed {
    fn name(&self) -> &'static str {
        FEED_NAME
    }
    fn vendor(&self) -> &'static str {
        "CoinGecko"
    }
    fn volume_mode(&self) -> VolumeMode {
        VolumeMode::Snapshot
    }

    fn as_tick_provider(&self) -> Option<&dyn TickProvider> {
        Some(self as &dyn TickProvider)
    }
}

#[async_trait]
impl TickProvider for GeckoFeed {
    async fn ticks(&self, subject: &str, range: FetchRange) -> Result<Vec<Tick>, CandelaError> {
        let days = adapter::days_for_range(range);
        let chart = self.fetch_chart(subject, days).await?;
        Ok(adapter::ticks_from_chart(&chart, range))
    }
}
