use std::time::Duration;

use candela_core::CandelaError;
use url::Url;

use crate::GeckoFeed;

const DEFAULT_BASE_URL: &str = "https://api.coingecko.com";
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Builder for a [`GeckoFeed`].
///
/// The base URL override exists for test injection against a local mock
/// server; production use keeps the default.
pub struct GeckoFeedBuilder {
    base_url: String,
    api_key: Option<String>,
    http_timeout: Duration,
}

impl Default for GeckoFeedBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GeckoFeedBuilder {
    /// Start from the public API defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }

    /// Point the connector at a different host (e.g. a mock server or the
    /// pro API hostname).
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Send a demo/pro API key with every request.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Override the HTTP client timeout. This caps the transport; the
    /// orchestrator applies its own per-feed timeout on top.
    #[must_use]
    pub const fn http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    /// Build the feed.
    ///
    /// # Errors
    /// Returns `InvalidArg` when the base URL does not parse or the HTTP
    /// client cannot be constructed.
    pub fn build(self) -> Result<GeckoFeed, CandelaError> {
        let base_url = Url::parse(&self.base_url)
            .map_err(|e| CandelaError::InvalidArg(format!("bad base url: {e}")))?;
        let client = reqwest::Client::builder()
            .timeout(self.http_timeout)
            .build()
            .map_err(|e| CandelaError::InvalidArg(format!("http client: {e}")))?;
        Ok(GeckoFeed {
            client,
            base_url,
            api_key: self.api_key,
        })
    }
}
