//! Candela resolves irregular, multi-source price observations into
//! fixed-interval OHLCV candles and derived technical indicators.
//!
//! Overview
//! - Routes each request across registered feeds in a fixed priority order,
//!   consulting the redistribution-compliance policy before any non-primary
//!   fetch.
//! - Buckets raw ticks deterministically into candles; uses native candles
//!   directly when a feed serves the requested interval, and aggregates finer
//!   native candles when it only serves a divisor of it.
//! - Caches resolved series per `(subject, interval, source)` with
//!   per-namespace TTLs, and degrades to the last known good entry (flagged
//!   stale) when every live source fails.
//! - Computes RSI, SMA, EMA, MACD, and Bollinger Bands with explicit
//!   insufficient-data failures instead of silent placeholders.
//!
//! Key behaviors and trade-offs
//! - Candidates are tried sequentially, never raced: a primary success
//!   short-circuits all fallback cost, and the deterministic order is part of
//!   the compliance contract.
//! - Policy is checked before I/O because discarding data after the fetch
//!   would not satisfy a redistribution license.
//! - Stale-serve is a successful result annotated `is_stale = true`; only an
//!   empty cache turns chain exhaustion into `UpstreamUnavailable`.
//! - Concurrent resolves for one key may double-fetch (no single-flight
//!   de-duplication); the cache and clock are injectable so tests are
//!   deterministic anyway.
//!
//! Example
//! ```rust,ignore
//! use std::sync::Arc;
//! use candela::{Candela, IndicatorKind, Interval, PolicyEntry, ResolveRequest, SourcePolicy};
//!
//! let exchange = Arc::new(ExchangeFeed::new_default());
//! let gecko = Arc::new(candela_gecko::GeckoFeed::builder().build());
//!
//! let policy = SourcePolicy::new().with_entry(
//!     gecko.key(),
//!     PolicyEntry::display_only().with_attribution("Data by CoinGecko"),
//! );
//!
//! let candela = Candela::builder()
//!     .with_feed(exchange.clone())
//!     .with_feed(gecko)
//!     .display_safe(exchange.key())
//!     .policy(policy)
//!     .build()?;
//!
//! let req = ResolveRequest::new("bitcoin", Interval::H1, 168)?;
//! let resolution = candela.resolve(&req).await?;
//! let rsi = candela.indicator(&req, IndicatorKind::Rsi).await?;
//! ```
#![warn(missing_docs)]

/// Result cache: injectable store, entries, and clocks.
pub mod cache;
mod core;
mod resolver;

pub use crate::core::{Candela, CandelaBuilder};
pub use cache::{CacheEntry, CacheKey, Clock, ManualClock, MemoryCache, ResultCache, SystemClock};
pub use resolver::{IndicatorReport, Resolution, ResolveRequest};

pub use candela_core::{
    CacheConfig, CandelaConfig, CandelaError, Candle, CandleSeries, FeedKey, IndicatorKind,
    IndicatorResult, IndicatorValue, Interval, PolicyEntry, Purpose, SourcePolicy, Tick,
    VolumeMode,
};
pub use candela_core::{CandleProvider, FetchRange, MarketFeed, TickProvider};
