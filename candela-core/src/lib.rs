//! candela-core
//!
//! Core traits and algorithms shared across the candela ecosystem.
//!
//! - `types`: consolidated re-export of the shared DTOs from `candela-types`.
//! - `feed`: the `MarketFeed` trait and capability provider traits.
//! - `timeseries`: deterministic bucketing of ticks and candles.
//! - `indicators`: technical indicator math over closing-price series.
//!
//! The bucketing and indicator layers are pure: they perform no I/O and hold
//! no state, so the orchestrator can discard partially aggregated output at
//! any point without side effects.
#![warn(missing_docs)]

/// Feed capability traits and the primary `MarketFeed` interface.
pub mod feed;
/// Technical indicator math over closing-price series.
pub mod indicators;
/// Time-series utilities for bucketing ticks and aggregating candles.
pub mod timeseries;
pub mod types;

pub use feed::{CandleProvider, FetchRange, MarketFeed, TickProvider};
pub use indicators::{IndicatorKind, IndicatorResult, IndicatorValue, compute};
pub use timeseries::bucket::{bucket_candles, bucket_start, bucket_ticks};
pub use types::*;
