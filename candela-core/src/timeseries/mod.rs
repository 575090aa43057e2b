//! Time-series utilities shared by feeds and the orchestrator.
//!
//! Modules include:
//! - `bucket`: group raw ticks into fixed-width OHLCV candles, and aggregate
//!   finer native candles into a coarser cadence.
/// Deterministic bucketing of ticks and OHLC-aware candle aggregation.
pub mod bucket;
