//! Re-export of foundational types from `candela-types`.
// Consolidated re-exports so downstream crates can depend on `candela-core` only

pub use candela_types::{CacheConfig, CandelaConfig, CandelaError};
pub use candela_types::{Candle, CandleSeries, Interval, Tick, VolumeMode};
pub use candela_types::{FeedKey, PolicyEntry, Purpose, SourcePolicy};
