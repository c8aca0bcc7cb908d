//! Re-export of foundational types from `candela-types`.
// Consolidated re-exports so downstream crates can depend on `candela-core` only

pub use candela_types::CandelaError;

pub use candela_types::{BackoffConfig, FeedConfig};
pub use candela_types::{CandlePoint, CandleSeries, EpochSeconds, TimeUnit, Timeframe};
pub use candela_types::{CandleRequest, RawCandle, RawNumber};
pub use candela_types::{PriceField, ReconcileReport, SkipReason, SkippedRecord};
