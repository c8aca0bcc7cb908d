//! Candela-specific data transfer objects and configuration primitives.
#![warn(missing_docs)]

mod candle;
mod config;
mod error;
mod raw;
mod reports;
mod request;
mod time;
mod timeframe;

pub use candle::{CandlePoint, CandleSeries};
pub use config::{BackoffConfig, FeedConfig};
pub use error::CandelaError;
pub use raw::{RawCandle, RawNumber};
pub use reports::{PriceField, ReconcileReport, SkipReason, SkippedRecord};
pub use request::CandleRequest;
pub use time::{EpochSeconds, TimeUnit};
pub use timeframe::Timeframe;
