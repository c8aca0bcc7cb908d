//! candela polls a candle source and keeps a reconciled price series.
//!
//! Overview
//! - A [`CandleFeed`] owns a [`CandleSource`], an optional [`SeriesSink`], the
//!   current [`CandleSeries`] and a background poll task.
//! - Every poll fetches the latest batch, merges it into the held series with
//!   [`SeriesReconciler`] (incoming candles replace existing ones at the same
//!   time, malformed records are skipped), publishes the result and renders it.
//! - Failures never clear the chart: the previous series stays current.
//!
//! Key behaviors and trade-offs
//! - Single flight: polls are serialized, and a slow source delays the next
//!   poll rather than overlapping with it.
//! - Cadence is measured from the start of each poll; with a [`BackoffConfig`]
//!   consecutive failures stretch it exponentially, with jitter.
//! - Switching symbol or timeframe resets the series and polls immediately; a
//!   batch still in flight for the old selection is discarded.
//! - The time unit is fixed when the feed is built. A batch that looks like it
//!   uses the other unit is dropped whole instead of being mixed in.
//!
//! Example
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use candela::{CandleFeed, Timeframe};
//! use candela_http::HttpCandleSource;
//!
//! let source = HttpCandleSource::builder("http://localhost:5002").build()?;
//! let mut feed = CandleFeed::builder()
//!     .source(Arc::new(source))
//!     .symbol("EURUSD-OTC")
//!     .timeframe(Timeframe::M5)
//!     .poll_interval(Duration::from_secs(2))
//!     .build()?;
//! feed.start()?;
//!
//! let mut rx = feed.subscribe();
//! rx.changed().await?;
//! println!("{} candles", rx.borrow().len());
//! feed.stop().await;
//! ```
#![warn(missing_docs)]

mod core;
mod poller;

pub use crate::core::{CandleFeed, CandleFeedBuilder, tag_err};
pub use poller::Selection;

pub use candela_core::{
    BackoffConfig, CandelaError, CandlePoint, CandleRequest, CandleSeries, CandleSource,
    EpochSeconds, FeedConfig, PriceField, RawCandle, RawNumber, ReconcileReport,
    SeriesReconciler, SeriesSink, SkipReason, SkippedRecord, TimeUnit, Timeframe,
};
