//! Series utilities shared by sources and the feed.
//!
//! Modules include:
//! - `coerce`: turn raw wire records into numeric candles
//! - `infer`: estimate cadence and detect time-unit mix-ups
//! - `reconcile`: merge batches into a series, replacing by time
//! - `util`: series invariant checks
/// Coercion of raw records into numeric candles.
pub mod coerce;
/// Step and unit inference helpers.
pub mod infer;
/// Batch reconciliation into an existing series.
pub mod reconcile;
/// Invariant checks over candle series.
pub mod util;
