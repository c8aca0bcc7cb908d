//! candela-core
//!
//! Core types, traits, and utilities shared across the candela workspace.
//!
//! - `types`: candle, series, request and report types (from `candela-types`).
//! - `timeseries`: the series reconciler and its coercion/inference helpers.
//! - `payload`: decoding of JSON candle payloads into raw records.
//! - `source` / `sink`: the collaborator traits a feed fetches from and renders to.
//! - `stream`: the cancellable handle owning a background poll task.
//!
//! Async runtime (Tokio)
//! ---------------------
//! `stream::PollHandle` wraps `tokio::task::JoinHandle<()>` and uses
//! `tokio::sync::oneshot::Sender<()>` for cooperative shutdown, so code that
//! starts a poll task must run under a Tokio 1.x runtime. Reconciliation itself
//! is synchronous and runtime-agnostic.
//!
#![warn(missing_docs)]

/// Decoding of JSON candle payloads.
pub mod payload;
/// Rendering collaborator trait.
pub mod sink;
/// Candle source trait.
pub mod source;
/// Background task handle with cooperative stop.
pub mod stream;
/// Reconciliation, coercion and inference over candle series.
pub mod timeseries;
pub mod types;

pub use payload::{parse_batch, parse_batch_value};
pub use sink::SeriesSink;
pub use source::CandleSource;
pub use timeseries::infer::{
    detect_time_unit, estimate_step_seconds, is_unit_mismatch, magnitude_unit,
};
pub use timeseries::reconcile::{SeriesReconciler, merge, reconcile};
pub use types::*;
