//! Report envelopes produced by reconciliation.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::CandleSeries;

/// Which field of a raw record failed coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceField {
    /// The bucket start (`time`/`from`/`timestamp`).
    Time,
    /// Opening price.
    Open,
    /// Highest price.
    High,
    /// Lowest price.
    Low,
    /// Closing price.
    Close,
}

impl fmt::Display for PriceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Time => "time",
            Self::Open => "open",
            Self::High => "high",
            Self::Low => "low",
            Self::Close => "close",
        })
    }
}

/// Why a raw record was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "field")]
#[non_exhaustive]
pub enum SkipReason {
    /// The field is absent or `null`.
    Missing(PriceField),
    /// The field is neither a number nor a numeric string.
    NotNumeric(PriceField),
    /// The field parsed to NaN or an infinity.
    NonFinite(PriceField),
    /// The time lies outside the representable calendar once normalized.
    TimeOutOfRange,
    /// The time's magnitude belongs to the other time unit.
    UnitMismatch,
}

/// A dropped record and the reason it was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRecord {
    /// Position of the record in the incoming batch.
    pub index: usize,
    /// Why it was dropped.
    pub reason: SkipReason,
}

/// Outcome of reconciling one batch into a series.
///
/// `inserted` and `replaced` are measured against the series the batch was
/// merged into: a time absent from it counts as inserted, a time present with a
/// different candle counts as replaced. Re-delivering an identical candle
/// counts as neither.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReconcileReport {
    /// The merged series.
    pub series: CandleSeries,
    /// Number of times that were not in the previous series.
    pub inserted: usize,
    /// Number of times whose candle changed.
    pub replaced: usize,
    /// Records dropped from the batch, in batch order.
    pub skipped: Vec<SkippedRecord>,
    /// Most common spacing between consecutive candles of `series`, in
    /// seconds. `None` when the series has fewer than two candles.
    #[serde(default)]
    pub step_seconds: Option<i64>,
}

impl ReconcileReport {
    /// Returns true if the merged series differs from the previous one.
    #[must_use]
    pub const fn changed(&self) -> bool {
        self.inserted + self.replaced > 0
    }
}
