use std::collections::{BTreeMap, btree_map::Entry};

use crate::payload::parse_batch;
use crate::timeseries::coerce::coerce_record;
use crate::timeseries::infer::estimate_step_seconds;
use crate::timeseries::util::ensure_finite_prices;
use crate::{
    CandelaError, CandlePoint, CandleSeries, EpochSeconds, RawCandle, ReconcileReport,
    SkippedRecord, TimeUnit,
};

/// Merges raw candle batches into a held series.
///
/// The unit of incoming `time` values is fixed when the reconciler is built;
/// every stored time is [`EpochSeconds`]. Reconciliation is a pure transform:
/// the existing series is never mutated and a new one is returned.
///
/// - Records whose time or prices cannot be coerced to finite numbers are
///   dropped one by one; they never fail the batch.
/// - Incoming candles replace existing ones at the same time. Within a batch,
///   the last record for a time wins.
/// - A record whose raw time is clearly in the other unit (a seconds-sized
///   value for a milliseconds reader, or the reverse) is dropped as
///   [`UnitMismatch`](crate::SkipReason::UnitMismatch). The check looks at the record alone, so
///   the result never depends on which batch arrived first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeriesReconciler {
    unit: TimeUnit,
}

impl SeriesReconciler {
    /// Build a reconciler reading incoming times in `unit`.
    #[must_use]
    pub const fn new(unit: TimeUnit) -> Self {
        Self { unit }
    }

    /// The unit incoming times are read in.
    #[must_use]
    pub const fn unit(&self) -> TimeUnit {
        self.unit
    }

    /// Merge `incoming` into `existing` and return the resulting series.
    #[must_use]
    pub fn reconcile(&self, existing: &CandleSeries, incoming: &[RawCandle]) -> CandleSeries {
        self.reconcile_with_report(existing, incoming).series
    }

    /// Merge `incoming` into `existing`, also reporting what changed and which
    /// records were dropped.
    #[must_use]
    pub fn reconcile_with_report(
        &self,
        existing: &CandleSeries,
        incoming: &[RawCandle],
    ) -> ReconcileReport {
        let mut skipped: Vec<SkippedRecord> = Vec::new();
        let mut accepted: Vec<(usize, CandlePoint)> = Vec::with_capacity(incoming.len());
        for (index, raw) in incoming.iter().enumerate() {
            match coerce_record(raw, self.unit) {
                Ok(p) => accepted.push((index, p)),
                Err(reason) => skipped.push(SkippedRecord { index, reason }),
            }
        }

        #[cfg(feature = "tracing")]
        for s in &skipped {
            tracing::debug!(index = s.index, reason = ?s.reason, "skipping malformed candle record");
        }

        #[cfg(feature = "tracing")]
        {
            let mismatched = skipped
                .iter()
                .filter(|s| s.reason == crate::SkipReason::UnitMismatch)
                .count();
            if mismatched > 0 {
                tracing::warn!(
                    mismatched,
                    unit = ?self.unit,
                    "dropping records whose times look like a different unit"
                );
            }
        }

        let (series, inserted, replaced) =
            merge_points(existing, accepted.into_iter().map(|(_, p)| p));
        ReconcileReport {
            step_seconds: estimate_step_seconds(series.as_slice()),
            series,
            inserted,
            replaced,
            skipped,
        }
    }

    /// Decode a JSON payload and merge it into `existing`.
    ///
    /// # Errors
    /// Returns `CandelaError::InvalidBatch` if the payload is not one of the
    /// accepted shapes (see [`crate::payload`]). Malformed records inside a
    /// well-shaped payload are skipped, not reported as errors.
    pub fn reconcile_payload(
        &self,
        existing: &CandleSeries,
        bytes: &[u8],
    ) -> Result<ReconcileReport, CandelaError> {
        let records = parse_batch(bytes)?;
        Ok(self.reconcile_with_report(existing, &records))
    }

    /// Merge an already-typed series into `existing`; `incoming` wins on shared
    /// times. Candles carrying a non-finite price are ignored.
    #[must_use]
    pub fn merge(existing: &CandleSeries, incoming: &CandleSeries) -> CandleSeries {
        let points = incoming
            .iter()
            .copied()
            .filter(|p| ensure_finite_prices(p).is_ok());
        merge_points(existing, points).0
    }
}

/// Merge `incoming` (times in seconds) into `existing`.
///
/// Shorthand for [`SeriesReconciler::reconcile`] with [`TimeUnit::Seconds`].
#[must_use]
pub fn reconcile(existing: &CandleSeries, incoming: &[RawCandle]) -> CandleSeries {
    SeriesReconciler::default().reconcile(existing, incoming)
}

/// Merge two typed series; see [`SeriesReconciler::merge`].
#[must_use]
pub fn merge(existing: &CandleSeries, incoming: &CandleSeries) -> CandleSeries {
    SeriesReconciler::merge(existing, incoming)
}

/// Returns the merged series and the inserted/replaced counts.
fn merge_points<I>(existing: &CandleSeries, incoming: I) -> (CandleSeries, usize, usize)
where
    I: IntoIterator<Item = CandlePoint>,
{
    // Later records overwrite earlier ones for the same time.
    let mut batch: BTreeMap<EpochSeconds, CandlePoint> = BTreeMap::new();
    for p in incoming {
        batch.insert(p.time, p);
    }

    let mut map: BTreeMap<EpochSeconds, CandlePoint> =
        existing.iter().map(|p| (p.time, *p)).collect();
    let mut inserted = 0usize;
    let mut replaced = 0usize;
    for (t, p) in batch {
        match map.entry(t) {
            Entry::Vacant(v) => {
                v.insert(p);
                inserted += 1;
            }
            Entry::Occupied(mut o) => {
                if *o.get() != p {
                    o.insert(p);
                    replaced += 1;
                }
            }
        }
    }
    (map.into_values().collect(), inserted, replaced)
}
