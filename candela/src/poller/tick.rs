//! One poll step: fetch, reconcile, publish, render.

use std::sync::Arc;

use candela_core::{CandelaError, CandleRequest, ReconcileReport};

use super::FeedShared;
use crate::core::{source_call_with_timeout, tag_err};

/// Run one poll against the current selection.
///
/// Returns `Ok(None)` when the selection changed while the fetch was in flight;
/// the batch belongs to the old selection and is dropped. On error nothing is
/// published and the previous series stays current.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(name = "candela::poller::tick", skip(shared), err)
)]
pub(crate) async fn run(shared: &FeedShared) -> Result<Option<ReconcileReport>, CandelaError> {
    let _turn = shared.gate.lock().await;

    let (req, generation) = {
        let state = shared.lock_selection();
        let req = CandleRequest::new(
            state.selection.symbol.clone(),
            state.selection.timeframe,
            shared.cfg.limit,
        )?;
        (req, state.generation)
    };

    let name = shared.source.name();
    let raw = source_call_with_timeout(
        name,
        shared.cfg.source_timeout,
        shared.source.fetch(&req),
    )
    .await
    .map_err(|e| tag_err(name, e))?;

    #[cfg(feature = "tracing")]
    {
        if let Some(seen) = candela_core::detect_time_unit(&raw)
            && seen != shared.reconciler.unit()
        {
            tracing::warn!(
                configured = ?shared.reconciler.unit(),
                observed = ?seen,
                symbol = %req.symbol(),
                "source times look like a different unit than configured"
            );
        }
    }

    // Check, publish and render under one lock so a concurrent selection
    // change cannot interleave with them.
    let state = shared.lock_selection();
    if state.generation != generation {
        #[cfg(feature = "tracing")]
        tracing::debug!(symbol = %req.symbol(), "selection changed during fetch; dropping batch");
        return Ok(None);
    }

    let current = shared.series_tx.borrow().clone();
    let mut report = shared.reconciler.reconcile_with_report(&current, &raw);
    if let Some(max) = shared.cfg.max_candles {
        report.series = report.series.retain_last(max);
        report.step_seconds = candela_core::estimate_step_seconds(report.series.as_slice());
    }

    #[cfg(feature = "tracing")]
    {
        if let Some(step) = report.step_seconds
            && step != req.timeframe().as_seconds()
        {
            tracing::warn!(
                step,
                expected = req.timeframe().as_seconds(),
                "observed candle spacing differs from the requested timeframe"
            );
        }
        let inverted = candela_core::timeseries::util::count_inverted(report.series.as_slice());
        tracing::debug!(
            inserted = report.inserted,
            replaced = report.replaced,
            skipped = report.skipped.len(),
            inverted,
            len = report.series.len(),
            "batch reconciled"
        );
    }

    if report.series != *current {
        let snapshot = Arc::new(report.series.clone());
        shared.series_tx.send_replace(Arc::clone(&snapshot));
        if let Some(sink) = &shared.sink {
            sink.render(&snapshot);
        }
    }
    drop(state);
    Ok(Some(report))
}
