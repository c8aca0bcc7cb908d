//! The background poll task and the state it shares with its owning feed.

pub mod backoff;
pub mod tick;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use candela_core::stream::PollHandle;
use candela_core::{CandleSeries, CandleSource, FeedConfig, SeriesReconciler, SeriesSink, Timeframe};
use tokio::sync::{Notify, oneshot, watch};
use tokio::time::Instant;

/// The instrument and candle width a feed is currently polling.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selection {
    /// Instrument symbol.
    pub symbol: String,
    /// Candle width.
    pub timeframe: Timeframe,
}

/// Current selection plus a counter bumped on every change, so a poll can
/// tell that the selection moved under it even if it moved back.
#[derive(Debug)]
pub(crate) struct SelectionState {
    pub(crate) selection: Selection,
    pub(crate) generation: u64,
}

/// State shared between a feed and its poll task.
pub(crate) struct FeedShared {
    pub(crate) source: Arc<dyn CandleSource>,
    pub(crate) sink: Option<Arc<dyn SeriesSink>>,
    pub(crate) cfg: FeedConfig,
    pub(crate) reconciler: SeriesReconciler,
    pub(crate) series_tx: watch::Sender<Arc<CandleSeries>>,
    /// Held across selection checks, publication and rendering; never across an await.
    pub(crate) selection: Mutex<SelectionState>,
    /// Serializes polls between the task and `poll_once`.
    pub(crate) gate: tokio::sync::Mutex<()>,
    /// Wakes the task early after a selection change.
    pub(crate) wake: Notify,
}

impl FeedShared {
    pub(crate) fn new(
        source: Arc<dyn CandleSource>,
        sink: Option<Arc<dyn SeriesSink>>,
        cfg: FeedConfig,
    ) -> Self {
        let selection = Selection {
            symbol: cfg.symbol.trim().to_string(),
            timeframe: cfg.timeframe,
        };
        let (series_tx, _) = watch::channel(Arc::new(CandleSeries::new()));
        Self {
            source,
            sink,
            reconciler: SeriesReconciler::new(cfg.time_unit),
            cfg,
            series_tx,
            selection: Mutex::new(SelectionState {
                selection,
                generation: 0,
            }),
            gate: tokio::sync::Mutex::new(()),
            wake: Notify::new(),
        }
    }

    /// Lock the selection. A sink that panicked while rendering poisons the
    /// lock; the state it guards is still consistent, so recover it.
    pub(crate) fn lock_selection(&self) -> MutexGuard<'_, SelectionState> {
        self.selection.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Switch selection, reset the series and clear the sink as one step.
    pub(crate) fn switch(&self, update: impl FnOnce(&mut Selection)) {
        let mut state = self.lock_selection();
        update(&mut state.selection);
        state.generation = state.generation.wrapping_add(1);
        self.series_tx.send_replace(Arc::new(CandleSeries::new()));
        if let Some(sink) = &self.sink {
            sink.clear();
        }
        drop(state);
        self.wake.notify_one();
    }
}

/// Spawn the poll loop: poll immediately, then every `poll_interval` measured
/// from the start of the previous poll, stretched by backoff after failures.
/// A selection change cuts the wait short.
pub(crate) fn spawn_poll_loop(shared: Arc<FeedShared>) -> PollHandle {
    let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
    let join = tokio::spawn(async move {
        let mut failures: u32 = 0;
        loop {
            let started = Instant::now();
            let outcome = tokio::select! {
                biased;
                _ = &mut stop_rx => break,
                r = tick::run(&shared) => r,
            };
            match outcome {
                Ok(_) => failures = 0,
                Err(_e) => {
                    failures = failures.saturating_add(1);
                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        error = %_e,
                        failures,
                        "poll failed; keeping previous series"
                    );
                }
            }
            let delay = backoff::next_delay(
                shared.cfg.poll_interval,
                shared.cfg.backoff.as_ref(),
                failures,
            );
            tokio::select! {
                biased;
                _ = &mut stop_rx => break,
                () = shared.wake.notified() => {}
                () = tokio::time::sleep_until(started + delay) => {}
            }
        }
        #[cfg(feature = "tracing")]
        tracing::debug!("poll loop stopped");
    });
    PollHandle::new(join, stop_tx)
}
