use std::sync::Arc;
use std::time::Duration;

use candela_core::stream::PollHandle;
use candela_core::{
    BackoffConfig, CandelaError, CandleSeries, CandleSource, FeedConfig, ReconcileReport,
    SeriesSink, TimeUnit, Timeframe,
};
use tokio::sync::watch;

use crate::poller::{self, FeedShared, Selection};

/// Builder for constructing a [`CandleFeed`] with custom configuration.
pub struct CandleFeedBuilder {
    source: Option<Arc<dyn CandleSource>>,
    sink: Option<Arc<dyn SeriesSink>>,
    cfg: FeedConfig,
}

impl Default for CandleFeedBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CandleFeedBuilder {
    /// Create a new builder with [`FeedConfig::default`] settings.
    ///
    /// Behavior and trade-offs:
    /// - Starts with no source; you must register one via [`Self::source`].
    /// - Defaults follow the reference candle endpoint: `EURUSD-OTC` on `M5`,
    ///   200 candles per request, a poll every 2s, a 10s source timeout and
    ///   no failure backoff.
    #[must_use]
    pub fn new() -> Self {
        Self {
            source: None,
            sink: None,
            cfg: FeedConfig::default(),
        }
    }

    /// Register the candle source.
    #[must_use]
    pub fn source(mut self, source: Arc<dyn CandleSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Register a sink that renders every published series.
    ///
    /// The sink is called on the poll task right after publication, with an
    /// internal lock held: it must not block for long or call back into the feed.
    #[must_use]
    pub fn sink(mut self, sink: Arc<dyn SeriesSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, cfg: FeedConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Initial instrument symbol.
    #[must_use]
    pub fn symbol(mut self, symbol: impl Into<String>) -> Self {
        self.cfg.symbol = symbol.into();
        self
    }

    /// Initial candle width.
    #[must_use]
    pub const fn timeframe(mut self, timeframe: Timeframe) -> Self {
        self.cfg.timeframe = timeframe;
        self
    }

    /// Candles requested per poll.
    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.cfg.limit = limit;
        self
    }

    /// Time between the starts of consecutive polls.
    #[must_use]
    pub const fn poll_interval(mut self, interval: Duration) -> Self {
        self.cfg.poll_interval = interval;
        self
    }

    /// Unit the source reports `time` in.
    ///
    /// Fixed for the feed's lifetime. A batch in the other unit is rejected
    /// rather than mixed into the series.
    #[must_use]
    pub const fn time_unit(mut self, unit: TimeUnit) -> Self {
        self.cfg.time_unit = unit;
        self
    }

    /// Keep at most `max` of the most recent candles; `None` keeps everything.
    #[must_use]
    pub const fn max_candles(mut self, max: Option<usize>) -> Self {
        self.cfg.max_candles = max;
        self
    }

    /// Timeout for a single source call.
    #[must_use]
    pub const fn source_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.source_timeout = timeout;
        self
    }

    /// Stretch the poll cadence after consecutive failures.
    #[must_use]
    pub const fn backoff(mut self, cfg: BackoffConfig) -> Self {
        self.cfg.backoff = Some(cfg);
        self
    }

    /// Build the feed. The poll task is not started; call [`CandleFeed::start`].
    ///
    /// # Errors
    /// Returns `CandelaError::InvalidArg` if no source is registered, the symbol is
    /// blank, or the poll interval, limit or `max_candles` is zero.
    pub fn build(self) -> Result<CandleFeed, CandelaError> {
        let Some(source) = self.source else {
            return Err(CandelaError::InvalidArg(
                "no source registered; add one via source(...)".to_string(),
            ));
        };
        if self.cfg.symbol.trim().is_empty() {
            return Err(CandelaError::InvalidArg("symbol must not be blank".into()));
        }
        if self.cfg.poll_interval.is_zero() {
            return Err(CandelaError::InvalidArg(
                "poll interval must be positive".into(),
            ));
        }
        if self.cfg.limit == 0 {
            return Err(CandelaError::InvalidArg("limit must be positive".into()));
        }
        if self.cfg.max_candles == Some(0) {
            return Err(CandelaError::InvalidArg(
                "max_candles must be positive when set".into(),
            ));
        }
        Ok(CandleFeed {
            shared: Arc::new(FeedShared::new(source, self.sink, self.cfg)),
            handle: None,
        })
    }
}

/// Tag an error with the name of the source it came from.
///
/// Errors that already identify their origin or class pass through unchanged;
/// anything else becomes `CandelaError::Source` carrying the source name.
#[must_use]
pub fn tag_err(source: &str, e: CandelaError) -> CandelaError {
    match e {
        e @ (CandelaError::NotFound { .. }
        | CandelaError::SourceTimeout { .. }
        | CandelaError::Source { .. }
        | CandelaError::Http { .. }
        | CandelaError::InvalidBatch(_)) => e,
        other => CandelaError::Source {
            provider: source.to_string(),
            msg: other.to_string(),
        },
    }
}

#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        name = "candela::core::source_call_with_timeout",
        skip(fut),
        fields(
            source = source_name,
            timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        ),
    )
)]
pub(crate) async fn source_call_with_timeout<T, Fut>(
    source_name: &'static str,
    timeout: Duration,
    fut: Fut,
) -> Result<T, CandelaError>
where
    Fut: core::future::Future<Output = Result<T, CandelaError>>,
{
    (tokio::time::timeout(timeout, fut).await)
        .unwrap_or_else(|_| Err(CandelaError::source_timeout(source_name)))
}

/// A polling candle feed.
///
/// Owns the source, the optional sink, the current series and the poll task.
/// Consumers read whole snapshots through [`series`](Self::series) or
/// [`subscribe`](Self::subscribe); a snapshot is never partially updated.
///
/// Dropping the feed stops its poll task.
pub struct CandleFeed {
    shared: Arc<FeedShared>,
    handle: Option<PollHandle>,
}

impl CandleFeed {
    /// Start configuring a feed.
    #[must_use]
    pub fn builder() -> CandleFeedBuilder {
        CandleFeedBuilder::new()
    }

    /// Spawn the poll task: one poll right away, then one per poll interval.
    ///
    /// # Errors
    /// Returns `CandelaError::AlreadyRunning` if the poll task is live.
    ///
    /// # Panics
    /// Panics if called outside a Tokio runtime.
    pub fn start(&mut self) -> Result<(), CandelaError> {
        if self.is_running() {
            return Err(CandelaError::AlreadyRunning);
        }
        #[cfg(feature = "tracing")]
        {
            let interval_ms =
                u64::try_from(self.shared.cfg.poll_interval.as_millis()).unwrap_or(u64::MAX);
            tracing::info!(
                source = self.shared.source.name(),
                interval_ms,
                "starting candle feed"
            );
        }
        self.handle = Some(poller::spawn_poll_loop(Arc::clone(&self.shared)));
        Ok(())
    }

    /// Stop the poll task and wait for it to exit. A poll in flight is
    /// cancelled without publishing. Calling this on a stopped feed is a no-op.
    pub async fn stop(&mut self) {
        if let Some(h) = self.handle.take() {
            h.stop().await;
        }
    }

    /// Returns true while the poll task is alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Run one poll now, serialized with the poll task.
    ///
    /// Returns `Ok(None)` if the selection changed while the fetch was in flight.
    ///
    /// # Errors
    /// Returns the source error (tagged with the source name), `SourceTimeout`
    /// if the source did not answer in time, or `InvalidBatch` for a payload
    /// that is not a candle batch. The current series is left untouched.
    pub async fn poll_once(&self) -> Result<Option<ReconcileReport>, CandelaError> {
        poller::tick::run(&self.shared).await
    }

    /// Switch to another instrument.
    ///
    /// Resets the series to empty, clears the sink and triggers an immediate
    /// poll if the task is running. A poll in flight for the old symbol is
    /// discarded when it completes.
    ///
    /// # Errors
    /// Returns `CandelaError::InvalidArg` if `symbol` is blank.
    pub fn change_symbol(&self, symbol: impl Into<String>) -> Result<(), CandelaError> {
        let symbol = symbol.into().trim().to_string();
        if symbol.is_empty() {
            return Err(CandelaError::InvalidArg("symbol must not be blank".into()));
        }
        self.shared.switch(|s| s.symbol = symbol);
        Ok(())
    }

    /// Switch to another candle width; same reset semantics as
    /// [`change_symbol`](Self::change_symbol).
    pub fn change_timeframe(&self, timeframe: Timeframe) {
        self.shared.switch(|s| s.timeframe = timeframe);
    }

    /// The current series snapshot.
    #[must_use]
    pub fn series(&self) -> Arc<CandleSeries> {
        self.shared.series_tx.borrow().clone()
    }

    /// Watch every published snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<CandleSeries>> {
        self.shared.series_tx.subscribe()
    }

    /// The current selection.
    #[must_use]
    pub fn selection(&self) -> Selection {
        self.shared.lock_selection().selection.clone()
    }

    /// The configuration the feed was built with. `symbol` and `timeframe`
    /// there are the initial selection; see [`selection`](Self::selection).
    #[must_use]
    pub fn config(&self) -> &FeedConfig {
        &self.shared.cfg
    }
}
