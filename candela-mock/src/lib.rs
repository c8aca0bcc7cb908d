//! candela-mock
//!
//! CI-safe stand-ins for the collaborators of a candle feed:
//! - [`MockSource`]: deterministic candles from static fixtures.
//! - [`DynamicMockSource`]: behavior scripted per symbol by a test.
//! - [`RecordingSink`]: a sink that remembers what it was asked to render.
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use candela_core::{
    CandelaError, CandleRequest, CandleSource, EpochSeconds, RawCandle, TimeUnit,
};

mod dynamic;
mod fixtures;
mod sink;

pub use dynamic::{DynamicMockController, DynamicMockSource, MockBehavior};
pub use sink::RecordingSink;

/// Anchor used by [`MockSource::new`]: 2023-11-14T22:13:20Z.
pub const DEFAULT_ANCHOR: EpochSeconds = EpochSeconds::new(1_700_000_000);

/// Mock source for CI-safe demos. Provides deterministic candles from static fixtures.
///
/// Known symbols are the majors `EURUSD`, `GBPUSD`, `USDJPY`, `EURJPY`,
/// `AUDUSD` and `USDCAD`, with or without an `-OTC` suffix. Two symbols
/// misbehave on purpose: `FAIL` returns a source error and `TIMEOUT` stalls
/// for 200ms before answering with `EURUSD` data.
#[derive(Debug)]
pub struct MockSource {
    anchor: AtomicI64,
    advance: bool,
    unit: TimeUnit,
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSource {
    /// A source whose newest candle always contains [`DEFAULT_ANCHOR`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            anchor: AtomicI64::new(DEFAULT_ANCHOR.get()),
            advance: false,
            unit: TimeUnit::Seconds,
        }
    }

    /// Anchor the newest candle at the current wall-clock time.
    #[must_use]
    pub fn at_now() -> Self {
        let now = EpochSeconds::from_datetime(chrono::Utc::now());
        Self::new().with_anchor(now)
    }

    /// Anchor the newest candle at `anchor`.
    #[must_use]
    pub fn with_anchor(self, anchor: EpochSeconds) -> Self {
        self.anchor.store(anchor.get(), Ordering::SeqCst);
        self
    }

    /// Move the anchor forward by one bucket after every fetch, so each poll
    /// sees one new candle.
    #[must_use]
    pub const fn advancing(mut self) -> Self {
        self.advance = true;
        self
    }

    /// Report `time` in `unit` instead of seconds.
    #[must_use]
    pub const fn with_time_unit(mut self, unit: TimeUnit) -> Self {
        self.unit = unit;
        self
    }

    fn not_found(what: &str) -> CandelaError {
        CandelaError::not_found(what.to_string())
    }

    async fn maybe_fail_or_timeout(symbol: &str) -> Result<(), CandelaError> {
        match symbol {
            "FAIL" => Err(CandelaError::source("candela-mock", "forced failure")),
            "TIMEOUT" => {
                // Long enough to trip a short source timeout, short enough for CI.
                tokio::time::sleep(Duration::from_millis(200)).await;
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl CandleSource for MockSource {
    fn name(&self) -> &'static str {
        "candela-mock"
    }

    async fn fetch(&self, req: &CandleRequest) -> Result<Vec<RawCandle>, CandelaError> {
        let symbol = req.symbol();
        Self::maybe_fail_or_timeout(symbol).await?;
        let lookup = if symbol == "TIMEOUT" { "EURUSD" } else { symbol };
        let base = fixtures::candles::base_price(lookup)
            .ok_or_else(|| Self::not_found(&format!("candles for {symbol}")))?;
        let step = req.timeframe().as_seconds();
        let anchor = if self.advance {
            self.anchor.fetch_add(step, Ordering::SeqCst)
        } else {
            self.anchor.load(Ordering::SeqCst)
        };
        Ok(fixtures::candles::build(
            base,
            req.timeframe(),
            req.limit(),
            EpochSeconds::new(anchor),
            self.unit,
        ))
    }
}
