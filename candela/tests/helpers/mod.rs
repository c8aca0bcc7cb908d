// Shared fixtures for feed tests: `use crate::helpers::*;`
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use candela::{CandleFeed, CandleFeedBuilder, RawCandle, Timeframe};
use candela_mock::{DynamicMockController, DynamicMockSource, RecordingSink};

/// Symbol constants used across tests.
pub const EURUSD: &str = "EURUSD-OTC";
pub const GBPUSD: &str = "GBPUSD-OTC";

/// Bucket start of the first candle in [`batch`].
pub const T0: i64 = 1_700_000_100;

/// Poll interval used unless a test needs another one.
pub const INTERVAL: Duration = Duration::from_secs(2);

/// A well-formed M5 record at `time` with a close of `close`.
pub fn candle(time: i64, close: f64) -> RawCandle {
    RawCandle::new(time, close, close + 0.5, close - 0.5, close)
}

/// `n` consecutive M5 records starting at `start`, closes counting up from `base`.
#[allow(clippy::cast_precision_loss)]
pub fn batch(start: i64, n: usize, base: f64) -> Vec<RawCandle> {
    (0..n)
        .map(|i| candle(start + 300 * i as i64, base + i as f64))
        .collect()
}

/// Builder preloaded with a scripted source, a recording sink, `EURUSD` on M5.
pub fn scripted() -> (CandleFeedBuilder, DynamicMockController, Arc<RecordingSink>) {
    let (source, ctrl) = DynamicMockSource::new_with_controller("dyn");
    let sink = Arc::new(RecordingSink::new());
    let builder = CandleFeed::builder()
        .source(source)
        .sink(sink.clone())
        .symbol(EURUSD)
        .timeframe(Timeframe::M5)
        .limit(10)
        .poll_interval(INTERVAL);
    (builder, ctrl, sink)
}

/// Let the poll task run whatever is ready without moving the clock far.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

/// Bucket starts of a series, for compact assertions.
pub fn times(series: &candela::CandleSeries) -> Vec<i64> {
    series.iter().map(|c| c.time.get()).collect()
}
