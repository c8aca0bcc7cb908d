use std::sync::Arc;
use std::time::Duration;

use candela::{CandleSeries, CandleSource, SeriesSink};

/// Base URL of the candle endpoint used when not running against the mock.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5002";

/// True when demos should run against the in-process mock source.
#[must_use]
pub fn use_mock() -> bool {
    std::env::var("CANDELA_DEMOS_USE_MOCK").is_ok()
}

/// Return a candle source for demos.
///
/// With `CANDELA_DEMOS_USE_MOCK` set this is a mock that gains one candle per
/// poll; otherwise an HTTP source for `CANDELA_BASE_URL` (default
/// [`DEFAULT_BASE_URL`]).
///
/// # Panics
/// Panics if `CANDELA_BASE_URL` is not a valid http(s) URL.
#[must_use]
pub fn get_source() -> Arc<dyn CandleSource> {
    if use_mock() {
        println!("--- (Using Mock Source for CI) ---");
        Arc::new(candela_mock::MockSource::at_now().advancing())
    } else {
        let base = std::env::var("CANDELA_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        Arc::new(
            candela_http::HttpCandleSource::builder(&base)
                .timeout(Some(Duration::from_secs(5)))
                .build()
                .expect("valid CANDELA_BASE_URL"),
        )
    }
}

/// How long the live demos keep polling.
#[must_use]
pub fn run_for() -> Duration {
    if use_mock() {
        Duration::from_millis(1_500)
    } else {
        Duration::from_secs(10)
    }
}

/// Poll interval for the live demos.
#[must_use]
pub fn poll_interval() -> Duration {
    if use_mock() {
        Duration::from_millis(300)
    } else {
        Duration::from_secs(2)
    }
}

/// A sink that prints a one-line summary of every render.
#[derive(Debug, Default)]
pub struct PrintSink;

impl SeriesSink for PrintSink {
    fn render(&self, series: &CandleSeries) {
        match series.last() {
            Some(last) => println!(
                "render: {} candles, last {} o={} h={} l={} c={}",
                series.len(),
                last.time,
                last.open,
                last.high,
                last.low,
                last.close
            ),
            None => println!("render: empty series"),
        }
    }

    fn clear(&self) {
        println!("clear");
    }
}
