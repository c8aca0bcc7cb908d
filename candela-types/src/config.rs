//! Configuration types shared by the feed and its sources.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{TimeUnit, Timeframe};

/// Exponential backoff applied to the poll cadence after consecutive failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Minimum backoff delay in milliseconds.
    pub min_backoff_ms: u64,
    /// Maximum backoff delay in milliseconds.
    pub max_backoff_ms: u64,
    /// Exponential factor to increase delay after each failure (>= 1).
    pub factor: u32,
    /// Random jitter percentage [0, 100] added to each delay.
    pub jitter_percent: u8,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            min_backoff_ms: 500,
            max_backoff_ms: 30_000,
            factor: 2,
            jitter_percent: 20,
        }
    }
}

impl BackoffConfig {
    /// Un-jittered delay after `failures` consecutive failures (`failures >= 1`).
    #[must_use]
    pub fn delay_ms(&self, failures: u32) -> u64 {
        let exp = failures.saturating_sub(1);
        let factor = u64::from(self.factor.max(1));
        let mut delay = self.min_backoff_ms;
        for _ in 0..exp {
            delay = delay.saturating_mul(factor);
            if delay >= self.max_backoff_ms {
                break;
            }
        }
        delay.min(self.max_backoff_ms)
    }
}

/// Configuration of a polling candle feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Instrument to poll, e.g. `"EURUSD-OTC"`.
    pub symbol: String,
    /// Candle width requested from the source.
    pub timeframe: Timeframe,
    /// Number of candles requested per poll.
    pub limit: u32,
    /// Time between the starts of two consecutive polls.
    pub poll_interval: Duration,
    /// Unit the source reports `time` in. Fixed for the lifetime of the feed.
    pub time_unit: TimeUnit,
    /// Keep at most this many of the most recent candles; `None` keeps all.
    pub max_candles: Option<usize>,
    /// Timeout for a single source call.
    pub source_timeout: Duration,
    /// Optional backoff after failed polls. Without it failures keep the normal cadence.
    pub backoff: Option<BackoffConfig>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            symbol: "EURUSD-OTC".to_string(),
            timeframe: Timeframe::M5,
            limit: 200,
            poll_interval: Duration::from_secs(2),
            time_unit: TimeUnit::Seconds,
            max_candles: Some(200),
            source_timeout: Duration::from_secs(10),
            backoff: None,
        }
    }
}
