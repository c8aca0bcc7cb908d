//! Shared helpers for candle series invariants.

use crate::{CandelaError, CandlePoint};

/// Ensure candle times are strictly increasing.
///
/// # Errors
/// Returns `Err(CandelaError::InvalidBatch)` naming the first offending position if
/// two adjacent candles are out of order or share a time.
pub fn ensure_strictly_increasing(points: &[CandlePoint]) -> Result<(), CandelaError> {
    for (i, w) in points.windows(2).enumerate() {
        if w[1].time <= w[0].time {
            return Err(CandelaError::invalid_batch(format!(
                "candle {} at {} does not follow {}",
                i + 1,
                w[1].time,
                w[0].time
            )));
        }
    }
    Ok(())
}

/// Ensure every price of a candle is finite.
///
/// # Errors
/// Returns `Err(CandelaError::InvalidBatch)` if any of open, high, low or close is
/// NaN or infinite.
pub fn ensure_finite_prices(c: &CandlePoint) -> Result<(), CandelaError> {
    if [c.open, c.high, c.low, c.close].iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(CandelaError::invalid_batch(format!(
            "non-finite price in candle at {}",
            c.time
        )))
    }
}

/// Count how many candles violate `low <= open, close <= high`.
///
/// Such candles are carried through untouched; the count is only for diagnostics.
#[must_use]
pub fn count_inverted(points: &[CandlePoint]) -> usize {
    points
        .iter()
        .filter(|c| {
            c.low > c.high || c.open < c.low || c.open > c.high || c.close < c.low || c.close > c.high
        })
        .count()
}
