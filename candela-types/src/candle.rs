//! Numeric candles and the time-keyed series built from them.

use serde::{Deserialize, Serialize};

use crate::EpochSeconds;

/// One time-bucketed OHLC price summary.
///
/// `low <= open, close <= high` is not enforced; upstream data may violate it
/// and the values are carried through as delivered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandlePoint {
    /// Bucket start, the unique key within a series.
    pub time: EpochSeconds,
    /// Opening price.
    pub open: f64,
    /// Highest price.
    pub high: f64,
    /// Lowest price.
    pub low: f64,
    /// Closing (or latest, for a still-forming candle) price.
    pub close: f64,
}

impl CandlePoint {
    /// Build a candle from its components.
    #[must_use]
    pub const fn new(time: EpochSeconds, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
        }
    }
}

/// Candles keyed by `time`, strictly increasing, without duplicate times.
///
/// Every way of building a series (collecting an iterator, deserializing)
/// sorts by time and keeps the last point seen for a repeated time, so the
/// ordering invariant holds for every value of this type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<CandlePoint>", into = "Vec<CandlePoint>")]
pub struct CandleSeries {
    points: Vec<CandlePoint>,
}

impl CandleSeries {
    /// An empty series.
    #[must_use]
    pub const fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Number of candles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if the series holds no candles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Candles in ascending time order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &CandlePoint> {
        self.points.iter()
    }

    /// Candles in ascending time order, as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[CandlePoint] {
        &self.points
    }

    /// Oldest candle.
    #[must_use]
    pub fn first(&self) -> Option<&CandlePoint> {
        self.points.first()
    }

    /// Most recent candle.
    #[must_use]
    pub fn last(&self) -> Option<&CandlePoint> {
        self.points.last()
    }

    /// Candle at exactly `time`, if present.
    #[must_use]
    pub fn get(&self, time: EpochSeconds) -> Option<&CandlePoint> {
        self.points
            .binary_search_by_key(&time, |p| p.time)
            .ok()
            .map(|i| &self.points[i])
    }

    /// Keep only the `max` most recent candles.
    #[must_use]
    pub fn retain_last(mut self, max: usize) -> Self {
        let excess = self.points.len().saturating_sub(max);
        if excess > 0 {
            self.points.drain(..excess);
        }
        self
    }

    /// Consume the series, returning its candles in ascending time order.
    #[must_use]
    pub fn into_vec(self) -> Vec<CandlePoint> {
        self.points
    }
}

impl FromIterator<CandlePoint> for CandleSeries {
    fn from_iter<I: IntoIterator<Item = CandlePoint>>(iter: I) -> Self {
        let mut raw: Vec<CandlePoint> = iter.into_iter().collect();
        // Stable sort keeps arrival order among equal times; the last one wins below.
        raw.sort_by_key(|p| p.time);
        let mut points: Vec<CandlePoint> = Vec::with_capacity(raw.len());
        for p in raw {
            match points.last_mut() {
                Some(prev) if prev.time == p.time => *prev = p,
                _ => points.push(p),
            }
        }
        Self { points }
    }
}

impl From<Vec<CandlePoint>> for CandleSeries {
    fn from(points: Vec<CandlePoint>) -> Self {
        points.into_iter().collect()
    }
}

impl From<CandleSeries> for Vec<CandlePoint> {
    fn from(series: CandleSeries) -> Self {
        series.points
    }
}

impl<'a> IntoIterator for &'a CandleSeries {
    type Item = &'a CandlePoint;
    type IntoIter = core::slice::Iter<'a, CandlePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
