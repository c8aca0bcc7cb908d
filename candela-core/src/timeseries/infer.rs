use std::collections::{BTreeMap, BTreeSet};

use crate::{CandlePoint, EpochSeconds, RawCandle, RawNumber, TimeUnit};

/// Raw times at or above this magnitude are milliseconds: 1973-03-03 in
/// milliseconds, year 5138 in seconds.
pub const MILLIS_MAGNITUDE: f64 = 1e11;

/// Raw times at or above this magnitude, and below [`MILLIS_MAGNITUDE`], are
/// seconds: 1973-03-03 in seconds, 1970-01-02 in milliseconds.
pub const SECONDS_MAGNITUDE: f64 = 1e8;

/// Estimate a representative step (in seconds) from positive adjacent time
/// deltas in the input series.
///
/// Prefer the mode (most frequent positive delta); if there is no unique mode,
/// return the lower median.
///
/// ```
/// use candela_core::{estimate_step_seconds, CandlePoint, EpochSeconds};
///
/// let mk = |t: i64| CandlePoint::new(EpochSeconds::new(t), 1.0, 1.0, 1.0, 1.0);
/// // Deltas 60,60,60,120,180: unique mode 60
/// let candles = vec![mk(0), mk(60), mk(120), mk(180), mk(300), mk(480)];
/// assert_eq!(estimate_step_seconds(&candles), Some(60));
///
/// // Deltas 60,60,120,120: tied, lower median 60
/// let candles = vec![mk(0), mk(60), mk(120), mk(240), mk(360)];
/// assert_eq!(estimate_step_seconds(&candles), Some(60));
/// ```
///
/// The input order does not matter; duplicates are ignored. Returns `None` if
/// fewer than two distinct times are present.
#[must_use]
pub fn estimate_step_seconds(candles: &[CandlePoint]) -> Option<i64> {
    let times: BTreeSet<EpochSeconds> = candles.iter().map(|c| c.time).collect();
    let mut deltas: Vec<i64> = times
        .iter()
        .zip(times.iter().skip(1))
        .map(|(a, b)| b.get().saturating_sub(a.get()))
        .collect();

    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for &d in &deltas {
        *counts.entry(d).or_default() += 1;
    }
    let top = counts.values().copied().max()?;
    let mut modes = counts.iter().filter(|&(_, &n)| n == top).map(|(&d, _)| d);
    match (modes.next(), modes.next()) {
        (Some(d), None) => Some(d),
        _ => {
            deltas.sort_unstable();
            lower_median(&deltas)
        }
    }
}

/// The unit a single raw time value looks like it is in, judged by magnitude.
///
/// Values below [`SECONDS_MAGNITUDE`] (including negatives) fit either unit
/// and give `None`.
#[must_use]
pub fn magnitude_unit(raw: f64) -> Option<TimeUnit> {
    if raw >= MILLIS_MAGNITUDE {
        Some(TimeUnit::Milliseconds)
    } else if raw >= SECONDS_MAGNITUDE {
        Some(TimeUnit::Seconds)
    } else {
        None
    }
}

/// Guess the unit a raw batch reports its times in.
///
/// Looks at the median numeric bucket start: at least `1e11` reads as
/// milliseconds, at least `1e8` as seconds. Smaller or absent values give
/// `None`. String times are parsed the same way prices are.
#[must_use]
pub fn detect_time_unit(raw: &[RawCandle]) -> Option<TimeUnit> {
    let mut times: Vec<f64> = raw
        .iter()
        .filter_map(|r| match r.bucket_start()? {
            RawNumber::Number(n) => Some(*n),
            RawNumber::Text(s) => s.trim().parse::<f64>().ok(),
            RawNumber::Other(_) => None,
        })
        .filter(|v| v.is_finite())
        .collect();
    times.sort_unstable_by(f64::total_cmp);
    magnitude_unit(lower_median(&times)?)
}

/// Returns `true` if a raw time read in `configured` unit is clearly in the
/// other one: a seconds-sized value fed to a milliseconds reader, or the
/// reverse. Small values are never a mismatch.
#[must_use]
pub fn is_unit_mismatch(configured: TimeUnit, raw: f64) -> bool {
    magnitude_unit(raw).is_some_and(|seen| seen != configured)
}

/// Lower median of an already sorted slice.
pub(crate) fn lower_median<T: Copy>(sorted: &[T]) -> Option<T> {
    if sorted.is_empty() {
        return None;
    }
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some(sorted[mid - 1])
    }
}
