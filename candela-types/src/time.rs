//! Epoch time primitives with a unit fixed by type.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Seconds since the Unix epoch.
///
/// A [`crate::CandleSeries`] stores only this type, so a series can never mix
/// seconds and milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EpochSeconds(i64);

impl EpochSeconds {
    /// Earliest representable value: 0000-01-01T00:00:00Z.
    pub const MIN: Self = Self(-62_167_219_200);
    /// Latest representable value: 9999-12-31T23:59:59Z.
    pub const MAX: Self = Self(253_402_300_799);

    /// Wrap a raw seconds value.
    #[must_use]
    pub const fn new(secs: i64) -> Self {
        Self(secs)
    }

    /// Returns the raw seconds value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Convert to a UTC `DateTime`, if representable.
    #[must_use]
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.0, 0)
    }

    /// Build from a UTC `DateTime`, truncating sub-second precision.
    #[must_use]
    pub const fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt.timestamp())
    }
}

impl From<i64> for EpochSeconds {
    fn from(secs: i64) -> Self {
        Self(secs)
    }
}

impl fmt::Display for EpochSeconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Unit in which a source reports candle `time` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum TimeUnit {
    /// Whole or fractional seconds since the epoch.
    #[default]
    Seconds,
    /// Milliseconds since the epoch.
    Milliseconds,
}

impl TimeUnit {
    /// Number of raw units per second.
    #[must_use]
    pub const fn per_second(self) -> f64 {
        match self {
            Self::Seconds => 1.0,
            Self::Milliseconds => 1_000.0,
        }
    }

    /// Normalize a raw value in this unit to whole epoch seconds, flooring any
    /// fractional part.
    ///
    /// Returns `None` for non-finite values and for values outside
    /// [`EpochSeconds::MIN`]..=[`EpochSeconds::MAX`] once converted. The latter is
    /// what a millisecond timestamp looks like when read as seconds.
    #[must_use]
    pub fn normalize(self, raw: f64) -> Option<EpochSeconds> {
        if !raw.is_finite() {
            return None;
        }
        let secs = (raw / self.per_second()).floor();
        #[allow(clippy::cast_precision_loss)]
        let in_range =
            secs >= EpochSeconds::MIN.get() as f64 && secs <= EpochSeconds::MAX.get() as f64;
        if !in_range {
            return None;
        }
        // Range-checked above, so the cast cannot saturate.
        #[allow(clippy::cast_possible_truncation)]
        Some(EpochSeconds(secs as i64))
    }
}
