//! Inbound candle records exactly as a source delivers them.

use serde::{Deserialize, Serialize};

/// A numeric-like wire value.
///
/// Sources are inconsistent: some send prices as JSON numbers, some as strings.
/// Anything else is kept verbatim so the record can be reported, not rejected
/// at decode time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    /// A JSON number.
    Number(f64),
    /// A JSON string, expected to hold a decimal number.
    Text(String),
    /// Any other JSON value (bool, array, object).
    Other(serde_json::Value),
}

impl From<f64> for RawNumber {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<i64> for RawNumber {
    #[allow(clippy::cast_precision_loss)]
    fn from(v: i64) -> Self {
        Self::Number(v as f64)
    }
}

impl From<&str> for RawNumber {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

/// A raw candle record.
///
/// Every field is optional so that any JSON object decodes; missing or
/// non-numeric fields are dealt with during reconciliation. The bucket start may
/// arrive as `time`, `from` or `timestamp`. Unknown fields (`to`, `volume`,
/// `symbol`, ...) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCandle {
    /// Bucket start, in the unit the source uses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<RawNumber>,
    /// Bucket start under the `from` key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<RawNumber>,
    /// Bucket start under the `timestamp` key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<RawNumber>,
    /// Opening price.
    #[serde(default)]
    pub open: Option<RawNumber>,
    /// Highest price.
    #[serde(default)]
    pub high: Option<RawNumber>,
    /// Lowest price.
    #[serde(default)]
    pub low: Option<RawNumber>,
    /// Closing price.
    #[serde(default)]
    pub close: Option<RawNumber>,
}

impl RawCandle {
    /// Build a record with a `time` key and four price fields.
    pub fn new(
        time: impl Into<RawNumber>,
        open: impl Into<RawNumber>,
        high: impl Into<RawNumber>,
        low: impl Into<RawNumber>,
        close: impl Into<RawNumber>,
    ) -> Self {
        Self {
            time: Some(time.into()),
            from: None,
            timestamp: None,
            open: Some(open.into()),
            high: Some(high.into()),
            low: Some(low.into()),
            close: Some(close.into()),
        }
    }

    /// The bucket start, whichever key carried it (`time`, then `from`, then `timestamp`).
    #[must_use]
    pub fn bucket_start(&self) -> Option<&RawNumber> {
        self.time
            .as_ref()
            .or(self.from.as_ref())
            .or(self.timestamp.as_ref())
    }
}
