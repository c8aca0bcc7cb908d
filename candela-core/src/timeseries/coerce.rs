//! Coercion of raw records into [`CandlePoint`]s.
//!
//! Prices are accepted as JSON numbers or as strings holding a decimal number
//! (surrounding whitespace allowed). Everything else marks the record as
//! malformed; the caller decides what to do with it.

use crate::timeseries::infer::is_unit_mismatch;
use crate::{CandlePoint, PriceField, RawCandle, RawNumber, SkipReason, TimeUnit};

/// Coerce a raw value to a finite `f64`.
///
/// # Errors
/// Returns the [`SkipReason`] for `field` when the value is absent, not numeric,
/// or not finite.
pub fn coerce_price(value: Option<&RawNumber>, field: PriceField) -> Result<f64, SkipReason> {
    let v = match value {
        None | Some(RawNumber::Other(serde_json::Value::Null)) => {
            return Err(SkipReason::Missing(field));
        }
        Some(RawNumber::Number(n)) => *n,
        Some(RawNumber::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| SkipReason::NotNumeric(field))?,
        Some(RawNumber::Other(_)) => return Err(SkipReason::NotNumeric(field)),
    };
    if v.is_finite() {
        Ok(v)
    } else {
        Err(SkipReason::NonFinite(field))
    }
}

/// Coerce and normalize a raw bucket start.
///
/// # Errors
/// Returns a `Time` [`SkipReason`] when the value cannot be coerced,
/// `UnitMismatch` when its magnitude belongs to the other unit (see
/// [`is_unit_mismatch`]), or `TimeOutOfRange` when it falls outside the
/// calendar once normalized.
pub fn coerce_time(
    value: Option<&RawNumber>,
    unit: TimeUnit,
) -> Result<crate::EpochSeconds, SkipReason> {
    let raw = coerce_price(value, PriceField::Time)?;
    if is_unit_mismatch(unit, raw) {
        return Err(SkipReason::UnitMismatch);
    }
    unit.normalize(raw).ok_or(SkipReason::TimeOutOfRange)
}

/// Coerce a whole record. The time is checked first, then open, high, low, close.
///
/// # Errors
/// Returns the first [`SkipReason`] encountered.
pub fn coerce_record(raw: &RawCandle, unit: TimeUnit) -> Result<CandlePoint, SkipReason> {
    let time = coerce_time(raw.bucket_start(), unit)?;
    let open = coerce_price(raw.open.as_ref(), PriceField::Open)?;
    let high = coerce_price(raw.high.as_ref(), PriceField::High)?;
    let low = coerce_price(raw.low.as_ref(), PriceField::Low)?;
    let close = coerce_price(raw.close.as_ref(), PriceField::Close)?;
    Ok(CandlePoint::new(time, open, high, low, close))
}
