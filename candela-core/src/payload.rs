//! Decoding of candle payloads.
//!
//! Candle endpoints answer in one of three shapes:
//! - a bare array of records: `[{"time": .., "open": ..}, ..]`
//! - an envelope: `{"symbol": "..", "candles": [..], "count": N}`
//! - a single record object carrying `time`, `from` or `timestamp`
//!
//! Anything else is an invalid batch. Individual records are decoded
//! leniently (see [`RawCandle`]); only the batch shape can fail here.

use serde_json::Value;

use crate::{CandelaError, RawCandle};

const TIME_KEYS: [&str; 3] = ["time", "from", "timestamp"];

/// Decode a JSON payload into raw records.
///
/// # Errors
/// Returns `CandelaError::InvalidBatch` if `bytes` is not JSON or not one of the
/// accepted payload shapes.
pub fn parse_batch(bytes: &[u8]) -> Result<Vec<RawCandle>, CandelaError> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| CandelaError::invalid_batch(format!("payload is not JSON: {e}")))?;
    parse_batch_value(value)
}

/// Decode an already-parsed JSON value into raw records.
///
/// # Errors
/// Returns `CandelaError::InvalidBatch` if `value` is not one of the accepted
/// payload shapes, or if any array element is not a JSON object.
pub fn parse_batch_value(value: Value) -> Result<Vec<RawCandle>, CandelaError> {
    match value {
        Value::Array(items) => records_from_array(items),
        Value::Object(mut map) => {
            if let Some(candles) = map.remove("candles") {
                return match candles {
                    Value::Array(items) => records_from_array(items),
                    other => Err(CandelaError::invalid_batch(format!(
                        "`candles` must be an array, got {}",
                        kind_of(&other)
                    ))),
                };
            }
            if TIME_KEYS.iter().any(|k| map.contains_key(*k)) {
                return Ok(vec![record_from_value(Value::Object(map), 0)?]);
            }
            let mut keys: Vec<&str> = map.keys().map(String::as_str).collect();
            keys.sort_unstable();
            Err(CandelaError::invalid_batch(format!(
                "object is neither a candle nor a candle envelope (keys: {keys:?})"
            )))
        }
        other => Err(CandelaError::invalid_batch(format!(
            "expected an array of candles, got {}",
            kind_of(&other)
        ))),
    }
}

fn records_from_array(items: Vec<Value>) -> Result<Vec<RawCandle>, CandelaError> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, v)| record_from_value(v, i))
        .collect()
}

fn record_from_value(v: Value, index: usize) -> Result<RawCandle, CandelaError> {
    if !v.is_object() {
        return Err(CandelaError::invalid_batch(format!(
            "element {index} is {}, not a candle object",
            kind_of(&v)
        )));
    }
    // Every field of RawCandle is optional and untyped, so an object always decodes.
    serde_json::from_value(v)
        .map_err(|e| CandelaError::invalid_batch(format!("element {index}: {e}")))
}

const fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
