//! Field conversions
//!
//! Typed helpers for the API's time encodings, and the JSON-level
//! conversions built on them. JSON conversions never fail: a value whose
//! shape is not the expected one is returned unchanged.

use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeDelta, Utc};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::trace;

/// Per-unit post-processing applied after decoding
pub type Converter<T> = Arc<dyn Fn(T) -> T + Send + Sync>;

/// Conversion applied to a single field value
pub type FieldConversion = fn(Value) -> Value;

/// Identity converter
pub fn noop<T>(value: T) -> T {
    value
}

// ============================================================================
// Time Helpers
// ============================================================================

const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

/// Milliseconds between `dt` and the epoch
pub fn to_millis(dt: DateTime<Utc>) -> i64 {
    dt.timestamp_millis()
}

/// UTC datetime for the given seconds since the epoch
pub fn datetime_from_seconds(ts: f64) -> Option<DateTime<Utc>> {
    let micros = (ts * 1_000_000.0).round();
    if !micros.is_finite() {
        return None;
    }
    DateTime::from_timestamp_micros(micros as i64)
}

/// UTC datetime for the given milliseconds since the epoch
pub fn datetime_from_millis(millis: f64) -> Option<DateTime<Utc>> {
    datetime_from_seconds(millis / 1000.0)
}

/// Parse a `%Y-%m-%dT%H:%M:%S.%fZ` timestamp as UTC
pub fn datetime_from_str(s: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
        .map(|dt| dt.and_utc())
        .map_err(|e| Error::decode(format!("Invalid timestamp '{s}': {e}")))
}

/// Datetime from either epoch milliseconds or a timestamp string
pub fn datetime_from_str_or_millis(value: &Value) -> Result<DateTime<Utc>> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .and_then(datetime_from_millis)
            .ok_or_else(|| Error::decode(format!("Timestamp out of range: {n}"))),
        Value::String(s) => datetime_from_str(s),
        other => Err(Error::decode(format!("Not a timestamp: {other}"))),
    }
}

/// Duration of the given milliseconds
pub fn timedelta_from_millis(millis: f64) -> TimeDelta {
    TimeDelta::microseconds((millis * 1000.0).round() as i64)
}

fn format_datetime(dt: DateTime<Utc>) -> Value {
    Value::String(dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

// ============================================================================
// JSON Field Conversions
// ============================================================================

/// Epoch milliseconds → RFC 3339 UTC timestamp
pub fn millis_to_datetime(value: Value) -> Value {
    match value.as_f64().and_then(datetime_from_millis) {
        Some(dt) => format_datetime(dt),
        None => untouched("millis_to_datetime", value),
    }
}

/// Epoch milliseconds or timestamp string → RFC 3339 UTC timestamp
pub fn str_or_millis_to_datetime(value: Value) -> Value {
    match datetime_from_str_or_millis(&value) {
        Ok(dt) => format_datetime(dt),
        Err(_) => untouched("str_or_millis_to_datetime", value),
    }
}

/// Milliseconds → ISO 8601 duration
pub fn millis_to_timedelta(value: Value) -> Value {
    match value.as_f64() {
        Some(millis) => Value::String(timedelta_from_millis(millis).to_string()),
        None => untouched("millis_to_timedelta", value),
    }
}

/// `[year, month, day, rating]` → object with those keys
pub fn rating_history_entry(value: Value) -> Value {
    match value {
        Value::Array(items) if items.len() == 4 => {
            let mut entry = Map::new();
            for (key, item) in ["year", "month", "day", "rating"].into_iter().zip(items) {
                entry.insert(key.to_string(), item);
            }
            Value::Object(entry)
        }
        other => untouched("rating_history_entry", other),
    }
}

/// Apply `conversion` to the listed keys of a nested object; missing keys are skipped
pub fn inner(value: Value, conversion: FieldConversion, keys: &[&str]) -> Value {
    match value {
        Value::Object(mut map) => {
            for key in keys {
                if let Some(field) = map.get_mut(*key) {
                    *field = conversion(field.take());
                }
            }
            Value::Object(map)
        }
        other => untouched("inner", other),
    }
}

/// Apply `conversion` to every element of an array
pub fn listing(value: Value, conversion: FieldConversion) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.into_iter().map(conversion).collect()),
        other => untouched("listing", other),
    }
}

fn untouched(conversion: &str, value: Value) -> Value {
    trace!("{} left value of unexpected shape unchanged: {}", conversion, value);
    value
}

// ============================================================================
// Adapter
// ============================================================================

/// Flattens nested objects by pulling values from dotted locations
#[derive(Debug, Clone)]
pub struct Adapter {
    mapping: Vec<(String, Vec<String>)>,
}

/// Build an adapter from `(key, location)` pairs, `sep` splitting the location path
pub fn build_adapter(mapping: &[(&str, &str)], sep: &str) -> Adapter {
    Adapter {
        mapping: mapping
            .iter()
            .map(|(key, location)| {
                let path = location.split(sep).map(str::to_string).collect();
                ((*key).to_string(), path)
            })
            .collect(),
    }
}

impl Adapter {
    /// Adapt `data`, omitting keys whose location is missing
    pub fn adapt(&self, data: &Value) -> Value {
        self.adapt_with(data, None)
    }

    /// Adapt `data`, filling keys whose location is missing with `fill` when given
    pub fn adapt_with(&self, data: &Value, fill: Option<&Value>) -> Value {
        let mut result = Map::new();
        for (key, path) in &self.mapping {
            let found = path.iter().try_fold(data, |current, part| current.get(part));
            match (found, fill) {
                (Some(value), _) => {
                    result.insert(key.clone(), value.clone());
                }
                (None, Some(default)) => {
                    result.insert(key.clone(), default.clone());
                }
                (None, None) => {}
            }
        }
        Value::Object(result)
    }
}
