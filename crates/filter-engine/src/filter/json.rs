//! Bridge between `serde_json` records and filter values.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value as JsonValue;

use super::ast::FieldPath;
use super::value::Value;

impl Value {
    /// Converts a JSON scalar into a filter value.
    ///
    /// Integers that fit in `i64` become [`Value::Int`], other numbers
    /// [`Value::Float`]. With `detect_dates`, strings in RFC 3339 or
    /// `YYYY-MM-DD` form become [`Value::Date`]. Arrays and objects have no
    /// scalar form and yield `None`.
    pub fn from_json(value: &JsonValue, detect_dates: bool) -> Option<Value> {
        match value {
            JsonValue::Null => Some(Value::Null),
            JsonValue::Bool(b) => Some(Value::Bool(*b)),
            JsonValue::Number(n) => n
                .as_i64()
                .map(Value::Int)
                .or_else(|| n.as_f64().map(Value::Float)),
            JsonValue::String(s) if detect_dates => {
                Some(parse_date(s).map_or_else(|| Value::String(s.clone()), Value::Date))
            }
            JsonValue::String(s) => Some(Value::String(s.clone())),
            JsonValue::Array(_) | JsonValue::Object(_) => None,
        }
    }
}

/// Parses an RFC 3339 timestamp or a plain `YYYY-MM-DD` date (taken as
/// midnight UTC).
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Field accessor for `serde_json` records.
///
/// Each path segment selects an object key, or an array index when the
/// current value is an array. A segment that does not resolve, or a path
/// ending on an array or object, reports the field as missing.
pub fn json_field(record: &JsonValue, path: &FieldPath, detect_dates: bool) -> Option<Value> {
    let mut current = record;
    for segment in path.segments() {
        current = match current {
            JsonValue::Object(map) => map.get(segment)?,
            JsonValue::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Value::from_json(current, detect_dates)
}
