//! Record values and their canonical comparable form.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use unicode_normalization::UnicodeNormalization;

/// A scalar value read from a record or carried as a filter operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// An explicit null. Distinct from a missing field, which accessors
    /// report as `None`.
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// A point in time. Normalizes to [`Value::Int`] epoch milliseconds.
    Date(DateTime<Utc>),
}

impl Value {
    /// Returns a short name for the value's kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Date(_) => "date",
        }
    }

    /// Returns the string contents if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Date(d) => write!(f, "{}", d.to_rfc3339()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(d: DateTime<Utc>) -> Self {
        Value::Date(d)
    }
}

/// Converts a value into its canonical comparable form.
///
/// Dates become epoch milliseconds. Strings are recomposed to NFC, and
/// unless `case_sensitive` is set they are uppercased first, so `"café"`
/// and `"CAFE\u{301}"` normalize to the same value. Everything else passes
/// through unchanged. Normalizing twice yields the same value as once.
pub fn normalize(value: &Value, case_sensitive: bool) -> Value {
    match value {
        Value::Date(d) => Value::Int(d.timestamp_millis()),
        Value::String(s) if case_sensitive => Value::String(s.nfc().collect()),
        Value::String(s) => Value::String(s.to_uppercase().nfc().collect()),
        other => other.clone(),
    }
}

/// Default ordering over (normalized) values.
///
/// Numbers compare numerically across `Int`/`Float`, exactly even past
/// 2^53, and dates compare as epoch milliseconds so an unnormalized date
/// still orders against a normalized one. Null equals only null. Any other
/// pairing (null against a value, a string against a number, NaN) is
/// incomparable and yields `None`.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (a, b) if a.is_null() || b.is_null() => None,
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
        (a, b) => compare_numbers(a.as_number()?, b.as_number()?),
    }
}

/// A numeric view of a value, with dates read as epoch milliseconds.
#[derive(Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Value {
    fn as_number(&self) -> Option<Number> {
        match self {
            Value::Int(i) => Some(Number::Int(*i)),
            Value::Float(x) => Some(Number::Float(*x)),
            Value::Date(d) => Some(Number::Int(d.timestamp_millis())),
            _ => None,
        }
    }
}

fn compare_numbers(a: Number, b: Number) -> Option<Ordering> {
    match (a, b) {
        (Number::Int(a), Number::Int(b)) => Some(a.cmp(&b)),
        (Number::Float(a), Number::Float(b)) => a.partial_cmp(&b),
        (Number::Int(a), Number::Float(b)) => compare_int_float(a, b),
        (Number::Float(a), Number::Int(b)) => compare_int_float(b, a).map(Ordering::reverse),
    }
}

/// Compares an integer with a float without rounding the integer.
fn compare_int_float(i: i64, x: f64) -> Option<Ordering> {
    // 2^63: every i64 lies in [-2^63, 2^63).
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if x.is_nan() {
        return None;
    }
    if x >= LIMIT {
        return Some(Ordering::Less);
    }
    if x < -LIMIT {
        return Some(Ordering::Greater);
    }
    let whole = x.trunc();
    let by_whole = i.cmp(&(whole as i64));
    let by_fraction = if x > whole {
        Ordering::Less
    } else if x < whole {
        Ordering::Greater
    } else {
        Ordering::Equal
    };
    Some(by_whole.then(by_fraction))
}
