//! Parsing of `--where PATH:OP:VALUE` conditions.

use filter_engine::filter::{parse_date, Filter, FilterNode, OperatorKind};
use filter_engine::Value;

use super::{CommandError, Result};

/// Separator between the bounds of a `BT` condition.
const RANGE_SEPARATOR: &str = "..";

/// Parses one `--where` condition into a leaf filter.
///
/// The value is split off after the second `:`, so it may itself contain
/// colons (timestamps, URLs). `BT` takes `LOW..HIGH`. Operands of string
/// operators are always text, so `code:Contains:42` searches for `"42"`.
pub fn parse_condition(input: &str, case_sensitive: bool, detect_dates: bool) -> Result<Filter> {
    let mut parts = input.splitn(3, ':');
    let (Some(path), Some(op), Some(raw_value)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid(input, "expected PATH:OP:VALUE"));
    };

    let path = path.trim();
    if path.is_empty() {
        return Err(invalid(input, "empty field path"));
    }
    let operator = OperatorKind::from(op);

    let node = if operator == OperatorKind::Bt {
        let Some((low, high)) = raw_value.split_once(RANGE_SEPARATOR) else {
            return Err(invalid(input, "BT expects LOW..HIGH"));
        };
        FilterNode::between(
            path,
            parse_operand(low, detect_dates),
            parse_operand(high, detect_dates),
        )
    } else if operator.is_string_operator() {
        FilterNode::new(path, operator, unquote(raw_value).unwrap_or(raw_value))
    } else {
        FilterNode::new(path, operator, parse_operand(raw_value, detect_dates))
    };

    Ok(node.with_case_sensitive(case_sensitive).into())
}

/// Types an operand written on the command line.
///
/// Tried in order: `null`, `true`/`false`, integer, finite float, date
/// (when `detect_dates`), string. Double quotes force a string.
pub fn parse_operand(text: &str, detect_dates: bool) -> Value {
    if let Some(quoted) = unquote(text) {
        return Value::from(quoted);
    }

    match text {
        "null" => return Value::Null,
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }

    if let Ok(i) = text.parse::<i64>() {
        return Value::Int(i);
    }
    if let Some(x) = text.parse::<f64>().ok().filter(|x| x.is_finite()) {
        return Value::Float(x);
    }
    if detect_dates {
        if let Some(date) = parse_date(text) {
            return Value::Date(date);
        }
    }
    Value::from(text)
}

fn unquote(text: &str) -> Option<&str> {
    text.strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
}

fn invalid(input: &str, reason: &str) -> CommandError {
    CommandError::Input(format!("invalid condition {input:?}: {reason}"))
}
