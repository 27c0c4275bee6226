//! Serializable filter definitions.
//!
//! Lets collaborators keep filter lists in JSON or TOML:
//!
//! ```toml
//! [[filters]]
//! path = "status"
//! operator = "EQ"
//! value = "open"
//!
//! [[filters]]
//! mode = "or"
//! children = [
//!     { path = "priority", operator = "GE", value = 3 },
//!     { path = "owner", operator = "EQ", value = "me" },
//! ]
//! ```
//!
//! Dates are written as strings and recognized when date detection is on.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::ast::{Combinator, FieldPath, Filter, FilterNode, Mode, OperatorKind};
use super::error::{FilterError, FilterResult};
use super::value::Value;

/// A filter as it appears in a configuration or request file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterDefinition {
    /// A boolean combination of nested definitions.
    Combinator {
        mode: Mode,
        children: Vec<FilterDefinition>,
    },
    /// A single condition.
    Leaf {
        path: FieldPath,
        operator: OperatorKind,
        value: JsonValue,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value2: Option<JsonValue>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        case_sensitive: Option<bool>,
    },
}

impl FilterDefinition {
    /// Converts the definition into a filter.
    ///
    /// A combinator with a single child becomes that child.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidDefinition`] for a combinator without
    /// children or an operand that is not a scalar.
    pub fn into_filter(self, detect_dates: bool) -> FilterResult<Filter> {
        match self {
            FilterDefinition::Combinator { mode, children } => {
                if children.is_empty() {
                    return Err(FilterError::invalid_definition(format!(
                        "{} combinator has no children",
                        mode_name(mode)
                    )));
                }
                let mut children = into_filters(children, detect_dates)?;
                if children.len() == 1 {
                    return Ok(children.remove(0));
                }
                Ok(Filter::Combinator(Combinator::new(mode, children)))
            }
            FilterDefinition::Leaf {
                path,
                operator,
                value,
                value2,
                case_sensitive,
            } => {
                // String operators compare text, so their operands stay strings.
                let detect_dates = detect_dates && !operator.is_string_operator();
                let value1 = operand(&path, &value, detect_dates)?;
                let mut node = FilterNode::new(path.clone(), operator, value1);
                if let Some(value2) = value2 {
                    node = node.with_value2(operand(&path, &value2, detect_dates)?);
                }
                if let Some(case_sensitive) = case_sensitive {
                    node = node.with_case_sensitive(case_sensitive);
                }
                Ok(Filter::Leaf(node))
            }
        }
    }
}

/// Converts a list of definitions, stopping at the first invalid one.
pub fn into_filters(
    definitions: Vec<FilterDefinition>,
    detect_dates: bool,
) -> FilterResult<Vec<Filter>> {
    definitions
        .into_iter()
        .map(|d| d.into_filter(detect_dates))
        .collect()
}

fn operand(path: &FieldPath, value: &JsonValue, detect_dates: bool) -> FilterResult<Value> {
    Value::from_json(value, detect_dates).ok_or_else(|| {
        FilterError::invalid_definition(format!("operand for {path} must be a scalar, got {value}"))
    })
}

fn mode_name(mode: Mode) -> &'static str {
    match mode {
        Mode::And => "and",
        Mode::Or => "or",
    }
}
