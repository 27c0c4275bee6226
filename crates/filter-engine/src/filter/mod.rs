//! Filter grouping and in-memory evaluation.
//!
//! # Building a tree
//!
//! [`group_filters`] turns a flat list into one tree:
//! - leaves on the same field path are OR-ed (`status = A | status = B`)
//! - groups on different paths are AND-ed
//! - prebuilt combinators are passed through and AND-ed with the rest
//!
//! [`combine_filters`] groups a "user" list and an "application" list
//! separately and AND-s the two trees.
//!
//! # Operators
//!
//! | Operator     | Matches when                              |
//! |--------------|-------------------------------------------|
//! | `EQ`, `NE`   | value equals / differs from the operand   |
//! | `LT` .. `GE` | value orders against the operand          |
//! | `BT`         | `low <= value <= high`                    |
//! | `Contains`   | string value contains the operand         |
//! | `StartsWith` | string value starts with the operand      |
//! | `EndsWith`   | string value ends with the operand        |
//!
//! Unknown operators match every record and raise a [`Diagnostic`].
//! String comparisons are case-insensitive unless a leaf asks otherwise,
//! and always insensitive to Unicode composition.
//!
//! # Example
//!
//! ```
//! use filter_engine::filter::{
//!     apply, combine_filters, json_field, Filter, FilterNode, OperatorKind,
//! };
//! use serde_json::json;
//!
//! let records = vec![
//!     json!({"status": "open", "archived": false}),
//!     json!({"status": "Closed", "archived": false}),
//!     json!({"status": "open", "archived": true}),
//! ];
//!
//! let user = vec![Filter::from(FilterNode::new("status", OperatorKind::Eq, "OPEN"))];
//! let application = vec![Filter::from(FilterNode::new("archived", OperatorKind::Eq, false))];
//! let tree = combine_filters(user, application);
//!
//! let matched = apply(&records, tree.as_ref(), |r, p| json_field(r, p, false)).unwrap();
//! assert_eq!(matched, vec![&records[0]]);
//! ```

mod ast;
mod definition;
mod diagnostics;
mod error;
mod evaluator;
mod grouping;
mod json;
mod operator;
mod value;

pub use ast::{
    CompareFn, Combinator, CustomFilter, FieldPath, Filter, FilterNode, FilterTree, Mode,
    OperatorKind, TestFn,
};
pub use definition::{into_filters, FilterDefinition};
pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticSink, LogSink};
pub use error::{FilterError, FilterResult};
pub use evaluator::{apply, evaluate, FilterEvaluator};
pub use grouping::{combine_filters, group_filters};
pub use json::{json_field, parse_date};
pub use operator::resolve;
pub use value::{compare_values, normalize, Value};

#[cfg(test)]
mod tests;
