//! Grouping and in-memory evaluation of declarative record filters.
//!
//! Callers hand in flat lists of filter conditions. The engine groups them
//! into a single boolean tree (same-field conditions OR-ed, different fields
//! AND-ed), merges independently authored "user" and "application" trees,
//! and evaluates the result against each record of a list.
//!
//! # Example
//!
//! ```
//! use filter_engine::filter::{apply, group_filters, json_field, Filter, FilterNode, OperatorKind};
//! use serde_json::json;
//!
//! let records = vec![
//!     json!({"status": "A"}),
//!     json!({"status": "B"}),
//!     json!({"status": "C"}),
//! ];
//!
//! let tree = group_filters(vec![
//!     Filter::from(FilterNode::new("status", OperatorKind::Eq, "A")),
//!     Filter::from(FilterNode::new("status", OperatorKind::Eq, "B")),
//! ]);
//!
//! let matched = apply(&records, tree.as_ref(), |r, p| json_field(r, p, false)).unwrap();
//! assert_eq!(matched, vec![&records[0], &records[1]]);
//! ```

pub mod filter;

pub use filter::{
    apply, combine_filters, group_filters, Filter, FilterError, FilterEvaluator, FilterNode,
    FilterResult, FilterTree, Value,
};
