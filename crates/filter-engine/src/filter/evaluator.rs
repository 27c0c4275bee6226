//! Filter evaluation against records.
//!
//! This module provides the [`FilterEvaluator`] for evaluating filter trees
//! against arbitrary records. Records are never inspected directly; the
//! caller supplies an accessor `(record, path) -> Option<Value>` where `None`
//! means the field is missing.
//!
//! # Example
//!
//! ```
//! use filter_engine::filter::{FieldPath, Filter, FilterEvaluator, FilterNode, OperatorKind, Value};
//!
//! struct Task {
//!     priority: i64,
//! }
//!
//! fn field(task: &Task, path: &FieldPath) -> Option<Value> {
//!     match path.as_str() {
//!         "priority" => Some(Value::Int(task.priority)),
//!         _ => None,
//!     }
//! }
//!
//! let filter = Filter::from(FilterNode::new("priority", OperatorKind::Ge, 3));
//! let tasks = vec![Task { priority: 1 }, Task { priority: 4 }];
//!
//! let evaluator = FilterEvaluator::new(Some(&filter));
//! let matched = evaluator.filter_items(&tasks, field).unwrap();
//! assert_eq!(matched.len(), 1);
//! assert_eq!(matched[0].priority, 4);
//! ```

use super::ast::{Combinator, FieldPath, Filter, Mode};
use super::diagnostics::{DiagnosticSink, LogSink};
use super::error::FilterResult;
use super::operator::resolve;
use super::value::{normalize, Value};

/// Evaluates a filter tree against records.
///
/// The evaluator borrows the tree read-only. An absent tree matches every
/// record. Unknown-operator diagnostics go to the configured sink, which
/// defaults to [`LogSink`].
pub struct FilterEvaluator<'a> {
    filter: Option<&'a Filter>,
    sink: &'a dyn DiagnosticSink,
}

impl<'a> FilterEvaluator<'a> {
    /// Creates a new evaluator for `filter`, reporting diagnostics to the log.
    pub fn new(filter: Option<&'a Filter>) -> Self {
        Self {
            filter,
            sink: &LogSink,
        }
    }

    /// Sends diagnostics to `sink` instead of the log.
    pub fn with_sink(mut self, sink: &'a dyn DiagnosticSink) -> Self {
        self.sink = sink;
        self
    }

    /// Returns true if the record matches the filter.
    ///
    /// # Errors
    ///
    /// Returns an error if a string operator meets a non-string value or a
    /// leaf's operands do not fit its operator.
    pub fn matches<R, F>(&self, record: &R, get_value: F) -> FilterResult<bool>
    where
        R: ?Sized,
        F: Fn(&R, &FieldPath) -> Option<Value>,
    {
        match self.filter {
            Some(filter) => evaluate(filter, record, &get_value, self.sink),
            None => Ok(true),
        }
    }

    /// Filters a slice of records, returning only those that match, in
    /// their original order.
    ///
    /// # Errors
    ///
    /// The first evaluation error aborts the whole call; no partial result
    /// is returned.
    pub fn filter_items<'r, R, F>(&self, records: &'r [R], get_value: F) -> FilterResult<Vec<&'r R>>
    where
        F: Fn(&R, &FieldPath) -> Option<Value>,
    {
        let Some(filter) = self.filter else {
            return Ok(records.iter().collect());
        };

        let mut matched = Vec::new();
        for record in records {
            if evaluate(filter, record, &get_value, self.sink)? {
                matched.push(record);
            }
        }
        Ok(matched)
    }
}

impl std::fmt::Debug for FilterEvaluator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterEvaluator")
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}

/// Filters `records` by `tree`, logging diagnostics through [`LogSink`].
///
/// An absent tree returns every record. The input is never modified and
/// matching records keep their relative order.
pub fn apply<'r, R, F>(
    records: &'r [R],
    tree: Option<&Filter>,
    get_value: F,
) -> FilterResult<Vec<&'r R>>
where
    F: Fn(&R, &FieldPath) -> Option<Value>,
{
    FilterEvaluator::new(tree).filter_items(records, get_value)
}

/// Evaluates a filter against one record.
///
/// Combinators evaluate their children in order and stop at the first
/// child that decides the result, so later children are never evaluated
/// (and cannot fail) once an AND has seen a non-match or an OR a match.
pub fn evaluate<R, F>(
    filter: &Filter,
    record: &R,
    get_value: &F,
    sink: &dyn DiagnosticSink,
) -> FilterResult<bool>
where
    R: ?Sized,
    F: Fn(&R, &FieldPath) -> Option<Value>,
{
    match filter {
        Filter::Leaf(node) => {
            let Some(raw) = get_value(record, node.path()) else {
                return Ok(false);
            };
            let value = if node.comparator().is_some() {
                raw
            } else {
                normalize(&raw, node.is_case_sensitive())
            };
            let test = resolve(node, sink)?;
            test(&value)
        }
        Filter::Custom(custom) => {
            let Some(raw) = get_value(record, custom.path()) else {
                return Ok(false);
            };
            (custom.test())(&raw)
        }
        Filter::Combinator(combinator) => evaluate_combinator(combinator, record, get_value, sink),
    }
}

fn evaluate_combinator<R, F>(
    combinator: &Combinator,
    record: &R,
    get_value: &F,
    sink: &dyn DiagnosticSink,
) -> FilterResult<bool>
where
    R: ?Sized,
    F: Fn(&R, &FieldPath) -> Option<Value>,
{
    match combinator.mode {
        Mode::And => {
            for child in &combinator.children {
                if !evaluate(child, record, get_value, sink)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Mode::Or => {
            for child in &combinator.children {
                if evaluate(child, record, get_value, sink)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
    }
}
