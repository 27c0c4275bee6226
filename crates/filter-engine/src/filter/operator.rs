//! Resolution of a leaf's operator and operands into a memoized test.

use std::cmp::Ordering;
use std::sync::Arc;

use super::ast::{CompareFn, FilterNode, OperatorKind, TestFn};
use super::diagnostics::{Diagnostic, DiagnosticSink};
use super::error::{FilterError, FilterResult};
use super::value::{compare_values, normalize, Value};

/// Returns the test for `node`, building and caching it on first use.
///
/// Later calls return the cached test without consulting `sink` again, so
/// an unknown operator is reported once per node.
pub fn resolve(node: &FilterNode, sink: &dyn DiagnosticSink) -> FilterResult<TestFn> {
    if let Some(test) = node.cached_test().get() {
        return Ok(Arc::clone(test));
    }

    let test = build_test(node, sink)?;
    Ok(Arc::clone(node.cached_test().get_or_init(|| test)))
}

/// Builds the boolean test for a leaf.
///
/// Without a custom comparator the operands are normalized here, once, with
/// the node's case sensitivity; the record value is normalized by the
/// evaluator before the test runs.
fn build_test(node: &FilterNode, sink: &dyn DiagnosticSink) -> FilterResult<TestFn> {
    let compare: CompareFn = match node.comparator() {
        Some(comparator) => Arc::clone(comparator),
        None => Arc::new(compare_values),
    };
    let (op1, op2) = if node.comparator().is_some() {
        (node.value1().clone(), node.value2().cloned())
    } else {
        let case_sensitive = node.is_case_sensitive();
        (
            normalize(node.value1(), case_sensitive),
            node.value2().map(|v| normalize(v, case_sensitive)),
        )
    };

    let test = match node.operator() {
        OperatorKind::Eq => ordering_test(compare, op1, |o| o.is_some_and(Ordering::is_eq)),
        // Incomparable values are "not equal".
        OperatorKind::Ne => ordering_test(compare, op1, |o| !o.is_some_and(Ordering::is_eq)),
        OperatorKind::Lt => ordering_test(compare, op1, |o| o.is_some_and(Ordering::is_lt)),
        OperatorKind::Le => ordering_test(compare, op1, |o| o.is_some_and(Ordering::is_le)),
        OperatorKind::Gt => ordering_test(compare, op1, |o| o.is_some_and(Ordering::is_gt)),
        OperatorKind::Ge => ordering_test(compare, op1, |o| o.is_some_and(Ordering::is_ge)),
        OperatorKind::Bt => {
            let high = op2.ok_or_else(|| FilterError::missing_operand(node.operator().symbol()))?;
            infallible(move |value| {
                compare(value, &op1).is_some_and(Ordering::is_ge)
                    && compare(value, &high).is_some_and(Ordering::is_le)
            })
        }
        OperatorKind::Contains => {
            string_test(node.operator(), op1, |s, needle| s.contains(needle))?
        }
        OperatorKind::StartsWith => {
            string_test(node.operator(), op1, |s, needle| s.starts_with(needle))?
        }
        // Both sides are normalized by now, so the suffix length is taken
        // from the normalized operand.
        OperatorKind::EndsWith => {
            string_test(node.operator(), op1, |s, needle| s.ends_with(needle))?
        }
        OperatorKind::Unknown(symbol) => {
            sink.emit(Diagnostic::UnknownOperator {
                path: node.path().clone(),
                operator: symbol.clone(),
            });
            infallible(|_| true)
        }
    };

    Ok(test)
}

fn infallible(test: impl Fn(&Value) -> bool + Send + Sync + 'static) -> TestFn {
    Arc::new(move |value: &Value| -> FilterResult<bool> { Ok(test(value)) })
}

fn ordering_test(
    compare: CompareFn,
    operand: Value,
    accept: fn(Option<Ordering>) -> bool,
) -> TestFn {
    infallible(move |value| accept(compare(value, &operand)))
}

/// Builds a test for a string-only operator.
///
/// Null record values never match. Any other non-string record value is a
/// [`FilterError::TypeMismatch`] at evaluation time.
fn string_test(
    operator: &OperatorKind,
    operand: Value,
    matcher: fn(&str, &str) -> bool,
) -> FilterResult<TestFn> {
    let found = operand.kind();
    let Value::String(needle) = operand else {
        return Err(FilterError::invalid_operand(
            operator.symbol(),
            format!("expected a string, found {found}"),
        ));
    };
    let symbol = operator.symbol().to_string();

    Ok(Arc::new(move |value: &Value| -> FilterResult<bool> {
        match value {
            Value::Null => Ok(false),
            Value::String(s) => Ok(matcher(s, &needle)),
            other => Err(FilterError::type_mismatch(symbol.as_str(), other.kind())),
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::diagnostics::CollectingSink;
    use crate::filter::LogSink;

    fn test_for(node: &FilterNode) -> TestFn {
        resolve(node, &LogSink).unwrap()
    }

    fn norm(v: impl Into<Value>) -> Value {
        normalize(&v.into(), false)
    }

    // ==================== Ordering Operators ====================

    #[test]
    fn test_eq_ne() {
        let eq = test_for(&FilterNode::new("n", OperatorKind::Eq, 5));
        let ne = test_for(&FilterNode::new("n", OperatorKind::Ne, 5));
        assert!(eq(&Value::Int(5)).unwrap());
        assert!(!eq(&Value::Int(6)).unwrap());
        assert!(!ne(&Value::Int(5)).unwrap());
        assert!(ne(&Value::Int(6)).unwrap());
    }

    #[test]
    fn test_lt_le_gt_ge() {
        let lt = test_for(&FilterNode::new("n", OperatorKind::Lt, 10));
        let le = test_for(&FilterNode::new("n", OperatorKind::Le, 10));
        let gt = test_for(&FilterNode::new("n", OperatorKind::Gt, 10));
        let ge = test_for(&FilterNode::new("n", OperatorKind::Ge, 10));

        assert!(lt(&Value::Int(9)).unwrap());
        assert!(!lt(&Value::Int(10)).unwrap());
        assert!(le(&Value::Int(10)).unwrap());
        assert!(!le(&Value::Int(11)).unwrap());
        assert!(gt(&Value::Int(11)).unwrap());
        assert!(!gt(&Value::Int(10)).unwrap());
        assert!(ge(&Value::Int(10)).unwrap());
        assert!(!ge(&Value::Int(9)).unwrap());
    }

    #[test]
    fn test_eq_operand_is_normalized() {
        let eq = test_for(&FilterNode::new("name", OperatorKind::Eq, "café"));
        assert!(eq(&norm("CAFÉ")).unwrap());
        assert!(eq(&norm("cafe\u{301}")).unwrap());
    }

    #[test]
    fn test_eq_case_sensitive_operand() {
        let node = FilterNode::new("name", OperatorKind::Eq, "Café").with_case_sensitive(true);
        let eq = test_for(&node);
        assert!(eq(&normalize(&Value::from("Café"), true)).unwrap());
        assert!(!eq(&normalize(&Value::from("CAFÉ"), true)).unwrap());
    }

    // ==================== Range Operator ====================

    #[test]
    fn test_bt_is_inclusive() {
        let bt = test_for(&FilterNode::between("n", 10, 20));
        assert!(bt(&Value::Int(10)).unwrap());
        assert!(bt(&Value::Int(15)).unwrap());
        assert!(bt(&Value::Int(20)).unwrap());
        assert!(!bt(&Value::Int(9)).unwrap());
        assert!(!bt(&Value::Int(21)).unwrap());
    }

    #[test]
    fn test_bt_without_upper_bound_fails() {
        let node = FilterNode::new("n", OperatorKind::Bt, 10);
        let err = resolve(&node, &LogSink).err().unwrap();
        assert_eq!(err, FilterError::missing_operand("BT"));
    }

    #[test]
    fn test_null_matches_only_ne_and_eq_null() {
        let null = Value::Null;
        for op in [
            OperatorKind::Eq,
            OperatorKind::Lt,
            OperatorKind::Le,
            OperatorKind::Gt,
            OperatorKind::Ge,
        ] {
            let test = test_for(&FilterNode::new("price", op.clone(), 10));
            assert_eq!(test(&null), Ok(false), "{op:?} matched null");
        }
        let ne = test_for(&FilterNode::new("price", OperatorKind::Ne, 10));
        assert_eq!(ne(&null), Ok(true));
        let bt = test_for(&FilterNode::between("price", 0, 100));
        assert_eq!(bt(&null), Ok(false));

        let eq_null = test_for(&FilterNode::new("price", OperatorKind::Eq, Value::Null));
        assert_eq!(eq_null(&null), Ok(true));
        assert_eq!(eq_null(&Value::Int(0)), Ok(false));
    }

    #[test]
    fn test_mixed_kinds_match_only_ne() {
        let text = norm("abc");
        let gt = test_for(&FilterNode::new("price", OperatorKind::Gt, 1));
        let lt = test_for(&FilterNode::new("price", OperatorKind::Lt, 10));
        let ne = test_for(&FilterNode::new("price", OperatorKind::Ne, 1));
        let bt = test_for(&FilterNode::between("price", 0, 100));
        assert_eq!(gt(&text), Ok(false));
        assert_eq!(lt(&text), Ok(false));
        assert_eq!(bt(&text), Ok(false));
        assert_eq!(ne(&text), Ok(true));
    }

    // ==================== String Operators ====================

    #[test]
    fn test_contains_starts_ends() {
        let contains = test_for(&FilterNode::new("s", OperatorKind::Contains, "ell"));
        let starts = test_for(&FilterNode::new("s", OperatorKind::StartsWith, "he"));
        let ends = test_for(&FilterNode::new("s", OperatorKind::EndsWith, "lo"));

        assert!(contains(&norm("Hello")).unwrap());
        assert!(!contains(&norm("Help")).unwrap());
        assert!(starts(&norm("Hello")).unwrap());
        assert!(!starts(&norm("oh hello")).unwrap());
        assert!(ends(&norm("Hello")).unwrap());
        assert!(!ends(&norm("Hello!")).unwrap());
    }

    #[test]
    fn test_ends_with_repeated_substring() {
        let ends = test_for(&FilterNode::new("s", OperatorKind::EndsWith, "ab"));
        assert!(ends(&norm("abab")).unwrap());
        assert!(!ends(&norm("abba")).unwrap());
    }

    #[test]
    fn test_ends_with_operand_that_grows_when_uppercased() {
        // "ß" uppercases to "SS", changing the operand's length.
        let ends = test_for(&FilterNode::new("s", OperatorKind::EndsWith, "ße"));
        assert!(ends(&norm("Straße")).unwrap());
        assert!(ends(&norm("STRASSE")).unwrap());
        assert!(!ends(&norm("Strasser")).unwrap());
    }

    #[test]
    fn test_string_operators_on_null_do_not_match() {
        for op in [OperatorKind::Contains, OperatorKind::StartsWith, OperatorKind::EndsWith] {
            let test = test_for(&FilterNode::new("s", op, "x"));
            assert_eq!(test(&Value::Null), Ok(false));
        }
    }

    #[test]
    fn test_string_operators_on_number_fail() {
        for op in [OperatorKind::Contains, OperatorKind::StartsWith, OperatorKind::EndsWith] {
            let symbol = op.symbol().to_string();
            let test = test_for(&FilterNode::new("s", op, "1"));
            assert_eq!(
                test(&Value::Int(123)),
                Err(FilterError::type_mismatch(symbol, "integer"))
            );
        }
    }

    #[test]
    fn test_string_operator_with_numeric_operand_is_invalid() {
        let node = FilterNode::new("s", OperatorKind::Contains, 1);
        assert!(matches!(
            resolve(&node, &LogSink),
            Err(FilterError::InvalidOperand { .. })
        ));
    }

    // ==================== Custom Comparator ====================

    #[test]
    fn test_custom_comparator_skips_operand_normalization() {
        let node = FilterNode::new("s", OperatorKind::Eq, "abc").with_comparator(|a, b| {
            let a = a.as_str().map(str::len).unwrap_or(0);
            let b = b.as_str().map(str::len).unwrap_or(0);
            Some(a.cmp(&b))
        });
        let eq = test_for(&node);
        assert!(eq(&Value::from("xyz")).unwrap());
        assert!(!eq(&Value::from("xy")).unwrap());
    }

    #[test]
    fn test_custom_comparator_with_string_operator_keeps_raw_operand() {
        let node = FilterNode::new("s", OperatorKind::Contains, "abc")
            .with_comparator(|a, b| compare_values(a, b));
        let contains = test_for(&node);
        assert!(contains(&Value::from("xabcx")).unwrap());
        assert!(!contains(&Value::from("XABCX")).unwrap());
    }

    // ==================== Unknown Operator ====================

    #[test]
    fn test_unknown_operator_matches_everything_and_reports_once() {
        let sink = CollectingSink::new();
        let node = FilterNode::new("status", OperatorKind::from("FOO"), "A");

        let test = resolve(&node, &sink).unwrap();
        assert!(test(&Value::from("anything")).unwrap());
        assert!(test(&Value::Int(1)).unwrap());

        // Cached: a second resolution does not report again.
        let _ = resolve(&node, &sink).unwrap();
        assert_eq!(
            sink.diagnostics(),
            vec![Diagnostic::UnknownOperator {
                path: "status".into(),
                operator: "FOO".to_string(),
            }]
        );
    }

    // ==================== Memoization ====================

    #[test]
    fn test_resolve_is_memoized_per_node() {
        let node = FilterNode::new("n", OperatorKind::Eq, 1);
        let first = resolve(&node, &LogSink).unwrap();
        let second = resolve(&node, &LogSink).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_new_node_gets_new_test() {
        let a = FilterNode::new("n", OperatorKind::Eq, 1);
        let b = FilterNode::new("n", OperatorKind::Eq, 1);
        let ta = resolve(&a, &LogSink).unwrap();
        let tb = resolve(&b, &LogSink).unwrap();
        assert!(!Arc::ptr_eq(&ta, &tb));
    }
}
