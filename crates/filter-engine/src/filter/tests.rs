//! Tests for filter grouping and combination.

use super::*;
use serde_json::{json, Value as JsonValue};

// ==================== Test Helpers ====================

fn eq(path: &str, value: impl Into<Value>) -> Filter {
    FilterNode::new(path, OperatorKind::Eq, value).into()
}

fn matches(tree: &FilterTree, record: &JsonValue) -> bool {
    FilterEvaluator::new(tree.as_ref())
        .matches(record, |r, p| json_field(r, p, false))
        .unwrap()
}

// ==================== group_filters ====================

#[test]
fn test_group_empty_is_absent() {
    assert_eq!(group_filters(vec![]), None);
}

#[test]
fn test_group_single_leaf_is_identity() {
    let f = eq("status", "A");
    assert_eq!(group_filters(vec![f.clone()]), Some(f));
}

#[test]
fn test_group_single_combinator_is_identity() {
    let f = Filter::or(vec![eq("a", 1), eq("b", 2)]);
    assert_eq!(group_filters(vec![f.clone()]), Some(f));
}

#[test]
fn test_group_same_path_is_or() {
    let tree = group_filters(vec![eq("status", "A"), eq("status", "B")]);
    assert_eq!(
        tree,
        Some(Filter::or(vec![eq("status", "A"), eq("status", "B")]))
    );

    assert!(matches(&tree, &json!({"status": "A"})));
    assert!(matches(&tree, &json!({"status": "B"})));
    assert!(!matches(&tree, &json!({"status": "C"})));
}

#[test]
fn test_group_different_paths_is_and() {
    let tree = group_filters(vec![eq("status", "A"), eq("owner", "me")]);
    // Sorted by path: "owner" < "status".
    assert_eq!(
        tree,
        Some(Filter::and(vec![eq("owner", "me"), eq("status", "A")]))
    );

    assert!(matches(&tree, &json!({"status": "A", "owner": "me"})));
    assert!(!matches(&tree, &json!({"status": "A", "owner": "you"})));
    assert!(!matches(&tree, &json!({"status": "B", "owner": "me"})));
}

#[test]
fn test_group_mixed_paths() {
    let tree = group_filters(vec![
        eq("status", "A"),
        eq("owner", "me"),
        eq("status", "B"),
        eq("owner", "you"),
        eq("kind", "bug"),
    ]);

    assert_eq!(
        tree,
        Some(Filter::and(vec![
            eq("kind", "bug"),
            Filter::or(vec![eq("owner", "me"), eq("owner", "you")]),
            Filter::or(vec![eq("status", "A"), eq("status", "B")]),
        ]))
    );
}

#[test]
fn test_group_preserves_order_within_same_path() {
    let tree = group_filters(vec![
        eq("status", "Z"),
        eq("a", 1),
        eq("status", "M"),
        eq("status", "A"),
    ]);

    assert_eq!(
        tree,
        Some(Filter::and(vec![
            eq("a", 1),
            Filter::or(vec![eq("status", "Z"), eq("status", "M"), eq("status", "A")]),
        ]))
    );
}

#[test]
fn test_group_passes_combinators_through() {
    let prebuilt = Filter::or(vec![eq("status", "X"), eq("owner", "me")]);
    let tree = group_filters(vec![
        eq("status", "A"),
        prebuilt.clone(),
        eq("status", "B"),
    ]);

    // The prebuilt combinator is not merged into the status group.
    assert_eq!(
        tree,
        Some(Filter::and(vec![
            prebuilt,
            Filter::or(vec![eq("status", "A"), eq("status", "B")]),
        ]))
    );
}

#[test]
fn test_group_two_combinators_stay_separate() {
    let first = Filter::or(vec![eq("a", 1), eq("a", 2)]);
    let second = Filter::or(vec![eq("b", 1), eq("b", 2)]);
    let tree = group_filters(vec![first.clone(), second.clone()]);
    assert_eq!(tree, Some(Filter::and(vec![first, second])));
}

#[test]
fn test_group_custom_leaves_group_by_path() {
    let custom: Filter = CustomFilter::new("n", |v| matches!(v, Value::Int(i) if *i > 10)).into();
    let tree = group_filters(vec![custom.clone(), eq("n", 1)]);
    assert_eq!(tree, Some(Filter::or(vec![custom, eq("n", 1)])));

    assert!(matches(&tree, &json!({"n": 1})));
    assert!(matches(&tree, &json!({"n": 11})));
    assert!(!matches(&tree, &json!({"n": 5})));
}

#[test]
fn test_group_never_builds_single_child_combinators() {
    fn check(filter: &Filter) {
        if let Filter::Combinator(c) = filter {
            assert!(c.children.len() >= 2, "combinator with {} children", c.children.len());
            c.children.iter().for_each(check);
        }
    }

    let tree = group_filters(vec![
        eq("a", 1),
        eq("b", 1),
        eq("b", 2),
        Filter::or(vec![eq("c", 1), eq("c", 2)]),
        eq("d", 1),
    ])
    .unwrap();
    check(&tree);
}

// ==================== combine_filters ====================

#[test]
fn test_combine_both_absent() {
    let tree = combine_filters(vec![], vec![]);
    assert_eq!(tree, None);
    assert!(matches(&tree, &json!({"anything": 1})));
}

#[test]
fn test_combine_only_user() {
    let u = eq("status", "A");
    assert_eq!(combine_filters(vec![u.clone()], vec![]), Some(u));
}

#[test]
fn test_combine_only_application() {
    let a = eq("archived", false);
    assert_eq!(combine_filters(vec![], vec![a.clone()]), Some(a));
}

#[test]
fn test_combine_both_is_and_of_groups() {
    let tree = combine_filters(
        vec![eq("status", "A"), eq("status", "B")],
        vec![eq("status", "C")],
    );

    // The two sets are grouped independently, so the application's status
    // condition is not OR-ed with the user's.
    assert_eq!(
        tree,
        Some(Filter::and(vec![
            Filter::or(vec![eq("status", "A"), eq("status", "B")]),
            eq("status", "C"),
        ]))
    );
    assert!(!matches(&tree, &json!({"status": "A"})));
    assert!(!matches(&tree, &json!({"status": "C"})));
}

#[test]
fn test_combine_user_and_application_both_apply() {
    let tree = combine_filters(vec![eq("status", "open")], vec![eq("archived", false)]);

    assert!(matches(&tree, &json!({"status": "open", "archived": false})));
    assert!(!matches(&tree, &json!({"status": "open", "archived": true})));
    assert!(!matches(&tree, &json!({"status": "closed", "archived": false})));
}
