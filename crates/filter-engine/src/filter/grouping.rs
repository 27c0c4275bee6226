//! Grouping of flat filter lists into a single tree, and merging of trees.

use super::ast::{Filter, FilterTree};

/// Groups a flat list of filters into one tree.
///
/// - An empty list yields `None` (match everything).
/// - A single filter is returned unchanged.
/// - Otherwise the list is stable-sorted by field path. Consecutive leaves
///   on the same path are OR-ed into one group; combinators are never
///   regrouped and each forms its own group. The groups are AND-ed.
///
/// Combinators carry no path and sort ahead of every leaf. Groups of one
/// element are never wrapped, so the result never contains a combinator
/// with a single child.
pub fn group_filters(mut filters: Vec<Filter>) -> FilterTree {
    match filters.len() {
        0 => return None,
        1 => return filters.pop(),
        _ => {}
    }

    let input_len = filters.len();
    filters.sort_by(|a, b| a.path().cmp(&b.path()));

    let mut groups: Vec<Filter> = Vec::new();
    let mut run: Vec<Filter> = Vec::new();

    for filter in filters {
        match filter.path() {
            None => {
                flush_run(&mut run, &mut groups);
                groups.push(filter);
            }
            Some(path) => {
                let continues_run = run
                    .last()
                    .and_then(Filter::path)
                    .is_some_and(|current| current == path);
                if !continues_run {
                    flush_run(&mut run, &mut groups);
                }
                run.push(filter);
            }
        }
    }
    flush_run(&mut run, &mut groups);

    log::debug!("grouped {input_len} filters into {} groups", groups.len());
    collapse(groups, Filter::and)
}

/// Groups `user` and `application` filters independently and AND-s the
/// two results, so both sets apply at once without regrouping each other.
pub fn combine_filters(user: Vec<Filter>, application: Vec<Filter>) -> FilterTree {
    match (group_filters(user), group_filters(application)) {
        (Some(user), Some(application)) => Some(Filter::and(vec![user, application])),
        (Some(tree), None) | (None, Some(tree)) => Some(tree),
        (None, None) => None,
    }
}

/// Moves the pending same-path run into `groups` as one OR group.
fn flush_run(run: &mut Vec<Filter>, groups: &mut Vec<Filter>) {
    if run.is_empty() {
        return;
    }
    let leaves = std::mem::take(run);
    if let Some(group) = collapse(leaves, Filter::or) {
        groups.push(group);
    }
}

/// Wraps `filters` with `wrap` unless there are fewer than two.
fn collapse(mut filters: Vec<Filter>, wrap: fn(Vec<Filter>) -> Filter) -> FilterTree {
    match filters.len() {
        0 => None,
        1 => filters.pop(),
        _ => Some(wrap(filters)),
    }
}
