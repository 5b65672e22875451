//! Sibling reordering helpers.
//!
//! Sort positions are sequential integers scoped to one sibling list. An
//! issue without a stored position is treated as sitting at its index.

use crate::domain::{Issue, IssueId};
use serde::Serialize;

/// A new sort position for one issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortUpdate {
    /// The issue to update
    pub id: IssueId,
    /// Its new position
    pub sort_order: i64,
}

fn position(index: usize) -> i64 {
    i64::try_from(index).unwrap_or(i64::MAX)
}

fn effective_sort_order(issues: &[Issue], index: usize) -> i64 {
    issues[index].sort_order.unwrap_or_else(|| position(index))
}

/// Sequential positions `0..n` following slice order.
#[must_use]
pub fn new_sort_orders(issues: &[Issue]) -> Vec<SortUpdate> {
    issues
        .iter()
        .enumerate()
        .map(|(index, issue)| SortUpdate {
            id: issue.id.clone(),
            sort_order: position(index),
        })
        .collect()
}

/// Swap the issue at `index` with the one above it.
///
/// Returns no updates for the first issue or an out-of-range index.
#[must_use]
pub fn move_up(issues: &[Issue], index: usize) -> Vec<SortUpdate> {
    if index == 0 || index >= issues.len() {
        return Vec::new();
    }
    swap(issues, index, index - 1)
}

/// Swap the issue at `index` with the one below it.
///
/// Returns no updates for the last issue or an out-of-range index.
#[must_use]
pub fn move_down(issues: &[Issue], index: usize) -> Vec<SortUpdate> {
    if index + 1 >= issues.len() {
        return Vec::new();
    }
    swap(issues, index, index + 1)
}

fn swap(issues: &[Issue], a: usize, b: usize) -> Vec<SortUpdate> {
    vec![
        SortUpdate {
            id: issues[a].id.clone(),
            sort_order: effective_sort_order(issues, b),
        },
        SortUpdate {
            id: issues[b].id.clone(),
            sort_order: effective_sort_order(issues, a),
        },
    ]
}

/// Position that appends after every existing one; 0 for an empty list.
#[must_use]
pub fn next_sort_order(existing: impl IntoIterator<Item = Option<i64>>) -> i64 {
    existing.into_iter().flatten().max().unwrap_or(-1) + 1
}
