//! Bottom-up story point and progress rollups.
//!
//! Rollups re-derive children from the full node list, so they must run
//! after [`crate::hierarchy::flatten_tree`] has produced every level.
//! Sub-issues never carry rollups.

use crate::counts::Progress;
use crate::domain::Issue;
use crate::hierarchy::{ChildIndex, NodeKind, TreeNode};

/// Story points rolled up to `node`.
///
/// An issue counts its own points plus its direct sub-issues'; an epic sums
/// its issues; a project sums its epics. `None` for sub-issues.
#[must_use]
pub fn total_points(node: &TreeNode, all_nodes: &[TreeNode]) -> Option<u32> {
    total_points_indexed(node, &ChildIndex::new(all_nodes))
}

/// Story-point-weighted progress over every issue below `node`.
///
/// When none of those issues is estimated, progress is all-or-nothing:
/// 100 if every one is terminal, otherwise 0. `None` for sub-issues.
#[must_use]
pub fn progress(node: &TreeNode, all_nodes: &[TreeNode]) -> Option<Progress> {
    progress_indexed(node, &ChildIndex::new(all_nodes))
}

/// A copy of `node` with both rollups computed against `all_nodes`.
#[must_use]
pub fn with_node_rollups(node: &TreeNode, all_nodes: &[TreeNode]) -> TreeNode {
    let index = ChildIndex::new(all_nodes);
    node.with_rollups(total_points_indexed(node, &index), progress_indexed(node, &index))
}

/// Every node of a complete list, with rollups computed.
#[must_use]
pub fn with_all_node_rollups(all_nodes: &[TreeNode]) -> Vec<TreeNode> {
    let index = ChildIndex::new(all_nodes);
    all_nodes
        .iter()
        .map(|node| node.with_rollups(total_points_indexed(node, &index), progress_indexed(node, &index)))
        .collect()
}

fn own_points(node: &TreeNode) -> u32 {
    node.issue().map_or(0, Issue::points)
}

fn total_points_indexed(node: &TreeNode, index: &ChildIndex<'_>) -> Option<u32> {
    let children = index.children(&node.id);
    // Each level only descends to the next kind, so recursion is bounded
    // even if parent links are corrupted.
    let total = match node.kind {
        NodeKind::SubIssue => return None,
        NodeKind::Issue => {
            own_points(node)
                + children
                    .iter()
                    .filter(|child| child.kind == NodeKind::SubIssue)
                    .map(|child| own_points(child))
                    .sum::<u32>()
        }
        NodeKind::Epic => sum_children(&children, NodeKind::Issue, index),
        NodeKind::Project => sum_children(&children, NodeKind::Epic, index),
    };
    Some(total)
}

fn sum_children(children: &[&TreeNode], kind: NodeKind, index: &ChildIndex<'_>) -> u32 {
    children
        .iter()
        .filter(|child| child.kind == kind)
        .filter_map(|child| total_points_indexed(child, index))
        .sum()
}

fn progress_indexed(node: &TreeNode, index: &ChildIndex<'_>) -> Option<Progress> {
    if node.kind == NodeKind::SubIssue {
        return None;
    }

    let issues: Vec<&Issue> = index
        .descendant_issues(&node.id)
        .into_iter()
        .filter_map(TreeNode::issue)
        .collect();
    if issues.is_empty() {
        return Some(Progress::default());
    }

    let total: u64 = issues.iter().map(|issue| u64::from(issue.points())).sum();
    let completed: u64 = issues
        .iter()
        .filter(|issue| issue.status.is_terminal())
        .map(|issue| u64::from(issue.points()))
        .sum();

    if total > 0 {
        return Some(Progress::new(completed, total));
    }

    let all_terminal = issues.iter().all(|issue| issue.status.is_terminal());
    Some(Progress {
        completed: 0,
        total: 0,
        percentage: if all_terminal { 100 } else { 0 },
    })
}
