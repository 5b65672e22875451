//! Drag-and-drop reparent validation and update computation.
//!
//! Only three moves change a node's parent: an epic onto a project, an
//! issue onto an epic, and a sub-issue onto an issue. Projects are roots and
//! never move. Dropping onto a sibling is a reorder, handled by
//! [`crate::reorder`].

use crate::domain::{EpicId, IssueId, NodeId, ProjectId};
use crate::hierarchy::{ChildIndex, NodeEntity, NodeKind, TreeNode};
use crate::reorder::next_sort_order;
use serde::Serialize;
use std::collections::HashSet;

/// Field changes for moving a node under a new parent.
///
/// A sub-issue's epic and project always follow its parent issue, and an
/// issue's project follows its epic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReparentUpdate {
    /// The moved node
    pub id: NodeId,
    /// Position after the new parent's existing children
    pub new_sort_order: i64,
    /// New owning project
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_project_id: Option<ProjectId>,
    /// New owning epic
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_epic_id: Option<EpicId>,
    /// New parent issue
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_parent_issue_id: Option<IssueId>,
}

fn is_permitted_move(source: NodeKind, target: NodeKind) -> bool {
    matches!(
        (source, target),
        (NodeKind::Epic, NodeKind::Project)
            | (NodeKind::Issue, NodeKind::Epic)
            | (NodeKind::SubIssue, NodeKind::Issue)
    )
}

/// Whether `source` may be moved under `target`.
///
/// Rejects projects, dropping a node onto itself, dropping onto one of its
/// own descendants, and every kind pairing other than the permitted moves.
#[must_use]
pub fn can_reparent(source: &TreeNode, target: &TreeNode, all_nodes: &[TreeNode]) -> bool {
    can_reparent_indexed(source, target, &ChildIndex::new(all_nodes))
}

fn can_reparent_indexed(source: &TreeNode, target: &TreeNode, index: &ChildIndex<'_>) -> bool {
    if source.kind == NodeKind::Project || source.id == target.id {
        return false;
    }
    if index.is_ancestor(&source.id, target) {
        return false;
    }
    is_permitted_move(source.kind, target.kind)
}

/// Ids of every node `dragging` may be dropped on.
///
/// Includes valid reparent targets (the current parent among them) plus
/// `dragging`'s siblings, which accept the drop as a reorder.
#[must_use]
pub fn valid_drop_targets(dragging: &TreeNode, all_nodes: &[TreeNode]) -> HashSet<NodeId> {
    let index = ChildIndex::new(all_nodes);

    all_nodes
        .iter()
        .filter(|node| {
            let is_sibling = node.id != dragging.id && node.parent_id == dragging.parent_id;
            is_sibling || can_reparent_indexed(dragging, node, &index)
        })
        .map(|node| node.id.clone())
        .collect()
}

/// Whether a drop reads as a reparent rather than a reorder.
///
/// This is a structural check only and does not look for cycles; gate the
/// actual move on [`can_reparent`].
#[must_use]
pub fn is_reparent_drop(source: &TreeNode, target: &TreeNode) -> bool {
    if source.parent_id == target.parent_id {
        return false;
    }
    can_reparent(source, target, &[])
}

/// Compute the updates for moving `source` under `new_parent`.
///
/// The node is appended after `new_parent`'s current children. Ownership
/// fields are filled for the permitted moves and left empty otherwise.
#[must_use]
pub fn reparent_updates(
    source: &TreeNode,
    new_parent: &TreeNode,
    all_nodes: &[TreeNode],
) -> ReparentUpdate {
    let index = ChildIndex::new(all_nodes);
    let new_sort_order = next_sort_order(
        index
            .children(&new_parent.id)
            .into_iter()
            .map(|child| child.entity.sort_order()),
    );

    let mut update = ReparentUpdate {
        id: source.id.clone(),
        new_sort_order,
        new_project_id: None,
        new_epic_id: None,
        new_parent_issue_id: None,
    };

    match (source.kind, &new_parent.entity) {
        (NodeKind::Epic, NodeEntity::Project(project)) => {
            update.new_project_id = Some(project.id.clone());
        }
        (NodeKind::Issue, NodeEntity::Epic(epic)) => {
            update.new_epic_id = Some(epic.id.clone());
            update.new_project_id = Some(epic.project_id.clone());
        }
        (NodeKind::SubIssue, NodeEntity::Issue(parent)) => {
            update.new_parent_issue_id = Some(parent.id.clone());
            update.new_epic_id = Some(parent.epic_id.clone());
            update.new_project_id = Some(parent.project_id.clone());
        }
        (kind, _) => {
            tracing::debug!(
                source = %source.id,
                ?kind,
                new_parent = %new_parent.id,
                "No ownership changes for unsupported reparent"
            );
        }
    }

    update
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EpicTree, IssueTree, ProjectTree};
    use crate::fixtures::{epic, issue, project, sample_tree, sub_issue};
    use crate::hierarchy::flatten_tree;

    fn node<'a>(nodes: &'a [TreeNode], id: &str) -> &'a TreeNode {
        nodes.iter().find(|n| n.id.as_str() == id).unwrap()
    }

    /// p1 { e1 { i1 { s1 }, i2 }, e2 { i3 } }, p2 { e3 }
    fn nodes() -> Vec<TreeNode> {
        let mut i1 = issue("i1", "e1");
        i1.sort_order = Some(0);
        let mut i2 = issue("i2", "e1");
        i2.sort_order = Some(4);
        let i3 = issue("i3", "e2");
        let mut e3 = epic("e3", "p2");
        e3.sort_order = 2;
        let mut p2_issue = issue("i4", "e3");
        p2_issue.project_id = ProjectId::new("p2");

        flatten_tree(&[
            ProjectTree {
                project: project("p1"),
                epics: vec![
                    EpicTree {
                        epic: epic("e1", "p1"),
                        issues: vec![
                            IssueTree {
                                issue: i1,
                                sub_issues: vec![sub_issue("s1", "i1")],
                            },
                            IssueTree {
                                issue: i2,
                                sub_issues: vec![],
                            },
                        ],
                    },
                    EpicTree {
                        epic: epic("e2", "p1"),
                        issues: vec![IssueTree {
                            issue: i3,
                            sub_issues: vec![],
                        }],
                    },
                ],
            },
            ProjectTree {
                project: project("p2"),
                epics: vec![EpicTree {
                    epic: e3,
                    issues: vec![IssueTree {
                        issue: p2_issue,
                        sub_issues: vec![],
                    }],
                }],
            },
        ])
    }

    #[test]
    fn test_permitted_moves() {
        let nodes = nodes();
        assert!(can_reparent(node(&nodes, "e1"), node(&nodes, "p2"), &nodes));
        assert!(can_reparent(node(&nodes, "i1"), node(&nodes, "e2"), &nodes));
        assert!(can_reparent(node(&nodes, "s1"), node(&nodes, "i2"), &nodes));
    }

    #[test]
    fn test_projects_never_move() {
        let nodes = nodes();
        assert!(!can_reparent(node(&nodes, "p1"), node(&nodes, "p2"), &nodes));
        assert!(!can_reparent(node(&nodes, "p1"), node(&nodes, "e3"), &nodes));
    }

    #[test]
    fn test_drop_on_self_rejected() {
        let nodes = nodes();
        assert!(!can_reparent(node(&nodes, "e1"), node(&nodes, "e1"), &nodes));
    }

    #[test]
    fn test_drop_on_own_descendant_rejected() {
        let nodes = nodes();
        // Kind pairing aside, the descendant check fires first.
        assert!(!can_reparent(node(&nodes, "e1"), node(&nodes, "i1"), &nodes));
        assert!(!can_reparent(node(&nodes, "i1"), node(&nodes, "s1"), &nodes));
    }

    #[test]
    fn test_other_pairings_rejected() {
        let nodes = nodes();
        assert!(!can_reparent(node(&nodes, "i1"), node(&nodes, "p2"), &nodes));
        assert!(!can_reparent(node(&nodes, "s1"), node(&nodes, "e2"), &nodes));
        assert!(!can_reparent(node(&nodes, "i1"), node(&nodes, "i2"), &nodes));
        assert!(!can_reparent(node(&nodes, "e1"), node(&nodes, "e2"), &nodes));
    }

    #[test]
    fn test_valid_drop_targets_include_siblings() {
        let nodes = nodes();

        let targets = valid_drop_targets(node(&nodes, "i1"), &nodes);
        let expected: HashSet<NodeId> =
            ["e1", "e2", "e3", "i2"].into_iter().map(NodeId::new).collect();
        assert_eq!(targets, expected);

        let targets = valid_drop_targets(node(&nodes, "e1"), &nodes);
        let expected: HashSet<NodeId> = ["p1", "p2", "e2"].into_iter().map(NodeId::new).collect();
        assert_eq!(targets, expected);
    }

    #[test]
    fn test_projects_only_accept_reorder_among_projects() {
        let nodes = nodes();
        let expected: HashSet<NodeId> = [NodeId::new("p2")].into();
        assert_eq!(valid_drop_targets(node(&nodes, "p1"), &nodes), expected);
    }

    #[test]
    fn test_is_reparent_drop() {
        let nodes = nodes();
        assert!(!is_reparent_drop(node(&nodes, "i1"), node(&nodes, "i2")));
        assert!(is_reparent_drop(node(&nodes, "i1"), node(&nodes, "e2")));
        assert!(is_reparent_drop(node(&nodes, "s1"), node(&nodes, "i2")));
        assert!(!is_reparent_drop(node(&nodes, "i1"), node(&nodes, "p1")));
    }

    #[test]
    fn test_is_reparent_drop_without_node_list_still_sees_direct_parent() {
        let nodes = nodes();
        // s1 sits under i1; dropping i1 onto s1 is rejected by the direct
        // parent link even though no node list is consulted.
        assert!(!is_reparent_drop(node(&nodes, "i1"), node(&nodes, "s1")));
    }

    #[test]
    fn test_epic_update_sets_project() {
        let nodes = nodes();
        let update = reparent_updates(node(&nodes, "e1"), node(&nodes, "p2"), &nodes);

        assert_eq!(update.id, NodeId::new("e1"));
        assert_eq!(update.new_sort_order, 3);
        assert_eq!(update.new_project_id, Some(ProjectId::new("p2")));
        assert_eq!(update.new_epic_id, None);
        assert_eq!(update.new_parent_issue_id, None);
    }

    #[test]
    fn test_issue_update_inherits_project_from_epic() {
        let nodes = nodes();
        let update = reparent_updates(node(&nodes, "i1"), node(&nodes, "e3"), &nodes);

        assert_eq!(update.new_epic_id, Some(EpicId::new("e3")));
        assert_eq!(update.new_project_id, Some(ProjectId::new("p2")));
        // e3's only child has no stored sort order.
        assert_eq!(update.new_sort_order, 0);
    }

    #[test]
    fn test_sub_issue_update_follows_parent_issue() {
        let nodes = nodes();
        let update = reparent_updates(node(&nodes, "s1"), node(&nodes, "i4"), &nodes);

        assert_eq!(update.new_parent_issue_id, Some(IssueId::new("i4")));
        assert_eq!(update.new_epic_id, Some(EpicId::new("e3")));
        assert_eq!(update.new_project_id, Some(ProjectId::new("p2")));
        assert_eq!(update.new_sort_order, 0);
    }

    #[test]
    fn test_update_appends_after_max_child() {
        let nodes = nodes();
        let update = reparent_updates(node(&nodes, "i3"), node(&nodes, "e1"), &nodes);
        assert_eq!(update.new_sort_order, 5);
    }

    #[test]
    fn test_update_for_unsupported_pair_changes_only_position() {
        let nodes = flatten_tree(&sample_tree());
        let update = reparent_updates(node(&nodes, "i1"), node(&nodes, "p2"), &nodes);

        assert_eq!(update.new_sort_order, 0);
        assert!(update.new_project_id.is_none());
        assert!(update.new_epic_id.is_none());
    }
}
