//! Flattening of the project → epic → issue → sub-issue hierarchy.
//!
//! [`flatten_tree`] turns nested [`ProjectTree`]s into a flat, pre-ordered
//! list of [`TreeNode`]s linked by `parent_id`. Everything downstream (tree
//! rendering, rollups, drag-and-drop validation) works on that list.
//! [`ChildIndex`] maps each parent to its children once per list so walks
//! are linear rather than rescanning the whole list at every level.

use crate::counts::{compute_issue_counts, IssueCounts, Progress};
use crate::domain::{Epic, Issue, NodeId, Project, ProjectTree};
use crate::metrics::{compute_project_metrics, ProjectMetrics};
use crate::rollup::with_all_node_rollups;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// What a tree node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Level 0
    Project,
    /// Level 1
    Epic,
    /// Level 2, a top-level issue
    Issue,
    /// Level 3, an issue nested under another issue
    SubIssue,
}

impl NodeKind {
    /// Depth in the hierarchy, 0 for projects.
    #[must_use]
    pub fn level(self) -> u8 {
        match self {
            Self::Project => 0,
            Self::Epic => 1,
            Self::Issue => 2,
            Self::SubIssue => 3,
        }
    }

    /// Issues and sub-issues.
    #[must_use]
    pub fn is_issue(self) -> bool {
        matches!(self, Self::Issue | Self::SubIssue)
    }
}

/// The entity behind a node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum NodeEntity {
    /// A project
    Project(Project),
    /// An epic
    Epic(Epic),
    /// An issue or sub-issue
    Issue(Issue),
}

impl NodeEntity {
    /// Manual position among siblings, if the entity has one.
    #[must_use]
    pub fn sort_order(&self) -> Option<i64> {
        match self {
            Self::Project(_) => None,
            Self::Epic(epic) => Some(epic.sort_order),
            Self::Issue(issue) => issue.sort_order,
        }
    }

    /// Project or epic name, or issue title.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Project(project) => &project.name,
            Self::Epic(epic) => &epic.name,
            Self::Issue(issue) => &issue.title,
        }
    }
}

/// One entity of the hierarchy, with aggregates over its subtree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode {
    /// Id of the underlying entity
    pub id: NodeId,
    /// Entity kind
    pub kind: NodeKind,
    /// Hierarchy depth, 0..=3
    pub level: u8,
    /// Parent node; `None` only for projects
    pub parent_id: Option<NodeId>,
    /// Whether the entity has nested entities
    pub has_children: bool,
    /// The underlying entity
    pub entity: NodeEntity,
    /// Issue state counts over the node's issues
    pub counts: IssueCounts,
    /// Story point metrics over the node's issues
    pub metrics: ProjectMetrics,
    /// Rolled-up story points; `None` for sub-issues and before rollup
    pub total_points: Option<u32>,
    /// Rolled-up progress; `None` for sub-issues and before rollup
    pub progress: Option<Progress>,
}

impl TreeNode {
    fn new<'a>(
        id: NodeId,
        kind: NodeKind,
        parent_id: Option<NodeId>,
        has_children: bool,
        entity: NodeEntity,
        issues: impl IntoIterator<Item = &'a Issue>,
    ) -> Self {
        let issues: Vec<&Issue> = issues.into_iter().collect();
        Self {
            id,
            kind,
            level: kind.level(),
            parent_id,
            has_children,
            entity,
            counts: compute_issue_counts(issues.iter().copied()),
            metrics: compute_project_metrics(issues.iter().copied()),
            total_points: None,
            progress: None,
        }
    }

    /// A copy of this node carrying the given rollup values.
    #[must_use]
    pub fn with_rollups(&self, total_points: Option<u32>, progress: Option<Progress>) -> Self {
        Self {
            total_points,
            progress,
            ..self.clone()
        }
    }

    /// The underlying issue, for issue and sub-issue nodes.
    #[must_use]
    pub fn issue(&self) -> Option<&Issue> {
        match &self.entity {
            NodeEntity::Issue(issue) => Some(issue),
            _ => None,
        }
    }
}

/// Flatten project trees into a pre-ordered node list.
///
/// Epic nodes aggregate their top-level issues, issue nodes aggregate
/// themselves plus their sub-issues, sub-issue nodes only themselves.
/// Project nodes aggregate the top-level issues of all their epics. Rollup
/// fields are left empty; see [`build_tree`].
#[must_use]
pub fn flatten_tree(projects: &[ProjectTree]) -> Vec<TreeNode> {
    let mut nodes = Vec::new();

    for tree in projects {
        let project_id = NodeId::from(&tree.project.id);
        nodes.push(TreeNode::new(
            project_id.clone(),
            NodeKind::Project,
            None,
            !tree.epics.is_empty(),
            NodeEntity::Project(tree.project.clone()),
            tree.top_level_issues(),
        ));

        for epic_tree in &tree.epics {
            let epic_id = NodeId::from(&epic_tree.epic.id);
            nodes.push(TreeNode::new(
                epic_id.clone(),
                NodeKind::Epic,
                Some(project_id.clone()),
                !epic_tree.issues.is_empty(),
                NodeEntity::Epic(epic_tree.epic.clone()),
                epic_tree.issues.iter().map(|t| &t.issue),
            ));

            for issue_tree in &epic_tree.issues {
                let issue_id = NodeId::from(&issue_tree.issue.id);
                nodes.push(TreeNode::new(
                    issue_id.clone(),
                    NodeKind::Issue,
                    Some(epic_id.clone()),
                    !issue_tree.sub_issues.is_empty(),
                    NodeEntity::Issue(issue_tree.issue.clone()),
                    issue_tree.all_issues(),
                ));

                for sub_issue in &issue_tree.sub_issues {
                    nodes.push(TreeNode::new(
                        NodeId::from(&sub_issue.id),
                        NodeKind::SubIssue,
                        Some(issue_id.clone()),
                        false,
                        NodeEntity::Issue(sub_issue.clone()),
                        std::iter::once(sub_issue),
                    ));
                }
            }
        }
    }

    nodes
}

/// Flatten and compute rollups in one step.
#[must_use]
pub fn build_tree(projects: &[ProjectTree]) -> Vec<TreeNode> {
    with_all_node_rollups(&flatten_tree(projects))
}

/// Nodes shown for the given expansion state.
///
/// Projects are always visible; any other node is visible when its parent
/// is expanded. This is progressive disclosure, not filtering: a node under
/// a collapsed grandparent stays visible if its own parent id is expanded.
#[must_use]
pub fn visible_nodes<'a>(all_nodes: &'a [TreeNode], expanded: &HashSet<NodeId>) -> Vec<&'a TreeNode> {
    all_nodes
        .iter()
        .filter(|node| match &node.parent_id {
            None => node.kind == NodeKind::Project,
            Some(parent) => expanded.contains(parent),
        })
        .collect()
}

/// Every node below `node`, in pre-order.
#[must_use]
pub fn descendant_nodes<'a>(node: &TreeNode, all_nodes: &'a [TreeNode]) -> Vec<&'a TreeNode> {
    ChildIndex::new(all_nodes).descendants(&node.id)
}

/// Issue and sub-issue nodes below `node`, in pre-order.
#[must_use]
pub fn descendant_issues<'a>(node: &TreeNode, all_nodes: &'a [TreeNode]) -> Vec<&'a TreeNode> {
    ChildIndex::new(all_nodes).descendant_issues(&node.id)
}

/// Whether `node` is the last of its siblings within `nodes`.
///
/// Sensitive to the list passed: against the visible list, a node whose
/// later siblings are hidden counts as last. Nodes without a parent are
/// never last.
#[must_use]
pub fn is_last_child(node: &TreeNode, nodes: &[TreeNode]) -> bool {
    is_last_child_of(node, nodes.iter())
}

/// [`is_last_child`] over a list of references, such as [`visible_nodes`].
#[must_use]
pub fn is_last_child_ref(node: &TreeNode, nodes: &[&TreeNode]) -> bool {
    is_last_child_of(node, nodes.iter().copied())
}

fn is_last_child_of<'a>(node: &TreeNode, nodes: impl Iterator<Item = &'a TreeNode>) -> bool {
    if node.parent_id.is_none() {
        return false;
    }
    nodes
        .filter(|candidate| candidate.parent_id == node.parent_id)
        .last()
        .is_some_and(|last| last.id == node.id)
}

/// Parent → children index over one node list.
#[derive(Debug)]
pub struct ChildIndex<'a> {
    nodes: &'a [TreeNode],
    by_id: HashMap<&'a NodeId, usize>,
    children: HashMap<&'a NodeId, Vec<usize>>,
}

impl<'a> ChildIndex<'a> {
    /// Index `nodes` by id and by parent id.
    #[must_use]
    pub fn new(nodes: &'a [TreeNode]) -> Self {
        let mut by_id = HashMap::with_capacity(nodes.len());
        let mut children: HashMap<&NodeId, Vec<usize>> = HashMap::new();

        for (position, node) in nodes.iter().enumerate() {
            by_id.insert(&node.id, position);
            if let Some(parent) = &node.parent_id {
                children.entry(parent).or_default().push(position);
            }
        }

        Self {
            nodes,
            by_id,
            children,
        }
    }

    /// The indexed node list.
    #[must_use]
    pub fn nodes(&self) -> &'a [TreeNode] {
        self.nodes
    }

    /// Look up a node by id.
    #[must_use]
    pub fn node(&self, id: &NodeId) -> Option<&'a TreeNode> {
        self.by_id.get(id).map(|&position| &self.nodes[position])
    }

    /// Parent of `node`, when it is present in the list.
    #[must_use]
    pub fn parent(&self, node: &TreeNode) -> Option<&'a TreeNode> {
        node.parent_id.as_ref().and_then(|id| self.node(id))
    }

    /// Direct children of `id`, in list order.
    #[must_use]
    pub fn children(&self, id: &NodeId) -> Vec<&'a TreeNode> {
        self.children
            .get(id)
            .map(|positions| positions.iter().map(|&p| &self.nodes[p]).collect())
            .unwrap_or_default()
    }

    /// Every node below `id`, in pre-order.
    ///
    /// Each node is visited once, so a corrupted parent chain that loops
    /// back on itself still terminates.
    #[must_use]
    pub fn descendants(&self, id: &NodeId) -> Vec<&'a TreeNode> {
        let mut result = Vec::new();
        let mut visited: HashSet<usize> = HashSet::new();
        let mut stack: Vec<usize> = self.child_positions_reversed(id);

        while let Some(position) = stack.pop() {
            if !visited.insert(position) {
                continue;
            }
            let node = &self.nodes[position];
            result.push(node);
            stack.extend(self.child_positions_reversed(&node.id));
        }

        result
    }

    /// Issue and sub-issue nodes below `id`, in pre-order.
    #[must_use]
    pub fn descendant_issues(&self, id: &NodeId) -> Vec<&'a TreeNode> {
        self.descendants(id)
            .into_iter()
            .filter(|node| node.kind.is_issue())
            .collect()
    }

    fn child_positions_reversed(&self, id: &NodeId) -> Vec<usize> {
        self.children
            .get(id)
            .map(|positions| positions.iter().rev().copied().collect())
            .unwrap_or_default()
    }

    /// Whether `ancestor` appears on `node`'s parent chain.
    ///
    /// The walk stops at a repeated id, so it terminates on a loop.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: &NodeId, node: &TreeNode) -> bool {
        let mut seen: HashSet<&NodeId> = HashSet::new();
        let mut current = node.parent_id.as_ref();

        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            if !seen.insert(parent) {
                return false;
            }
            current = self.node(parent).and_then(|p| p.parent_id.as_ref());
        }

        false
    }
}
