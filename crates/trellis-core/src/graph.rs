//! Dependency graph operations.
//!
//! Edges point from **dependent -> dependency**: `issue_id` cannot be ready
//! until `depends_on_id` is terminal. A consistent snapshot is acyclic, but
//! nothing here assumes it; every traversal tracks what it has visited and
//! a cycle is reported as `None` or simply bounds the walk.
//!
//! The free functions work directly on the raw edge list. [`DependencyGraph`]
//! indexes the edges once with petgraph for repeated queries such as
//! write-time cycle prevention and cycle diagnostics.

use crate::domain::{DependencyEdge, Issue, IssueId};
use petgraph::algo;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{HashMap, HashSet, VecDeque};

/// Order issues so every dependency comes before its dependents.
///
/// Kahn's algorithm with a FIFO frontier seeded in input order, so issues
/// with no ordering constraint between them keep their relative order.
/// Edges with an endpoint outside `issues` are ignored.
///
/// Returns `None` if the edges contain a cycle (a self-edge included).
#[must_use]
pub fn topological_sort<'a>(
    issues: &'a [Issue],
    dependencies: &[DependencyEdge],
) -> Option<Vec<&'a Issue>> {
    let position: HashMap<&IssueId, usize> = issues
        .iter()
        .enumerate()
        .map(|(i, issue)| (&issue.id, i))
        .collect();

    let mut in_degree = vec![0usize; issues.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); issues.len()];
    for edge in dependencies {
        let (Some(&from), Some(&to)) = (
            position.get(&edge.issue_id),
            position.get(&edge.depends_on_id),
        ) else {
            continue;
        };
        in_degree[from] += 1;
        dependents[to].push(from);
    }

    let mut frontier: VecDeque<usize> = (0..issues.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(issues.len());

    while let Some(current) = frontier.pop_front() {
        order.push(&issues[current]);
        for &dependent in &dependents[current] {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                frontier.push_back(dependent);
            }
        }
    }

    if order.len() < issues.len() {
        tracing::debug!(
            sorted = order.len(),
            total = issues.len(),
            "Dependency cycle prevented a complete topological order"
        );
        return None;
    }

    Some(order)
}

/// Issues with an edge pointing at `issue_id`, in edge order.
#[must_use]
pub fn blocked_issues(issue_id: &IssueId, dependencies: &[DependencyEdge]) -> Vec<IssueId> {
    dependencies
        .iter()
        .filter(|edge| &edge.depends_on_id == issue_id)
        .map(|edge| edge.issue_id.clone())
        .collect()
}

/// Every issue reachable by following dependency edges from `issue_id`.
///
/// `issue_id` itself is included only when a cycle leads back to it.
#[must_use]
pub fn transitive_dependencies(
    issue_id: &IssueId,
    dependencies: &[DependencyEdge],
) -> HashSet<IssueId> {
    let mut adjacency: HashMap<&IssueId, Vec<&IssueId>> = HashMap::new();
    for edge in dependencies {
        adjacency
            .entry(&edge.issue_id)
            .or_default()
            .push(&edge.depends_on_id);
    }

    let mut visited: HashSet<IssueId> = HashSet::new();
    let mut stack = vec![issue_id];

    while let Some(current) = stack.pop() {
        let Some(targets) = adjacency.get(current) else {
            continue;
        };
        // Reverse so the first edge is explored first.
        for &target in targets.iter().rev() {
            if visited.insert(target.clone()) {
                stack.push(target);
            }
        }
    }

    visited
}

/// Indexed dependency graph for repeated queries.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: DiGraph<IssueId, ()>,
    node_map: HashMap<IssueId, NodeIndex>,
}

impl DependencyGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every edge of the relation.
    #[must_use]
    pub fn from_edges(edges: &[DependencyEdge]) -> Self {
        let mut graph = Self::new();
        for edge in edges {
            graph.add_edge(edge);
        }
        graph
    }

    fn node(&mut self, id: &IssueId) -> NodeIndex {
        if let Some(&node) = self.node_map.get(id) {
            return node;
        }
        let node = self.graph.add_node(id.clone());
        self.node_map.insert(id.clone(), node);
        node
    }

    /// Add an edge. Duplicate edges are stored once.
    pub fn add_edge(&mut self, edge: &DependencyEdge) {
        let from = self.node(&edge.issue_id);
        let to = self.node(&edge.depends_on_id);
        self.graph.update_edge(from, to, ());
    }

    /// Number of edges in the graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Whether adding `from -> to` would close a cycle.
    ///
    /// A self-edge always would. Otherwise this checks for an existing path
    /// from `to` back to `from`.
    #[must_use]
    pub fn would_create_cycle(&self, from: &IssueId, to: &IssueId) -> bool {
        if from == to {
            return true;
        }
        let (Some(&from_node), Some(&to_node)) = (self.node_map.get(from), self.node_map.get(to))
        else {
            return false;
        };
        algo::has_path_connecting(&self.graph, to_node, from_node, None)
    }

    /// Direct dependencies of `id`, in insertion order.
    #[must_use]
    pub fn dependencies(&self, id: &IssueId) -> Vec<IssueId> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Issues that directly depend on `id`, in insertion order.
    #[must_use]
    pub fn dependents(&self, id: &IssueId) -> Vec<IssueId> {
        self.neighbors(id, Direction::Incoming)
    }

    fn neighbors(&self, id: &IssueId, direction: Direction) -> Vec<IssueId> {
        let Some(&node) = self.node_map.get(id) else {
            return Vec::new();
        };
        // petgraph walks the most recently added edge first.
        let mut ids: Vec<IssueId> = self
            .graph
            .neighbors_directed(node, direction)
            .map(|n| self.graph[n].clone())
            .collect();
        ids.reverse();
        ids
    }

    /// Groups of issues that sit on a cycle.
    ///
    /// Each group is a strongly connected component with more than one
    /// member, or a single issue with a self-edge. Ids within a group and
    /// the groups themselves are sorted.
    #[must_use]
    pub fn find_cycles(&self) -> Vec<Vec<IssueId>> {
        let mut cycles: Vec<Vec<IssueId>> = algo::tarjan_scc(&self.graph)
            .into_iter()
            .filter(|component| {
                component.len() > 1 || self.graph.contains_edge(component[0], component[0])
            })
            .map(|component| {
                let mut ids: Vec<IssueId> =
                    component.into_iter().map(|n| self.graph[n].clone()).collect();
                ids.sort();
                ids
            })
            .collect();
        cycles.sort();
        cycles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::issue;

    fn ids(issues: &[&Issue]) -> Vec<String> {
        issues.iter().map(|i| i.id.to_string()).collect()
    }

    fn edge(from: &str, to: &str) -> DependencyEdge {
        DependencyEdge::new(from, to)
    }

    fn set(ids: &[&str]) -> HashSet<IssueId> {
        ids.iter().map(|id| IssueId::new(*id)).collect()
    }

    #[test]
    fn test_sort_empty_and_singleton() {
        assert_eq!(topological_sort(&[], &[]), Some(vec![]));

        let issues = vec![issue("a", "e")];
        assert_eq!(ids(&topological_sort(&issues, &[]).unwrap()), vec!["a"]);
    }

    #[test]
    fn test_sort_puts_dependencies_first() {
        let issues = vec![issue("a", "e"), issue("b", "e"), issue("c", "e")];
        // a depends on b, b depends on c
        let edges = vec![edge("a", "b"), edge("b", "c")];

        let order = topological_sort(&issues, &edges).unwrap();

        assert_eq!(ids(&order), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_sort_preserves_input_order_for_unconstrained_issues() {
        let issues = vec![
            issue("d", "e"),
            issue("a", "e"),
            issue("c", "e"),
            issue("b", "e"),
        ];
        let edges = vec![edge("d", "b")];

        let order = topological_sort(&issues, &edges).unwrap();

        assert_eq!(ids(&order), vec!["a", "c", "b", "d"]);
    }

    #[test]
    fn test_sort_detects_two_and_three_cycles() {
        let two = vec![issue("a", "e"), issue("b", "e")];
        assert!(topological_sort(&two, &[edge("a", "b"), edge("b", "a")]).is_none());

        let three = vec![issue("a", "e"), issue("b", "e"), issue("c", "e")];
        let edges = vec![edge("a", "b"), edge("b", "c"), edge("c", "a")];
        assert!(topological_sort(&three, &edges).is_none());
    }

    #[test]
    fn test_sort_detects_self_edge() {
        let issues = vec![issue("a", "e")];
        assert!(topological_sort(&issues, &[edge("a", "a")]).is_none());
    }

    #[test]
    fn test_sort_ignores_edges_to_unknown_issues() {
        let issues = vec![issue("a", "e"), issue("b", "e")];
        let edges = vec![edge("a", "ghost"), edge("b", "a")];

        let order = topological_sort(&issues, &edges).unwrap();

        assert_eq!(ids(&order), vec!["a", "b"]);
    }

    #[test]
    fn test_blocked_issues_follow_edge_order() {
        let edges = vec![edge("x", "a"), edge("y", "b"), edge("z", "a")];
        assert_eq!(
            blocked_issues(&IssueId::new("a"), &edges),
            vec![IssueId::new("x"), IssueId::new("z")]
        );
        assert!(blocked_issues(&IssueId::new("x"), &edges).is_empty());
    }

    #[test]
    fn test_transitive_dependencies_of_chain() {
        let edges = vec![edge("a", "b"), edge("b", "c"), edge("c", "d"), edge("x", "a")];
        assert_eq!(
            transitive_dependencies(&IssueId::new("a"), &edges),
            set(&["b", "c", "d"])
        );
        assert!(transitive_dependencies(&IssueId::new("d"), &edges).is_empty());
    }

    #[test]
    fn test_transitive_dependencies_terminate_on_cycle() {
        let edges = vec![edge("a", "b"), edge("b", "c"), edge("c", "a")];
        assert_eq!(
            transitive_dependencies(&IssueId::new("a"), &edges),
            set(&["a", "b", "c"])
        );
    }

    #[test]
    fn test_transitive_dependencies_handle_diamond() {
        let edges = vec![edge("a", "b"), edge("a", "c"), edge("b", "d"), edge("c", "d")];
        assert_eq!(
            transitive_dependencies(&IssueId::new("a"), &edges),
            set(&["b", "c", "d"])
        );
    }

    #[test]
    fn test_would_create_cycle() {
        let graph = DependencyGraph::from_edges(&[edge("a", "b"), edge("b", "c")]);

        assert!(graph.would_create_cycle(&IssueId::new("c"), &IssueId::new("a")));
        assert!(graph.would_create_cycle(&IssueId::new("a"), &IssueId::new("a")));
        assert!(!graph.would_create_cycle(&IssueId::new("a"), &IssueId::new("c")));
        assert!(!graph.would_create_cycle(&IssueId::new("new"), &IssueId::new("a")));
    }

    #[test]
    fn test_graph_neighbors_in_insertion_order() {
        let graph = DependencyGraph::from_edges(&[
            edge("a", "b"),
            edge("a", "c"),
            edge("a", "b"),
            edge("d", "c"),
        ]);

        assert_eq!(graph.edge_count(), 3);
        assert_eq!(
            graph.dependencies(&IssueId::new("a")),
            vec![IssueId::new("b"), IssueId::new("c")]
        );
        assert_eq!(
            graph.dependents(&IssueId::new("c")),
            vec![IssueId::new("a"), IssueId::new("d")]
        );
        assert!(graph.dependents(&IssueId::new("missing")).is_empty());
    }

    #[test]
    fn test_find_cycles() {
        let graph = DependencyGraph::from_edges(&[
            edge("a", "b"),
            edge("b", "a"),
            edge("c", "c"),
            edge("d", "e"),
        ]);

        assert_eq!(
            graph.find_cycles(),
            vec![
                vec![IssueId::new("a"), IssueId::new("b")],
                vec![IssueId::new("c")],
            ]
        );
        assert!(DependencyGraph::from_edges(&[edge("a", "b")])
            .find_cycles()
            .is_empty());
    }
}
