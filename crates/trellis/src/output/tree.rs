//! Hierarchy tree rendering with ASCII/Unicode connectors.

use super::color::{
    bold, colored_status_icon, colorize_number, colorize_percentage, colorize_priority, dimmed,
};
use super::OutputConfig;
use std::collections::HashMap;
use std::io::{self, Write};
use trellis_core::domain::NodeId;
use trellis_core::format::display_number;
use trellis_core::hierarchy::{is_last_child_ref, NodeEntity, NodeKind, TreeNode};
use trellis_core::status::is_blocked;

struct Glyphs {
    branch: &'static str,
    corner: &'static str,
    pipe: &'static str,
    space: &'static str,
}

const UNICODE: Glyphs = Glyphs {
    branch: "├── ",
    corner: "└── ",
    pipe: "│   ",
    space: "    ",
};

const ASCII: Glyphs = Glyphs {
    branch: "|-- ",
    corner: "`-- ",
    pipe: "|   ",
    space: "    ",
};

/// Render visible tree nodes, one per line, in the order given.
///
/// Projects print flush left. Every other node gets one column per
/// ancestor below the project plus its own connector. A node whose children
/// are all hidden is marked with `[+]`.
pub(crate) fn print_tree_text<W: Write>(
    w: &mut W,
    nodes: &[&TreeNode],
    config: &OutputConfig,
) -> io::Result<()> {
    let glyphs = if config.use_ascii { &ASCII } else { &UNICODE };
    let by_id: HashMap<&NodeId, &TreeNode> = nodes.iter().map(|node| (&node.id, *node)).collect();

    for node in nodes {
        let prefix = tree_prefix(node, nodes, &by_id, glyphs);
        let collapsed = node.has_children
            && !nodes
                .iter()
                .any(|candidate| candidate.parent_id.as_ref() == Some(&node.id));

        write!(w, "{}{}", dimmed(&prefix, config), node_label(node, config))?;
        if collapsed {
            write!(w, " {}", dimmed("[+]", config))?;
        }
        writeln!(w)?;
    }

    Ok(())
}

fn tree_prefix(
    node: &TreeNode,
    nodes: &[&TreeNode],
    by_id: &HashMap<&NodeId, &TreeNode>,
    glyphs: &Glyphs,
) -> String {
    if node.kind == NodeKind::Project {
        return String::new();
    }

    let mut columns = Vec::new();
    let mut current = node.parent_id.as_ref();
    while let Some(parent_id) = current {
        match by_id.get(parent_id) {
            Some(parent) if parent.kind == NodeKind::Project => break,
            Some(parent) => {
                columns.push(if is_last_child_ref(parent, nodes) {
                    glyphs.space
                } else {
                    glyphs.pipe
                });
                current = parent.parent_id.as_ref();
            }
            // Hidden ancestor; nothing to continue.
            None => {
                columns.push(glyphs.space);
                break;
            }
        }
    }
    columns.reverse();

    let connector = if is_last_child_ref(node, nodes) {
        glyphs.corner
    } else {
        glyphs.branch
    };
    format!("{}{connector}", columns.concat())
}

fn node_label(node: &TreeNode, config: &OutputConfig) -> String {
    let mut label = match &node.entity {
        NodeEntity::Project(project) => bold(
            &format!("{} {}", display_number(NodeKind::Project, project.number), project.name),
            config,
        ),
        NodeEntity::Epic(epic) => format!(
            "{} {}",
            colorize_number(&display_number(NodeKind::Epic, epic.number), config),
            epic.name
        ),
        NodeEntity::Issue(issue) => {
            let mut text = format!(
                "{} {} {} {}",
                colored_status_icon(issue.status, is_blocked(issue), config),
                colorize_number(&display_number(node.kind, issue.number), config),
                colorize_priority(issue.priority, config),
                issue.title
            );
            if let Some(points) = issue.story_points {
                text.push_str(&format!(" ({points} pts)"));
            }
            text
        }
    };

    let mut rollups = Vec::new();
    // Issues already show their own estimate.
    if let Some(points) = node.total_points.filter(|_| node.kind != NodeKind::Issue) {
        rollups.push(format!("{points} pts"));
    }
    if let Some(progress) = node.progress.filter(|progress| progress.total > 0) {
        rollups.push(colorize_percentage(progress.percentage, config));
    }
    if !rollups.is_empty() {
        label.push_str("  ");
        label.push_str(&rollups.join("  "));
    }

    label
}
