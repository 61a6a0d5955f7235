use std::collections::{HashMap, HashSet};

use crate::core::node::NodeId;
use crate::graph::{DependencyGraph, GraphEdge};

/// Graphviz description of the graph. The root, truncated nodes and cycle
/// edges each get their own styling.
pub fn render_dot(graph: &DependencyGraph) -> String {
    let mut out = String::from("digraph dependencies {\n");
    out.push_str("  rankdir=LR;\n");
    out.push_str("  node [shape=box, style=rounded];\n");
    out.push_str(&format!(
        "  \"{}\" [color=green, penwidth=2];\n",
        escape_dot(graph.root().as_str())
    ));
    for node in graph.truncated() {
        out.push_str(&format!(
            "  \"{}\" [color=orange, style=\"rounded,dashed\"];\n",
            escape_dot(node.as_str())
        ));
    }
    for edge in graph.edges() {
        let from = escape_dot(edge.from.as_str());
        let to = escape_dot(edge.to.as_str());
        if edge.cycle {
            out.push_str(&format!(
                "  \"{from}\" -> \"{to}\" [color=red, style=dashed];\n"
            ));
        } else {
            out.push_str(&format!("  \"{from}\" -> \"{to}\";\n"));
        }
    }
    out.push_str("}\n");
    out
}

/// Indented text tree rooted at the graph root, children in discovery
/// order. Subtrees already printed once are marked `(seen)` instead of
/// being repeated.
pub fn render_tree(graph: &DependencyGraph) -> String {
    let mut children: HashMap<&NodeId, Vec<&GraphEdge>> = HashMap::new();
    for edge in graph.edges() {
        children.entry(&edge.from).or_default().push(edge);
    }

    let mut out = String::new();
    out.push_str(graph.root().as_str());
    if graph.is_truncated(graph.root()) {
        out.push_str(" (truncated)");
    }
    out.push('\n');

    let mut printed: HashSet<&NodeId> = HashSet::new();
    printed.insert(graph.root());
    let mut prefix = String::new();
    let mut stack = vec![TreeFrame {
        edges: children.get(graph.root()).cloned().unwrap_or_default(),
        indent: 0,
        cursor: 0,
    }];

    while let Some(frame) = stack.last_mut() {
        let Some(&edge) = frame.edges.get(frame.cursor) else {
            stack.pop();
            continue;
        };
        frame.cursor += 1;
        let is_last = frame.cursor == frame.edges.len();
        prefix.truncate(frame.indent);
        out.push_str(&prefix);
        out.push_str(if is_last { "`-- " } else { "|-- " });
        out.push_str(edge.to.as_str());

        if edge.cycle {
            out.push_str(" (cycle)\n");
            continue;
        }
        if graph.is_truncated(&edge.to) {
            out.push_str(" (truncated)\n");
            continue;
        }
        let grandchildren = children.get(&edge.to);
        if !printed.insert(&edge.to) {
            if grandchildren.is_some_and(|edges| !edges.is_empty()) {
                out.push_str(" (seen)");
            }
            out.push('\n');
            continue;
        }
        out.push('\n');

        prefix.push_str(if is_last { "    " } else { "|   " });
        stack.push(TreeFrame {
            edges: grandchildren.cloned().unwrap_or_default(),
            indent: prefix.len(),
            cursor: 0,
        });
    }
    out
}

/// Children still to print for one node. `indent` is the length of the
/// shared prefix buffer at this level.
struct TreeFrame<'a> {
    edges: Vec<&'a GraphEdge>,
    indent: usize,
    cursor: usize,
}

fn escape_dot(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}
