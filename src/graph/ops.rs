use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

use crate::core::node::NodeId;
use crate::graph::DependencyGraph;

/// Orders every node so that dependencies come before their dependents.
///
/// Cycle edges are ignored. Ties are broken lexicographically, so identical
/// graphs always produce identical orders. Nodes the degree pass cannot
/// place are appended in sorted order.
pub fn load_order(graph: &DependencyGraph) -> Vec<NodeId> {
    let nodes = graph.nodes();
    if nodes.is_empty() {
        return Vec::new();
    }

    let mut adjacency: BTreeMap<&NodeId, BTreeSet<&NodeId>> = BTreeMap::new();
    for edge in graph.edges() {
        if edge.cycle || !nodes.contains(&edge.from) || !nodes.contains(&edge.to) {
            continue;
        }
        adjacency.entry(&edge.from).or_default().insert(&edge.to);
    }

    let mut indegree: BTreeMap<&NodeId, usize> = nodes.iter().map(|node| (node, 0)).collect();
    for targets in adjacency.values() {
        for target in targets {
            if let Some(count) = indegree.get_mut(target) {
                *count += 1;
            }
        }
    }

    let mut queue: VecDeque<&NodeId> = indegree
        .iter()
        .filter_map(|(node, &count)| if count == 0 { Some(*node) } else { None })
        .collect();
    let mut emitted: HashSet<&NodeId> = HashSet::new();
    let mut topo: Vec<&NodeId> = Vec::with_capacity(nodes.len());

    while let Some(node) = queue.pop_front() {
        if !emitted.insert(node) {
            continue;
        }
        topo.push(node);
        if let Some(targets) = adjacency.get(node) {
            for target in targets {
                if let Some(count) = indegree.get_mut(target) {
                    if *count > 0 {
                        *count -= 1;
                        if *count == 0 {
                            queue.push_back(*target);
                        }
                    }
                }
            }
        }
    }

    let mut order: Vec<NodeId> = topo.into_iter().rev().cloned().collect();
    order.extend(
        nodes
            .iter()
            .filter(|node| !emitted.contains(node))
            .cloned(),
    );
    order
}

#[cfg(test)]
mod tests {
    use crate::core::node::NodeId;
    use crate::graph::builder::build_graph;
    use crate::graph::ops::load_order;
    use crate::graph::{DependencyGraph, GraphEdge};
    use crate::source::FixtureSource;

    fn id(value: &str) -> NodeId {
        NodeId::new(value)
    }

    fn edge(from: &str, to: &str, cycle: bool) -> GraphEdge {
        GraphEdge::new(id(from), id(to), cycle)
    }

    fn names(order: &[NodeId]) -> Vec<&str> {
        order.iter().map(NodeId::as_str).collect()
    }

    fn position(order: &[NodeId], name: &str) -> usize {
        order
            .iter()
            .position(|node| node.as_str() == name)
            .expect("node in order")
    }

    fn assert_each_node_once(graph: &DependencyGraph, order: &[NodeId]) {
        assert_eq!(order.len(), graph.nodes().len());
        for node in graph.nodes() {
            assert_eq!(order.iter().filter(|n| *n == node).count(), 1, "{node}");
        }
    }

    #[test]
    fn diamond_orders_dependencies_first() {
        let source = FixtureSource::parse("A:B,C\nB:D\nC:D\nD:\n").expect("parse fixture");
        let graph = build_graph(id("A"), 5, &source);
        let order = load_order(&graph);
        assert_each_node_once(&graph, &order);
        assert_eq!(names(&order), vec!["D", "C", "B", "A"]);
        assert!(position(&order, "D") < position(&order, "B"));
        assert!(position(&order, "D") < position(&order, "C"));
        assert!(position(&order, "B") < position(&order, "A"));
        assert!(position(&order, "C") < position(&order, "A"));
        assert_eq!(load_order(&graph), order);
    }

    #[test]
    fn cycle_edges_do_not_constrain_order() {
        let source = FixtureSource::parse("A:B\nB:C\nC:A\n").expect("parse fixture");
        let graph = build_graph(id("A"), 5, &source);
        let order = load_order(&graph);
        assert_each_node_once(&graph, &order);
        assert_eq!(names(&order), vec!["C", "B", "A"]);
    }

    #[test]
    fn lone_root_orders_itself() {
        let graph = DependencyGraph::from_parts(id("A"), Vec::new(), Vec::new(), Vec::new());
        assert_eq!(names(&load_order(&graph)), vec!["A"]);
    }

    #[test]
    fn unordered_cycle_members_fall_back_to_sorted_order() {
        // A hand-built graph whose cycle is not flagged on any edge.
        let graph = DependencyGraph::from_parts(
            id("A"),
            vec![id("Z")],
            vec![
                edge("A", "B", false),
                edge("B", "C", false),
                edge("C", "B", false),
            ],
            Vec::new(),
        );
        let order = load_order(&graph);
        assert_each_node_once(&graph, &order);
        assert_eq!(names(&order), vec!["Z", "A", "B", "C"]);
    }

    #[test]
    fn disconnected_nodes_are_ordered_deterministically() {
        let graph = DependencyGraph::from_parts(
            id("A"),
            vec![id("Q"), id("M")],
            vec![edge("A", "B", false), edge("A", "B", false)],
            Vec::new(),
        );
        let order = load_order(&graph);
        assert_each_node_once(&graph, &order);
        assert_eq!(names(&order), vec!["B", "Q", "M", "A"]);
    }
}
