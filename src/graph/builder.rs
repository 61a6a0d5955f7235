use std::collections::{BTreeSet, HashMap};

use crate::core::node::NodeId;
use crate::graph::{DependencyGraph, GraphEdge};
use crate::source::MetadataSource;

#[derive(Clone, Copy, PartialEq, Eq)]
enum VisitState {
    Visiting,
    Visited,
}

struct Frame {
    id: NodeId,
    depth: usize,
    deps: Option<Vec<NodeId>>,
    cursor: usize,
}

impl Frame {
    fn new(id: NodeId, depth: usize) -> Self {
        Self {
            id,
            depth,
            deps: None,
            cursor: 0,
        }
    }
}

/// Resolves the dependency graph reachable from `root`, expanding nodes up
/// to `max_depth` levels below it.
///
/// Traversal is a depth-first walk over an explicit stack. A node at
/// `max_depth` is recorded as truncated and never fetched. An edge back to a
/// node that is still being expanded is marked as a cycle and not followed.
/// A failed fetch leaves that node without dependencies; the rest of the
/// graph is still resolved.
pub fn build_graph<S>(root: NodeId, max_depth: usize, source: &S) -> DependencyGraph
where
    S: MetadataSource + ?Sized,
{
    let mut nodes: BTreeSet<NodeId> = BTreeSet::new();
    let mut edges: Vec<GraphEdge> = Vec::new();
    let mut truncated: BTreeSet<NodeId> = BTreeSet::new();
    let mut state: HashMap<NodeId, VisitState> = HashMap::new();
    let mut stack: Vec<Frame> = Vec::new();

    nodes.insert(root.clone());
    state.insert(root.clone(), VisitState::Visiting);
    stack.push(Frame::new(root.clone(), 0));

    while let Some(frame) = stack.last_mut() {
        if frame.deps.is_none() {
            if frame.depth >= max_depth {
                truncated.insert(frame.id.clone());
                state.insert(frame.id.clone(), VisitState::Visited);
                stack.pop();
                continue;
            }
            let deps = match source.direct_dependencies(&frame.id) {
                Ok(deps) => deps,
                Err(err) => {
                    tracing::warn!(node = %frame.id, error = %err, "failed to fetch dependencies");
                    Vec::new()
                }
            };
            frame.deps = Some(deps);
        }

        let next = frame
            .deps
            .as_ref()
            .and_then(|deps| deps.get(frame.cursor))
            .cloned();
        let Some(dep) = next else {
            state.insert(frame.id.clone(), VisitState::Visited);
            stack.pop();
            continue;
        };
        frame.cursor += 1;
        let from = frame.id.clone();
        let child_depth = frame.depth + 1;

        nodes.insert(dep.clone());
        match state.get(&dep).copied() {
            None => {
                edges.push(GraphEdge::new(from, dep.clone(), false));
                state.insert(dep.clone(), VisitState::Visiting);
                stack.push(Frame::new(dep, child_depth));
            }
            Some(VisitState::Visiting) => {
                edges.push(GraphEdge::new(from, dep, true));
            }
            Some(VisitState::Visited) => {
                edges.push(GraphEdge::new(from, dep, false));
            }
        }
    }

    debug_assert!(edges
        .iter()
        .all(|edge| nodes.contains(&edge.from) && nodes.contains(&edge.to)));

    DependencyGraph::from_parts(root, nodes, edges, truncated)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use crate::core::node::NodeId;
    use crate::graph::builder::build_graph;
    use crate::graph::{DependencyGraph, GraphEdge};
    use crate::source::{FetchError, FixtureSource, MetadataSource};

    fn fixture(text: &str) -> FixtureSource {
        FixtureSource::parse(text).expect("parse fixture")
    }

    fn id(value: &str) -> NodeId {
        NodeId::new(value)
    }

    fn edge(from: &str, to: &str, cycle: bool) -> GraphEdge {
        GraphEdge::new(id(from), id(to), cycle)
    }

    fn node_names(graph: &DependencyGraph) -> Vec<&str> {
        graph.nodes().iter().map(NodeId::as_str).collect()
    }

    fn assert_invariants(graph: &DependencyGraph) {
        assert!(graph.contains(graph.root()));
        for edge in graph.edges() {
            assert!(graph.contains(&edge.from), "missing from {}", edge.from);
            assert!(graph.contains(&edge.to), "missing to {}", edge.to);
        }
        for node in graph.truncated() {
            assert_eq!(graph.edges_from(node).count(), 0, "{node} has edges");
        }
    }

    /// Counts fetches and fails for selected nodes.
    struct Recording<'a> {
        inner: &'a FixtureSource,
        failing: Vec<NodeId>,
        calls: RefCell<HashMap<NodeId, usize>>,
    }

    impl MetadataSource for Recording<'_> {
        fn direct_dependencies(&self, id: &NodeId) -> Result<Vec<NodeId>, FetchError> {
            *self.calls.borrow_mut().entry(id.clone()).or_default() += 1;
            if self.failing.contains(id) {
                return Err(FetchError::Manifest(format!("broken manifest for {id}")));
            }
            self.inner.direct_dependencies(id)
        }
    }

    #[test]
    fn two_node_cycle_is_marked_once() {
        let source = fixture("A:B\nB:A\n");
        let graph = build_graph(id("A"), 3, &source);
        assert_invariants(&graph);
        assert_eq!(node_names(&graph), vec!["A", "B"]);
        assert_eq!(graph.edges(), &[edge("A", "B", false), edge("B", "A", true)]);
        assert_eq!(graph.cycles().cloned().collect::<Vec<_>>(), vec![edge("B", "A", true)]);
        assert!(graph.truncated().is_empty());
    }

    #[test]
    fn depth_bound_truncates_without_fetching() {
        let inner = fixture("A:B\nB:C\nC:\n");
        let source = Recording {
            inner: &inner,
            failing: Vec::new(),
            calls: RefCell::new(HashMap::new()),
        };
        let graph = build_graph(id("A"), 1, &source);
        assert_invariants(&graph);
        assert_eq!(node_names(&graph), vec!["A", "B"]);
        assert_eq!(graph.truncated().iter().collect::<Vec<_>>(), vec![&id("B")]);
        assert_eq!(graph.edges(), &[edge("A", "B", false)]);

        let calls = source.calls.borrow();
        assert_eq!(calls.get(&id("A")), Some(&1));
        assert_eq!(calls.get(&id("B")), None);
    }

    #[test]
    fn diamond_is_not_a_cycle() {
        let source = fixture("A:B,C\nB:D\nC:D\nD:\n");
        let graph = build_graph(id("A"), 5, &source);
        assert_invariants(&graph);
        assert_eq!(
            graph.edges(),
            &[
                edge("A", "B", false),
                edge("B", "D", false),
                edge("A", "C", false),
                edge("C", "D", false),
            ]
        );
        assert_eq!(graph.cycles().count(), 0);
    }

    #[test]
    fn each_node_is_fetched_once() {
        let inner = fixture("A:B,C\nB:D\nC:D\nD:A\n");
        let source = Recording {
            inner: &inner,
            failing: Vec::new(),
            calls: RefCell::new(HashMap::new()),
        };
        let graph = build_graph(id("A"), 10, &source);
        assert_invariants(&graph);
        assert!(source.calls.borrow().values().all(|count| *count == 1));
        assert_eq!(
            graph.cycles().cloned().collect::<Vec<_>>(),
            vec![edge("D", "A", true)]
        );
    }

    #[test]
    fn fetch_failure_keeps_node_and_siblings() {
        let inner = fixture("A:B,C\nB:X\nC:D,E\nD:\nE:\n");
        let source = Recording {
            inner: &inner,
            failing: vec![id("B")],
            calls: RefCell::new(HashMap::new()),
        };
        let graph = build_graph(id("A"), 5, &source);
        assert_invariants(&graph);
        assert_eq!(node_names(&graph), vec!["A", "B", "C", "D", "E"]);
        assert_eq!(graph.edges_from(&id("B")).count(), 0);
        assert!(!graph.contains(&id("X")));
        assert!(!graph.is_truncated(&id("B")));
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let source = fixture("A:A,B\nB:\n");
        let graph = build_graph(id("A"), 2, &source);
        assert_invariants(&graph);
        assert_eq!(graph.edges(), &[edge("A", "A", true), edge("A", "B", false)]);
    }

    #[test]
    fn repeated_dependency_produces_repeated_edges() {
        let source = fixture("A:B,B\nB:\n");
        let graph = build_graph(id("A"), 2, &source);
        assert_eq!(graph.edges(), &[edge("A", "B", false), edge("A", "B", false)]);
    }

    #[test]
    fn deep_chain_does_not_recurse() {
        let names: Vec<String> = (0..20_000).map(|i| format!("N{i}")).collect();
        let adjacency: HashMap<NodeId, Vec<NodeId>> = names
            .windows(2)
            .map(|pair| (id(&pair[0]), vec![id(&pair[1])]))
            .collect();

        struct Chain(HashMap<NodeId, Vec<NodeId>>);
        impl MetadataSource for Chain {
            fn direct_dependencies(&self, id: &NodeId) -> Result<Vec<NodeId>, FetchError> {
                Ok(self.0.get(id).cloned().unwrap_or_default())
            }
        }

        let graph = build_graph(id("N0"), usize::MAX, &Chain(adjacency));
        assert_eq!(graph.nodes().len(), names.len());
        assert_eq!(graph.edges().len(), names.len() - 1);
    }

    #[test]
    fn node_at_depth_ceiling_is_truncated() {
        let source = fixture("A:B\nB:C\n");
        let graph = build_graph(id("A"), 2, &source);
        assert_eq!(node_names(&graph), vec!["A", "B", "C"]);
        assert_eq!(graph.truncated().iter().collect::<Vec<_>>(), vec![&id("C")]);
    }
}
