use std::collections::BTreeSet;

use serde::Serialize;

use crate::core::node::NodeId;

pub mod builder;
pub mod ops;
pub mod viz;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub from: NodeId,
    pub to: NodeId,
    /// Target was an ancestor still being expanded when the edge was found.
    pub cycle: bool,
}

impl GraphEdge {
    pub fn new(from: NodeId, to: NodeId, cycle: bool) -> Self {
        Self { from, to, cycle }
    }
}

/// Result of one resolution run. Not mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyGraph {
    root: NodeId,
    nodes: BTreeSet<NodeId>,
    edges: Vec<GraphEdge>,
    truncated: BTreeSet<NodeId>,
}

impl DependencyGraph {
    /// Assembles a graph, adding the root and every edge endpoint to the
    /// node set.
    pub fn from_parts(
        root: NodeId,
        nodes: impl IntoIterator<Item = NodeId>,
        edges: Vec<GraphEdge>,
        truncated: impl IntoIterator<Item = NodeId>,
    ) -> Self {
        let mut nodes: BTreeSet<NodeId> = nodes.into_iter().collect();
        nodes.insert(root.clone());
        for edge in &edges {
            nodes.insert(edge.from.clone());
            nodes.insert(edge.to.clone());
        }
        Self {
            root,
            nodes,
            edges,
            truncated: truncated.into_iter().collect(),
        }
    }

    pub fn root(&self) -> &NodeId {
        &self.root
    }

    pub fn nodes(&self) -> &BTreeSet<NodeId> {
        &self.nodes
    }

    /// Edges in discovery order.
    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn truncated(&self) -> &BTreeSet<NodeId> {
        &self.truncated
    }

    pub fn cycles(&self) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter().filter(|edge| edge.cycle)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains(id)
    }

    pub fn is_truncated(&self, id: &NodeId) -> bool {
        self.truncated.contains(id)
    }

    /// Outgoing edges of `id`, in discovery order.
    pub fn edges_from<'a>(&'a self, id: &'a NodeId) -> impl Iterator<Item = &'a GraphEdge> + 'a {
        self.edges.iter().filter(move |edge| &edge.from == id)
    }
}
