use std::collections::HashMap;

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use clausegraph_core::error::{ClauseGraphError, Result};
use clausegraph_core::graph::GraphProjection;
use clausegraph_core::node::{Edge, EdgeType, Node, NodeKind};

/// Mutable construction phase of a contract graph.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    graph: DiGraph<Node, Edge>,
    node_map: HashMap<String, NodeIndex>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node. Fails if a node with the same id is already present.
    pub fn add_node(&mut self, node: impl Into<Node>) -> Result<&Node> {
        let node = node.into();
        if self.node_map.contains_key(node.id()) {
            return Err(ClauseGraphError::DuplicateNode(node.id().to_string()));
        }

        let id = node.id().to_string();
        let idx = self.graph.add_node(node);
        self.node_map.insert(id, idx);
        Ok(&self.graph[idx])
    }

    pub fn find_node(&self, id: &str) -> Option<&Node> {
        self.node_map.get(id).map(|&idx| &self.graph[idx])
    }

    /// Append an edge. Both endpoints must already be present. Parallel
    /// edges are kept.
    pub fn add_edge(&mut self, from: &str, to: &str, edge_type: EdgeType) -> Result<&Edge> {
        let lookup = |id: &str| {
            self.node_map
                .get(id)
                .copied()
                .ok_or_else(|| ClauseGraphError::UnknownNode(id.to_string()))
        };
        let source = lookup(from)?;
        let target = lookup(to)?;

        let edge = self
            .graph
            .add_edge(source, target, Edge::new(from, to, edge_type));
        Ok(&self.graph[edge])
    }

    /// Append an already constructed edge, checking endpoints the same way.
    pub fn insert_edge(&mut self, edge: Edge) -> Result<&Edge> {
        self.add_edge(&edge.from, &edge.to, edge.edge_type)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Freeze the graph.
    pub fn build(self) -> ContractGraph {
        tracing::debug!(
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            "Contract graph assembled"
        );

        ContractGraph {
            graph: self.graph,
            node_map: self.node_map,
        }
    }
}

/// Immutable, assembled contract graph: a directed multigraph that may
/// contain cycles.
///
/// Nothing is ever removed, so node and edge indices follow insertion order
/// and every traversal over the snapshot is deterministic.
#[derive(Debug, Clone, Default)]
pub struct ContractGraph {
    pub(crate) graph: DiGraph<Node, Edge>,
    pub(crate) node_map: HashMap<String, NodeIndex>,
}

impl ContractGraph {
    /// Rebuild a graph from its projection, re-checking every invariant.
    pub fn from_projection(projection: GraphProjection) -> Result<Self> {
        let mut builder = GraphBuilder::new();
        for node in projection.nodes {
            builder.add_node(node)?;
        }
        for edge in projection.edges {
            builder.insert_edge(edge)?;
        }
        Ok(builder.build())
    }

    pub fn find_node(&self, id: &str) -> Option<&Node> {
        self.node_map.get(id).map(|&idx| &self.graph[idx])
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.graph.node_weights()
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.graph.edge_weights()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &Node> + '_ {
        self.nodes().filter(move |n| n.kind() == kind)
    }

    pub fn outgoing(&self, id: &str) -> impl Iterator<Item = &Edge> + '_ {
        self.edge_list(id, Direction::Outgoing)
    }

    pub fn incoming(&self, id: &str) -> impl Iterator<Item = &Edge> + '_ {
        self.edge_list(id, Direction::Incoming)
    }

    /// Direct successors, one entry per outgoing edge.
    pub fn neighbors(&self, id: &str) -> Vec<&Node> {
        match self.node_map.get(id) {
            Some(&idx) => self
                .ordered_edges(idx, Direction::Outgoing)
                .into_iter()
                .map(|(_, next)| &self.graph[next])
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn to_projection(&self) -> GraphProjection {
        GraphProjection {
            nodes: self.nodes().cloned().collect(),
            edges: self.edges().cloned().collect(),
        }
    }

    /// Edges touching `idx` in `direction`, oldest first, paired with the
    /// node at the far end. Petgraph walks adjacency newest first.
    pub(crate) fn ordered_edges(
        &self,
        idx: NodeIndex,
        direction: Direction,
    ) -> Vec<(EdgeIndex, NodeIndex)> {
        let mut edges: Vec<(EdgeIndex, NodeIndex)> = self
            .graph
            .edges_directed(idx, direction)
            .map(|edge| {
                let far = match direction {
                    Direction::Outgoing => edge.target(),
                    Direction::Incoming => edge.source(),
                };
                (edge.id(), far)
            })
            .collect();
        edges.sort_by_key(|&(edge, _)| edge);
        edges
    }

    fn edge_list(&self, id: &str, direction: Direction) -> impl Iterator<Item = &Edge> + '_ {
        let edges = match self.node_map.get(id) {
            Some(&idx) => self.ordered_edges(idx, direction),
            None => Vec::new(),
        };
        edges.into_iter().map(move |(edge, _)| &self.graph[edge])
    }
}
