use crate::error::{GraphError, Result};
use crate::types::{EdgeKind, GraphEdge, GraphNode, GraphStats};
use codebundle_units::{SemanticUnit, UnitId};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::HashMap;
use std::sync::Arc;

/// Directed graph over semantic units
///
/// An edge `A -> B` means A depends on B. Dependencies are the outgoing
/// neighbours and dependents the incoming ones, so both views stay in sync.
pub struct DependencyGraph {
    graph: DiGraph<GraphNode, GraphEdge>,

    /// Unit id -> NodeIndex mapping
    id_index: HashMap<UnitId, NodeIndex>,

    /// Short name -> structural nodes carrying it, in insertion order
    name_index: HashMap<String, Vec<NodeIndex>>,

    stats: GraphStats,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            id_index: HashMap::new(),
            name_index: HashMap::new(),
            stats: GraphStats::default(),
        }
    }

    /// Register a unit, indexing structural units by short name
    pub fn add_unit(&mut self, unit: Arc<SemanticUnit>) -> Result<NodeIndex> {
        if self.id_index.contains_key(&unit.id) {
            return Err(GraphError::DuplicateNode(unit.id.clone()));
        }

        let id = unit.id.clone();
        let short_name = unit
            .is_structural()
            .then(|| unit.name.clone())
            .flatten();

        let idx = self.graph.add_node(GraphNode::new(unit));
        self.id_index.insert(id, idx);
        if let Some(name) = short_name {
            self.name_index.entry(name).or_default().push(idx);
        }

        Ok(idx)
    }

    /// Add a dependency edge; self-loops and repeated pairs are ignored
    ///
    /// Returns `true` when a new edge was inserted.
    pub fn add_edge(&mut self, from: NodeIndex, to: NodeIndex, kind: EdgeKind) -> bool {
        if from == to || self.graph.find_edge(from, to).is_some() {
            return false;
        }
        self.graph.add_edge(from, to, GraphEdge { kind });
        match kind {
            EdgeKind::Declared(_) => self.stats.declared_edges += 1,
            EdgeKind::Mention => self.stats.mention_edges += 1,
        }
        true
    }

    /// Units this node depends on, in insertion order
    pub fn dependencies(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.neighbors(idx, Direction::Outgoing)
    }

    /// Units depending on this node, in insertion order
    pub fn dependents(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.neighbors(idx, Direction::Incoming)
    }

    fn neighbors(&self, idx: NodeIndex, direction: Direction) -> Vec<NodeIndex> {
        let mut neighbors: Vec<_> = self.graph.neighbors_directed(idx, direction).collect();
        neighbors.sort_unstable();
        neighbors
    }

    pub fn edge(&self, from: NodeIndex, to: NodeIndex) -> Option<&GraphEdge> {
        self.graph
            .find_edge(from, to)
            .and_then(|edge| self.graph.edge_weight(edge))
    }

    /// Find node by unit id
    pub fn find(&self, id: &UnitId) -> Option<NodeIndex> {
        self.id_index.get(id).copied()
    }

    /// Structural nodes whose short name is exactly `name`
    pub fn named(&self, name: &str) -> &[NodeIndex] {
        self.name_index.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Get node data
    pub fn node(&self, idx: NodeIndex) -> Option<&GraphNode> {
        self.graph.node_weight(idx)
    }

    pub fn node_mut(&mut self, idx: NodeIndex) -> Option<&mut GraphNode> {
        self.graph.node_weight_mut(idx)
    }

    /// All nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &GraphNode)> {
        self.graph
            .node_indices()
            .filter_map(move |idx| self.graph.node_weight(idx).map(|node| (idx, node)))
    }

    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> {
        self.graph.node_indices()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub(crate) fn record_unresolved(&mut self, count: usize) {
        self.stats.unresolved_references += count;
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            nodes: self.node_count(),
            edges: self.edge_count(),
            ..self.stats.clone()
        }
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}
