use codebundle_units::{RelationKind, SemanticUnit};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Node in the dependency graph
#[derive(Debug, Clone)]
pub struct GraphNode {
    pub unit: Arc<SemanticUnit>,

    /// Importance score, assigned by the weigher
    pub weight: f64,

    /// Sum of declared-relation contributions (extends 2.0, implements 1.5, imports 1.0)
    ///
    /// Reported only. Root order and traversal use `weight` alone.
    pub relation_weight: f64,
}

impl GraphNode {
    pub fn new(unit: Arc<SemanticUnit>) -> Self {
        Self {
            unit,
            weight: 0.0,
            relation_weight: 0.0,
        }
    }
}

/// How an edge was discovered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// A resolved `imports`, `extends` or `implements` reference
    Declared(RelationKind),

    /// The target's name appears as a token in the source unit
    Mention,
}

/// Edge in the dependency graph, pointing from dependent to dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub kind: EdgeKind,
}

/// Summary numbers for one built graph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
    pub declared_edges: usize,
    pub mention_edges: usize,
    pub unresolved_references: usize,
}
