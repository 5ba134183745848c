use crate::graph::DependencyGraph;
use codebundle_units::UnitKind;

/// Type-based starting weight of a node
pub const fn base_weight(kind: UnitKind) -> f64 {
    match kind {
        UnitKind::Class => 10.0,
        UnitKind::Interface => 8.0,
        UnitKind::Trait => 7.0,
        UnitKind::Function => 5.0,
        _ => 1.0,
    }
}

/// Assign `base + 2 x dependents + dependencies` to every node
pub fn assign_weights(graph: &mut DependencyGraph) {
    let indices: Vec<_> = graph.node_indices().collect();
    for idx in indices {
        let dependents = graph.dependents(idx).len() as f64;
        let dependencies = graph.dependencies(idx).len() as f64;
        if let Some(node) = graph.node_mut(idx) {
            node.weight = base_weight(node.unit.kind) + 2.0 * dependents + dependencies;
        }
    }
}
