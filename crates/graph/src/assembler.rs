use crate::graph::DependencyGraph;
use crate::group::UnitGroup;
use codebundle_units::UnitKind;
use petgraph::graph::NodeIndex;
use std::collections::{BTreeMap, HashSet};

/// Default bound on traversal depth from a root
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Dependents are followed only while the depth is below this
const DEPENDENT_DEPTH_LIMIT: usize = 2;

/// Clusters a weighted graph into groups
///
/// Roots (classes, interfaces, traits; every node when none exist) are
/// visited by descending weight. Each root collects the not yet processed
/// units reachable through dependencies up to `max_depth`, plus direct and
/// second-level dependents. Whatever no traversal reached is grouped per file.
#[derive(Debug, Clone)]
pub struct GroupAssembler {
    max_depth: usize,
}

impl GroupAssembler {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Every node ends up in exactly one group
    pub fn assemble(&self, graph: &DependencyGraph) -> Vec<UnitGroup> {
        let mut processed: HashSet<NodeIndex> = HashSet::with_capacity(graph.node_count());
        let mut groups = Vec::new();

        let roots = select_roots(graph);
        log::debug!("Selected {} roots", roots.len());

        for root in roots {
            if processed.contains(&root) {
                continue;
            }
            let Some(root_node) = graph.node(root) else {
                continue;
            };
            let unit = &root_node.unit;
            let name = match &unit.name {
                Some(name) => format!("{}: {name} ({})", unit.kind.label(), unit.relative_path),
                None => format!("{}: {}", unit.kind.label(), unit.relative_path),
            };

            let members = self.collect(graph, root, &mut processed);
            groups.push(UnitGroup::from_units(
                name,
                members
                    .into_iter()
                    .filter_map(|idx| graph.node(idx).map(|node| node.unit.clone())),
            ));
        }

        let leftovers = leftover_groups(graph, &processed);
        if !leftovers.is_empty() {
            log::debug!("{} leftover file groups", leftovers.len());
        }
        groups.extend(leftovers);

        log::info!("Assembled {} groups from {} units", groups.len(), graph.node_count());
        groups
    }

    /// Depth-bounded traversal from `root` with an explicit stack
    fn collect(
        &self,
        graph: &DependencyGraph,
        root: NodeIndex,
        processed: &mut HashSet<NodeIndex>,
    ) -> Vec<NodeIndex> {
        let mut members = Vec::new();
        let mut stack = vec![(root, 0usize)];

        while let Some((current, depth)) = stack.pop() {
            if !processed.insert(current) {
                continue;
            }
            members.push(current);

            if depth >= self.max_depth {
                continue;
            }

            // Pushed in reverse so dependencies pop first, in order
            if depth < DEPENDENT_DEPTH_LIMIT {
                for dependent in graph.dependents(current).into_iter().rev() {
                    if !processed.contains(&dependent) {
                        stack.push((dependent, depth + 1));
                    }
                }
            }
            for dependency in graph.dependencies(current).into_iter().rev() {
                if !processed.contains(&dependency) {
                    stack.push((dependency, depth + 1));
                }
            }
        }

        members
    }
}

impl Default for GroupAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

/// Root candidates by descending weight, ties kept in insertion order
pub fn select_roots(graph: &DependencyGraph) -> Vec<NodeIndex> {
    let is_root_kind =
        |kind: UnitKind| matches!(kind, UnitKind::Class | UnitKind::Interface | UnitKind::Trait);

    let mut roots: Vec<(NodeIndex, f64)> = graph
        .nodes()
        .filter(|(_, node)| is_root_kind(node.unit.kind))
        .map(|(idx, node)| (idx, node.weight))
        .collect();

    if roots.is_empty() {
        roots = graph.nodes().map(|(idx, node)| (idx, node.weight)).collect();
    }

    roots.sort_by(|a, b| b.1.total_cmp(&a.1));
    roots.into_iter().map(|(idx, _)| idx).collect()
}

/// Unprocessed nodes bucketed per file, in path order
fn leftover_groups(graph: &DependencyGraph, processed: &HashSet<NodeIndex>) -> Vec<UnitGroup> {
    let mut by_file: BTreeMap<String, UnitGroup> = BTreeMap::new();

    for (idx, node) in graph.nodes() {
        if processed.contains(&idx) {
            continue;
        }
        let path = node.unit.relative_path.clone();
        by_file
            .entry(path.clone())
            .or_insert_with(|| UnitGroup::new(format!("File: {path}")))
            .push(node.unit.clone());
    }

    by_file.into_values().collect()
}
