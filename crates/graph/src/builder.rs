use crate::error::Result;
use crate::graph::DependencyGraph;
use crate::types::EdgeKind;
use codebundle_units::{RelationKind, SemanticUnit, UnitId};
use once_cell::sync::Lazy;
use petgraph::graph::NodeIndex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Unicode word runs; `$` is part of a script identifier
static IDENTIFIER: Lazy<regex::Regex> =
    Lazy::new(|| regex::Regex::new(r"[\w$]+").expect("valid regex"));

/// Memoized reference -> unit resolutions
///
/// Successful resolutions survive across builds and are re-checked against
/// the graph they are used with. Not designed for concurrent mutation.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    resolved: HashMap<String, UnitId>,
}

impl ResolutionCache {
    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }

    pub fn clear(&mut self) {
        self.resolved.clear();
    }
}

/// Build the dependency graph from extracted units
#[derive(Debug, Default)]
pub struct GraphBuilder {
    cache: ResolutionCache,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    /// Forget every memoized resolution
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Build a graph: one node per unit, edges from declared relations and name mentions
    pub fn build(&mut self, units: &[Arc<SemanticUnit>]) -> Result<DependencyGraph> {
        let mut graph = DependencyGraph::new();

        // Phase 1: one node per unit
        let mut nodes = Vec::with_capacity(units.len());
        for unit in units {
            nodes.push(graph.add_unit(Arc::clone(unit))?);
        }

        // Phase 2: declared relations
        let mut unresolved_this_run: HashSet<String> = HashSet::new();
        let mut unresolved = 0usize;
        let mut contributions: Vec<(NodeIndex, f64)> = Vec::new();

        for (&from, unit) in nodes.iter().zip(units) {
            for (kind, reference) in unit.relations.iter() {
                let Some(contribution) = relation_contribution(kind) else {
                    continue;
                };

                match self.resolve(&graph, reference, &mut unresolved_this_run) {
                    Some(to) if to != from => {
                        graph.add_edge(from, to, EdgeKind::Declared(kind));
                        contributions.push((from, contribution));
                        contributions.push((to, contribution));
                    }
                    Some(_) => {}
                    None => {
                        unresolved += 1;
                        log::debug!("Unresolved {kind} reference '{reference}' from {}", unit.id);
                    }
                }
            }
        }

        for (idx, contribution) in contributions {
            if let Some(node) = graph.node_mut(idx) {
                node.relation_weight += contribution;
            }
        }

        if unresolved > 0 {
            log::warn!("{unresolved} relation references could not be resolved; no edges created for them");
        }
        graph.record_unresolved(unresolved);

        // Phase 3: content mentions of structural unit names
        for (&from, unit) in nodes.iter().zip(units) {
            let mut seen: HashSet<&str> = HashSet::new();
            for token in IDENTIFIER.find_iter(&unit.content) {
                let token = token.as_str();
                if !seen.insert(token) {
                    continue;
                }
                let targets = graph.named(token).to_vec();
                for to in targets {
                    graph.add_edge(from, to, EdgeKind::Mention);
                }
            }
        }

        log::info!(
            "Built dependency graph: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );

        Ok(graph)
    }

    /// Resolve a referenced name to a node
    ///
    /// Exact short-name hit first, else the first structural unit whose name
    /// contains the short name.
    fn resolve(
        &mut self,
        graph: &DependencyGraph,
        reference: &str,
        unresolved_this_run: &mut HashSet<String>,
    ) -> Option<NodeIndex> {
        if let Some(idx) = self.cache.resolved.get(reference).and_then(|id| graph.find(id)) {
            return Some(idx);
        }
        if unresolved_this_run.contains(reference) {
            return None;
        }

        let short = short_name(reference);
        let found = if short.is_empty() {
            None
        } else {
            graph.named(short).first().copied().or_else(|| {
                graph.nodes().find_map(|(idx, node)| {
                    let is_match = node.unit.is_structural()
                        && node
                            .unit
                            .name
                            .as_deref()
                            .is_some_and(|name| name.contains(short));
                    is_match.then_some(idx)
                })
            })
        };

        match found.and_then(|idx| graph.node(idx).map(|node| (idx, node.unit.id.clone()))) {
            Some((idx, id)) => {
                self.cache.resolved.insert(reference.to_string(), id);
                Some(idx)
            }
            None => {
                unresolved_this_run.insert(reference.to_string());
                None
            }
        }
    }
}

/// Weight added to both endpoints of a resolved relation; `None` for kinds that never link
pub fn relation_contribution(kind: RelationKind) -> Option<f64> {
    match kind {
        RelationKind::Extends => Some(2.0),
        RelationKind::Implements => Some(1.5),
        RelationKind::Imports => Some(1.0),
        RelationKind::Namespace => None,
    }
}

/// Last path segment of a reference, without generic arguments
///
/// `App\Models\User` -> `User`, `crate::a::Foo<T>` -> `Foo`, `./car` -> `car`
pub fn short_name(reference: &str) -> &str {
    let cut = reference.find('<').unwrap_or(reference.len());
    let path = reference[..cut].trim();
    let start = ["\\", "::", ".", "/"]
        .iter()
        .filter_map(|sep| path.rfind(sep).map(|pos| pos + sep.len()))
        .max()
        .unwrap_or(0);
    path[start..].trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::tests::unit;
    use codebundle_units::{RelationMap, UnitKind};
    use pretty_assertions::assert_eq;

    fn with_relations(
        unit: Arc<SemanticUnit>,
        relations: &[(RelationKind, &str)],
    ) -> Arc<SemanticUnit> {
        let mut map = RelationMap::new();
        for (kind, name) in relations {
            map.push(*kind, *name);
        }
        let mut unit = (*unit).clone();
        unit.relations = map;
        Arc::new(unit)
    }

    #[test]
    fn test_short_name() {
        assert_eq!(short_name("App\\Models\\User"), "User");
        assert_eq!(short_name("crate::model::Car<T>"), "Car");
        assert_eq!(short_name("./car"), "car");
        assert_eq!(short_name("com.example.Greeter"), "Greeter");
        assert_eq!(short_name("Plain"), "Plain");
        assert_eq!(short_name(""), "");
    }

    #[test]
    fn test_extends_creates_edge_and_contributes_weight() {
        let foo = unit("A.java", UnitKind::Class, "Foo", "class Foo {}");
        let bar = with_relations(
            unit("B.java", UnitKind::Class, "Bar", "class Bar extends Foo {}"),
            &[(RelationKind::Extends, "Foo")],
        );

        let mut builder = GraphBuilder::new();
        let graph = builder.build(&[foo.clone(), bar.clone()]).unwrap();

        let foo_idx = graph.find(&foo.id).unwrap();
        let bar_idx = graph.find(&bar.id).unwrap();
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.dependencies(bar_idx), vec![foo_idx]);
        assert_eq!(
            graph.edge(bar_idx, foo_idx).map(|e| e.kind),
            Some(EdgeKind::Declared(RelationKind::Extends))
        );
        assert_eq!(graph.node(foo_idx).unwrap().relation_weight, 2.0);
        assert_eq!(graph.node(bar_idx).unwrap().relation_weight, 2.0);
    }

    #[test]
    fn test_substring_fallback_and_namespace_ignored() {
        let repo = unit("repo.php", UnitKind::Class, "UserRepository", "class UserRepository {}");
        let service = with_relations(
            unit("svc.php", UnitKind::Class, "Service", "class Service {}"),
            &[
                (RelationKind::Imports, "App\\Repository"),
                (RelationKind::Namespace, "App"),
                (RelationKind::Implements, "Missing"),
            ],
        );

        let mut builder = GraphBuilder::new();
        let graph = builder.build(&[repo.clone(), service.clone()]).unwrap();

        let repo_idx = graph.find(&repo.id).unwrap();
        let service_idx = graph.find(&service.id).unwrap();
        assert_eq!(graph.dependencies(service_idx), vec![repo_idx]);
        assert_eq!(graph.node(service_idx).unwrap().relation_weight, 1.0);
        assert_eq!(graph.stats().unresolved_references, 1);
    }

    #[test]
    fn test_mentions_link_whole_word_tokens_only() {
        let engine = unit("engine.rs", UnitKind::Class, "Engine", "struct Engine;");
        let car = unit("car.rs", UnitKind::Function, "build", "fn build() -> Engine { Engine }");
        let other = unit("misc.rs", UnitKind::Function, "misc", "fn misc() { let EngineRoom = 1; }");

        let mut builder = GraphBuilder::new();
        let graph = builder
            .build(&[engine.clone(), car.clone(), other.clone()])
            .unwrap();

        let engine_idx = graph.find(&engine.id).unwrap();
        let car_idx = graph.find(&car.id).unwrap();
        let other_idx = graph.find(&other.id).unwrap();

        assert_eq!(graph.dependents(engine_idx), vec![car_idx]);
        assert!(graph.dependencies(other_idx).is_empty());
        // Mentions add connectivity only
        assert_eq!(graph.node(engine_idx).unwrap().relation_weight, 0.0);
        // The unit naming itself does not loop
        assert!(graph.dependencies(engine_idx).is_empty());
    }

    #[test]
    fn test_mentions_of_non_ascii_names_match_the_whole_word() {
        let size = unit("a.py", UnitKind::Class, "Größe", "class Größe:\n    pass\n");
        let prefix = unit("b.py", UnitKind::Class, "Gr", "class Gr:\n    pass\n");
        let caller = unit("c.py", UnitKind::Function, "use_it", "def use_it():\n    return Größe()\n");

        let mut builder = GraphBuilder::new();
        let graph = builder
            .build(&[size.clone(), prefix.clone(), caller.clone()])
            .unwrap();

        let caller_idx = graph.find(&caller.id).unwrap();
        let size_idx = graph.find(&size.id).unwrap();
        assert_eq!(graph.dependencies(caller_idx), vec![size_idx]);
        assert!(graph.dependents(graph.find(&prefix.id).unwrap()).is_empty());
    }

    #[test]
    fn test_mentions_keep_dollar_in_script_names() {
        let jquery = unit("dom.js", UnitKind::Function, "$query", "function $query() {}");
        let query = unit("q.js", UnitKind::Function, "query", "function query() {}");
        let caller = unit("app.js", UnitKind::Function, "boot", "function boot() { $query('#app'); }");

        let mut builder = GraphBuilder::new();
        let graph = builder
            .build(&[jquery.clone(), query.clone(), caller.clone()])
            .unwrap();

        let caller_idx = graph.find(&caller.id).unwrap();
        assert_eq!(
            graph.dependencies(caller_idx),
            vec![graph.find(&jquery.id).unwrap()]
        );
    }

    #[test]
    fn test_cache_survives_runs_until_cleared() {
        let foo = unit("A.java", UnitKind::Class, "Foo", "class Foo {}");
        let bar = with_relations(
            unit("B.java", UnitKind::Class, "Bar", "class Bar {}"),
            &[(RelationKind::Extends, "Foo")],
        );

        let mut builder = GraphBuilder::new();
        builder.build(&[foo.clone(), bar.clone()]).unwrap();
        assert_eq!(builder.cache().len(), 1);

        // A stale entry is re-validated against the new graph
        let graph = builder.build(&[bar.clone()]).unwrap();
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.stats().unresolved_references, 1);

        builder.clear_cache();
        assert!(builder.cache().is_empty());
    }
}
