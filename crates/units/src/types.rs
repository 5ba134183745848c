use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Structural category of a semantic unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Class,
    Interface,
    Trait,
    Function,
    Method,
    Impl,
    Enum,
    Module,
    Import,
    /// Whole file, produced when no structure was recognized
    File,
    Other,
}

impl UnitKind {
    /// Structural units carry declared relations and can be referenced by name
    #[must_use]
    pub const fn is_structural(self) -> bool {
        matches!(
            self,
            Self::Class
                | Self::Interface
                | Self::Trait
                | Self::Function
                | Self::Method
                | Self::Impl
                | Self::Enum
        )
    }

    /// Get machine-readable name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Trait => "trait",
            Self::Function => "function",
            Self::Method => "method",
            Self::Impl => "impl",
            Self::Enum => "enum",
            Self::Module => "module",
            Self::Import => "import",
            Self::File => "file",
            Self::Other => "other",
        }
    }

    /// Get human-readable label, used in group names
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Class => "Class",
            Self::Interface => "Interface",
            Self::Trait => "Trait",
            Self::Function => "Function",
            Self::Method => "Method",
            Self::Impl => "Impl",
            Self::Enum => "Enum",
            Self::Module => "Module",
            Self::Import => "Import",
            Self::File => "File",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of a declared relation found in a unit's source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    Imports,
    Extends,
    Implements,
    Namespace,
}

impl RelationKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Imports => "imports",
            Self::Extends => "extends",
            Self::Implements => "implements",
            Self::Namespace => "namespace",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Referenced symbol names grouped by relation kind
///
/// Names are kept in first-seen order and deduplicated per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationMap(BTreeMap<RelationKind, Vec<String>>);

impl RelationMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a reference, ignoring blanks and duplicates
    pub fn push(&mut self, kind: RelationKind, reference: impl Into<String>) {
        let reference = reference.into();
        let reference = reference.trim();
        if reference.is_empty() {
            return;
        }
        let names = self.0.entry(kind).or_default();
        if !names.iter().any(|existing| existing == reference) {
            names.push(reference.to_string());
        }
    }

    #[must_use]
    pub fn get(&self, kind: RelationKind) -> &[String] {
        self.0.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (RelationKind, &str)> {
        self.0
            .iter()
            .flat_map(|(kind, names)| names.iter().map(move |name| (*kind, name.as_str())))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }

    /// Total number of references across all kinds
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }
}

/// One structural match reported by a language analyzer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitMatch {
    /// Byte offset where the unit begins
    pub offset: usize,
    pub kind: UnitKind,
    /// Declared name, if the construct has one
    pub name: Option<String>,
    /// Enclosing type for members (impl target, class name)
    pub scope: Option<String>,
}

impl UnitMatch {
    #[must_use]
    pub fn new(offset: usize, kind: UnitKind, name: Option<String>) -> Self {
        Self {
            offset,
            kind,
            name,
            scope: None,
        }
    }

    #[must_use]
    pub fn with_scope(mut self, scope: Option<String>) -> Self {
        self.scope = scope;
        self
    }
}

/// Deterministic key of a unit: `relative_path::kind::qualified_name`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(String);

impl UnitId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A contiguous span of one file recognized as a structural element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticUnit {
    pub id: UnitId,

    /// Path as discovered on disk
    pub source_file: PathBuf,

    /// Path relative to the codebase root, `/`-separated
    pub relative_path: String,

    pub kind: UnitKind,

    /// Short declared name (e.g. `drive`, not `Car::drive`)
    pub name: Option<String>,

    /// Enclosing type for members
    pub scope: Option<String>,

    /// Raw source text of the span
    pub content: String,

    /// Byte offset of the span within the file
    pub byte_offset: usize,

    pub byte_size: usize,

    pub token_estimate: usize,

    pub relations: RelationMap,
}

impl SemanticUnit {
    /// Name qualified by its scope, `Scope::name`
    #[must_use]
    pub fn qualified_name(&self) -> Option<String> {
        match (&self.scope, &self.name) {
            (Some(scope), Some(name)) => Some(format!("{scope}::{name}")),
            (None, Some(name)) => Some(name.clone()),
            _ => None,
        }
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<anonymous>")
    }

    #[must_use]
    pub const fn is_structural(&self) -> bool {
        self.kind.is_structural()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relation_map_dedups_per_kind() {
        let mut relations = RelationMap::new();
        relations.push(RelationKind::Imports, "Foo");
        relations.push(RelationKind::Imports, " Foo ");
        relations.push(RelationKind::Extends, "Foo");
        relations.push(RelationKind::Implements, "   ");

        assert_eq!(relations.get(RelationKind::Imports), &["Foo".to_string()]);
        assert_eq!(relations.len(), 2);
        assert!(relations.get(RelationKind::Implements).is_empty());
    }

    #[test]
    fn relation_map_iterates_in_kind_order() {
        let mut relations = RelationMap::new();
        relations.push(RelationKind::Implements, "Shape");
        relations.push(RelationKind::Imports, "Point");

        let collected: Vec<_> = relations.iter().collect();
        assert_eq!(
            collected,
            vec![
                (RelationKind::Imports, "Point"),
                (RelationKind::Implements, "Shape")
            ]
        );
    }

    #[test]
    fn structural_kinds() {
        assert!(UnitKind::Class.is_structural());
        assert!(UnitKind::Method.is_structural());
        assert!(!UnitKind::Import.is_structural());
        assert!(!UnitKind::File.is_structural());
        assert!(!UnitKind::Other.is_structural());
    }
}
