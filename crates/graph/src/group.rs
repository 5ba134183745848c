use codebundle_units::SemanticUnit;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;

/// A cluster of units destined to be rendered together
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UnitGroup {
    pub name: String,
    pub units: Vec<Arc<SemanticUnit>>,
    /// Relative paths of the files the units come from
    pub files: BTreeSet<String>,
    pub total_size: usize,
    pub total_tokens: usize,
}

impl UnitGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn from_units(
        name: impl Into<String>,
        units: impl IntoIterator<Item = Arc<SemanticUnit>>,
    ) -> Self {
        let mut group = Self::new(name);
        for unit in units {
            group.push(unit);
        }
        group
    }

    pub fn push(&mut self, unit: Arc<SemanticUnit>) {
        self.files.insert(unit.relative_path.clone());
        self.total_size += unit.byte_size;
        self.total_tokens += unit.token_estimate;
        self.units.push(unit);
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
