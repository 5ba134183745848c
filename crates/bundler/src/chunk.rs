use codebundle_graph::UnitGroup;
use codebundle_units::{SemanticUnit, UnitId};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A finalized, token-bounded bundle of groups
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Position in the output, starting at 0
    pub index: usize,

    /// Rendered units, grouped under per-file headers
    pub content: String,

    /// Relative paths of the files present, sorted and deduplicated
    pub files: Vec<String>,

    /// Units in rendered order
    pub unit_ids: Vec<UnitId>,

    /// Names of the groups packed into this chunk
    pub group_names: Vec<String>,

    pub token_estimate: usize,
    pub unit_count: usize,
    pub file_count: usize,

    /// Lowercase hex SHA-256 of `content`
    pub checksum: String,
}

impl Chunk {
    /// Render and seal a set of groups
    pub fn from_groups(index: usize, groups: &[UnitGroup]) -> Self {
        let mut by_file: BTreeMap<&str, Vec<&Arc<SemanticUnit>>> = BTreeMap::new();
        for unit in groups.iter().flat_map(|g| &g.units) {
            by_file.entry(unit.relative_path.as_str()).or_default().push(unit);
        }

        let mut content = String::new();
        let mut unit_ids = Vec::new();
        let mut token_estimate = 0;

        for (idx, (path, units)) in by_file.iter_mut().enumerate() {
            // Stable: equal offsets keep insertion order
            units.sort_by_key(|u| u.byte_offset);

            if idx > 0 {
                content.push('\n');
            }
            content.push_str(&format!("=== File: {path} ===\n"));
            for unit in units.iter() {
                content.push_str(&unit.content);
                if !unit.content.ends_with('\n') {
                    content.push('\n');
                }
                unit_ids.push(unit.id.clone());
                token_estimate += unit.token_estimate;
            }
        }

        let files: Vec<String> = by_file.keys().map(|path| path.to_string()).collect();

        Self {
            index,
            checksum: checksum(&content),
            unit_count: unit_ids.len(),
            file_count: files.len(),
            content,
            files,
            unit_ids,
            group_names: groups.iter().map(|g| g.name.clone()).collect(),
            token_estimate,
        }
    }
}

/// Lowercase hex SHA-256 digest
pub fn checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}
