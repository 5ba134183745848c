use codebundle_graph::UnitGroup;
use codebundle_units::SemanticUnit;
use std::sync::Arc;

/// Splits groups that exceed the token ceiling
///
/// First by file, then per-file pieces still above the ceiling are cut, in
/// unit order, into sequential pieces of at most half the ceiling. A single
/// unit larger than that becomes a piece on its own.
#[derive(Debug, Clone)]
pub struct GroupSizeOptimizer {
    max_group_tokens: usize,
}

impl GroupSizeOptimizer {
    pub fn new(max_group_tokens: usize) -> Self {
        Self {
            max_group_tokens: max_group_tokens.max(1),
        }
    }

    pub fn optimize(&self, groups: Vec<UnitGroup>) -> Vec<UnitGroup> {
        let before = groups.len();
        let mut optimized = Vec::with_capacity(before);

        for group in groups {
            if group.total_tokens <= self.max_group_tokens {
                optimized.push(group);
            } else {
                log::debug!(
                    "Splitting group '{}' ({} tokens > {})",
                    group.name,
                    group.total_tokens,
                    self.max_group_tokens
                );
                optimized.extend(self.split(group));
            }
        }

        if optimized.len() != before {
            log::info!("Group size optimization: {before} -> {} groups", optimized.len());
        }
        optimized
    }

    fn split(&self, group: UnitGroup) -> Vec<UnitGroup> {
        let by_file = split_by_file(&group.units);
        let single_file = by_file.len() == 1;

        let mut pieces = Vec::new();
        for (file, units) in by_file {
            let name = if single_file {
                group.name.clone()
            } else {
                format!("{} / {file}", group.name)
            };
            let sub_group = UnitGroup::from_units(name, units);

            if sub_group.total_tokens <= self.max_group_tokens {
                pieces.push(sub_group);
            } else {
                pieces.extend(self.split_sequential(sub_group));
            }
        }
        pieces
    }

    fn split_sequential(&self, group: UnitGroup) -> Vec<UnitGroup> {
        let limit = (self.max_group_tokens / 2).max(1);
        let mut pieces = Vec::new();
        let mut current: Vec<Arc<SemanticUnit>> = Vec::new();
        let mut current_tokens = 0usize;

        for unit in group.units {
            if !current.is_empty() && current_tokens + unit.token_estimate > limit {
                let part = pieces.len() + 1;
                pieces.push(UnitGroup::from_units(
                    format!("{} (part {part})", group.name),
                    std::mem::take(&mut current),
                ));
                current_tokens = 0;
            }
            current_tokens += unit.token_estimate;
            current.push(unit);
        }

        if !current.is_empty() {
            let part = pieces.len() + 1;
            pieces.push(UnitGroup::from_units(
                format!("{} (part {part})", group.name),
                current,
            ));
        }
        pieces
    }
}

/// Units bucketed by file, files in first-appearance order
fn split_by_file(units: &[Arc<SemanticUnit>]) -> Vec<(String, Vec<Arc<SemanticUnit>>)> {
    let mut buckets: Vec<(String, Vec<Arc<SemanticUnit>>)> = Vec::new();
    for unit in units {
        match buckets.iter_mut().find(|(file, _)| *file == unit.relative_path) {
            Some((_, bucket)) => bucket.push(Arc::clone(unit)),
            None => buckets.push((unit.relative_path.clone(), vec![Arc::clone(unit)])),
        }
    }
    buckets
}
