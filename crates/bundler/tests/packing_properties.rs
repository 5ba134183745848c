use codebundle_bundler::{ChunkPacker, GroupSizeOptimizer};
use codebundle_graph::UnitGroup;
use codebundle_units::{RelationMap, SemanticUnit, UnitId, UnitKind};
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

fn unit(group: usize, idx: usize, file: usize, tokens: usize) -> Arc<SemanticUnit> {
    let relative_path = format!("src/f{file}.php");
    let name = format!("g{group}u{idx}");
    Arc::new(SemanticUnit {
        id: UnitId::new(format!("{relative_path}::function::{name}")),
        source_file: PathBuf::from(&relative_path),
        relative_path,
        kind: UnitKind::Function,
        name: Some(name),
        scope: None,
        content: format!("function g{group}u{idx}() {{}}\n"),
        byte_offset: idx * 64,
        byte_size: 64,
        token_estimate: tokens,
        relations: RelationMap::new(),
    })
}

/// Groups of (file, tokens) units
fn groups_strategy() -> impl Strategy<Value = Vec<Vec<(usize, usize)>>> {
    prop::collection::vec(
        prop::collection::vec((0usize..4, 1usize..1500), 1..12),
        0..10,
    )
}

fn build(layout: &[Vec<(usize, usize)>]) -> Vec<UnitGroup> {
    layout.iter()
        .enumerate()
        .map(|(g, units)| {
            UnitGroup::from_units(
                format!("Class: G{g} (src/f0.php)"),
                units
                    .iter()
                    .enumerate()
                    .map(|(i, (file, tokens))| unit(g, i, *file, *tokens)),
            )
        })
        .collect()
}

proptest! {
    #[test]
    fn optimizer_keeps_every_unit_and_bounds_multi_unit_groups(
        layout in groups_strategy(),
        ceiling in 1usize..6000,
    ) {
        let groups = build(&layout);
        let expected: BTreeSet<UnitId> = groups
            .iter()
            .flat_map(|g| g.units.iter().map(|u| u.id.clone()))
            .collect();

        let optimized = GroupSizeOptimizer::new(ceiling).optimize(groups);

        let ids: Vec<UnitId> = optimized
            .iter()
            .flat_map(|g| g.units.iter().map(|u| u.id.clone()))
            .collect();
        prop_assert_eq!(ids.len(), expected.len());
        prop_assert_eq!(ids.into_iter().collect::<BTreeSet<_>>(), expected);

        for group in &optimized {
            prop_assert!(!group.is_empty());
            if group.len() > 1 {
                prop_assert!(group.total_tokens <= ceiling, "{} > {}", group.total_tokens, ceiling);
            }
        }
    }

    #[test]
    fn packer_only_overshoots_with_a_lone_group(
        layout in groups_strategy(),
        target in 1usize..8000,
    ) {
        let groups = build(&layout);
        let sizes: Vec<usize> = groups.iter().map(|g| g.total_tokens).collect();
        let largest = sizes.iter().copied().max().unwrap_or(0);
        let total: usize = sizes.iter().sum();

        let chunks = ChunkPacker::new(target).pack(groups);

        prop_assert_eq!(chunks.iter().map(|c| c.token_estimate).sum::<usize>(), total);
        prop_assert_eq!(
            chunks.iter().map(|c| c.group_names.len()).sum::<usize>(),
            layout.len()
        );
        for (i, chunk) in chunks.iter().enumerate() {
            prop_assert_eq!(chunk.index, i);
            if chunk.group_names.len() > 1 {
                prop_assert!(chunk.token_estimate <= target);
            } else {
                prop_assert!(chunk.token_estimate <= largest);
            }
        }
    }
}
