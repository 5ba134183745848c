use crate::chunk::Chunk;
use codebundle_graph::UnitGroup;

/// Greedy largest-first packing of groups into chunks
///
/// A chunk is sealed when the next group would push it past the target. A
/// group larger than the target is never re-split, so a chunk can exceed the
/// target by at most one group.
#[derive(Debug, Clone)]
pub struct ChunkPacker {
    target_tokens: usize,
}

impl ChunkPacker {
    pub fn new(target_tokens: usize) -> Self {
        Self { target_tokens }
    }

    pub fn pack(&self, mut groups: Vec<UnitGroup>) -> Vec<Chunk> {
        // Stable, so equal sizes keep assembly order
        groups.sort_by(|a, b| b.total_tokens.cmp(&a.total_tokens));

        let mut chunks = Vec::new();
        let mut current: Vec<UnitGroup> = Vec::new();
        let mut current_tokens = 0usize;

        for group in groups {
            if !current.is_empty() && current_tokens + group.total_tokens > self.target_tokens {
                chunks.push(Chunk::from_groups(chunks.len(), &current));
                current.clear();
                current_tokens = 0;
            }
            current_tokens += group.total_tokens;
            current.push(group);
        }

        if !current.is_empty() {
            chunks.push(Chunk::from_groups(chunks.len(), &current));
        }

        for chunk in &chunks {
            if chunk.token_estimate > self.target_tokens {
                log::debug!(
                    "Chunk {} holds {} tokens, over the {} target by one group",
                    chunk.index,
                    chunk.token_estimate,
                    self.target_tokens
                );
            }
        }

        chunks
    }
}
