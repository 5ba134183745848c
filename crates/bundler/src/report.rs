use crate::chunk::Chunk;
use codebundle_graph::GraphStats;
use serde::{Deserialize, Serialize};

/// A file that could not be turned into units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedFile {
    pub path: String,
    pub reason: String,
}

/// What happened during one chunking run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingReport {
    pub language: String,
    pub files_discovered: usize,
    pub files_read: usize,
    pub failed_files: Vec<FailedFile>,
    pub units: usize,
    pub graph: GraphStats,
    pub groups: usize,
    pub optimized_groups: usize,
    pub chunks: usize,
    pub total_tokens: usize,
}

impl ChunkingReport {
    /// True when the run had nothing to chunk
    pub fn is_empty(&self) -> bool {
        self.units == 0
    }
}

/// Chunks plus the report of the run that produced them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingOutcome {
    pub chunks: Vec<Chunk>,
    pub report: ChunkingReport,
}
