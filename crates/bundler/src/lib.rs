//! # Codebundle Bundler
//!
//! Turns a codebase into dependency-coherent, token-bounded chunks.
//!
//! ## Architecture
//!
//! ```text
//! Codebase root
//!     │
//!     ├──> File Discovery (.gitignore aware, include/exclude globs)
//!     │
//!     ├──> Unit Extractor (per file, failures recorded and skipped)
//!     │
//!     ├──> Graph Builder + Node Weigher + Group Assembler
//!     │
//!     ├──> Group Size Optimizer
//!     │      ├─ Split oversized groups by file
//!     │      └─ Cut remaining overflow into half-ceiling pieces
//!     │
//!     └──> Chunk Packer: largest group first, greedy fill
//! ```
//!
//! ## Usage
//!
//! ```no_run
//! use codebundle_bundler::{ChunkingConfig, SemanticChunker};
//! use codebundle_units::Language;
//!
//! # fn main() -> codebundle_bundler::Result<()> {
//! let mut chunker = SemanticChunker::new(ChunkingConfig::for_language(Language::Rust))?;
//! for chunk in chunker.create_semantic_chunks("path/to/project", 8000)? {
//!     println!("chunk {}: {} tokens, {} files", chunk.index, chunk.token_estimate, chunk.file_count);
//! }
//! # Ok(())
//! # }
//! ```

mod chunk;
mod config;
mod discovery;
mod error;
mod optimizer;
mod packer;
mod pipeline;
mod report;

pub use chunk::{checksum, Chunk};
pub use config::{split_patterns, ChunkingConfig, DEFAULT_MAX_FILE_BYTES, DEFAULT_MAX_GROUP_TOKENS};
pub use discovery::{build_glob_set, relative_path, FileDiscovery, WalkDiscovery};
pub use error::{BundleError, Result};
pub use optimizer::GroupSizeOptimizer;
pub use packer::ChunkPacker;
pub use pipeline::SemanticChunker;
pub use report::{ChunkingOutcome, ChunkingReport, FailedFile};
