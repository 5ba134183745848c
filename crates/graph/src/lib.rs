//! # Codebundle Graph
//!
//! Dependency analysis over semantic units and clustering into groups.
//!
//! ## Architecture
//!
//! ```text
//! SemanticUnit[]
//!     │
//!     ├──> Graph Builder
//!     │      ├─ One node per unit, keyed by unit id
//!     │      ├─ Declared relations → short-name index lookup (memoized)
//!     │      └─ Name mentions → connectivity-only edges
//!     │
//!     ├──> Node Weigher: base(kind) + 2×dependents + dependencies
//!     │
//!     └──> Group Assembler
//!            ├─ Roots by descending weight
//!            ├─ Depth-bounded traversal, global dedup
//!            └─ Leftover units grouped per file
//! ```

mod assembler;
mod builder;
mod error;
mod graph;
mod group;
mod types;
mod weigher;

pub use assembler::{select_roots, GroupAssembler, DEFAULT_MAX_DEPTH};
pub use builder::{relation_contribution, short_name, GraphBuilder, ResolutionCache};
pub use error::{GraphError, Result};
pub use graph::DependencyGraph;
pub use group::UnitGroup;
pub use types::{EdgeKind, GraphEdge, GraphNode, GraphStats};
pub use weigher::{assign_weights, base_weight};
