//! # Codebundle Units
//!
//! Turns source files into ordered semantic units: contiguous spans that each
//! hold one structural element (class, trait, function, method, import, ...).
//!
//! ## Architecture
//!
//! ```text
//! File content
//!     │
//!     ├──> Language analyzer (resolved once from configuration)
//!     │      ├─ Tree-sitter grammars: Rust, Python, TypeScript, JavaScript
//!     │      └─ Line-anchored regexes: generic brace languages
//!     │
//!     ├──> Unit Extractor
//!     │      ├─ Sort matches by byte offset
//!     │      ├─ Span = [offset, next offset) or end of file
//!     │      ├─ No matches → one whole-file unit
//!     │      └─ Declared relations for structural units only
//!     │
//!     └──> SemanticUnit[] with ids and token estimates
//! ```
//!
//! ## Example
//!
//! ```rust
//! use codebundle_units::{Language, UnitExtractor, UnitKind};
//! use std::path::Path;
//!
//! let analyzer = Language::Rust.analyzer();
//! let mut extractor = UnitExtractor::new(analyzer.as_ref());
//!
//! let code = "struct Car;\n\nimpl Car {\n    fn drive(&self) {}\n}\n";
//! let units = extractor.extract(Path::new("src/car.rs"), "src/car.rs", code).unwrap();
//!
//! assert_eq!(units[0].kind, UnitKind::Class);
//! assert!(units.iter().any(|u| u.kind == UnitKind::Method));
//! ```

mod ast_analyzer;
mod error;
mod extractor;
mod generic;
mod language;
mod relations;
mod tokens;
mod types;

pub use ast_analyzer::AstAnalyzer;
pub use error::{Result, UnitsError};
pub use extractor::UnitExtractor;
pub use generic::GenericAnalyzer;
pub use language::{Language, LanguageAnalyzer};
pub use tokens::estimate_tokens;
pub use types::{RelationKind, RelationMap, SemanticUnit, UnitId, UnitKind, UnitMatch};
