use crate::ast_analyzer::AstAnalyzer;
use crate::error::Result;
use crate::generic::GenericAnalyzer;
use crate::types::{RelationMap, UnitMatch};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Per-language capabilities needed to cut a file into units
pub trait LanguageAnalyzer: Send + Sync {
    /// Language variant this analyzer serves
    fn language(&self) -> Language;

    /// Constructs recognized as unit boundaries (node kinds or regex sources)
    fn structural_patterns(&self) -> &'static [&'static str];

    /// Glob patterns excluded from discovery unless disabled in config
    fn default_excludes(&self) -> &'static [&'static str] {
        self.language().default_excludes()
    }

    /// File extensions included when no include pattern is configured
    fn default_extensions(&self) -> &'static [&'static str] {
        self.language().default_extensions()
    }

    /// Line prefixes that mark a comment line for token estimation
    fn comment_prefixes(&self) -> &'static [&'static str] {
        self.language().comment_prefixes()
    }

    /// Structural matches in `content`, in any order
    fn identify_units(&self, path: &Path, content: &str) -> Result<Vec<UnitMatch>>;

    /// Declared relations found in a unit's text
    fn extract_dependencies(&self, content: &str) -> RelationMap;
}

/// Supported codebase language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Rust,
    Python,
    TypeScript,
    JavaScript,
    /// Regex-driven fallback for brace languages (PHP, Java, C#, Kotlin, ...)
    Generic,
}

impl Language {
    /// Resolve a configured language name
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "rust" | "rs" => Some(Self::Rust),
            "python" | "py" => Some(Self::Python),
            "typescript" | "ts" | "tsx" => Some(Self::TypeScript),
            "javascript" | "js" | "jsx" | "node" => Some(Self::JavaScript),
            "generic" | "default" | "php" | "java" | "csharp" | "cs" | "kotlin" | "kt" => {
                Some(Self::Generic)
            }
            _ => None,
        }
    }

    /// Resolve a configured language name, falling back to [`Language::Generic`]
    pub fn from_config(name: &str) -> Self {
        Self::from_name(name).unwrap_or_else(|| {
            log::warn!("Unrecognized codebase language '{name}', using generic analyzer");
            Self::Generic
        })
    }

    /// Get language name as string
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rust => "rust",
            Self::Python => "python",
            Self::TypeScript => "typescript",
            Self::JavaScript => "javascript",
            Self::Generic => "generic",
        }
    }

    /// Check if this language is analyzed with a tree-sitter grammar
    pub fn supports_ast(self) -> bool {
        !matches!(self, Self::Generic)
    }

    /// Build the analyzer for this variant
    pub fn analyzer(self) -> Box<dyn LanguageAnalyzer> {
        if self.supports_ast() {
            Box::new(AstAnalyzer::new(self))
        } else {
            Box::new(GenericAnalyzer::new())
        }
    }

    pub fn default_extensions(self) -> &'static [&'static str] {
        match self {
            Self::Rust => &["rs"],
            Self::Python => &["py", "pyi"],
            Self::TypeScript => &["ts", "tsx", "mts", "cts"],
            Self::JavaScript => &["js", "jsx", "mjs", "cjs"],
            Self::Generic => &["php", "java", "cs", "kt", "kts", "scala", "swift", "groovy"],
        }
    }

    pub fn default_excludes(self) -> &'static [&'static str] {
        match self {
            Self::Rust => &["**/target/**", "**/.git/**"],
            Self::Python => &[
                "**/__pycache__/**",
                "**/.venv/**",
                "**/venv/**",
                "**/.tox/**",
                "**/.git/**",
            ],
            Self::TypeScript | Self::JavaScript => &[
                "**/node_modules/**",
                "**/dist/**",
                "**/build/**",
                "**/coverage/**",
                "**/*.min.js",
                "**/.git/**",
            ],
            Self::Generic => &[
                "**/vendor/**",
                "**/build/**",
                "**/bin/**",
                "**/obj/**",
                "**/.gradle/**",
                "**/.git/**",
            ],
        }
    }

    /// Get typical comment prefixes for this language
    pub fn comment_prefixes(self) -> &'static [&'static str] {
        match self {
            Self::Rust | Self::TypeScript | Self::JavaScript => &["//", "/*", "* ", "*/"],
            Self::Python => &["#", "\"\"\"", "'''"],
            Self::Generic => &["//", "/*", "* ", "*/", "#"],
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(Language::from_name("rust"), Some(Language::Rust));
        assert_eq!(Language::from_name("RS"), Some(Language::Rust));
        assert_eq!(Language::from_name("py"), Some(Language::Python));
        assert_eq!(Language::from_name(" TypeScript "), Some(Language::TypeScript));
        assert_eq!(Language::from_name("php"), Some(Language::Generic));
        assert_eq!(Language::from_name("cobol"), None);
    }

    #[test]
    fn test_unknown_language_falls_back_to_generic() {
        assert_eq!(Language::from_config("cobol"), Language::Generic);
        assert_eq!(Language::from_config(""), Language::Generic);
    }

    #[test]
    fn test_analyzer_reports_its_language() {
        for language in [
            Language::Rust,
            Language::Python,
            Language::TypeScript,
            Language::JavaScript,
            Language::Generic,
        ] {
            let analyzer = language.analyzer();
            assert_eq!(analyzer.language(), language);
            assert!(!analyzer.structural_patterns().is_empty());
            assert!(!analyzer.default_extensions().is_empty());
            assert!(!analyzer.default_excludes().is_empty());
        }
    }

    #[test]
    fn test_comment_prefixes() {
        assert!(Language::Rust.comment_prefixes().contains(&"//"));
        assert!(Language::Python.comment_prefixes().contains(&"#"));
    }

    #[test]
    fn test_dereference_is_costed_as_code() {
        let prefixes = Language::Rust.comment_prefixes();
        // 16 chars: code -> ceil(16/4) = 4, comment would be ceil(16/6) = 3
        assert_eq!(crate::estimate_tokens("*slot = value;  ", prefixes), 4);
        // " * continued doc" is 16 chars of block comment -> 3
        assert_eq!(crate::estimate_tokens(" * continued doc", prefixes), 3);
        assert_eq!(crate::estimate_tokens(" */", prefixes), 1);
    }
}
