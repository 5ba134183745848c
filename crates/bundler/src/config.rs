use crate::error::{BundleError, Result};
use codebundle_graph::DEFAULT_MAX_DEPTH;
use codebundle_units::{Language, LanguageAnalyzer};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

/// Default token ceiling for a single group
pub const DEFAULT_MAX_GROUP_TOKENS: usize = 5000;

/// Files above this size are skipped during discovery
pub const DEFAULT_MAX_FILE_BYTES: u64 = 2 * 1024 * 1024;

/// Configuration for semantic chunking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChunkingConfig {
    /// Language variant used to analyze every file (`rust`, `python`, ...)
    pub codebase_language: String,

    /// Traversal depth bound from each root
    pub max_recursion_depth: usize,

    /// Groups above this estimate are split before packing
    pub max_group_tokens: usize,

    /// Globs selecting files, relative to the codebase root (empty = language extensions)
    #[serde(deserialize_with = "deserialize_patterns")]
    pub include_patterns: Vec<String>,

    /// Globs removing files, relative to the codebase root
    #[serde(deserialize_with = "deserialize_patterns")]
    pub exclude_patterns: Vec<String>,

    /// Also exclude the language's default globs (build output, vendored code)
    pub use_default_excludes: bool,

    pub max_file_bytes: u64,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            codebase_language: Language::Generic.as_str().to_string(),
            max_recursion_depth: DEFAULT_MAX_DEPTH,
            max_group_tokens: DEFAULT_MAX_GROUP_TOKENS,
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
            use_default_excludes: true,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
        }
    }
}

impl ChunkingConfig {
    /// Create config for a given language with defaults elsewhere
    pub fn for_language(language: Language) -> Self {
        Self {
            codebase_language: language.as_str().to_string(),
            ..Default::default()
        }
    }

    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate().map_err(BundleError::InvalidConfig)?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.max_group_tokens < 2 {
            return Err("max_group_tokens must be >= 2".to_string());
        }

        if self.max_file_bytes == 0 {
            return Err("max_file_bytes must be > 0".to_string());
        }

        if let Some(blank) = self
            .include_patterns
            .iter()
            .chain(&self.exclude_patterns)
            .find(|p| p.trim().is_empty())
        {
            return Err(format!("empty glob pattern in include/exclude list: {blank:?}"));
        }

        Ok(())
    }

    /// Resolved language variant; unknown names fall back to generic
    pub fn language(&self) -> Language {
        Language::from_config(&self.codebase_language)
    }

    /// Include globs, defaulting to the analyzer's extensions
    pub fn effective_includes(&self, analyzer: &dyn LanguageAnalyzer) -> Vec<String> {
        if !self.include_patterns.is_empty() {
            return self.include_patterns.clone();
        }
        analyzer
            .default_extensions()
            .iter()
            .map(|ext| format!("**/*.{ext}"))
            .collect()
    }

    /// Exclude globs, merged with the analyzer's defaults when enabled
    pub fn effective_excludes(&self, analyzer: &dyn LanguageAnalyzer) -> Vec<String> {
        let mut excludes = self.exclude_patterns.clone();
        if self.use_default_excludes {
            for pattern in analyzer.default_excludes() {
                if !excludes.iter().any(|p| p == pattern) {
                    excludes.push((*pattern).to_string());
                }
            }
        }
        excludes
    }
}

/// Split a comma-separated pattern string
pub fn split_patterns(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PatternInput {
    One(String),
    Many(Vec<String>),
}

/// Accept either a list of globs or one comma-separated string
fn deserialize_patterns<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match PatternInput::deserialize(deserializer)? {
        PatternInput::One(text) => split_patterns(&text),
        PatternInput::Many(list) => list.iter().flat_map(|p| split_patterns(p)).collect(),
    })
}
