use thiserror::Error;

/// Result type for unit extraction
pub type Result<T> = std::result::Result<T, UnitsError>;

/// Errors that can occur while turning a file into semantic units
#[derive(Error, Debug)]
pub enum UnitsError {
    /// Failed to parse the source code
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Tree-sitter error
    #[error("Tree-sitter error: {0}")]
    TreeSitterError(String),

    /// A match offset does not fall on a character boundary of the file
    #[error("Invalid unit span in {path}: {start}..{end}")]
    InvalidSpan {
        path: String,
        start: usize,
        end: usize,
    },
}

impl UnitsError {
    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a tree-sitter error
    pub fn tree_sitter(msg: impl Into<String>) -> Self {
        Self::TreeSitterError(msg.into())
    }
}
