use thiserror::Error;

pub type Result<T> = std::result::Result<T, BundleError>;

#[derive(Error, Debug)]
pub enum BundleError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Unit extraction error: {0}")]
    UnitsError(#[from] codebundle_units::UnitsError),

    #[error("Graph error: {0}")]
    GraphError(#[from] codebundle_graph::GraphError),

    #[error("Invalid codebase path: {0}")]
    InvalidPath(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid glob pattern: {0}")]
    Glob(String),
}
