use codebundle_units::UnitId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Duplicate unit id: {0}")]
    DuplicateNode(UnitId),
}
