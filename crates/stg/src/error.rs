use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Unknown concept '{0}' referenced by an edge")]
    UnknownConcept(String),

    #[error("Duplicate concept '{0}' in seed data")]
    DuplicateConcept(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
