use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Question is empty")]
    EmptyQuestion,

    #[error("Both retrieval sources unavailable (semantic: {semantic}; structural: {structural})")]
    BothSourcesUnavailable { semantic: String, structural: String },

    #[error("Deadline exceeded before both retrieval passes completed")]
    DeadlineExceeded,

    #[error("Vector store error: {0}")]
    VectorStoreError(#[from] upgrade_vector_store::VectorStoreError),

    #[error("Answer composer failed: {0}")]
    Composer(String),

    #[error("Unknown preset '{0}'")]
    UnknownPreset(String),
}
