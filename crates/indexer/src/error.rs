use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexerError>;

#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Vector store error: {0}")]
    VectorStoreError(#[from] upgrade_vector_store::VectorStoreError),

    #[error("Failed to fetch {tool} {line}: {reason}")]
    Fetch {
        tool: String,
        line: String,
        reason: String,
    },

    #[error("Invalid indexer config: {0}")]
    InvalidConfig(String),
}
