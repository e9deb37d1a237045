use thiserror::Error;
use upgrade_extractor::VersionId;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Graph store unavailable: {0}")]
    Unavailable(String),

    #[error("No version graph for tool '{0}'")]
    UnknownTool(String),

    #[error("Version {0} not found")]
    VersionNotFound(VersionId),

    #[error("Broken version chain: {0}")]
    BrokenChain(String),
}
