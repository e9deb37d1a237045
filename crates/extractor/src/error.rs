use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExtractError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Invalid version identifier '{input}': {reason}")]
    Parse { input: String, reason: String },

    #[error("Unknown change type '{0}'")]
    UnknownChangeType(String),
}

impl ExtractError {
    pub(crate) fn parse(input: &str, reason: impl Into<String>) -> Self {
        Self::Parse {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}
