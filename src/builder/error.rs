//! Build errors for history builders.

use thiserror::Error;

/// Errors that can occur when constructing a history.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("No navigable document. A platform-backed history needs a host with a document")]
    MissingDocument,

    #[error("Invalid history options: {0}")]
    InvalidOptions(String),
}

impl From<serde_json::Error> for BuildError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidOptions(err.to_string())
    }
}
