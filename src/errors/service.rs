use thiserror::Error;

use super::RepositoryError;

/// Failures of the short link operations
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed input, rejected before touching storage
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Every slug candidate collided with an existing link
    #[error("Could not allocate a unique slug after {0} attempts")]
    SlugAllocationFailed(u32),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The caller does not own the link it tries to read or mutate
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Storage failure: {0}")]
    Storage(RepositoryError),
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(msg) => Self::NotFound(msg),
            RepositoryError::InvalidData(msg) => Self::InvalidInput(msg),
            other => Self::Storage(other),
        }
    }
}
