use crate::{errors::GenericError, utils::error_chain_fmt};

#[allow(clippy::enum_variant_names)]
#[derive(thiserror::Error)]
pub enum DealError {
    #[error("{0}")]
    ValidationError(String),
    #[error("{0}")]
    NotFoundError(String),
    #[error("{0}")]
    SlugConflictError(String),
    #[error("{0}")]
    DatabaseError(String, anyhow::Error),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for DealError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl From<DealError> for GenericError {
    fn from(err: DealError) -> GenericError {
        match err {
            DealError::ValidationError(message) => GenericError::ValidationError(message),
            DealError::NotFoundError(message) => GenericError::NotFoundError(message),
            DealError::SlugConflictError(message) => GenericError::ConflictError(message),
            DealError::DatabaseError(message, error) => GenericError::DatabaseError(message, error),
            DealError::UnexpectedError(error) => GenericError::UnexpectedError(error),
        }
    }
}
