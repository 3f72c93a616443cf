//! Store Error Types

use thiserror::Error;

use crate::usecase::UseCaseError;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bson::ser::Error),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] bson::de::Error),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl StoreError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

impl From<StoreError> for UseCaseError {
    fn from(err: StoreError) -> Self {
        UseCaseError::commit(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_becomes_commit_error() {
        let err: UseCaseError = StoreError::internal("disk full").into();
        assert_eq!(err.code(), "COMMIT_FAILED");
        assert!(err.message().contains("disk full"));
    }
}
