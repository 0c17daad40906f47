use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Order not found")]
    NotFound,
    #[error("Order id already exists")]
    Conflict,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("Stored order could not be decoded: {0}")]
    Decode(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

