//! Service-level errors and their gRPC status mapping.

use tonic::Status;

use crate::convert::ConvertError;
use crate::storage::StorageError;

/// Errors surfaced by collection service operations.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Unavailable: {0}")]
    Unavailable(String),
}

impl From<StorageError> for ServiceError {
    fn from(e: StorageError) -> Self {
        if e.is_not_found() {
            ServiceError::NotFound(e.to_string())
        } else {
            ServiceError::Persistence(e.to_string())
        }
    }
}

impl From<ConvertError> for ServiceError {
    fn from(e: ConvertError) -> Self {
        match e {
            ConvertError::Serialization { .. } => ServiceError::Serialization(e.to_string()),
            ConvertError::UnspecifiedKind | ConvertError::InvalidJson { .. } => {
                ServiceError::InvalidArgument(e.to_string())
            }
        }
    }
}

impl From<ServiceError> for Status {
    fn from(e: ServiceError) -> Self {
        let message = e.to_string();
        match e {
            ServiceError::InvalidArgument(_) => Status::invalid_argument(message),
            ServiceError::NotFound(_) => Status::not_found(message),
            ServiceError::Serialization(_) | ServiceError::Persistence(_) => {
                Status::internal(message)
            }
            ServiceError::Unavailable(_) => Status::unavailable(message),
        }
    }
}
