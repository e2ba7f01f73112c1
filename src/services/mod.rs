//! gRPC service implementations.

pub mod collections;
pub mod error;

pub use collections::CollectionService;
pub use error::ServiceError;
