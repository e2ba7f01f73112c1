//! Collections - request collection service
//!
//! A gRPC service for organizing saved HTTP and GraphQL requests into named
//! collections, backed by SQLite or PostgreSQL.

pub mod config;
pub mod convert;
pub mod model;
pub mod services;
pub mod storage;
pub mod transport;
pub mod utils;

pub mod proto {
    tonic::include_proto!("collections");
}
