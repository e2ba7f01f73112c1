//! Shared storage integration tests.
//!
//! Tests the CollectionStore interface against every implementation.
//! Each implementation module imports these test functions and runs them.

pub mod collection_store_tests;
