//! Storage implementations.
//!
//! [`CollectionStore`] is the sole owner of persistence access. The SQL
//! backends share one implementation in [`sql`]; [`mock`] keeps everything in
//! memory for tests.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};

use crate::config::{StorageConfig, StorageType};
use crate::model::{Collection, Request, RequestPatch, UpdateRequestOutcome};

pub mod mock;
pub mod row;
pub mod schema;
pub mod sql;

#[cfg(feature = "postgres")]
pub use sql::postgres::PostgresCollectionStore;
#[cfg(feature = "sqlite")]
pub use sql::sqlite::SqliteCollectionStore;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error("Request not found in collection: collection={collection_id}, request={request_id}")]
    RequestNotFound {
        collection_id: String,
        request_id: String,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StorageError {
    /// True for errors caused by an id or name that does not resolve.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StorageError::CollectionNotFound(_) | StorageError::RequestNotFound { .. }
        )
    }
}

/// Interface for collection persistence.
///
/// Implementations:
/// - `SqliteCollectionStore`: SQLite storage
/// - `PostgresCollectionStore`: PostgreSQL storage
/// - `MockCollectionStore`: in-memory storage for tests
#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// Insert a collection. An empty id is replaced by a generated one.
    ///
    /// Returns the id the collection was stored under.
    async fn create_collection(&self, collection: Collection) -> Result<String>;

    /// Append requests to the first collection named `collection_name`.
    ///
    /// Each request is stamped with the resolved collection id. All rows are
    /// inserted or none are.
    async fn add_requests_to_collection(
        &self,
        collection_name: &str,
        requests: Vec<Request>,
    ) -> Result<()>;

    /// First collection named `name`, with requests loaded.
    async fn get_collection_by_name(&self, name: &str) -> Result<Collection>;

    /// Every collection with requests loaded, in insertion order.
    async fn list_collections_and_requests(&self) -> Result<Vec<Collection>>;

    /// Collection by id, without requests.
    async fn get_by_id(&self, id: &str) -> Result<Collection>;

    /// Overwrite (or insert) the collection row and return the persisted row.
    async fn update(&self, collection: Collection) -> Result<Collection>;

    /// Write the fields present in `patch` to the request.
    async fn update_request_in_collection(
        &self,
        collection_id: &str,
        request_id: &str,
        patch: RequestPatch,
    ) -> Result<UpdateRequestOutcome>;

    /// Delete a collection and, by cascade, its requests.
    ///
    /// Deleting an unknown id succeeds.
    async fn delete_collection(&self, id: &str) -> Result<()>;

    /// Delete one request after checking it belongs to the collection.
    async fn remove_request_from_collection(
        &self,
        collection_id: &str,
        request_id: &str,
    ) -> Result<()>;
}

/// Initialize storage based on configuration.
///
/// Connects to the configured backend and creates the schema.
pub async fn init_storage(
    config: &StorageConfig,
) -> std::result::Result<Arc<dyn CollectionStore>, Box<dyn std::error::Error>> {
    match config.storage_type {
        #[cfg(feature = "sqlite")]
        StorageType::Sqlite => {
            use std::str::FromStr;

            use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

            info!("Storage: sqlite at {}", config.sqlite.path);

            if let Some(parent) = std::path::Path::new(&config.sqlite.path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }

            let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", config.sqlite.path))?
                .create_if_missing(true)
                .foreign_keys(true);
            let pool = SqlitePoolOptions::new()
                .max_connections(config.sqlite.max_connections)
                .connect_with(options)
                .await?;

            let store = SqliteCollectionStore::new(pool);
            store.init().await?;
            Ok(Arc::new(store))
        }
        #[cfg(feature = "postgres")]
        StorageType::Postgres => {
            use sqlx::postgres::PgPoolOptions;

            info!("Storage: postgres");

            let pool = PgPoolOptions::new()
                .max_connections(config.postgres.max_connections)
                .connect(&config.postgres.uri)
                .await?;

            let store = PostgresCollectionStore::new(pool);
            store.init().await?;
            Ok(Arc::new(store))
        }
        #[allow(unreachable_patterns)]
        ref other => {
            error!("Storage type {:?} requested but its feature is not enabled", other);
            Err(format!("Storage type {:?} not enabled", other).into())
        }
    }
}
