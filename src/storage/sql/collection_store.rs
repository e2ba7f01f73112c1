//! Unified SQL CollectionStore implementation.
//!
//! Uses a macro to generate implementations for each SQL backend,
//! eliminating code duplication while maintaining type safety.

use std::collections::HashMap;
use std::marker::PhantomData;

use sea_query::{Expr, OnConflict, Order, Query};
use tracing::{error, info, warn};

use super::SqlDatabase;
use crate::model::{
    new_id, Collection, Request, RequestPatch, UpdateRequestOutcome, REQUEST_UPDATED_MESSAGE,
};
use crate::storage::row::{collection_from_row, patch_assignments, RequestRow};
use crate::storage::schema::{Collections, Requests, COLLECTION_COLUMNS, REQUEST_COLUMNS};
use crate::storage::{CollectionStore, Result, StorageError};

/// SQL-based implementation of CollectionStore.
///
/// This generic implementation works with any SQL database that implements
/// the `SqlDatabase` trait (PostgreSQL, SQLite).
pub struct SqlCollectionStore<DB: SqlDatabase> {
    pool: DB::Pool,
    _marker: PhantomData<DB>,
}

impl<DB: SqlDatabase> SqlCollectionStore<DB> {
    /// Create a new SQL collection store with the given pool.
    pub fn new(pool: DB::Pool) -> Self {
        Self {
            pool,
            _marker: PhantomData,
        }
    }

    /// Get the underlying pool.
    pub fn pool(&self) -> &DB::Pool {
        &self.pool
    }
}

/// Attach eager-loaded requests to their owning collections.
fn attach_requests(collections: &mut [Collection], requests: Vec<Request>) {
    let mut by_collection: HashMap<String, Vec<Request>> = HashMap::new();
    for request in requests {
        by_collection
            .entry(request.collection_id.clone())
            .or_default()
            .push(request);
    }
    for collection in collections {
        collection.requests = by_collection.remove(&collection.id).unwrap_or_default();
    }
}

/// Macro to implement CollectionStore for a specific SQL backend.
macro_rules! impl_collection_store {
    ($db_type:ty, $feature:literal) => {
        #[cfg(feature = $feature)]
        impl SqlCollectionStore<$db_type> {
            /// Create the schema if it does not already exist.
            pub async fn init(&self) -> Result<()> {
                for stmt in <$db_type as SqlDatabase>::SCHEMA.iter().copied() {
                    sqlx::query(stmt).execute(&self.pool).await?;
                }
                Ok(())
            }

            /// First collection (by insertion order) whose `column` equals `value`.
            async fn find_collection(
                &self,
                column: Collections,
                value: &str,
            ) -> Result<Option<Collection>> {
                let stmt = Query::select()
                    .columns(COLLECTION_COLUMNS)
                    .from(Collections::Table)
                    .and_where(Expr::col(column).eq(value))
                    .order_by(Collections::Position, Order::Asc)
                    .limit(1)
                    .to_owned();

                let sql = <$db_type>::build_select(stmt);
                let row = sqlx::query(&sql).fetch_optional(&self.pool).await?;

                match row {
                    Some(row) => Ok(Some(collection_from_row(&row)?)),
                    None => Ok(None),
                }
            }

            /// Requests in insertion order, optionally restricted to one collection.
            ///
            /// Rows with an unrecognized kind are skipped.
            async fn load_requests(&self, collection_id: Option<&str>) -> Result<Vec<Request>> {
                let mut stmt = Query::select();
                stmt.columns(REQUEST_COLUMNS)
                    .from(Requests::Table)
                    .order_by(Requests::Position, Order::Asc);
                if let Some(collection_id) = collection_id {
                    stmt.and_where(Expr::col(Requests::CollectionId).eq(collection_id));
                }

                let sql = <$db_type>::build_select(stmt);
                let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

                let mut requests = Vec::with_capacity(rows.len());
                for row in &rows {
                    let row = RequestRow::from_row(row)?;
                    let request_id = row.id.clone();
                    match Request::try_from(row) {
                        Ok(request) => requests.push(request),
                        Err(e) => {
                            warn!(request_id = %request_id, error = %e, "Skipping stored request");
                        }
                    }
                }
                Ok(requests)
            }

            /// Whether a request with `request_id` belongs to `collection_id`.
            async fn request_exists(&self, collection_id: &str, request_id: &str) -> Result<bool> {
                let stmt = Query::select()
                    .column(Requests::Id)
                    .from(Requests::Table)
                    .and_where(Expr::col(Requests::Id).eq(request_id))
                    .and_where(Expr::col(Requests::CollectionId).eq(collection_id))
                    .to_owned();

                let sql = <$db_type>::build_select(stmt);
                let row = sqlx::query(&sql).fetch_optional(&self.pool).await?;
                Ok(row.is_some())
            }
        }

        #[cfg(feature = $feature)]
        #[async_trait::async_trait]
        impl CollectionStore for SqlCollectionStore<$db_type> {
            async fn create_collection(&self, mut collection: Collection) -> Result<String> {
                if collection.id.is_empty() {
                    collection.id = new_id();
                }
                info!(name = %collection.name, "Creating collection");

                let stmt = Query::insert()
                    .into_table(Collections::Table)
                    .columns(COLLECTION_COLUMNS)
                    .values_panic([
                        collection.id.clone().into(),
                        collection.name.clone().into(),
                        collection.description.clone().into(),
                    ])
                    .to_owned();

                let sql = <$db_type>::build_insert(stmt);
                sqlx::query(&sql).execute(&self.pool).await.map_err(|e| {
                    error!(name = %collection.name, error = %e, "Failed to create collection");
                    e
                })?;

                info!(collection_id = %collection.id, "Collection created");
                Ok(collection.id)
            }

            async fn add_requests_to_collection(
                &self,
                collection_name: &str,
                requests: Vec<Request>,
            ) -> Result<()> {
                let mut tx = self.pool.begin().await?;

                let stmt = Query::select()
                    .column(Collections::Id)
                    .from(Collections::Table)
                    .and_where(Expr::col(Collections::Name).eq(collection_name))
                    .order_by(Collections::Position, Order::Asc)
                    .limit(1)
                    .to_owned();

                let sql = <$db_type>::build_select(stmt);
                let row = sqlx::query(&sql).fetch_optional(&mut *tx).await?;
                let collection_id: String = match row {
                    Some(row) => sqlx::Row::try_get(&row, "id")?,
                    None => {
                        error!(collection_name = %collection_name, "Collection not found");
                        return Err(StorageError::CollectionNotFound(collection_name.to_string()));
                    }
                };

                if requests.is_empty() {
                    return Ok(());
                }

                let count = requests.len();
                let mut stmt = Query::insert();
                stmt.into_table(Requests::Table).columns(REQUEST_COLUMNS);
                for mut request in requests {
                    request.collection_id = collection_id.clone();
                    stmt.values_panic(RequestRow::from(request).into_values());
                }

                let sql = <$db_type>::build_insert(stmt);
                sqlx::query(&sql).execute(&mut *tx).await.map_err(|e| {
                    error!(collection_id = %collection_id, error = %e, "Failed to add requests");
                    e
                })?;

                tx.commit().await?;

                info!(collection_id = %collection_id, count = count, "Requests added");
                Ok(())
            }

            async fn get_collection_by_name(&self, name: &str) -> Result<Collection> {
                let mut collection = self
                    .find_collection(Collections::Name, name)
                    .await?
                    .ok_or_else(|| {
                        error!(collection_name = %name, "Failed to get collection");
                        StorageError::CollectionNotFound(name.to_string())
                    })?;

                collection.requests = self.load_requests(Some(&collection.id)).await?;
                Ok(collection)
            }

            async fn list_collections_and_requests(&self) -> Result<Vec<Collection>> {
                let stmt = Query::select()
                    .columns(COLLECTION_COLUMNS)
                    .from(Collections::Table)
                    .order_by(Collections::Position, Order::Asc)
                    .to_owned();

                let sql = <$db_type>::build_select(stmt);
                let rows = sqlx::query(&sql).fetch_all(&self.pool).await.map_err(|e| {
                    error!(error = %e, "Failed to list collections");
                    e
                })?;

                let mut collections = Vec::with_capacity(rows.len());
                for row in &rows {
                    collections.push(collection_from_row(row)?);
                }

                let requests = self.load_requests(None).await?;
                attach_requests(&mut collections, requests);
                Ok(collections)
            }

            async fn get_by_id(&self, id: &str) -> Result<Collection> {
                self.find_collection(Collections::Id, id)
                    .await?
                    .ok_or_else(|| {
                        error!(collection_id = %id, "Failed to fetch collection");
                        StorageError::CollectionNotFound(id.to_string())
                    })
            }

            async fn update(&self, collection: Collection) -> Result<Collection> {
                info!(collection_id = %collection.id, "Updating collection");

                let stmt = Query::insert()
                    .into_table(Collections::Table)
                    .columns(COLLECTION_COLUMNS)
                    .values_panic([
                        collection.id.clone().into(),
                        collection.name.into(),
                        collection.description.into(),
                    ])
                    .on_conflict(
                        OnConflict::column(Collections::Id)
                            .update_columns([Collections::Name, Collections::Description])
                            .to_owned(),
                    )
                    .to_owned();

                let sql = <$db_type>::build_insert(stmt);
                sqlx::query(&sql).execute(&self.pool).await.map_err(|e| {
                    error!(collection_id = %collection.id, error = %e, "Update failed");
                    e
                })?;

                let updated = self.get_by_id(&collection.id).await?;
                info!(collection_id = %updated.id, "Collection updated");
                Ok(updated)
            }

            async fn update_request_in_collection(
                &self,
                collection_id: &str,
                request_id: &str,
                patch: RequestPatch,
            ) -> Result<UpdateRequestOutcome> {
                if !self.request_exists(collection_id, request_id).await? {
                    error!(request_id = %request_id, collection_id = %collection_id, "Request not found");
                    return Err(StorageError::RequestNotFound {
                        collection_id: collection_id.to_string(),
                        request_id: request_id.to_string(),
                    });
                }

                let assignments = patch_assignments(patch);
                if !assignments.is_empty() {
                    let stmt = Query::update()
                        .table(Requests::Table)
                        .values(assignments)
                        .and_where(Expr::col(Requests::Id).eq(request_id))
                        .and_where(Expr::col(Requests::CollectionId).eq(collection_id))
                        .to_owned();

                    let sql = <$db_type>::build_update(stmt);
                    sqlx::query(&sql).execute(&self.pool).await.map_err(|e| {
                        error!(request_id = %request_id, error = %e, "Failed to update request");
                        e
                    })?;
                }

                info!(request_id = %request_id, "Request updated");
                Ok(UpdateRequestOutcome {
                    message: REQUEST_UPDATED_MESSAGE.to_string(),
                    request_id: request_id.to_string(),
                })
            }

            async fn delete_collection(&self, id: &str) -> Result<()> {
                info!(collection_id = %id, "Deleting collection");

                let stmt = Query::delete()
                    .from_table(Collections::Table)
                    .and_where(Expr::col(Collections::Id).eq(id))
                    .to_owned();

                let sql = <$db_type>::build_delete(stmt);
                let result = sqlx::query(&sql).execute(&self.pool).await.map_err(|e| {
                    error!(collection_id = %id, error = %e, "Delete failed");
                    e
                })?;

                info!(
                    collection_id = %id,
                    rows = result.rows_affected(),
                    "Collection deleted"
                );
                Ok(())
            }

            async fn remove_request_from_collection(
                &self,
                collection_id: &str,
                request_id: &str,
            ) -> Result<()> {
                if !self.request_exists(collection_id, request_id).await? {
                    error!(request_id = %request_id, collection_id = %collection_id, "Request not found in collection");
                    return Err(StorageError::RequestNotFound {
                        collection_id: collection_id.to_string(),
                        request_id: request_id.to_string(),
                    });
                }

                let stmt = Query::delete()
                    .from_table(Requests::Table)
                    .and_where(Expr::col(Requests::Id).eq(request_id))
                    .and_where(Expr::col(Requests::CollectionId).eq(collection_id))
                    .to_owned();

                let sql = <$db_type>::build_delete(stmt);
                sqlx::query(&sql).execute(&self.pool).await.map_err(|e| {
                    error!(request_id = %request_id, error = %e, "Failed to delete request");
                    e
                })?;

                info!(request_id = %request_id, "Request deleted from collection");
                Ok(())
            }
        }
    };
}

impl_collection_store!(super::sqlite::Sqlite, "sqlite");
impl_collection_store!(super::postgres::Postgres, "postgres");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HttpPayload, RequestPayload};

    fn request(id: &str, collection_id: &str) -> Request {
        Request {
            id: id.to_string(),
            collection_id: collection_id.to_string(),
            name: id.to_string(),
            payload: RequestPayload::Http(HttpPayload::default()),
        }
    }

    #[test]
    fn test_attach_requests_groups_by_owner_in_order() {
        let mut collections = vec![
            Collection {
                id: "a".to_string(),
                ..Default::default()
            },
            Collection {
                id: "b".to_string(),
                ..Default::default()
            },
        ];
        let requests = vec![request("r1", "a"), request("r2", "b"), request("r3", "a")];

        attach_requests(&mut collections, requests);

        let a: Vec<&str> = collections[0].requests.iter().map(|r| r.id.as_str()).collect();
        let b: Vec<&str> = collections[1].requests.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(a, vec!["r1", "r3"]);
        assert_eq!(b, vec!["r2"]);
    }
}
