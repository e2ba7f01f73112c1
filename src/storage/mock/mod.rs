//! Mock storage implementation for testing.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::row::RequestRow;
use super::{CollectionStore, Result, StorageError};
use crate::model::{
    new_id, Collection, Request, RequestPatch, UpdateRequestOutcome, REQUEST_UPDATED_MESSAGE,
};


/// Mock collection store that keeps rows in memory.
///
/// Requests are held as flat rows, the same shape the SQL backends persist,
/// so kind changes made through patches behave as they do in a database.
#[derive(Default)]
pub struct MockCollectionStore {
    collections: RwLock<Vec<Collection>>,
    requests: RwLock<Vec<RequestRow>>,
    fail_on_write: RwLock<bool>,
    fail_on_read: RwLock<bool>,
}

impl MockCollectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_fail_on_write(&self, fail: bool) {
        *self.fail_on_write.write().await = fail;
    }

    pub async fn set_fail_on_read(&self, fail: bool) {
        *self.fail_on_read.write().await = fail;
    }

    /// Number of stored request rows.
    pub async fn request_count(&self) -> usize {
        self.requests.read().await.len()
    }

    /// Insert a raw row, bypassing domain conversion.
    pub async fn insert_row(&self, row: RequestRow) {
        self.requests.write().await.push(row);
    }

    async fn check_write(&self) -> Result<()> {
        if *self.fail_on_write.read().await {
            return Err(StorageError::Database(sqlx::Error::PoolClosed));
        }
        Ok(())
    }

    async fn check_read(&self) -> Result<()> {
        if *self.fail_on_read.read().await {
            return Err(StorageError::Database(sqlx::Error::PoolClosed));
        }
        Ok(())
    }

    async fn requests_for(&self, collection_id: &str) -> Vec<Request> {
        self.requests
            .read()
            .await
            .iter()
            .filter(|row| row.collection_id == collection_id)
            .filter_map(|row| Request::try_from(row.clone()).ok())
            .collect()
    }
}

fn apply_patch(row: &mut RequestRow, patch: RequestPatch) {
    if let Some(kind) = patch.kind {
        row.kind = kind.as_str().to_string();
    }
    if let Some(name) = patch.name {
        row.name = name;
    }
    let optional = [
        (&mut row.http_method, patch.http_method),
        (&mut row.http_url, patch.http_url),
        (&mut row.http_headers, patch.http_headers),
        (&mut row.http_query_params, patch.http_query_params),
        (&mut row.http_body, patch.http_body),
        (&mut row.graphql_endpoint, patch.graphql_endpoint),
        (&mut row.graphql_query, patch.graphql_query),
        (&mut row.graphql_variables, patch.graphql_variables),
        (&mut row.graphql_headers, patch.graphql_headers),
    ];
    for (column, value) in optional {
        if value.is_some() {
            *column = value;
        }
    }
}

#[async_trait]
impl CollectionStore for MockCollectionStore {
    async fn create_collection(&self, mut collection: Collection) -> Result<String> {
        self.check_write().await?;
        if collection.id.is_empty() {
            collection.id = new_id();
        }
        collection.requests.clear();
        let id = collection.id.clone();
        self.collections.write().await.push(collection);
        Ok(id)
    }

    async fn add_requests_to_collection(
        &self,
        collection_name: &str,
        requests: Vec<Request>,
    ) -> Result<()> {
        let collection_id = self
            .collections
            .read()
            .await
            .iter()
            .find(|c| c.name == collection_name)
            .map(|c| c.id.clone())
            .ok_or_else(|| StorageError::CollectionNotFound(collection_name.to_string()))?;

        self.check_write().await?;

        let mut rows = self.requests.write().await;
        for mut request in requests {
            request.collection_id = collection_id.clone();
            rows.push(RequestRow::from(request));
        }
        Ok(())
    }

    async fn get_collection_by_name(&self, name: &str) -> Result<Collection> {
        self.check_read().await?;
        let mut collection = self
            .collections
            .read()
            .await
            .iter()
            .find(|c| c.name == name)
            .cloned()
            .ok_or_else(|| StorageError::CollectionNotFound(name.to_string()))?;
        collection.requests = self.requests_for(&collection.id).await;
        Ok(collection)
    }

    async fn list_collections_and_requests(&self) -> Result<Vec<Collection>> {
        self.check_read().await?;
        let mut collections = self.collections.read().await.clone();
        for collection in &mut collections {
            collection.requests = self.requests_for(&collection.id).await;
        }
        Ok(collections)
    }

    async fn get_by_id(&self, id: &str) -> Result<Collection> {
        self.check_read().await?;
        self.collections
            .read()
            .await
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| StorageError::CollectionNotFound(id.to_string()))
    }

    async fn update(&self, mut collection: Collection) -> Result<Collection> {
        self.check_write().await?;
        collection.requests.clear();
        let mut collections = self.collections.write().await;
        match collections.iter_mut().find(|c| c.id == collection.id) {
            Some(existing) => *existing = collection.clone(),
            None => collections.push(collection.clone()),
        }
        Ok(collection)
    }

    async fn update_request_in_collection(
        &self,
        collection_id: &str,
        request_id: &str,
        patch: RequestPatch,
    ) -> Result<UpdateRequestOutcome> {
        self.check_write().await?;
        let mut rows = self.requests.write().await;
        let row = rows
            .iter_mut()
            .find(|row| row.id == request_id && row.collection_id == collection_id)
            .ok_or_else(|| StorageError::RequestNotFound {
                collection_id: collection_id.to_string(),
                request_id: request_id.to_string(),
            })?;
        apply_patch(row, patch);
        Ok(UpdateRequestOutcome {
            message: REQUEST_UPDATED_MESSAGE.to_string(),
            request_id: request_id.to_string(),
        })
    }

    async fn delete_collection(&self, id: &str) -> Result<()> {
        self.check_write().await?;
        self.collections.write().await.retain(|c| c.id != id);
        self.requests
            .write()
            .await
            .retain(|row| row.collection_id != id);
        Ok(())
    }

    async fn remove_request_from_collection(
        &self,
        collection_id: &str,
        request_id: &str,
    ) -> Result<()> {
        self.check_write().await?;
        let mut rows = self.requests.write().await;
        let index = rows
            .iter()
            .position(|row| row.id == request_id && row.collection_id == collection_id)
            .ok_or_else(|| StorageError::RequestNotFound {
                collection_id: collection_id.to_string(),
                request_id: request_id.to_string(),
            })?;
        rows.remove(index);
        Ok(())
    }
}
