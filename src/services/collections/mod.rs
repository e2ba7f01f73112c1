//! Collection service.
//!
//! One stateless operation per RPC: validate, call the store, convert the
//! result. Create, add, list, get, and update report failures as gRPC errors.
//! The two delete operations always answer with a `DeleteResponse` and report
//! failure through its `success` flag.

use std::sync::Arc;

use tonic::{Request, Response, Status};
use tracing::{error, info};

use super::ServiceError;
use crate::convert::{convert_collection, convert_collections, convert_patch, convert_requests};
use crate::model::Collection;
use crate::proto::{
    collection_service_server::CollectionService as CollectionServiceTrait,
    AddRequestToCollectionRequest, CollectionResponse, CreateCollectionRequest,
    CreateCollectionResponse, DeleteCollectionRequest, DeleteRequestFromCollectionRequest,
    DeleteResponse, GetCollectionRequest, ListCollectionsRequest, ListCollectionsResponse,
    UpdateCollectionRequest, UpdateRequestInCollectionRequest, UpdateRequestInCollectionResponse,
};
use crate::storage::CollectionStore;


const REPOSITORY_UNSET: &str = "repository is not initialized";

/// Collection service.
///
/// Holds the store as an injected dependency. A service built with
/// [`CollectionService::without_repository`] answers `UNAVAILABLE`.
pub struct CollectionService {
    repo: Option<Arc<dyn CollectionStore>>,
}

impl CollectionService {
    /// Create a collection service backed by `repo`.
    pub fn new(repo: Arc<dyn CollectionStore>) -> Self {
        Self { repo: Some(repo) }
    }

    /// Create a service with no store attached.
    pub fn without_repository() -> Self {
        Self { repo: None }
    }

    fn repo(&self) -> Result<&Arc<dyn CollectionStore>, ServiceError> {
        self.repo
            .as_ref()
            .ok_or_else(|| ServiceError::Unavailable(REPOSITORY_UNSET.to_string()))
    }

    async fn create_collection_inner(
        &self,
        req: CreateCollectionRequest,
    ) -> Result<CreateCollectionResponse, ServiceError> {
        if req.name.is_empty() {
            return Err(ServiceError::InvalidArgument(
                "collection name cannot be empty".to_string(),
            ));
        }
        let repo = self.repo()?;

        let description = (!req.description.is_empty()).then_some(req.description);
        let collection = Collection::new(req.name, description);
        let name = collection.name.clone();

        let id = repo.create_collection(collection).await.map_err(|e| {
            error!(collection_name = %name, error = %e, "Failed to create collection");
            e
        })?;

        Ok(CreateCollectionResponse { id, name })
    }

    async fn add_request_inner(
        &self,
        req: AddRequestToCollectionRequest,
    ) -> Result<CollectionResponse, ServiceError> {
        let repo = self.repo()?;
        let input = req.request.ok_or_else(|| {
            ServiceError::InvalidArgument("request input is required".to_string())
        })?;

        // Stamped with the resolved collection id by the store.
        let requests = convert_requests(vec![input], &req.collection_name).map_err(|e| {
            error!(error = %e, "Failed to convert request input");
            e
        })?;

        repo.add_requests_to_collection(&req.collection_name, requests)
            .await
            .map_err(|e| {
                error!(collection_name = %req.collection_name, error = %e, "Failed to add request to collection");
                e
            })?;

        let updated = repo
            .get_collection_by_name(&req.collection_name)
            .await
            .map_err(|e| {
                error!(collection_name = %req.collection_name, error = %e, "Failed to fetch updated collection");
                e
            })?;

        Ok(convert_collection(updated))
    }

    async fn list_inner(&self) -> Result<ListCollectionsResponse, ServiceError> {
        let repo = self.repo()?;
        let collections = repo.list_collections_and_requests().await.map_err(|e| {
            error!(error = %e, "Failed to list collections and requests");
            e
        })?;

        Ok(ListCollectionsResponse {
            collections: convert_collections(collections),
        })
    }

    async fn get_collection_inner(
        &self,
        req: GetCollectionRequest,
    ) -> Result<CollectionResponse, ServiceError> {
        let repo = self.repo()?;
        if req.name.is_empty() {
            return Err(ServiceError::InvalidArgument(
                "collection name cannot be empty".to_string(),
            ));
        }

        let collection = repo.get_collection_by_name(&req.name).await.map_err(|e| {
            error!(collection_name = %req.name, error = %e, "Failed to get collection");
            e
        })?;
        Ok(convert_collection(collection))
    }

    async fn update_collection_inner(
        &self,
        req: UpdateCollectionRequest,
    ) -> Result<CollectionResponse, ServiceError> {
        let repo = self.repo()?;
        let mut existing = repo.get_by_id(&req.id).await.map_err(|e| {
            error!(collection_id = %req.id, error = %e, "Failed to get collection by ID");
            e
        })?;

        if !req.name.is_empty() {
            existing.name = req.name;
        }
        if !req.description.is_empty() {
            existing.description = Some(req.description);
        }

        let updated = repo.update(existing).await.map_err(|e| {
            error!(collection_id = %req.id, error = %e, "Failed to update collection");
            e
        })?;
        Ok(convert_collection(updated))
    }

    async fn update_request_inner(
        &self,
        req: UpdateRequestInCollectionRequest,
    ) -> Result<UpdateRequestInCollectionResponse, ServiceError> {
        let repo = self.repo()?;
        let patch = convert_patch(&req)?;

        let outcome = repo
            .update_request_in_collection(&req.collection_id, &req.request_id, patch)
            .await
            .map_err(|e| {
                error!(request_id = %req.request_id, error = %e, "Failed to update request in collection");
                e
            })?;

        Ok(UpdateRequestInCollectionResponse {
            message: outcome.message,
            request_id: outcome.request_id,
        })
    }
}

#[tonic::async_trait]
impl CollectionServiceTrait for CollectionService {
    async fn create_collection(
        &self,
        request: Request<CreateCollectionRequest>,
    ) -> Result<Response<CreateCollectionResponse>, Status> {
        let response = self.create_collection_inner(request.into_inner()).await?;
        info!(collection_id = %response.id, "CreateCollection completed");
        Ok(Response::new(response))
    }

    async fn add_request_to_collection(
        &self,
        request: Request<AddRequestToCollectionRequest>,
    ) -> Result<Response<CollectionResponse>, Status> {
        let response = self.add_request_inner(request.into_inner()).await?;
        info!(collection_id = %response.id, requests = response.request_count, "AddRequestToCollection completed");
        Ok(Response::new(response))
    }

    async fn list_collections_and_requests(
        &self,
        _request: Request<ListCollectionsRequest>,
    ) -> Result<Response<ListCollectionsResponse>, Status> {
        Ok(Response::new(self.list_inner().await?))
    }

    async fn get_collection(
        &self,
        request: Request<GetCollectionRequest>,
    ) -> Result<Response<CollectionResponse>, Status> {
        Ok(Response::new(
            self.get_collection_inner(request.into_inner()).await?,
        ))
    }

    async fn update_collection(
        &self,
        request: Request<UpdateCollectionRequest>,
    ) -> Result<Response<CollectionResponse>, Status> {
        let response = self.update_collection_inner(request.into_inner()).await?;
        info!(collection_id = %response.id, "UpdateCollection completed");
        Ok(Response::new(response))
    }

    async fn update_request_in_collection(
        &self,
        request: Request<UpdateRequestInCollectionRequest>,
    ) -> Result<Response<UpdateRequestInCollectionResponse>, Status> {
        Ok(Response::new(
            self.update_request_inner(request.into_inner()).await?,
        ))
    }

    async fn delete_collection(
        &self,
        request: Request<DeleteCollectionRequest>,
    ) -> Result<Response<DeleteResponse>, Status> {
        let req = request.into_inner();

        let result = match self.repo() {
            Ok(repo) => repo.delete_collection(&req.id).await.map_err(ServiceError::from),
            Err(e) => Err(e),
        };

        let response = match result {
            Ok(()) => DeleteResponse {
                success: true,
                message: "Collection deleted successfully".to_string(),
            },
            Err(e) => {
                error!(collection_id = %req.id, error = %e, "Failed to delete collection");
                DeleteResponse {
                    success: false,
                    message: format!("Failed to delete collection: {}", e),
                }
            }
        };
        Ok(Response::new(response))
    }

    async fn delete_request_from_collection(
        &self,
        request: Request<DeleteRequestFromCollectionRequest>,
    ) -> Result<Response<DeleteResponse>, Status> {
        let req = request.into_inner();

        let result = match self.repo() {
            Ok(repo) => repo
                .remove_request_from_collection(&req.collection_id, &req.request_id)
                .await
                .map_err(ServiceError::from),
            Err(e) => Err(e),
        };

        let response = match result {
            Ok(()) => DeleteResponse {
                success: true,
                message: "Request removed from collection successfully".to_string(),
            },
            Err(e) => {
                error!(
                    request_id = %req.request_id,
                    collection_id = %req.collection_id,
                    error = %e,
                    "Failed to remove request from collection"
                );
                DeleteResponse {
                    success: false,
                    message: format!("Failed to remove request: {}", e),
                }
            }
        };
        Ok(Response::new(response))
    }
}
