//! CollectionStore interface tests.
//!
//! These tests verify the contract of the CollectionStore trait.
//! Each storage implementation should run these tests. Stores are shared
//! between tests, so every test works on uniquely named collections.

use uuid::Uuid;

use collections::model::{
    Collection, GraphqlPayload, HttpPayload, Request, RequestKind, RequestPatch, RequestPayload,
    REQUEST_UPDATED_MESSAGE,
};
use collections::storage::{CollectionStore, StorageError};

/// Unique collection name for one test.
pub fn unique_name(prefix: &str) -> String {
    format!("test_{}_{}", prefix, Uuid::new_v4())
}

/// HTTP request template with placeholder ownership.
pub fn make_http_request(name: &str) -> Request {
    Request {
        id: Uuid::new_v4().to_string(),
        collection_id: String::new(),
        name: name.to_string(),
        payload: RequestPayload::Http(HttpPayload {
            method: "GET".to_string(),
            url: "https://api.example.com/health".to_string(),
            headers: r#"{"Accept":"application/json"}"#.to_string(),
            query_params: "{}".to_string(),
            body: None,
        }),
    }
}

/// GraphQL request template with placeholder ownership.
pub fn make_graphql_request(name: &str) -> Request {
    Request {
        id: Uuid::new_v4().to_string(),
        collection_id: String::new(),
        name: name.to_string(),
        payload: RequestPayload::Graphql(GraphqlPayload {
            endpoint: "https://api.example.com/graphql".to_string(),
            query: "{ viewer { id } }".to_string(),
            variables: Some(r#"{"first":10}"#.to_string()),
            headers: "{}".to_string(),
        }),
    }
}

async fn create_named<S: CollectionStore>(store: &S, name: &str) -> String {
    store
        .create_collection(Collection::new(name, Some("integration".to_string())))
        .await
        .expect("create should succeed")
}

// =============================================================================
// CollectionStore::create_collection tests
// =============================================================================

pub async fn test_create_and_get_by_id<S: CollectionStore>(store: &S) {
    let name = unique_name("create");
    let id = create_named(store, &name).await;

    let collection = store.get_by_id(&id).await.expect("get_by_id should succeed");
    assert_eq!(collection.id, id);
    assert_eq!(collection.name, name);
    assert_eq!(collection.description.as_deref(), Some("integration"));
    assert!(collection.requests.is_empty());
}

pub async fn test_create_generates_missing_id<S: CollectionStore>(store: &S) {
    let name = unique_name("noid");
    let mut collection = Collection::new(&name, None);
    collection.id = String::new();

    let id = store
        .create_collection(collection)
        .await
        .expect("create should succeed");
    assert!(!id.is_empty());

    let stored = store.get_by_id(&id).await.expect("get_by_id should succeed");
    assert_eq!(stored.name, name);
    assert!(stored.description.is_none());
}

pub async fn test_get_by_id_nonexistent<S: CollectionStore>(store: &S) {
    let result = store.get_by_id(&Uuid::new_v4().to_string()).await;
    assert!(matches!(result, Err(StorageError::CollectionNotFound(_))));
}

// =============================================================================
// CollectionStore::add_requests_to_collection tests
// =============================================================================

pub async fn test_add_requests_preserves_order<S: CollectionStore>(store: &S) {
    let name = unique_name("order");
    let id = create_named(store, &name).await;

    store
        .add_requests_to_collection(
            &name,
            vec![make_http_request("first"), make_graphql_request("second")],
        )
        .await
        .expect("add should succeed");
    store
        .add_requests_to_collection(&name, vec![make_http_request("third")])
        .await
        .expect("add should succeed");

    let collection = store
        .get_collection_by_name(&name)
        .await
        .expect("get should succeed");
    let names: Vec<&str> = collection.requests.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["first", "second", "third"]);
    assert!(collection.requests.iter().all(|r| r.collection_id == id));
    assert_eq!(collection.requests[1].kind(), RequestKind::Graphql);
}

pub async fn test_add_requests_preserves_payload<S: CollectionStore>(store: &S) {
    let name = unique_name("payload");
    create_named(store, &name).await;
    let http = make_http_request("http");
    let graphql = make_graphql_request("graphql");

    store
        .add_requests_to_collection(&name, vec![http.clone(), graphql.clone()])
        .await
        .expect("add should succeed");

    let collection = store
        .get_collection_by_name(&name)
        .await
        .expect("get should succeed");
    assert_eq!(collection.requests[0].id, http.id);
    assert_eq!(collection.requests[0].payload, http.payload);
    assert_eq!(collection.requests[1].id, graphql.id);
    assert_eq!(collection.requests[1].payload, graphql.payload);
}

pub async fn test_add_requests_unknown_collection<S: CollectionStore>(store: &S) {
    let result = store
        .add_requests_to_collection(&unique_name("missing"), vec![make_http_request("r")])
        .await;
    assert!(matches!(result, Err(StorageError::CollectionNotFound(_))));
}

pub async fn test_add_requests_first_match_by_name<S: CollectionStore>(store: &S) {
    let name = unique_name("dup");
    let first = create_named(store, &name).await;
    let second = create_named(store, &name).await;

    store
        .add_requests_to_collection(&name, vec![make_http_request("r")])
        .await
        .expect("add should succeed");

    let fetched = store
        .get_collection_by_name(&name)
        .await
        .expect("get should succeed");
    assert_eq!(fetched.id, first);
    assert_eq!(fetched.requests.len(), 1);

    let other = store.get_by_id(&second).await.expect("get should succeed");
    assert_eq!(other.name, name);
}

pub async fn test_add_requests_batch_is_atomic<S: CollectionStore>(store: &S) {
    let name = unique_name("atomic");
    create_named(store, &name).await;
    let repeated = make_http_request("x");
    let batch = vec![
        repeated.clone(),
        make_graphql_request("y"),
        repeated,
    ];

    let result = store.add_requests_to_collection(&name, batch).await;
    assert!(
        matches!(result, Err(StorageError::Database(_))),
        "batch with a repeated request id should fail"
    );

    let collection = store
        .get_collection_by_name(&name)
        .await
        .expect("get should succeed");
    assert!(
        collection.requests.is_empty(),
        "no row of a failed batch should be stored"
    );
}

// =============================================================================
// CollectionStore::list_collections_and_requests tests
// =============================================================================

pub async fn test_list_includes_requests<S: CollectionStore>(store: &S) {
    let full = unique_name("list_full");
    let empty = unique_name("list_empty");
    let full_id = create_named(store, &full).await;
    let empty_id = create_named(store, &empty).await;
    store
        .add_requests_to_collection(&full, vec![make_http_request("a"), make_http_request("b")])
        .await
        .expect("add should succeed");

    let collections = store
        .list_collections_and_requests()
        .await
        .expect("list should succeed");

    let full_pos = collections.iter().position(|c| c.id == full_id).expect("listed");
    let empty_pos = collections.iter().position(|c| c.id == empty_id).expect("listed");
    assert!(full_pos < empty_pos, "collections should list in insertion order");
    assert_eq!(collections[full_pos].requests.len(), 2);
    assert!(collections[empty_pos].requests.is_empty());
}

// =============================================================================
// CollectionStore::update tests
// =============================================================================

pub async fn test_update_overwrites_row<S: CollectionStore>(store: &S) {
    let name = unique_name("update");
    let id = create_named(store, &name).await;
    store
        .add_requests_to_collection(&name, vec![make_http_request("kept")])
        .await
        .expect("add should succeed");

    let mut collection = store.get_by_id(&id).await.expect("get should succeed");
    collection.name = format!("{}_renamed", name);
    collection.description = Some("changed".to_string());

    let updated = store.update(collection).await.expect("update should succeed");
    assert_eq!(updated.id, id);
    assert_eq!(updated.description.as_deref(), Some("changed"));

    let reloaded = store
        .get_collection_by_name(&format!("{}_renamed", name))
        .await
        .expect("renamed collection should resolve");
    assert_eq!(reloaded.requests.len(), 1);
}

pub async fn test_update_inserts_missing_row<S: CollectionStore>(store: &S) {
    let collection = Collection::new(unique_name("upsert"), None);
    let id = collection.id.clone();

    store.update(collection).await.expect("update should succeed");

    assert!(store.get_by_id(&id).await.is_ok());
}

// =============================================================================
// CollectionStore::update_request_in_collection tests
// =============================================================================

pub async fn test_update_request_partial<S: CollectionStore>(store: &S) {
    let name = unique_name("patch");
    let id = create_named(store, &name).await;
    let request = make_http_request("before");
    store
        .add_requests_to_collection(&name, vec![request.clone()])
        .await
        .expect("add should succeed");

    let outcome = store
        .update_request_in_collection(
            &id,
            &request.id,
            RequestPatch {
                name: Some("after".to_string()),
                http_url: Some("https://api.example.com/v2".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("update should succeed");
    assert_eq!(outcome.message, REQUEST_UPDATED_MESSAGE);
    assert_eq!(outcome.request_id, request.id);

    let stored = store
        .get_collection_by_name(&name)
        .await
        .expect("get should succeed");
    let updated = &stored.requests[0];
    assert_eq!(updated.name, "after");
    let RequestPayload::Http(http) = &updated.payload else {
        panic!("kind should be unchanged");
    };
    assert_eq!(http.url, "https://api.example.com/v2");
    assert_eq!(http.method, "GET");
    assert_eq!(http.headers, r#"{"Accept":"application/json"}"#);
}

pub async fn test_update_request_empty_patch<S: CollectionStore>(store: &S) {
    let name = unique_name("empty_patch");
    let id = create_named(store, &name).await;
    let request = make_graphql_request("same");
    store
        .add_requests_to_collection(&name, vec![request.clone()])
        .await
        .expect("add should succeed");

    store
        .update_request_in_collection(&id, &request.id, RequestPatch::default())
        .await
        .expect("empty patch should succeed");

    let stored = store
        .get_collection_by_name(&name)
        .await
        .expect("get should succeed");
    assert_eq!(stored.requests[0].payload, request.payload);
}

pub async fn test_update_request_wrong_collection<S: CollectionStore>(store: &S) {
    let owner = unique_name("owner");
    create_named(store, &owner).await;
    let stranger = create_named(store, &unique_name("stranger")).await;
    let request = make_http_request("owned");
    store
        .add_requests_to_collection(&owner, vec![request.clone()])
        .await
        .expect("add should succeed");

    let result = store
        .update_request_in_collection(
            &stranger,
            &request.id,
            RequestPatch {
                name: Some("hijacked".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(StorageError::RequestNotFound { .. })));

    let stored = store
        .get_collection_by_name(&owner)
        .await
        .expect("get should succeed");
    assert_eq!(stored.requests[0].name, "owned");
}

// =============================================================================
// CollectionStore::delete_collection tests
// =============================================================================

pub async fn test_delete_collection_cascades<S: CollectionStore>(store: &S) {
    let name = unique_name("cascade");
    let id = create_named(store, &name).await;
    let request = make_http_request("doomed");
    store
        .add_requests_to_collection(&name, vec![request.clone()])
        .await
        .expect("add should succeed");

    store
        .delete_collection(&id)
        .await
        .expect("delete should succeed");

    assert!(matches!(
        store.get_by_id(&id).await,
        Err(StorageError::CollectionNotFound(_))
    ));
    let listed = store
        .list_collections_and_requests()
        .await
        .expect("list should succeed");
    assert!(listed
        .iter()
        .flat_map(|c| c.requests.iter())
        .all(|r| r.id != request.id));
    assert!(matches!(
        store.remove_request_from_collection(&id, &request.id).await,
        Err(StorageError::RequestNotFound { .. })
    ));
}

pub async fn test_delete_collection_nonexistent<S: CollectionStore>(store: &S) {
    store
        .delete_collection(&Uuid::new_v4().to_string())
        .await
        .expect("deleting an unknown id should succeed");
}

// =============================================================================
// CollectionStore::remove_request_from_collection tests
// =============================================================================

pub async fn test_remove_request<S: CollectionStore>(store: &S) {
    let name = unique_name("remove");
    let id = create_named(store, &name).await;
    let gone = make_http_request("gone");
    let kept = make_http_request("kept");
    store
        .add_requests_to_collection(&name, vec![gone.clone(), kept.clone()])
        .await
        .expect("add should succeed");

    store
        .remove_request_from_collection(&id, &gone.id)
        .await
        .expect("remove should succeed");

    let stored = store
        .get_collection_by_name(&name)
        .await
        .expect("get should succeed");
    assert_eq!(stored.requests.len(), 1);
    assert_eq!(stored.requests[0].id, kept.id);
}

pub async fn test_remove_request_nonexistent<S: CollectionStore>(store: &S) {
    let id = create_named(store, &unique_name("remove_missing")).await;

    let result = store
        .remove_request_from_collection(&id, &Uuid::new_v4().to_string())
        .await;
    assert!(matches!(result, Err(StorageError::RequestNotFound { .. })));
}

/// Run all CollectionStore interface tests against a store implementation.
#[macro_export]
macro_rules! run_collection_store_tests {
    ($store:expr) => {
        use $crate::storage::collection_store_tests::*;

        // create / get tests
        test_create_and_get_by_id($store).await;
        println!("  test_create_and_get_by_id: PASSED");

        test_create_generates_missing_id($store).await;
        println!("  test_create_generates_missing_id: PASSED");

        test_get_by_id_nonexistent($store).await;
        println!("  test_get_by_id_nonexistent: PASSED");

        // add tests
        test_add_requests_preserves_order($store).await;
        println!("  test_add_requests_preserves_order: PASSED");

        test_add_requests_preserves_payload($store).await;
        println!("  test_add_requests_preserves_payload: PASSED");

        test_add_requests_unknown_collection($store).await;
        println!("  test_add_requests_unknown_collection: PASSED");

        test_add_requests_first_match_by_name($store).await;
        println!("  test_add_requests_first_match_by_name: PASSED");

        test_add_requests_batch_is_atomic($store).await;
        println!("  test_add_requests_batch_is_atomic: PASSED");

        // list tests
        test_list_includes_requests($store).await;
        println!("  test_list_includes_requests: PASSED");

        // update tests
        test_update_overwrites_row($store).await;
        println!("  test_update_overwrites_row: PASSED");

        test_update_inserts_missing_row($store).await;
        println!("  test_update_inserts_missing_row: PASSED");

        test_update_request_partial($store).await;
        println!("  test_update_request_partial: PASSED");

        test_update_request_empty_patch($store).await;
        println!("  test_update_request_empty_patch: PASSED");

        test_update_request_wrong_collection($store).await;
        println!("  test_update_request_wrong_collection: PASSED");

        // delete tests
        test_delete_collection_cascades($store).await;
        println!("  test_delete_collection_cascades: PASSED");

        test_delete_collection_nonexistent($store).await;
        println!("  test_delete_collection_nonexistent: PASSED");

        test_remove_request($store).await;
        println!("  test_remove_request: PASSED");

        test_remove_request_nonexistent($store).await;
        println!("  test_remove_request_nonexistent: PASSED");
    };
}
