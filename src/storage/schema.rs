//! Database schema definitions using sea-query.
//!
//! These define the table and column identifiers for type-safe query building.
//! Both tables carry an auto-incrementing `position` key that records insertion
//! order; the opaque `id` is a separate unique column.

use sea_query::Iden;

/// Collections table schema.
#[derive(Iden, Clone, Copy)]
pub enum Collections {
    Table,
    #[iden = "position"]
    Position,
    #[iden = "id"]
    Id,
    #[iden = "name"]
    Name,
    #[iden = "description"]
    Description,
}

/// Requests table schema.
#[derive(Iden, Clone, Copy)]
pub enum Requests {
    Table,
    #[iden = "position"]
    Position,
    #[iden = "id"]
    Id,
    #[iden = "collection_id"]
    CollectionId,
    #[iden = "kind"]
    Kind,
    #[iden = "name"]
    Name,
    #[iden = "http_method"]
    HttpMethod,
    #[iden = "http_url"]
    HttpUrl,
    #[iden = "http_headers"]
    HttpHeaders,
    #[iden = "http_query_params"]
    HttpQueryParams,
    #[iden = "http_body"]
    HttpBody,
    #[iden = "graphql_endpoint"]
    GraphqlEndpoint,
    #[iden = "graphql_query"]
    GraphqlQuery,
    #[iden = "graphql_variables"]
    GraphqlVariables,
    #[iden = "graphql_headers"]
    GraphqlHeaders,
}

/// Columns read when loading a collection row.
pub const COLLECTION_COLUMNS: [Collections; 3] =
    [Collections::Id, Collections::Name, Collections::Description];

/// Columns read and written for a request row, in insert order.
pub const REQUEST_COLUMNS: [Requests; 13] = [
    Requests::Id,
    Requests::CollectionId,
    Requests::Kind,
    Requests::Name,
    Requests::HttpMethod,
    Requests::HttpUrl,
    Requests::HttpHeaders,
    Requests::HttpQueryParams,
    Requests::HttpBody,
    Requests::GraphqlEndpoint,
    Requests::GraphqlQuery,
    Requests::GraphqlVariables,
    Requests::GraphqlHeaders,
];

/// SQLite schema, one statement per entry.
pub const SQLITE_SCHEMA: &[&str] = &[
    r#"
CREATE TABLE IF NOT EXISTS collections (
    position INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    description TEXT
)"#,
    "CREATE INDEX IF NOT EXISTS idx_collections_name ON collections(name)",
    r#"
CREATE TABLE IF NOT EXISTS requests (
    position INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    collection_id TEXT NOT NULL REFERENCES collections(id) ON DELETE CASCADE,
    kind TEXT NOT NULL,
    name TEXT NOT NULL,
    http_method TEXT,
    http_url TEXT,
    http_headers TEXT,
    http_query_params TEXT,
    http_body TEXT,
    graphql_endpoint TEXT,
    graphql_query TEXT,
    graphql_variables TEXT,
    graphql_headers TEXT
)"#,
    "CREATE INDEX IF NOT EXISTS idx_requests_collection_id ON requests(collection_id)",
];

/// PostgreSQL schema, one statement per entry.
pub const POSTGRES_SCHEMA: &[&str] = &[
    r#"
CREATE TABLE IF NOT EXISTS collections (
    position BIGSERIAL PRIMARY KEY,
    id TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    description TEXT
)"#,
    "CREATE INDEX IF NOT EXISTS idx_collections_name ON collections(name)",
    r#"
CREATE TABLE IF NOT EXISTS requests (
    position BIGSERIAL PRIMARY KEY,
    id TEXT NOT NULL UNIQUE,
    collection_id TEXT NOT NULL REFERENCES collections(id) ON DELETE CASCADE,
    kind TEXT NOT NULL,
    name TEXT NOT NULL,
    http_method TEXT,
    http_url TEXT,
    http_headers TEXT,
    http_query_params TEXT,
    http_body TEXT,
    graphql_endpoint TEXT,
    graphql_query TEXT,
    graphql_variables TEXT,
    graphql_headers TEXT
)"#,
    "CREATE INDEX IF NOT EXISTS idx_requests_collection_id ON requests(collection_id)",
];
