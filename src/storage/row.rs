//! Flat row representation of requests.
//!
//! The domain [`Request`] is a sum type; the `requests` table stores both
//! variants in one row with nullable variant columns. Translation between the
//! two happens only here.

use sea_query::SimpleExpr;
use sqlx::{ColumnIndex, Decode, Row, Type};

use super::schema::Requests;
use crate::model::{
    Collection, GraphqlPayload, HttpPayload, Request, RequestKind, RequestPatch, RequestPayload,
    UnknownKind,
};

/// One row of the `requests` table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestRow {
    pub id: String,
    pub collection_id: String,
    pub kind: String,
    pub name: String,
    pub http_method: Option<String>,
    pub http_url: Option<String>,
    pub http_headers: Option<String>,
    pub http_query_params: Option<String>,
    pub http_body: Option<String>,
    pub graphql_endpoint: Option<String>,
    pub graphql_query: Option<String>,
    pub graphql_variables: Option<String>,
    pub graphql_headers: Option<String>,
}

impl RequestRow {
    /// Decode a row selected with [`super::schema::REQUEST_COLUMNS`].
    pub fn from_row<'r, R>(row: &'r R) -> Result<Self, sqlx::Error>
    where
        R: Row,
        for<'a> &'a str: ColumnIndex<R>,
        String: Decode<'r, R::Database> + Type<R::Database>,
    {
        Ok(Self {
            id: row.try_get("id")?,
            collection_id: row.try_get("collection_id")?,
            kind: row.try_get("kind")?,
            name: row.try_get("name")?,
            http_method: row.try_get("http_method")?,
            http_url: row.try_get("http_url")?,
            http_headers: row.try_get("http_headers")?,
            http_query_params: row.try_get("http_query_params")?,
            http_body: row.try_get("http_body")?,
            graphql_endpoint: row.try_get("graphql_endpoint")?,
            graphql_query: row.try_get("graphql_query")?,
            graphql_variables: row.try_get("graphql_variables")?,
            graphql_headers: row.try_get("graphql_headers")?,
        })
    }

    /// Values in [`super::schema::REQUEST_COLUMNS`] order.
    pub fn into_values(self) -> [SimpleExpr; 13] {
        [
            self.id.into(),
            self.collection_id.into(),
            self.kind.into(),
            self.name.into(),
            self.http_method.into(),
            self.http_url.into(),
            self.http_headers.into(),
            self.http_query_params.into(),
            self.http_body.into(),
            self.graphql_endpoint.into(),
            self.graphql_query.into(),
            self.graphql_variables.into(),
            self.graphql_headers.into(),
        ]
    }
}

impl From<Request> for RequestRow {
    fn from(request: Request) -> Self {
        let mut row = RequestRow {
            id: request.id,
            collection_id: request.collection_id,
            kind: request.payload.kind().as_str().to_string(),
            name: request.name,
            ..Default::default()
        };
        match request.payload {
            RequestPayload::Http(http) => {
                row.http_method = Some(http.method);
                row.http_url = Some(http.url);
                row.http_headers = Some(http.headers);
                row.http_query_params = Some(http.query_params);
                row.http_body = http.body;
            }
            RequestPayload::Graphql(graphql) => {
                row.graphql_endpoint = Some(graphql.endpoint);
                row.graphql_query = Some(graphql.query);
                row.graphql_variables = graphql.variables;
                row.graphql_headers = Some(graphql.headers);
            }
        }
        row
    }
}

impl TryFrom<RequestRow> for Request {
    type Error = UnknownKind;

    /// Columns belonging to the other variant are ignored.
    fn try_from(row: RequestRow) -> Result<Self, Self::Error> {
        let payload = match row.kind.parse::<RequestKind>()? {
            RequestKind::Http => RequestPayload::Http(HttpPayload {
                method: row.http_method.unwrap_or_default(),
                url: row.http_url.unwrap_or_default(),
                headers: row.http_headers.unwrap_or_default(),
                query_params: row.http_query_params.unwrap_or_default(),
                body: row.http_body,
            }),
            RequestKind::Graphql => RequestPayload::Graphql(GraphqlPayload {
                endpoint: row.graphql_endpoint.unwrap_or_default(),
                query: row.graphql_query.unwrap_or_default(),
                variables: row.graphql_variables,
                headers: row.graphql_headers.unwrap_or_default(),
            }),
        };
        Ok(Request {
            id: row.id,
            collection_id: row.collection_id,
            name: row.name,
            payload,
        })
    }
}

/// Decode a row selected with [`super::schema::COLLECTION_COLUMNS`].
///
/// Requests are left empty; callers eager-load them separately.
pub fn collection_from_row<'r, R>(row: &'r R) -> Result<Collection, sqlx::Error>
where
    R: Row,
    for<'a> &'a str: ColumnIndex<R>,
    String: Decode<'r, R::Database> + Type<R::Database>,
{
    Ok(Collection {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        requests: Vec::new(),
    })
}

/// Column assignments for the fields present in a patch.
pub fn patch_assignments(patch: RequestPatch) -> Vec<(Requests, SimpleExpr)> {
    let RequestPatch {
        kind,
        name,
        http_method,
        http_url,
        http_headers,
        http_query_params,
        http_body,
        graphql_endpoint,
        graphql_query,
        graphql_variables,
        graphql_headers,
    } = patch;

    let fields = [
        (Requests::Kind, kind.map(|k| k.as_str().to_string())),
        (Requests::Name, name),
        (Requests::HttpMethod, http_method),
        (Requests::HttpUrl, http_url),
        (Requests::HttpHeaders, http_headers),
        (Requests::HttpQueryParams, http_query_params),
        (Requests::HttpBody, http_body),
        (Requests::GraphqlEndpoint, graphql_endpoint),
        (Requests::GraphqlQuery, graphql_query),
        (Requests::GraphqlVariables, graphql_variables),
        (Requests::GraphqlHeaders, graphql_headers),
    ];

    fields
        .into_iter()
        .filter_map(|(column, value)| value.map(|v| (column, v.into())))
        .collect()
}
