//! Domain entities.
//!
//! A [`Collection`] exclusively owns its [`Request`]s. Each request carries
//! exactly one payload variant, selected by its [`RequestKind`]. JSON-valued
//! fields are kept as raw JSON text and are opaque to the store.

use std::fmt;
use std::str::FromStr;

/// Confirmation message returned after a request update.
pub const REQUEST_UPDATED_MESSAGE: &str = "Request Updated successfully";

/// A named group of request templates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collection {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// Owned requests in insertion order. Empty unless eager-loaded.
    pub requests: Vec<Request>,
}

impl Collection {
    /// Create a collection with a freshly generated id and no requests.
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            description,
            requests: Vec::new(),
        }
    }
}

/// Request discriminant as persisted in the `kind` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Http,
    Graphql,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Http => "HTTP",
            RequestKind::Graphql => "GRAPHQL",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a stored kind string is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unrecognized request kind: {0}")]
pub struct UnknownKind(pub String);

impl FromStr for RequestKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HTTP" => Ok(RequestKind::Http),
            "GRAPHQL" => Ok(RequestKind::Graphql),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

/// HTTP call template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpPayload {
    pub method: String,
    pub url: String,
    /// JSON object text.
    pub headers: String,
    /// JSON object text.
    pub query_params: String,
    /// Arbitrary text, typically JSON.
    pub body: Option<String>,
}

/// GraphQL call template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphqlPayload {
    pub endpoint: String,
    pub query: String,
    /// JSON object text.
    pub variables: Option<String>,
    /// JSON object text.
    pub headers: String,
}

/// Variant-specific request fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestPayload {
    Http(HttpPayload),
    Graphql(GraphqlPayload),
}

impl RequestPayload {
    pub fn kind(&self) -> RequestKind {
        match self {
            RequestPayload::Http(_) => RequestKind::Http,
            RequestPayload::Graphql(_) => RequestKind::Graphql,
        }
    }
}

/// A request template owned by a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub id: String,
    pub collection_id: String,
    pub name: String,
    pub payload: RequestPayload,
}

impl Request {
    pub fn kind(&self) -> RequestKind {
        self.payload.kind()
    }
}

/// Field-level partial update of a stored request.
///
/// Only `Some` fields are written; `None` leaves the stored column untouched.
/// There is no way to clear a column through a patch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestPatch {
    pub kind: Option<RequestKind>,
    pub name: Option<String>,
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

impl RequestPatch {
    /// True when no field is supplied.
    pub fn is_empty(&self) -> bool {
        self == &RequestPatch::default()
    }
}

/// Result of a successful request update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRequestOutcome {
    pub message: String,
    pub request_id: String,
}

/// Generate a new opaque identifier.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_column_text() {
        for kind in [RequestKind::Http, RequestKind::Graphql] {
            assert_eq!(kind.as_str().parse::<RequestKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let err = "SOAP".parse::<RequestKind>().unwrap_err();
        assert_eq!(err, UnknownKind("SOAP".to_string()));
    }

    #[test]
    fn test_new_collection_ids_are_unique() {
        let a = Collection::new("Dup", None);
        let b = Collection::new("Dup", None);
        assert_ne!(a.id, b.id);
        assert!(a.requests.is_empty());
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(RequestPatch::default().is_empty());
        let patch = RequestPatch {
            name: Some("renamed".to_string()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
