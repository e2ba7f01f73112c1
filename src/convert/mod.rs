//! Conversion between wire messages and domain entities.
//!
//! Wire -> domain serializes map and struct fields to JSON text; domain ->
//! wire decodes them again. All functions are pure.

use std::collections::{BTreeMap, HashMap};

use prost_types::value::Kind;
use prost_types::{ListValue, Struct, Value};

use crate::model::{
    new_id, Collection, GraphqlPayload, HttpPayload, Request, RequestKind, RequestPatch,
    RequestPayload,
};
use crate::proto;


/// Errors raised while converting wire messages.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("Request kind must be specified")]
    UnspecifiedKind,

    #[error("Failed to serialize {field}: {reason}")]
    Serialization { field: &'static str, reason: String },

    #[error("Invalid JSON in {field}: {reason}")]
    InvalidJson { field: &'static str, reason: String },
}

// =============================================================================
// Wire -> Domain
// =============================================================================

/// Convert request inputs into domain requests owned by `collection_id`.
///
/// Each request gets a fresh id. Fails on the first input that cannot be
/// serialized.
pub fn convert_requests(
    inputs: Vec<proto::CollectionRequestInput>,
    collection_id: &str,
) -> Result<Vec<Request>, ConvertError> {
    inputs
        .into_iter()
        .map(|input| convert_request_input(input, collection_id))
        .collect()
}

fn convert_request_input(
    input: proto::CollectionRequestInput,
    collection_id: &str,
) -> Result<Request, ConvertError> {
    let payload = match input.kind() {
        proto::RequestKind::Http => {
            let http = input.http.unwrap_or_default();
            let body = http
                .body
                .as_ref()
                .map(|body| value_to_json("http body", body))
                .transpose()?
                .map(|body| body.to_string());
            RequestPayload::Http(HttpPayload {
                method: http.method().as_str_name().to_string(),
                url: http.url,
                headers: map_to_json("http headers", http.headers)?,
                query_params: map_to_json("http query params", http.query_params)?,
                body,
            })
        }
        proto::RequestKind::Graphql => {
            let graphql = input.graphql.unwrap_or_default();
            let variables = graphql
                .variables
                .as_ref()
                .map(|variables| struct_to_json("graphql variables", variables))
                .transpose()?
                .map(|variables| variables.to_string());
            RequestPayload::Graphql(GraphqlPayload {
                endpoint: graphql.endpoint,
                query: graphql.query,
                variables,
                headers: map_to_json("graphql headers", graphql.headers)?,
            })
        }
        proto::RequestKind::Unspecified => return Err(ConvertError::UnspecifiedKind),
    };

    Ok(Request {
        id: new_id(),
        collection_id: collection_id.to_string(),
        name: input.name,
        payload,
    })
}

/// Build a patch from an update message.
///
/// Empty strings and an unspecified kind are treated as absent. JSON-valued
/// fields must be well-formed JSON; the body is arbitrary text.
pub fn convert_patch(
    update: &proto::UpdateRequestInCollectionRequest,
) -> Result<RequestPatch, ConvertError> {
    let kind = match update.kind() {
        proto::RequestKind::Http => Some(RequestKind::Http),
        proto::RequestKind::Graphql => Some(RequestKind::Graphql),
        proto::RequestKind::Unspecified => None,
    };

    Ok(RequestPatch {
        kind,
        name: non_empty(&update.name),
        http_method: non_empty(&update.http_method),
        http_url: non_empty(&update.http_url),
        http_headers: json_field("http headers", &update.http_headers)?,
        http_query_params: json_field("http query params", &update.http_query_params)?,
        http_body: non_empty(&update.http_body),
        graphql_endpoint: non_empty(&update.graphql_endpoint),
        graphql_query: non_empty(&update.graphql_query),
        graphql_variables: json_field("graphql variables", &update.graphql_variables)?,
        graphql_headers: json_field("graphql headers", &update.graphql_headers)?,
    })
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn json_field(field: &'static str, value: &str) -> Result<Option<String>, ConvertError> {
    if value.is_empty() {
        return Ok(None);
    }
    serde_json::from_str::<serde_json::Value>(value).map_err(|e| ConvertError::InvalidJson {
        field,
        reason: e.to_string(),
    })?;
    Ok(Some(value.to_string()))
}

/// Serialize a string map as a JSON object with sorted keys.
fn map_to_json(
    field: &'static str,
    map: HashMap<String, String>,
) -> Result<String, ConvertError> {
    let sorted: BTreeMap<String, String> = map.into_iter().collect();
    serde_json::to_string(&sorted).map_err(|e| ConvertError::Serialization {
        field,
        reason: e.to_string(),
    })
}

fn struct_to_json(field: &'static str, value: &Struct) -> Result<serde_json::Value, ConvertError> {
    let mut object = serde_json::Map::with_capacity(value.fields.len());
    for (key, value) in &value.fields {
        object.insert(key.clone(), value_to_json(field, value)?);
    }
    Ok(serde_json::Value::Object(object))
}

fn value_to_json(field: &'static str, value: &Value) -> Result<serde_json::Value, ConvertError> {
    let json = match &value.kind {
        None | Some(Kind::NullValue(_)) => serde_json::Value::Null,
        Some(Kind::BoolValue(b)) => serde_json::Value::Bool(*b),
        Some(Kind::StringValue(s)) => serde_json::Value::String(s.clone()),
        Some(Kind::NumberValue(n)) => number_to_json(field, *n)?,
        Some(Kind::StructValue(s)) => struct_to_json(field, s)?,
        Some(Kind::ListValue(list)) => serde_json::Value::Array(
            list.values
                .iter()
                .map(|v| value_to_json(field, v))
                .collect::<Result<_, _>>()?,
        ),
    };
    Ok(json)
}

/// Whole numbers in the i64 range are written without a fraction.
fn number_to_json(field: &'static str, n: f64) -> Result<serde_json::Value, ConvertError> {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        return Ok(serde_json::Value::from(n as i64));
    }
    serde_json::Number::from_f64(n)
        .map(serde_json::Value::Number)
        .ok_or_else(|| ConvertError::Serialization {
            field,
            reason: format!("{} is not a finite number", n),
        })
}

// =============================================================================
// Domain -> Wire
// =============================================================================

/// Convert a collection to its wire form.
///
/// A missing description becomes an empty string and `request_count` equals
/// the number of converted requests.
pub fn convert_collection(collection: Collection) -> proto::CollectionResponse {
    let requests: Vec<proto::CollectionRequest> = collection
        .requests
        .into_iter()
        .map(convert_request)
        .collect();

    proto::CollectionResponse {
        id: collection.id,
        name: collection.name,
        description: collection.description.unwrap_or_default(),
        request_count: requests.len() as i32,
        requests,
    }
}

/// Convert a list of collections, as returned by the listing operation.
pub fn convert_collections(collections: Vec<Collection>) -> Vec<proto::CollectionResponse> {
    collections.into_iter().map(convert_collection).collect()
}

/// Convert a domain request to the wire variant selected by its kind.
pub fn convert_request(request: Request) -> proto::CollectionRequest {
    use proto::collection_request::Request as Variant;

    let variant = match request.payload {
        RequestPayload::Http(http) => {
            let method =
                proto::HttpMethod::from_str_name(&http.method).unwrap_or(proto::HttpMethod::Get);
            Variant::HttpRequest(proto::HttpRequest {
                id: request.id,
                name: request.name,
                method: method as i32,
                url: http.url,
                headers: json_to_map(&http.headers),
                query_params: json_to_map(&http.query_params),
                body: http.body.as_deref().map(text_to_value),
            })
        }
        RequestPayload::Graphql(graphql) => Variant::GraphqlRequest(proto::GraphqlRequest {
            id: request.id,
            name: request.name,
            endpoint: graphql.endpoint,
            query: graphql.query,
            variables: graphql.variables.as_deref().and_then(text_to_struct),
            headers: json_to_map(&graphql.headers),
        }),
    };

    proto::CollectionRequest {
        request: Some(variant),
    }
}

/// Decode a JSON object into a string map.
///
/// Non-string values are rendered as JSON text. Anything other than a JSON
/// object yields an empty map.
fn json_to_map(text: &str) -> HashMap<String, String> {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(serde_json::Value::Object(object)) => object
            .into_iter()
            .map(|(key, value)| match value {
                serde_json::Value::String(s) => (key, s),
                other => (key, other.to_string()),
            })
            .collect(),
        _ => HashMap::new(),
    }
}

/// Decode JSON text into a protobuf value; non-JSON text becomes a string value.
fn text_to_value(text: &str) -> Value {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(json) => json_to_value(json),
        Err(_) => Value {
            kind: Some(Kind::StringValue(text.to_string())),
        },
    }
}

fn text_to_struct(text: &str) -> Option<Struct> {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(serde_json::Value::Object(object)) => Some(object_to_struct(object)),
        _ => None,
    }
}

fn object_to_struct(object: serde_json::Map<String, serde_json::Value>) -> Struct {
    Struct {
        fields: object
            .into_iter()
            .map(|(key, value)| (key, json_to_value(value)))
            .collect(),
    }
}

fn json_to_value(json: serde_json::Value) -> Value {
    let kind = match json {
        serde_json::Value::Null => Kind::NullValue(0),
        serde_json::Value::Bool(b) => Kind::BoolValue(b),
        serde_json::Value::Number(n) => Kind::NumberValue(n.as_f64().unwrap_or_default()),
        serde_json::Value::String(s) => Kind::StringValue(s),
        serde_json::Value::Array(values) => Kind::ListValue(ListValue {
            values: values.into_iter().map(json_to_value).collect(),
        }),
        serde_json::Value::Object(object) => Kind::StructValue(object_to_struct(object)),
    };
    Value { kind: Some(kind) }
}
