//! Transport helpers for the gRPC server.

use tower_http::trace::TraceLayer;

/// Header carrying a caller-supplied correlation id.
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// Request tracing layer for the gRPC server.
///
/// Every request runs inside a `grpc` span carrying the request path and the
/// correlation id header (empty when absent).
pub fn grpc_trace_layer() -> TraceLayer<
    tower_http::classify::SharedClassifier<tower_http::classify::GrpcErrorsAsFailures>,
    impl Fn(&http::Request<tonic::body::BoxBody>) -> tracing::Span + Clone,
> {
    TraceLayer::new_for_grpc().make_span_with(|request: &http::Request<tonic::body::BoxBody>| {
        let correlation_id = correlation_id(request.headers());
        let path = request.uri().path();
        tracing::info_span!("grpc", %correlation_id, %path)
    })
}

fn correlation_id(headers: &http::HeaderMap) -> &str {
    headers
        .get(CORRELATION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}
