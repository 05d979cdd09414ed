//! Extraction of [`GateRequest`] from HTTP request parts.

use http::header::AUTHORIZATION;
use http::request::Parts;
use s3gate_core::GateRequest;

/// Build the gate's view of a request.
///
/// The path is taken raw (not percent-decoded). An `Authorization` header
/// only counts when it is non-empty.
#[must_use]
pub fn gate_request_from_parts(parts: &Parts) -> GateRequest {
    let has_authorization = parts
        .headers
        .get(AUTHORIZATION)
        .is_some_and(|v| !v.as_bytes().is_empty());
    GateRequest::new(
        parts.method.clone(),
        parts.uri.path(),
        parts.uri.query(),
        has_authorization,
    )
}
