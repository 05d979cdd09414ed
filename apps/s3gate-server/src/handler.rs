//! Downstream handler reporting the gate's decision.
//!
//! s3gate runs as an authorization sidecar: a reverse proxy sends each
//! request here (auth-subrequest style) and forwards it to storage only on a
//! 2xx answer. Requests that reach this handler have already passed the gate,
//! so it only reports how.

use std::convert::Infallible;
use std::future::{Ready, ready};

use hyper::service::Service;
use s3gate_http::{GateResponseBody, PublicAccess};

/// `public` or `authenticated`.
pub const ACCESS_HEADER: &str = "x-s3gate-access";
/// IAM name of the action a public request was classified as.
pub const ACTION_HEADER: &str = "x-s3gate-action";
/// `policy` or `acl`: the document that allowed a public request.
pub const GRANT_HEADER: &str = "x-s3gate-grant";

/// Answers `200 OK` describing how the request was authorized.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecisionHandler;

impl<B> Service<http::Request<B>> for DecisionHandler {
    type Response = http::Response<GateResponseBody>;
    type Error = Infallible;
    type Future = Ready<Result<Self::Response, Self::Error>>;

    fn call(&self, req: http::Request<B>) -> Self::Future {
        ready(Ok(decision_response(req.extensions().get::<PublicAccess>())))
    }
}

fn decision_response(access: Option<&PublicAccess>) -> http::Response<GateResponseBody> {
    let builder = http::Response::builder().status(http::StatusCode::OK);
    let builder = match access {
        Some(PublicAccess(grant)) => builder
            .header(ACCESS_HEADER, "public")
            .header(ACTION_HEADER, grant.action.as_str())
            .header(GRANT_HEADER, grant.source.as_str()),
        None => builder.header(ACCESS_HEADER, "authenticated"),
    };
    builder
        .body(GateResponseBody::empty())
        .expect("static decision response should be valid")
}
