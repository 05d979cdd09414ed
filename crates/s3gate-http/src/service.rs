//! [`PublicAccessService`]: hyper middleware running the public access gate.
//!
//! For each request the service:
//!
//! 1. Assigns a request ID (`x-amz-request-id`)
//! 2. Extracts a [`GateRequest`] from the request parts
//! 3. Asks the [`PublicAccessGate`] for a decision
//! 4. Forwards skipped and allowed requests to the inner service, tagging
//!    allowed ones with the [`PublicAccess`] extension
//! 5. Answers denials and backend failures through [`send_error`]

use std::convert::Infallible;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use http_body_util::Either;
use hyper::service::Service;
use s3gate_core::audit::{AuditEntry, AuditLogger, Outcome, TracingAuditLogger};
use s3gate_core::metrics::GateMetrics;
use s3gate_core::{GateDecision, GateError, GateRequest, PublicAccessGate, PublicAccessGrant};
use s3gate_model::S3Action;
use tracing::debug;
use uuid::Uuid;

use crate::body::GateResponseBody;
use crate::request::gate_request_from_parts;
use crate::response::{error_to_response, set_request_id};

/// Request extension marking a request as publicly authorized.
///
/// Present only on anonymous requests the gate allowed. Downstream handlers,
/// audit and metrics read it to tell public reads from authenticated ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicAccess(pub PublicAccessGrant);

/// hyper service that gates anonymous access in front of `S`.
pub struct PublicAccessService<S> {
    inner: Arc<S>,
    gate: PublicAccessGate,
    audit: Arc<dyn AuditLogger>,
    metrics: GateMetrics,
}

impl<S> PublicAccessService<S> {
    /// Wrap `inner` with `gate`, auditing through `tracing` and recording metrics.
    #[must_use]
    pub fn new(inner: S, gate: PublicAccessGate) -> Self {
        Self {
            inner: Arc::new(inner),
            gate,
            audit: Arc::new(TracingAuditLogger),
            metrics: GateMetrics::default(),
        }
    }

    /// Replace the audit logger.
    #[must_use]
    pub fn with_audit(mut self, audit: Arc<dyn AuditLogger>) -> Self {
        self.audit = audit;
        self
    }

    /// Replace the metrics handle.
    #[must_use]
    pub fn with_metrics(mut self, metrics: GateMetrics) -> Self {
        self.metrics = metrics;
        self
    }
}

impl<S> Clone for PublicAccessService<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            gate: self.gate.clone(),
            audit: Arc::clone(&self.audit),
            metrics: self.metrics,
        }
    }
}

impl<S> fmt::Debug for PublicAccessService<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicAccessService")
            .field("gate", &self.gate)
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}

impl<S, ReqB, RespB> Service<http::Request<ReqB>> for PublicAccessService<S>
where
    S: Service<http::Request<ReqB>, Response = http::Response<RespB>, Error = Infallible>
        + Send
        + Sync
        + 'static,
    S::Future: Send + 'static,
    ReqB: Send + 'static,
    RespB: Send + 'static,
{
    type Response = http::Response<Either<GateResponseBody, RespB>>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<ReqB>) -> Self::Future {
        let inner = Arc::clone(&self.inner);
        let gate = self.gate.clone();
        let audit = Arc::clone(&self.audit);
        let metrics = self.metrics;

        Box::pin(async move {
            let started = Instant::now();
            let request_id = Uuid::new_v4().to_string();
            let (mut parts, body) = req.into_parts();
            let gate_req = gate_request_from_parts(&parts);

            let decision = gate.authorize(&gate_req).await;
            let elapsed = started.elapsed().as_secs_f64();

            match decision {
                Ok(GateDecision::Skip) => {
                    debug!(
                        request_id = %request_id,
                        "authenticated request, public access gate skipped"
                    );
                    metrics.record(Outcome::Skip, None);
                    metrics.record_duration(Outcome::Skip, elapsed);
                }
                Ok(GateDecision::Allow(grant)) => {
                    audit.log(&audit_entry(
                        &gate_req,
                        &request_id,
                        Some(grant.action),
                        Outcome::Allow,
                        None,
                    ));
                    metrics.record(Outcome::Allow, Some(grant.action));
                    metrics.record_duration(Outcome::Allow, elapsed);
                    parts.extensions.insert(PublicAccess(grant));
                }
                Err(kind) => {
                    let outcome = outcome_of(&kind);
                    metrics.record_duration(outcome, elapsed);
                    let resp = send_error(kind, &gate_req, &request_id, audit.as_ref(), &metrics);
                    return Ok(resp.map(Either::Left));
                }
            }

            let mut resp = inner
                .call(http::Request::from_parts(parts, body))
                .await
                .unwrap_or_else(|e| match e {});
            set_request_id(&mut resp, &request_id);
            Ok(resp.map(Either::Right))
        })
    }
}

/// Send an error produced by the gate.
///
/// The one sending path for denials and backend failures: the error is
/// audited, counted, and rendered as an S3 XML error response.
pub fn send_error(
    kind: GateError,
    req: &GateRequest,
    request_id: &str,
    audit: &dyn AuditLogger,
    metrics: &GateMetrics,
) -> http::Response<GateResponseBody> {
    let outcome = outcome_of(&kind);
    let action = kind.action();
    let mut err = kind.into_s3_error();
    if err.resource.is_none() {
        err.resource = Some(resource_of(req));
    }

    audit.log(&audit_entry(
        req,
        request_id,
        action,
        outcome,
        Some(err.code.as_str().to_owned()),
    ));
    metrics.record(outcome, action);

    error_to_response(&err, &req.method, request_id)
}

fn outcome_of(kind: &GateError) -> Outcome {
    match kind {
        GateError::AccessDenied(_) => Outcome::Deny,
        GateError::Backend(_) => Outcome::Error,
    }
}

fn resource_of(req: &GateRequest) -> String {
    match (req.path.bucket.as_str(), req.path.object.as_str()) {
        ("", _) => "/".to_owned(),
        (bucket, "") => format!("/{bucket}"),
        (bucket, object) => format!("/{bucket}/{object}"),
    }
}

fn audit_entry(
    req: &GateRequest,
    request_id: &str,
    action: Option<S3Action>,
    outcome: Outcome,
    error_code: Option<String>,
) -> AuditEntry {
    AuditEntry {
        timestamp: Utc::now(),
        request_id: request_id.to_owned(),
        method: req.method.to_string(),
        bucket: req.path.bucket.clone(),
        object: req.path.object.clone(),
        action,
        outcome,
        error_code,
    }
}
