//! The anonymous-access authorization gate.
//!
//! [`PublicAccessGate::authorize`] runs one ordered decision procedure per
//! request:
//!
//! 1. Authenticated requests (presigned query or `Authorization` header) are
//!    skipped and left to the signed-request path.
//! 2. Anything other than `GET` or `HEAD` is denied.
//! 3. The path is split into bucket and object and the action is classified.
//!    Never-public actions are denied here.
//! 4. The bucket policy is fetched. A fetch failure other than
//!    `NoSuchBucketPolicy` is returned unchanged as [`GateError::Backend`].
//! 5. When a policy exists it alone decides. Otherwise the bucket ACL decides.
//!
//! Every denial carries an internal [`DenyReason`] for logging, but they all
//! collapse to the same `AccessDenied` wire error.

use std::fmt;
use std::sync::Arc;

use http::Method;
use s3gate_model::{S3Action, S3Error};
use tracing::{debug, info, warn};

use crate::backend::{BucketBackend, PublicAccessVerifier};
use crate::classify::classify;
use crate::path::ResourcePath;
use crate::query::QueryParams;

/// Query parameter that marks a presigned (query-authenticated) request.
pub const PRESIGNED_ALGORITHM_PARAM: &str = "X-Amz-Algorithm";

/// The request attributes the gate needs.
#[derive(Debug, Clone)]
pub struct GateRequest {
    /// HTTP method.
    pub method: Method,
    /// Bucket and object parsed from the raw path.
    pub path: ResourcePath,
    /// Decoded query parameters.
    pub query: QueryParams,
    /// Whether a non-empty `Authorization` header was sent.
    pub has_authorization: bool,
}

impl GateRequest {
    /// Build a request from its raw parts.
    #[must_use]
    pub fn new(
        method: Method,
        raw_path: &str,
        raw_query: Option<&str>,
        has_authorization: bool,
    ) -> Self {
        Self {
            method,
            path: ResourcePath::parse(raw_path),
            query: raw_query.map(QueryParams::parse).unwrap_or_default(),
            has_authorization,
        }
    }

    /// Whether the request carries any authentication signal.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.has_authorization
            || self
                .query
                .get(PRESIGNED_ALGORITHM_PARAM)
                .is_some_and(|v| !v.is_empty())
    }
}

/// Which document granted public access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantSource {
    /// The bucket policy.
    Policy,
    /// The bucket ACL (no policy configured).
    Acl,
}

impl GrantSource {
    /// Lowercase label used in logs and metrics.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Policy => "policy",
            Self::Acl => "acl",
        }
    }
}

impl fmt::Display for GrantSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A successful anonymous authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicAccessGrant {
    /// Target bucket.
    pub bucket: String,
    /// Target object key, empty for bucket-level requests.
    pub object: String,
    /// The classified action.
    pub action: S3Action,
    /// Which document allowed it.
    pub source: GrantSource,
}

/// The gate's verdict for a request that was not denied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// The request is authenticated; the gate does not apply.
    Skip,
    /// The anonymous request is allowed.
    Allow(PublicAccessGrant),
}

/// Why an anonymous request was denied. Never sent to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// The method is not `GET` or `HEAD`.
    MethodNotAllowed,
    /// The action is never publicly exposable.
    NeverPublic(S3Action),
    /// The bucket policy did not allow the action.
    PolicyDenied(S3Action),
    /// No policy is configured and the ACL did not allow the action.
    AclDenied(S3Action),
}

impl DenyReason {
    /// The classified action, if classification ran.
    #[must_use]
    pub fn action(&self) -> Option<S3Action> {
        match *self {
            Self::MethodNotAllowed => None,
            Self::NeverPublic(a) | Self::PolicyDenied(a) | Self::AclDenied(a) => Some(a),
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MethodNotAllowed => f.write_str("method not allowed for anonymous access"),
            Self::NeverPublic(a) => write!(f, "{a} is never public"),
            Self::PolicyDenied(a) => write!(f, "bucket policy denies {a}"),
            Self::AclDenied(a) => write!(f, "bucket ACL denies {a}"),
        }
    }
}

/// Errors returned by [`PublicAccessGate::authorize`].
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// The request is denied.
    #[error("access denied: {0}")]
    AccessDenied(DenyReason),

    /// The policy fetch failed for a reason other than "no policy".
    #[error("bucket policy lookup failed: {0}")]
    Backend(#[source] S3Error),
}

impl GateError {
    /// Convert to the error sent on the wire.
    ///
    /// All denials become the same generic `AccessDenied`. Backend failures
    /// pass through unchanged.
    #[must_use]
    pub fn into_s3_error(self) -> S3Error {
        match self {
            Self::AccessDenied(_) => S3Error::access_denied(),
            Self::Backend(err) => err,
        }
    }

    /// The classified action, when known.
    #[must_use]
    pub fn action(&self) -> Option<S3Action> {
        match self {
            Self::AccessDenied(reason) => reason.action(),
            Self::Backend(_) => None,
        }
    }
}

/// Authorizes anonymous requests against bucket policies and ACLs.
#[derive(Clone)]
pub struct PublicAccessGate {
    backend: Arc<dyn BucketBackend>,
    verifier: Arc<dyn PublicAccessVerifier>,
}

impl fmt::Debug for PublicAccessGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicAccessGate").finish_non_exhaustive()
    }
}

impl PublicAccessGate {
    /// Create a gate over a policy backend and a verifier.
    #[must_use]
    pub fn new(backend: Arc<dyn BucketBackend>, verifier: Arc<dyn PublicAccessVerifier>) -> Self {
        Self { backend, verifier }
    }

    /// Decide whether the request may proceed.
    pub async fn authorize(&self, req: &GateRequest) -> Result<GateDecision, GateError> {
        if req.is_authenticated() {
            return Ok(GateDecision::Skip);
        }

        if req.method != Method::GET && req.method != Method::HEAD {
            return Err(deny(DenyReason::MethodNotAllowed, req));
        }

        let bucket = req.path.bucket.as_str();
        let object = req.path.object.as_str();
        let classification = classify(&req.method, &req.path, &req.query);
        let action = classification.action;
        debug!(method = %req.method, bucket, object, %action, "classified anonymous request");

        if classification.forced_deny {
            return Err(deny(DenyReason::NeverPublic(action), req));
        }

        let source = match self.backend.get_bucket_policy(bucket).await {
            Ok(policy) => {
                if let Err(err) = self.verifier.verify_policy(&policy, bucket, object, action) {
                    debug!(bucket, %action, error = %err, "policy verification failed");
                    return Err(deny(DenyReason::PolicyDenied(action), req));
                }
                GrantSource::Policy
            }
            Err(err) if err.is_no_such_bucket_policy() => {
                if let Err(err) = self
                    .verifier
                    .verify_acl(self.backend.as_ref(), bucket, action)
                    .await
                {
                    debug!(bucket, %action, error = %err, "ACL verification failed");
                    return Err(deny(DenyReason::AclDenied(action), req));
                }
                GrantSource::Acl
            }
            Err(err) => {
                warn!(bucket, %action, error = %err, "bucket policy lookup failed");
                return Err(GateError::Backend(err));
            }
        };

        info!(bucket, object, %action, %source, "anonymous request allowed");
        Ok(GateDecision::Allow(PublicAccessGrant {
            bucket: bucket.to_owned(),
            object: object.to_owned(),
            action,
            source,
        }))
    }
}

fn deny(reason: DenyReason, req: &GateRequest) -> GateError {
    debug!(
        method = %req.method,
        bucket = %req.path.bucket,
        object = %req.path.object,
        %reason,
        "anonymous request denied"
    );
    GateError::AccessDenied(reason)
}
