//! Audit records for anonymous-access decisions.

use std::fmt;

use chrono::{DateTime, Utc};
use s3gate_model::S3Action;
use serde::Serialize;
use tracing::info;

/// Final outcome of an anonymous request at the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Authenticated request, gate not applied.
    Skip,
    /// Allowed by policy or ACL.
    Allow,
    /// Denied with `AccessDenied`.
    Deny,
    /// Failed on a backend error.
    Error,
}

impl Outcome {
    /// Lowercase label used in logs and metrics.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::Allow => "allow",
            Self::Deny => "deny",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One audited gate decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    /// When the decision was made.
    pub timestamp: DateTime<Utc>,
    /// Request ID echoed in `x-amz-request-id`.
    pub request_id: String,
    /// HTTP method.
    pub method: String,
    /// Target bucket, empty for the service root.
    pub bucket: String,
    /// Target object key, empty for bucket-level requests.
    pub object: String,
    /// Classified action, absent when classification did not run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<S3Action>,
    /// Decision outcome.
    pub outcome: Outcome,
    /// S3 error code sent to the client, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

/// Sink for [`AuditEntry`] records.
pub trait AuditLogger: Send + Sync + 'static {
    /// Record one entry.
    fn log(&self, entry: &AuditEntry);
}

/// Emits entries as structured `tracing` events on the `s3gate::audit` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditLogger;

impl AuditLogger for TracingAuditLogger {
    fn log(&self, entry: &AuditEntry) {
        info!(
            target: "s3gate::audit",
            request_id = %entry.request_id,
            method = %entry.method,
            bucket = %entry.bucket,
            object = %entry.object,
            action = entry.action.map_or("-", |a| a.as_str()),
            outcome = %entry.outcome,
            error_code = entry.error_code.as_deref().unwrap_or("-"),
            "public access"
        );
    }
}

/// Discards every entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAuditLogger;

impl AuditLogger for NoopAuditLogger {
    fn log(&self, _entry: &AuditEntry) {}
}
