//! Request classification: maps (method, path, query) to a canonical [`S3Action`].
//!
//! Many S3 operations share one method and path shape and differ only by a
//! query parameter, so the sub-resource parameters are checked against static,
//! ordered tables ([`BUCKET_RULES`], [`OBJECT_RULES`]). The first matching rule
//! wins. Some rules carry a forced denial: those operations are never served
//! anonymously, even when a bucket policy would allow them.

use http::Method;
use s3gate_model::S3Action;

use crate::path::ResourcePath;
use crate::query::QueryParams;

/// The outcome of classifying a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// The action the request maps to.
    pub action: S3Action,
    /// Whether the request must be denied regardless of policy or ACL.
    pub forced_deny: bool,
}

impl Classification {
    fn allowed(action: S3Action) -> Self {
        Self {
            action,
            forced_deny: false,
        }
    }
}

/// A query-parameter test used by a [`QueryRule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryPredicate {
    /// The parameter is present, with any value.
    Present(&'static str),
    /// The parameter parses as this unsigned integer.
    UintEquals(&'static str, u64),
}

impl QueryPredicate {
    /// Evaluate the predicate against the request's query parameters.
    #[must_use]
    pub fn matches(&self, query: &QueryParams) -> bool {
        match *self {
            Self::Present(key) => query.has(key),
            Self::UintEquals(key, expected) => query.get_uint_or_zero(key) == expected,
        }
    }
}

/// One entry of a priority table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryRule {
    /// The test applied to the query.
    pub predicate: QueryPredicate,
    /// The action produced on a match.
    pub action: S3Action,
    /// Whether a match forces denial.
    pub forced_deny: bool,
}

const fn rule(key: &'static str, action: S3Action) -> QueryRule {
    QueryRule {
        predicate: QueryPredicate::Present(key),
        action,
        forced_deny: false,
    }
}

const fn deny_rule(key: &'static str, action: S3Action) -> QueryRule {
    QueryRule {
        predicate: QueryPredicate::Present(key),
        action,
        forced_deny: true,
    }
}

/// Bucket-level GET rules, highest priority first.
pub const BUCKET_RULES: &[QueryRule] = &[
    rule("tagging", S3Action::GetBucketTagging),
    deny_rule("ownershipControls", S3Action::GetBucketOwnershipControls),
    rule("versioning", S3Action::GetBucketVersioning),
    deny_rule("policy", S3Action::GetBucketPolicy),
    rule("cors", S3Action::GetBucketCors),
    rule("versions", S3Action::ListObjectVersions),
    rule("object-lock", S3Action::GetBucketObjectLockConfiguration),
    rule("acl", S3Action::GetBucketAcl),
    rule("uploads", S3Action::ListMultipartUploads),
    QueryRule {
        predicate: QueryPredicate::UintEquals("list-type", 2),
        action: S3Action::ListBucket,
        forced_deny: false,
    },
];

/// Object-level GET rules, highest priority first.
pub const OBJECT_RULES: &[QueryRule] = &[
    rule("tagging", S3Action::GetObjectTagging),
    rule("retention", S3Action::GetObjectRetention),
    rule("legal-hold", S3Action::GetObjectLegalHold),
    rule("acl", S3Action::GetObjectAcl),
    rule("attributes", S3Action::GetObjectAttributes),
    rule("uploadId", S3Action::ListMultipartUploadParts),
];

/// Classify a request into an action.
///
/// Rules, first match wins:
/// 1. The service root is `ListAllBuckets`, always force-denied.
/// 2. `HEAD` is `ListBucket` on a bucket and `GetObject` on an object; the query
///    is never consulted.
/// 3. Bucket-level requests walk [`BUCKET_RULES`] and default to `ListBucket`.
/// 4. Object-level requests walk [`OBJECT_RULES`], then fall back to
///    `GetObjectVersion` when `versionId` is present, else `GetObject`.
///
/// # Examples
///
/// ```
/// use http::Method;
/// use s3gate_core::classify::classify;
/// use s3gate_core::path::ResourcePath;
/// use s3gate_core::query::QueryParams;
/// use s3gate_model::S3Action;
///
/// let c = classify(
///     &Method::GET,
///     &ResourcePath::parse("/mybucket"),
///     &QueryParams::parse("tagging&acl"),
/// );
/// assert_eq!(c.action, S3Action::GetBucketTagging);
/// assert!(!c.forced_deny);
/// ```
#[must_use]
pub fn classify(method: &Method, path: &ResourcePath, query: &QueryParams) -> Classification {
    if path.is_service_root() {
        return Classification {
            action: S3Action::ListAllBuckets,
            forced_deny: true,
        };
    }

    if *method == Method::HEAD {
        return Classification::allowed(if path.is_bucket_only() {
            S3Action::ListBucket
        } else {
            S3Action::GetObject
        });
    }

    if path.is_bucket_only() {
        // Any other parameter set is served as a plain object listing.
        return first_match(BUCKET_RULES, query)
            .unwrap_or_else(|| Classification::allowed(S3Action::ListBucket));
    }

    first_match(OBJECT_RULES, query).unwrap_or_else(|| {
        Classification::allowed(if query.has("versionId") {
            S3Action::GetObjectVersion
        } else {
            S3Action::GetObject
        })
    })
}

fn first_match(rules: &[QueryRule], query: &QueryParams) -> Option<Classification> {
    rules
        .iter()
        .find(|r| r.predicate.matches(query))
        .map(|r| Classification {
            action: r.action,
            forced_deny: r.forced_deny,
        })
}
