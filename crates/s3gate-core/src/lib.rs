//! Anonymous-access authorization for an S3-compatible gateway.
//!
//! Unauthenticated requests are classified into a canonical [`S3Action`]
//! and then resolved against the bucket policy, falling back to the bucket
//! ACL only when no policy is configured.
//!
//! # Architecture
//!
//! ```text
//! GateRequest (method, path, query, auth signal)
//!        |
//!        v
//!   classify() -> S3Action / forced deny
//!        |
//!        v
//! PublicAccessGate
//!    |-- BucketBackend::get_bucket_policy
//!    |-- PublicAccessVerifier::verify_policy   (policy present)
//!    `-- PublicAccessVerifier::verify_acl      (no policy)
//! ```
//!
//! [`S3Action`]: s3gate_model::S3Action

pub mod acl;
pub mod audit;
pub mod backend;
pub mod classify;
pub mod config;
pub mod error;
pub mod gate;
pub mod metrics;
pub mod path;
pub mod policy;
pub mod query;
pub mod store;
pub mod verifier;

pub use backend::{BucketBackend, PublicAccessVerifier};
pub use config::GateConfig;
pub use gate::{
    DenyReason, GateDecision, GateError, GateRequest, GrantSource, PublicAccessGate,
    PublicAccessGrant,
};
pub use store::InMemoryBucketStore;
pub use verifier::BuiltinVerifier;
