//! Collaborator traits the gate is built on.
//!
//! The gate owns none of the policy or ACL semantics. It fetches documents
//! through a [`BucketBackend`] and hands them to a [`PublicAccessVerifier`].
//! Both traits are object safe so they can be injected as `Arc<dyn ...>`.

use bytes::Bytes;
use s3gate_model::{S3Action, S3Error};

/// Read access to per-bucket access-control documents.
#[async_trait::async_trait]
pub trait BucketBackend: Send + Sync + 'static {
    /// Fetch the raw bucket policy document.
    ///
    /// # Errors
    ///
    /// Returns an error with code `NoSuchBucketPolicy` when the bucket has no
    /// policy. Any other error is an infrastructure fault.
    async fn get_bucket_policy(&self, bucket: &str) -> Result<Bytes, S3Error>;

    /// Fetch the raw bucket ACL document.
    async fn get_bucket_acl(&self, bucket: &str) -> Result<Bytes, S3Error>;
}

/// Evaluates whether an anonymous caller may perform an action.
#[async_trait::async_trait]
pub trait PublicAccessVerifier: Send + Sync + 'static {
    /// Evaluate a bucket policy for an anonymous request. `Ok(())` allows.
    fn verify_policy(
        &self,
        policy: &[u8],
        bucket: &str,
        object: &str,
        action: S3Action,
    ) -> Result<(), S3Error>;

    /// Evaluate the bucket ACL for an anonymous request. `Ok(())` allows.
    async fn verify_acl(
        &self,
        backend: &dyn BucketBackend,
        bucket: &str,
        action: S3Action,
    ) -> Result<(), S3Error>;
}
