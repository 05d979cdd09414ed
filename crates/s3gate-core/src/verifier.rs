//! [`BuiltinVerifier`]: the default [`PublicAccessVerifier`] backed by the
//! builtin policy and ACL evaluators.

use s3gate_model::{S3Action, S3Error};
use tracing::debug;

use crate::acl::BucketAcl;
use crate::backend::{BucketBackend, PublicAccessVerifier};
use crate::policy::{BucketPolicy, PolicyDecision};

/// Verifier using [`BucketPolicy`] JSON documents and [`BucketAcl`] grants.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinVerifier;

#[async_trait::async_trait]
impl PublicAccessVerifier for BuiltinVerifier {
    fn verify_policy(
        &self,
        policy: &[u8],
        bucket: &str,
        object: &str,
        action: S3Action,
    ) -> Result<(), S3Error> {
        let policy = BucketPolicy::parse(policy)?;
        let decision = policy.evaluate_anonymous(bucket, object, action);
        debug!(bucket, object, %action, ?decision, "evaluated bucket policy");
        match decision {
            PolicyDecision::Allow => Ok(()),
            PolicyDecision::ExplicitDeny | PolicyDecision::ImplicitDeny => {
                Err(S3Error::access_denied())
            }
        }
    }

    async fn verify_acl(
        &self,
        backend: &dyn BucketBackend,
        bucket: &str,
        action: S3Action,
    ) -> Result<(), S3Error> {
        let document = backend.get_bucket_acl(bucket).await?;
        let acl = BucketAcl::parse(&document)?;
        if acl.allows_anonymous(action) {
            Ok(())
        } else {
            debug!(bucket, %action, "bucket ACL does not grant public access");
            Err(S3Error::access_denied())
        }
    }
}
