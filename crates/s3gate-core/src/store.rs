//! In-memory [`BucketBackend`] with seed-file loading.
//!
//! [`InMemoryBucketStore`] keeps one entry per bucket in a [`DashMap`]: the
//! owner, an optional raw policy document and the bucket ACL. A JSON seed file
//! can populate it at startup:
//!
//! ```json
//! {
//!   "buckets": {
//!     "website": { "owner": "alice", "acl": "public-read" },
//!     "photos": {
//!       "policy": {
//!         "Statement": [{
//!           "Effect": "Allow", "Principal": "*",
//!           "Action": "s3:GetObject", "Resource": "arn:aws:s3:::photos/*"
//!         }]
//!       }
//!     }
//!   }
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use bytes::Bytes;
use dashmap::DashMap;
use s3gate_model::S3Error;
use serde::Deserialize;
use tracing::{debug, info};

use crate::acl::{BucketAcl, CannedAcl};
use crate::backend::BucketBackend;
use crate::error::StoreError;
use crate::policy::BucketPolicy;

/// Owner recorded for seeded buckets that do not name one.
pub const DEFAULT_OWNER: &str = "s3gate";

#[derive(Debug, Clone)]
struct BucketEntry {
    policy: Option<Bytes>,
    acl: BucketAcl,
}

/// Thread-safe in-memory store of bucket policies and ACLs.
#[derive(Debug, Default)]
pub struct InMemoryBucketStore {
    buckets: DashMap<String, BucketEntry>,
}

impl InMemoryBucketStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace a bucket with a canned ACL and no policy.
    pub fn put_bucket(&self, bucket: &str, owner: &str, acl: CannedAcl) {
        self.buckets.insert(
            bucket.to_owned(),
            BucketEntry {
                policy: None,
                acl: BucketAcl::from_canned(acl, owner),
            },
        );
    }

    /// Remove a bucket. Returns whether it existed.
    pub fn remove_bucket(&self, bucket: &str) -> bool {
        self.buckets.remove(bucket).is_some()
    }

    /// Set the bucket policy after checking it parses.
    pub fn put_bucket_policy(&self, bucket: &str, policy: impl Into<Bytes>) -> Result<(), S3Error> {
        let policy = policy.into();
        BucketPolicy::parse(&policy)?;
        let mut entry = self
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| S3Error::no_such_bucket(bucket))?;
        entry.policy = Some(policy);
        debug!(bucket, "put_bucket_policy completed");
        Ok(())
    }

    /// Remove the bucket policy.
    pub fn delete_bucket_policy(&self, bucket: &str) -> Result<(), S3Error> {
        let mut entry = self
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| S3Error::no_such_bucket(bucket))?;
        entry.policy = None;
        debug!(bucket, "delete_bucket_policy completed");
        Ok(())
    }

    /// Replace the bucket ACL.
    pub fn put_bucket_acl(&self, bucket: &str, acl: BucketAcl) -> Result<(), S3Error> {
        let mut entry = self
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| S3Error::no_such_bucket(bucket))?;
        entry.acl = acl;
        Ok(())
    }

    /// Number of buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Whether the store holds no buckets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Build a store from a parsed seed document.
    pub fn from_seed(seed: BucketSeed) -> Result<Self, StoreError> {
        let store = Self::new();
        for (name, entry) in seed.buckets {
            let acl = match entry.acl {
                Some(AclSeed::Canned(canned)) => BucketAcl::from_canned(canned, &entry.owner),
                Some(AclSeed::Explicit(acl)) => acl,
                None => BucketAcl::from_canned(CannedAcl::Private, &entry.owner),
            };
            store.buckets.insert(name.clone(), BucketEntry { policy: None, acl });

            if let Some(policy) = entry.policy {
                let document = serde_json::to_vec(&policy)?;
                store
                    .put_bucket_policy(&name, document)
                    .map_err(|e| StoreError::InvalidPolicy {
                        bucket: name.clone(),
                        message: e.message,
                    })?;
            }
        }
        Ok(store)
    }

    /// Load a store from a JSON seed file.
    pub fn from_seed_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let raw = std::fs::read(path).map_err(|source| StoreError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let seed: BucketSeed = serde_json::from_slice(&raw)?;
        let store = Self::from_seed(seed)?;
        info!(path = %path.display(), buckets = store.len(), "loaded bucket seed file");
        Ok(store)
    }
}

#[async_trait::async_trait]
impl BucketBackend for InMemoryBucketStore {
    async fn get_bucket_policy(&self, bucket: &str) -> Result<Bytes, S3Error> {
        let entry = self
            .buckets
            .get(bucket)
            .ok_or_else(|| S3Error::no_such_bucket(bucket))?;
        entry
            .policy
            .clone()
            .ok_or_else(|| S3Error::no_such_bucket_policy(bucket))
    }

    async fn get_bucket_acl(&self, bucket: &str) -> Result<Bytes, S3Error> {
        let entry = self
            .buckets
            .get(bucket)
            .ok_or_else(|| S3Error::no_such_bucket(bucket))?;
        entry.acl.to_json().map(Bytes::from)
    }
}

/// Top-level seed file document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BucketSeed {
    /// Buckets keyed by name.
    #[serde(default)]
    pub buckets: HashMap<String, BucketSeedEntry>,
}

/// One bucket in a seed file.
#[derive(Debug, Clone, Deserialize)]
pub struct BucketSeedEntry {
    /// Bucket owner's canonical ID.
    #[serde(default = "default_owner")]
    pub owner: String,
    /// Canned ACL name or an explicit ACL document.
    #[serde(default)]
    pub acl: Option<AclSeed>,
    /// Inline bucket policy document.
    #[serde(default)]
    pub policy: Option<serde_json::Value>,
}

/// ACL as written in a seed file.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AclSeed {
    /// A canned ACL name such as `"public-read"`.
    Canned(CannedAcl),
    /// A full ACL document.
    Explicit(BucketAcl),
}

fn default_owner() -> String {
    DEFAULT_OWNER.to_owned()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use s3gate_model::S3ErrorCode;

    use super::*;

    const POLICY: &str = r#"{"Statement": [{"Effect": "Allow", "Principal": "*",
        "Action": "s3:GetObject", "Resource": "arn:aws:s3:::b/*"}]}"#;

    #[tokio::test]
    async fn test_should_report_missing_bucket() {
        let store = InMemoryBucketStore::new();
        let err = store.get_bucket_policy("ghost").await.unwrap_err();
        assert_eq!(err.code, S3ErrorCode::NoSuchBucket);
        assert!(!err.is_no_such_bucket_policy());
    }

    #[tokio::test]
    async fn test_should_report_missing_policy_as_sentinel() {
        let store = InMemoryBucketStore::new();
        store.put_bucket("b", "owner", CannedAcl::Private);
        let err = store.get_bucket_policy("b").await.unwrap_err();
        assert!(err.is_no_such_bucket_policy());
    }

    #[tokio::test]
    async fn test_should_store_and_delete_policy() {
        let store = InMemoryBucketStore::new();
        store.put_bucket("b", "owner", CannedAcl::Private);
        store.put_bucket_policy("b", POLICY).expect("valid policy");
        let policy = store.get_bucket_policy("b").await.expect("policy stored");
        assert_eq!(&policy[..], POLICY.as_bytes());

        store.delete_bucket_policy("b").expect("bucket exists");
        assert!(
            store
                .get_bucket_policy("b")
                .await
                .unwrap_err()
                .is_no_such_bucket_policy()
        );
    }

    #[test]
    fn test_should_reject_invalid_policy() {
        let store = InMemoryBucketStore::new();
        store.put_bucket("b", "owner", CannedAcl::Private);
        let err = store.put_bucket_policy("b", "nope").unwrap_err();
        assert_eq!(err.code, S3ErrorCode::MalformedPolicy);
        let err = store.put_bucket_policy("ghost", POLICY).unwrap_err();
        assert_eq!(err.code, S3ErrorCode::NoSuchBucket);
    }

    #[tokio::test]
    async fn test_should_serve_acl_document() {
        let store = InMemoryBucketStore::new();
        store.put_bucket("b", "alice", CannedAcl::PublicRead);
        let doc = store.get_bucket_acl("b").await.expect("acl");
        let acl = BucketAcl::parse(&doc).expect("valid ACL");
        assert_eq!(acl.owner, "alice");
        assert_eq!(acl, BucketAcl::from_canned(CannedAcl::PublicRead, "alice"));

        store
            .put_bucket_acl("b", BucketAcl::from_canned(CannedAcl::Private, "alice"))
            .expect("bucket exists");
        assert!(store.remove_bucket("b"));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_should_load_seed_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"{{"buckets": {{
                "site": {{"owner": "alice", "acl": "public-read"}},
                "b": {{"policy": {POLICY}}},
                "custom": {{"acl": {{"owner": "o", "grants": []}}}}
            }}}}"#
        )
        .expect("write seed");

        let store = InMemoryBucketStore::from_seed_file(file.path()).expect("seed loads");
        assert_eq!(store.len(), 3);
        assert!(store.get_bucket_policy("b").await.is_ok());
        assert!(
            store
                .get_bucket_policy("site")
                .await
                .unwrap_err()
                .is_no_such_bucket_policy()
        );
        let acl = BucketAcl::parse(&store.get_bucket_acl("b").await.expect("acl")).expect("acl");
        assert_eq!(acl.owner, DEFAULT_OWNER);
    }

    #[test]
    fn test_should_fail_on_missing_seed_file() {
        let err = InMemoryBucketStore::from_seed_file("/nonexistent/s3gate-seed.json").unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }

    #[test]
    fn test_should_fail_on_invalid_seed_policy() {
        let seed: BucketSeed =
            serde_json::from_str(r#"{"buckets": {"b": {"policy": {"Nope": 1}}}}"#).expect("json");
        let err = InMemoryBucketStore::from_seed(seed).unwrap_err();
        assert!(matches!(err, StoreError::InvalidPolicy { ref bucket, .. } if bucket == "b"));
    }
}
