//! Canonical storage actions a public (anonymous) request can be classified into.

use std::fmt;
use std::str::FromStr;

/// A storage action, named after the IAM action a bucket policy refers to.
///
/// The set is closed: it covers every read-shaped operation that can reach the
/// public access gate, plus the actions that are never publicly permitted
/// (see [`S3Action::is_never_public`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum S3Action {
    /// ListBuckets at the service root.
    ListAllBuckets,
    /// ListObjects, ListObjectsV2 and HeadBucket.
    ListBucket,
    /// ListObjectVersions.
    ListObjectVersions,
    /// ListMultipartUploads.
    ListMultipartUploads,
    /// ListParts.
    ListMultipartUploadParts,
    /// GetObject and HeadObject.
    GetObject,
    /// GetObject with an explicit `versionId`.
    GetObjectVersion,
    /// GetObjectTagging.
    GetObjectTagging,
    /// GetObjectRetention.
    GetObjectRetention,
    /// GetObjectLegalHold.
    GetObjectLegalHold,
    /// GetObjectAcl.
    GetObjectAcl,
    /// GetObjectAttributes.
    GetObjectAttributes,
    /// GetBucketTagging.
    GetBucketTagging,
    /// GetBucketOwnershipControls.
    GetBucketOwnershipControls,
    /// GetBucketVersioning.
    GetBucketVersioning,
    /// GetBucketPolicy.
    GetBucketPolicy,
    /// GetBucketCors.
    GetBucketCors,
    /// GetObjectLockConfiguration.
    GetBucketObjectLockConfiguration,
    /// GetBucketAcl.
    GetBucketAcl,
}

impl S3Action {
    /// Every action, in declaration order.
    pub const ALL: [Self; 19] = [
        Self::ListAllBuckets,
        Self::ListBucket,
        Self::ListObjectVersions,
        Self::ListMultipartUploads,
        Self::ListMultipartUploadParts,
        Self::GetObject,
        Self::GetObjectVersion,
        Self::GetObjectTagging,
        Self::GetObjectRetention,
        Self::GetObjectLegalHold,
        Self::GetObjectAcl,
        Self::GetObjectAttributes,
        Self::GetBucketTagging,
        Self::GetBucketOwnershipControls,
        Self::GetBucketVersioning,
        Self::GetBucketPolicy,
        Self::GetBucketCors,
        Self::GetBucketObjectLockConfiguration,
        Self::GetBucketAcl,
    ];

    /// Returns the IAM action name (e.g. `s3:GetObject`).
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ListAllBuckets => "s3:ListAllMyBuckets",
            Self::ListBucket => "s3:ListBucket",
            Self::ListObjectVersions => "s3:ListBucketVersions",
            Self::ListMultipartUploads => "s3:ListBucketMultipartUploads",
            Self::ListMultipartUploadParts => "s3:ListMultipartUploadParts",
            Self::GetObject => "s3:GetObject",
            Self::GetObjectVersion => "s3:GetObjectVersion",
            Self::GetObjectTagging => "s3:GetObjectTagging",
            Self::GetObjectRetention => "s3:GetObjectRetention",
            Self::GetObjectLegalHold => "s3:GetObjectLegalHold",
            Self::GetObjectAcl => "s3:GetObjectAcl",
            Self::GetObjectAttributes => "s3:GetObjectAttributes",
            Self::GetBucketTagging => "s3:GetBucketTagging",
            Self::GetBucketOwnershipControls => "s3:GetBucketOwnershipControls",
            Self::GetBucketVersioning => "s3:GetBucketVersioning",
            Self::GetBucketPolicy => "s3:GetBucketPolicy",
            Self::GetBucketCors => "s3:GetBucketCORS",
            Self::GetBucketObjectLockConfiguration => "s3:GetBucketObjectLockConfiguration",
            Self::GetBucketAcl => "s3:GetBucketAcl",
        }
    }

    /// Parse an IAM action name into an action. Matching is exact.
    #[must_use]
    pub fn from_iam_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == name)
    }

    /// Actions that must never be reachable anonymously, whatever a policy says.
    #[must_use]
    pub fn is_never_public(&self) -> bool {
        matches!(
            self,
            Self::ListAllBuckets | Self::GetBucketOwnershipControls | Self::GetBucketPolicy
        )
    }

    /// Whether the action targets an object rather than the bucket itself.
    #[must_use]
    pub fn is_object_action(&self) -> bool {
        matches!(
            self,
            Self::ListMultipartUploadParts
                | Self::GetObject
                | Self::GetObjectVersion
                | Self::GetObjectTagging
                | Self::GetObjectRetention
                | Self::GetObjectLegalHold
                | Self::GetObjectAcl
                | Self::GetObjectAttributes
        )
    }

    /// Whether the action reads an access control list.
    #[must_use]
    pub fn reads_acl(&self) -> bool {
        matches!(self, Self::GetBucketAcl | Self::GetObjectAcl)
    }
}

impl fmt::Display for S3Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown IAM action name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown S3 action: {0}")]
pub struct UnknownAction(pub String);

impl FromStr for S3Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_iam_name(s).ok_or_else(|| UnknownAction(s.to_owned()))
    }
}

impl serde::Serialize for S3Action {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for S3Action {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_round_trip_every_iam_name() {
        for action in S3Action::ALL {
            assert_eq!(S3Action::from_iam_name(action.as_str()), Some(action));
        }
    }

    #[test]
    fn test_should_reject_unknown_action_name() {
        let err = "s3:PutObject".parse::<S3Action>().unwrap_err();
        assert_eq!(err, UnknownAction("s3:PutObject".to_owned()));
    }

    #[test]
    fn test_should_flag_never_public_actions() {
        let never: Vec<_> = S3Action::ALL
            .into_iter()
            .filter(S3Action::is_never_public)
            .collect();
        assert_eq!(
            never,
            vec![
                S3Action::ListAllBuckets,
                S3Action::GetBucketOwnershipControls,
                S3Action::GetBucketPolicy,
            ]
        );
    }

    #[test]
    fn test_should_use_iam_names_for_listing_actions() {
        assert_eq!(S3Action::ListObjectVersions.as_str(), "s3:ListBucketVersions");
        assert_eq!(
            S3Action::ListMultipartUploads.as_str(),
            "s3:ListBucketMultipartUploads"
        );
        assert_eq!(S3Action::GetBucketCors.to_string(), "s3:GetBucketCORS");
    }

    #[test]
    fn test_should_classify_object_actions() {
        assert!(S3Action::GetObject.is_object_action());
        assert!(S3Action::ListMultipartUploadParts.is_object_action());
        assert!(!S3Action::ListBucket.is_object_action());
        assert!(!S3Action::GetBucketAcl.is_object_action());
    }

    #[test]
    fn test_should_serialize_as_iam_name() {
        let json = serde_json::to_string(&S3Action::GetObjectAcl).expect("serialize");
        assert_eq!(json, "\"s3:GetObjectAcl\"");
        let back: S3Action = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, S3Action::GetObjectAcl);
    }
}
