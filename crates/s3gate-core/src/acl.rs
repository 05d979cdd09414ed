//! Builtin bucket ACL model and anonymous-access evaluation.

use std::fmt;
use std::str::FromStr;

use s3gate_model::{S3Action, S3Error};
use serde::{Deserialize, Serialize};

/// Predefined (canned) ACLs that can seed a bucket ACL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CannedAcl {
    /// Owner gets `FULL_CONTROL`. No one else has access rights (default).
    #[default]
    Private,
    /// Owner gets `FULL_CONTROL`. The `AllUsers` group gets `READ` access.
    PublicRead,
    /// Owner gets `FULL_CONTROL`. The `AllUsers` group gets `READ` and `WRITE` access.
    PublicReadWrite,
    /// Owner gets `FULL_CONTROL`. The `AuthenticatedUsers` group gets `READ` access.
    AuthenticatedRead,
}

impl CannedAcl {
    /// Return the string representation of the canned ACL.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::PublicRead => "public-read",
            Self::PublicReadWrite => "public-read-write",
            Self::AuthenticatedRead => "authenticated-read",
        }
    }
}

impl fmt::Display for CannedAcl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CannedAcl {
    type Err = S3Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "private" => Ok(Self::Private),
            "public-read" => Ok(Self::PublicRead),
            "public-read-write" => Ok(Self::PublicReadWrite),
            "authenticated-read" => Ok(Self::AuthenticatedRead),
            other => Err(S3Error::malformed_acl(format!("unknown canned ACL: {other}"))),
        }
    }
}

/// Who a grant applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Grantee {
    /// Everyone, including anonymous callers.
    AllUsers,
    /// Any caller with valid credentials.
    AuthenticatedUsers,
    /// A specific account.
    CanonicalUser {
        /// Canonical user ID.
        id: String,
    },
}

/// Permission carried by a grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    /// List or read.
    Read,
    /// Create, overwrite, delete.
    Write,
    /// Read the ACL.
    ReadAcp,
    /// Write the ACL.
    WriteAcp,
    /// All of the above.
    FullControl,
}

impl Permission {
    /// Whether holding `self` satisfies a requirement for `required`.
    #[must_use]
    pub fn satisfies(self, required: Self) -> bool {
        self == Self::FullControl || self == required
    }
}

/// A single ACL grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    /// Who is granted.
    pub grantee: Grantee,
    /// What is granted.
    pub permission: Permission,
}

/// A bucket access control list.
///
/// # Examples
///
/// ```
/// use s3gate_core::acl::{BucketAcl, CannedAcl};
/// use s3gate_model::S3Action;
///
/// let acl = BucketAcl::from_canned(CannedAcl::PublicRead, "owner");
/// assert!(acl.allows_anonymous(S3Action::GetObject));
/// assert!(!acl.allows_anonymous(S3Action::GetBucketAcl));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketAcl {
    /// Canonical ID of the bucket owner.
    pub owner: String,
    /// Grants beyond the owner's implicit full control.
    #[serde(default)]
    pub grants: Vec<Grant>,
}

impl BucketAcl {
    /// Expand a canned ACL into explicit grants.
    #[must_use]
    pub fn from_canned(canned: CannedAcl, owner: impl Into<String>) -> Self {
        let owner = owner.into();
        let mut grants = vec![Grant {
            grantee: Grantee::CanonicalUser { id: owner.clone() },
            permission: Permission::FullControl,
        }];
        match canned {
            CannedAcl::Private => {}
            CannedAcl::PublicRead => grants.push(Grant {
                grantee: Grantee::AllUsers,
                permission: Permission::Read,
            }),
            CannedAcl::PublicReadWrite => {
                grants.push(Grant {
                    grantee: Grantee::AllUsers,
                    permission: Permission::Read,
                });
                grants.push(Grant {
                    grantee: Grantee::AllUsers,
                    permission: Permission::Write,
                });
            }
            CannedAcl::AuthenticatedRead => grants.push(Grant {
                grantee: Grantee::AuthenticatedUsers,
                permission: Permission::Read,
            }),
        }
        Self { owner, grants }
    }

    /// Parse a JSON ACL document.
    pub fn parse(document: &[u8]) -> Result<Self, S3Error> {
        serde_json::from_slice(document)
            .map_err(|e| S3Error::malformed_acl(format!("invalid bucket ACL: {e}")))
    }

    /// Serialize to the JSON document format accepted by [`BucketAcl::parse`].
    pub fn to_json(&self) -> Result<Vec<u8>, S3Error> {
        serde_json::to_vec(self)
            .map_err(|e| S3Error::internal_error(format!("failed to encode ACL: {e}")))
    }

    /// Whether an anonymous caller may perform `action`.
    ///
    /// ACL reads need `READ_ACP`; every other read needs `READ`. Actions that
    /// are never public are refused outright.
    #[must_use]
    pub fn allows_anonymous(&self, action: S3Action) -> bool {
        if action.is_never_public() {
            return false;
        }
        let required = required_permission(action);
        self.grants
            .iter()
            .any(|g| g.grantee == Grantee::AllUsers && g.permission.satisfies(required))
    }
}

/// The ACL permission an action requires.
#[must_use]
pub fn required_permission(action: S3Action) -> Permission {
    if action.reads_acl() {
        Permission::ReadAcp
    } else {
        Permission::Read
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_deny_everything_for_private_acl() {
        let acl = BucketAcl::from_canned(CannedAcl::Private, "owner");
        for action in S3Action::ALL {
            assert!(!acl.allows_anonymous(action), "{action}");
        }
    }

    #[test]
    fn test_should_allow_reads_for_public_read() {
        let acl = BucketAcl::from_canned(CannedAcl::PublicRead, "owner");
        assert!(acl.allows_anonymous(S3Action::ListBucket));
        assert!(acl.allows_anonymous(S3Action::GetObjectVersion));
        assert!(!acl.allows_anonymous(S3Action::GetObjectAcl));
        assert!(!acl.allows_anonymous(S3Action::GetBucketPolicy));
    }

    #[test]
    fn test_should_not_treat_authenticated_read_as_public() {
        let acl = BucketAcl::from_canned(CannedAcl::AuthenticatedRead, "owner");
        assert!(!acl.allows_anonymous(S3Action::GetObject));
    }

    #[test]
    fn test_should_let_full_control_cover_acl_reads() {
        let acl = BucketAcl {
            owner: "owner".to_owned(),
            grants: vec![Grant {
                grantee: Grantee::AllUsers,
                permission: Permission::FullControl,
            }],
        };
        assert!(acl.allows_anonymous(S3Action::GetBucketAcl));
        assert!(acl.allows_anonymous(S3Action::GetObject));
        assert!(!acl.allows_anonymous(S3Action::GetBucketOwnershipControls));
    }

    #[test]
    fn test_should_round_trip_json_document() {
        let acl = BucketAcl::from_canned(CannedAcl::PublicReadWrite, "abc");
        let json = acl.to_json().expect("encode");
        assert_eq!(BucketAcl::parse(&json).expect("decode"), acl);
    }

    #[test]
    fn test_should_parse_hand_written_document() {
        let acl = BucketAcl::parse(
            br#"{"owner": "o", "grants": [
                {"grantee": {"type": "all-users"}, "permission": "READ_ACP"}
            ]}"#,
        )
        .expect("valid ACL");
        assert!(acl.allows_anonymous(S3Action::GetBucketAcl));
        assert!(!acl.allows_anonymous(S3Action::ListBucket));
    }

    #[test]
    fn test_should_reject_malformed_document() {
        let err = BucketAcl::parse(b"[]").unwrap_err();
        assert_eq!(err.code, s3gate_model::S3ErrorCode::MalformedACLError);
    }

    #[test]
    fn test_should_parse_canned_names() {
        assert_eq!("public-read".parse::<CannedAcl>().ok(), Some(CannedAcl::PublicRead));
        assert!("everyone".parse::<CannedAcl>().is_err());
        assert_eq!(CannedAcl::PublicReadWrite.to_string(), "public-read-write");
    }
}
