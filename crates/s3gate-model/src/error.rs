//! S3 wire error codes and the [`S3Error`] type shared by the gate and its collaborators.

use std::fmt;

/// Well-known S3 error codes produced or consumed by the public access gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum S3ErrorCode {
    /// Access to the resource was denied.
    #[default]
    AccessDenied,
    /// An internal error occurred.
    InternalError,
    /// The stored ACL document could not be parsed.
    MalformedACLError,
    /// The bucket policy document could not be parsed.
    MalformedPolicy,
    /// The specified bucket does not exist.
    NoSuchBucket,
    /// The specified bucket does not have a bucket policy.
    NoSuchBucketPolicy,
    /// The backend is temporarily unavailable.
    ServiceUnavailable,
    /// A custom error code not in the standard set.
    Custom(&'static str),
}

impl S3ErrorCode {
    /// Returns the error code as a string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccessDenied => "AccessDenied",
            Self::InternalError => "InternalError",
            Self::MalformedACLError => "MalformedACLError",
            Self::MalformedPolicy => "MalformedPolicy",
            Self::NoSuchBucket => "NoSuchBucket",
            Self::NoSuchBucketPolicy => "NoSuchBucketPolicy",
            Self::ServiceUnavailable => "ServiceUnavailable",
            Self::Custom(s) => s,
        }
    }

    /// Returns the default HTTP status code for this error.
    #[must_use]
    #[allow(clippy::match_same_arms)]
    pub fn default_status_code(&self) -> http::StatusCode {
        match self {
            Self::MalformedACLError | Self::MalformedPolicy => http::StatusCode::BAD_REQUEST,
            Self::AccessDenied => http::StatusCode::FORBIDDEN,
            Self::NoSuchBucket | Self::NoSuchBucketPolicy => http::StatusCode::NOT_FOUND,
            Self::InternalError => http::StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServiceUnavailable => http::StatusCode::SERVICE_UNAVAILABLE,
            Self::Custom(_) => http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the default message for this error.
    #[must_use]
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::AccessDenied => "Access Denied",
            Self::InternalError => "We encountered an internal error. Please try again.",
            Self::MalformedACLError => {
                "The XML you provided was not well-formed or did not validate against our published schema"
            }
            Self::MalformedPolicy => "Policies must be valid JSON and the first byte must be '{'",
            Self::NoSuchBucket => "The specified bucket does not exist",
            Self::NoSuchBucketPolicy => "The specified bucket does not have a bucket policy",
            Self::ServiceUnavailable => "Please reduce your request rate.",
            Self::Custom(s) => s,
        }
    }
}

impl fmt::Display for S3ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An S3 error response.
#[derive(Debug)]
pub struct S3Error {
    /// The error code.
    pub code: S3ErrorCode,
    /// A human-readable error message.
    pub message: String,
    /// The resource that caused the error.
    pub resource: Option<String>,
    /// The HTTP status code.
    pub status_code: http::StatusCode,
    /// The underlying source error, if any.
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for S3Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S3Error({}): {}", self.code, self.message)
    }
}

impl std::error::Error for S3Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl S3Error {
    /// Create a new S3Error from an error code.
    #[must_use]
    pub fn new(code: S3ErrorCode) -> Self {
        Self {
            status_code: code.default_status_code(),
            message: code.default_message().to_owned(),
            code,
            resource: None,
            source: None,
        }
    }

    /// Create a new S3Error with a custom message.
    #[must_use]
    pub fn with_message(code: S3ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status_code: code.default_status_code(),
            message: message.into(),
            code,
            resource: None,
            source: None,
        }
    }

    /// Set the resource that caused this error.
    #[must_use]
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Set the source error.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Whether this error is the "no policy configured" condition.
    #[must_use]
    pub fn is_no_such_bucket_policy(&self) -> bool {
        self.code == S3ErrorCode::NoSuchBucketPolicy
    }

    /// Create an AccessDenied error without naming the resource.
    #[must_use]
    pub fn access_denied() -> Self {
        Self::new(S3ErrorCode::AccessDenied)
    }

    /// Create a NoSuchBucket error.
    #[must_use]
    pub fn no_such_bucket(bucket_name: impl Into<String>) -> Self {
        Self::new(S3ErrorCode::NoSuchBucket).with_resource(bucket_name)
    }

    /// Create a NoSuchBucketPolicy error.
    #[must_use]
    pub fn no_such_bucket_policy(bucket_name: impl Into<String>) -> Self {
        Self::new(S3ErrorCode::NoSuchBucketPolicy).with_resource(bucket_name)
    }

    /// Create an InternalError error.
    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::with_message(S3ErrorCode::InternalError, message)
    }

    /// Create a MalformedPolicy error.
    #[must_use]
    pub fn malformed_policy(detail: impl Into<String>) -> Self {
        Self::with_message(S3ErrorCode::MalformedPolicy, detail)
    }

    /// Create a MalformedACLError error.
    #[must_use]
    pub fn malformed_acl(detail: impl Into<String>) -> Self {
        Self::with_message(S3ErrorCode::MalformedACLError, detail)
    }

    /// Create a ServiceUnavailable error.
    #[must_use]
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::with_message(S3ErrorCode::ServiceUnavailable, message)
    }
}
