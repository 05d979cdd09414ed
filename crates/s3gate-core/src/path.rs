//! Bucket/object extraction from a path-style request path.

/// The bucket and object a request targets.
///
/// Derived from the raw request path: one leading `/` is stripped and the rest
/// is split on the first remaining `/`. The object part keeps any further
/// separators and is never split again. The path is not percent-decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourcePath {
    /// Bucket name, empty for the service root.
    pub bucket: String,
    /// Object key, empty for bucket-level requests.
    pub object: String,
}

impl ResourcePath {
    /// Parse a raw request path.
    ///
    /// # Examples
    ///
    /// ```
    /// use s3gate_core::path::ResourcePath;
    ///
    /// let p = ResourcePath::parse("/mybucket/my/nested/object");
    /// assert_eq!(p.bucket, "mybucket");
    /// assert_eq!(p.object, "my/nested/object");
    /// ```
    #[must_use]
    pub fn parse(path: &str) -> Self {
        let trimmed = path.strip_prefix('/').unwrap_or(path);
        let (bucket, object) = trimmed.split_once('/').unwrap_or((trimmed, ""));
        Self {
            bucket: bucket.to_owned(),
            object: object.to_owned(),
        }
    }

    /// Whether the path addresses the service root (no bucket segment).
    #[must_use]
    pub fn is_service_root(&self) -> bool {
        self.bucket.is_empty()
    }

    /// Whether the path addresses a bucket without an object.
    #[must_use]
    pub fn is_bucket_only(&self) -> bool {
        self.object.is_empty()
    }
}
