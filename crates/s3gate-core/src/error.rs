//! Library error types for s3gate-core.
//!
//! [`StoreError`] covers loading the in-memory bucket store from a seed file.
//! Authorization failures use [`GateError`](crate::gate::GateError) instead,
//! which separates denials from infrastructure faults.

/// Errors raised while building an [`InMemoryBucketStore`](crate::store::InMemoryBucketStore).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The seed file could not be read.
    #[error("failed to read bucket seed file {path}: {source}")]
    Io {
        /// Path of the seed file.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The seed file is not a valid seed document.
    #[error("invalid bucket seed document: {0}")]
    Parse(#[from] serde_json::Error),

    /// A seeded bucket carries a policy that does not parse.
    #[error("invalid policy for bucket {bucket}: {message}")]
    InvalidPolicy {
        /// Bucket the policy belongs to.
        bucket: String,
        /// Parser message.
        message: String,
    },
}
