//! Shared types for the S3 public access gate.
//!
//! - [`action`]: the closed set of storage actions a request is classified into.
//! - [`error`]: S3 wire error codes and the [`S3Error`] type.

pub mod action;
pub mod error;

pub use action::S3Action;
pub use error::{S3Error, S3ErrorCode};
