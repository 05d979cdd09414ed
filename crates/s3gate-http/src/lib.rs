//! HTTP layer for the s3gate public access gate.
//!
//! [`PublicAccessService`] wraps any hyper service and runs every request
//! through a [`PublicAccessGate`](s3gate_core::PublicAccessGate) first:
//!
//! - authenticated requests reach the inner service untouched
//! - allowed anonymous requests reach it with a [`PublicAccess`] extension
//! - everything else is answered here with an S3 XML error

pub mod body;
pub mod request;
pub mod response;
pub mod service;

pub use body::GateResponseBody;
pub use service::{PublicAccess, PublicAccessService};
