//! Gateway configuration.
//!
//! Provides [`GateConfig`] for configuring the s3gate server. Values are
//! loaded from environment variables with LocalStack-compatible defaults for
//! the shared settings.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// s3gate server configuration.
///
/// # Examples
///
/// ```
/// use s3gate_core::config::GateConfig;
///
/// let config = GateConfig::default();
/// assert_eq!(config.gateway_listen, "0.0.0.0:4566");
/// assert!(config.buckets_file.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct GateConfig {
    /// Bind address for the gateway (e.g. `"0.0.0.0:4566"`).
    #[builder(default = String::from("0.0.0.0:4566"))]
    pub gateway_listen: String,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,

    /// JSON seed file with bucket policies and ACLs.
    #[builder(default, setter(strip_option))]
    pub buckets_file: Option<PathBuf>,

    /// Whether gate decisions are written to the audit log.
    #[builder(default = true)]
    pub audit: bool,

    /// Whether gate metrics are recorded and served on `/metrics`.
    #[builder(default = true)]
    pub metrics: bool,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            gateway_listen: String::from("0.0.0.0:4566"),
            log_level: String::from("info"),
            buckets_file: None,
            audit: true,
            metrics: true,
        }
    }
}

impl GateConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `GATEWAY_LISTEN` | `0.0.0.0:4566` |
    /// | `LOG_LEVEL` | `info` |
    /// | `S3GATE_BUCKETS_FILE` | unset |
    /// | `S3GATE_AUDIT` | `true` |
    /// | `S3GATE_METRICS` | `true` |
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(v) = lookup("GATEWAY_LISTEN") {
            config.gateway_listen = v;
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            config.log_level = v;
        }
        if let Some(v) = lookup("S3GATE_BUCKETS_FILE").filter(|v| !v.is_empty()) {
            config.buckets_file = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("S3GATE_AUDIT") {
            config.audit = parse_bool(&v);
        }
        if let Some(v) = lookup("S3GATE_METRICS") {
            config.metrics = parse_bool(&v);
        }

        config
    }
}

/// Parse a string as a boolean, accepting `"1"` and `"true"` (case-insensitive).
fn parse_bool(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}
