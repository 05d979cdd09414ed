//! s3gate server library: the gateway service and its accept loop.
//!
//! The binary in `main.rs` wires these together from environment
//! configuration. Integration tests use them to run the full stack
//! in-process.

pub mod gateway;
pub mod handler;
pub mod server;

pub use gateway::GatewayService;
pub use handler::DecisionHandler;

/// Process-wide Prometheus handle shared by tests; the recorder can be
/// installed only once.
#[cfg(test)]
pub(crate) fn test_prometheus() -> metrics_exporter_prometheus::PrometheusHandle {
    static HANDLE: std::sync::OnceLock<metrics_exporter_prometheus::PrometheusHandle> =
        std::sync::OnceLock::new();
    HANDLE
        .get_or_init(|| server::install_prometheus().expect("recorder installs"))
        .clone()
}
