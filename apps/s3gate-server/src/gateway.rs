//! Gateway service in front of the public access gate.
//!
//! Health checks (`/_health`, `/health`) and the Prometheus scrape endpoint
//! (`/metrics`, when enabled) are answered here. Every other request goes
//! through [`PublicAccessService`] to the [`DecisionHandler`].

use std::convert::Infallible;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

use http_body_util::Either;
use hyper::service::Service;
use metrics_exporter_prometheus::PrometheusHandle;
use s3gate_http::{GateResponseBody, PublicAccessService};

use crate::handler::DecisionHandler;

/// Server version reported in health check responses.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Body of a gated response: a gate error or the handler's answer.
pub type GatedBody = Either<GateResponseBody, GateResponseBody>;

/// Body of any gateway response.
pub type GatewayBody = Either<GateResponseBody, GatedBody>;

/// Routes health and metrics probes locally and gates everything else.
#[derive(Clone)]
pub struct GatewayService {
    gated: PublicAccessService<DecisionHandler>,
    prometheus: Option<PrometheusHandle>,
}

impl GatewayService {
    /// Create a gateway. `/metrics` is served only when `prometheus` is set.
    #[must_use]
    pub fn new(
        gated: PublicAccessService<DecisionHandler>,
        prometheus: Option<PrometheusHandle>,
    ) -> Self {
        Self { gated, prometheus }
    }
}

impl fmt::Debug for GatewayService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayService")
            .field("gated", &self.gated)
            .field("metrics_enabled", &self.prometheus.is_some())
            .finish()
    }
}

impl<B: Send + 'static> Service<http::Request<B>> for GatewayService {
    type Response = http::Response<GatewayBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<B>) -> Self::Future {
        if is_health_check(req.method(), req.uri().path()) {
            return Box::pin(async { Ok(health_check_response().map(Either::Left)) });
        }

        if let Some(handle) = &self.prometheus {
            if is_metrics_endpoint(req.method(), req.uri().path()) {
                let resp = metrics_response(handle);
                return Box::pin(async { Ok(resp.map(Either::Left)) });
            }
        }

        let gated = self.gated.clone();
        Box::pin(async move {
            let resp = gated.call(req).await;
            Ok(resp.unwrap_or_else(|e| match e {}).map(Either::Right))
        })
    }
}

/// Check if the request is a health check probe.
fn is_health_check(method: &http::Method, path: &str) -> bool {
    *method == http::Method::GET && (path == "/_health" || path == "/health")
}

/// Check if the request is a Prometheus scrape.
fn is_metrics_endpoint(method: &http::Method, path: &str) -> bool {
    *method == http::Method::GET && path == "/metrics"
}

fn health_check_response() -> http::Response<GateResponseBody> {
    let body = serde_json::json!({
        "status": "running",
        "service": "s3gate",
        "version": VERSION,
    })
    .to_string();
    http::Response::builder()
        .status(http::StatusCode::OK)
        .header("Content-Type", "application/json")
        .body(GateResponseBody::from_string(body))
        .expect("static health response should be valid")
}

fn metrics_response(handle: &PrometheusHandle) -> http::Response<GateResponseBody> {
    http::Response::builder()
        .status(http::StatusCode::OK)
        .header("Content-Type", "text/plain; version=0.0.4; charset=utf-8")
        .body(GateResponseBody::from_string(handle.render()))
        .expect("static metrics response should be valid")
}
