//! Stack assembly and the accept loop.

use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use s3gate_core::audit::{AuditLogger, NoopAuditLogger, TracingAuditLogger};
use s3gate_core::metrics::GateMetrics;
use s3gate_core::{BuiltinVerifier, GateConfig, InMemoryBucketStore, PublicAccessGate};
use s3gate_http::PublicAccessService;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::gateway::GatewayService;
use crate::handler::DecisionHandler;

/// Load the bucket store from the configured seed file, or start empty.
pub fn load_store(config: &GateConfig) -> Result<InMemoryBucketStore> {
    match &config.buckets_file {
        Some(path) => InMemoryBucketStore::from_seed_file(path)
            .with_context(|| format!("failed to load buckets from {}", path.display())),
        None => {
            warn!("S3GATE_BUCKETS_FILE not set, every anonymous request will be denied");
            Ok(InMemoryBucketStore::new())
        }
    }
}

/// Install the global Prometheus recorder and register metric descriptions.
pub fn install_prometheus() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .context("failed to install Prometheus recorder")?;
    GateMetrics::describe();
    Ok(handle)
}

/// Assemble the gateway over `store` with the builtin verifier.
#[must_use]
pub fn build_gateway(
    config: &GateConfig,
    store: Arc<InMemoryBucketStore>,
    prometheus: Option<PrometheusHandle>,
) -> GatewayService {
    let gate = PublicAccessGate::new(store, Arc::new(BuiltinVerifier));
    let audit: Arc<dyn AuditLogger> = if config.audit {
        Arc::new(TracingAuditLogger)
    } else {
        Arc::new(NoopAuditLogger)
    };
    let gated = PublicAccessService::new(DecisionHandler, gate)
        .with_audit(audit)
        .with_metrics(GateMetrics::new(config.metrics && prometheus.is_some()));
    GatewayService::new(gated, prometheus)
}

/// Run the accept loop until `shutdown` resolves, then drain connections.
pub async fn serve(
    listener: TcpListener,
    service: GatewayService,
    shutdown: impl Future<Output = ()>,
) -> Result<()> {
    let graceful = hyper_util::server::graceful::GracefulShutdown::new();
    let http = HttpConnBuilder::new(TokioExecutor::new());

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = listener.accept() => {
                let (stream, peer_addr) = match result {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "failed to accept connection");
                        continue;
                    }
                };

                let svc = service.clone();
                let conn = http.serve_connection(TokioIo::new(stream), svc);
                let conn = graceful.watch(conn.into_owned());

                tokio::spawn(async move {
                    if let Err(e) = conn.await {
                        error!(peer_addr = %peer_addr, error = %e, "connection error");
                    }
                });
            }

            () = &mut shutdown => {
                info!("shutting down gracefully");
                break;
            }
        }
    }

    graceful.shutdown().await;
    info!("all connections drained, exiting");

    Ok(())
}
