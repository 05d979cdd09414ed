//! Integration tests for the s3gate server.
//!
//! Each test starts the full gateway stack in-process on an ephemeral port,
//! seeded with its own buckets, and talks to it over HTTP with `reqwest`.
//!
//! ```text
//! cargo test -p s3gate-integration
//! ```

use std::net::SocketAddr;
use std::sync::{Arc, Once};

use s3gate_core::GateConfig;
use s3gate_core::store::{BucketSeed, InMemoryBucketStore};
use s3gate_server::server::{build_gateway, serve};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// A gateway running on a local ephemeral port. Shuts down on drop.
#[derive(Debug)]
pub struct TestServer {
    addr: SocketAddr,
    client: reqwest::Client,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl TestServer {
    /// Start a server seeded with `seed` (the bucket seed file format).
    pub async fn start(seed: serde_json::Value) -> Self {
        init_tracing();

        let seed: BucketSeed = serde_json::from_value(seed).expect("valid bucket seed");
        let store = Arc::new(InMemoryBucketStore::from_seed(seed).expect("seed loads"));
        let config = GateConfig::builder()
            .gateway_listen("127.0.0.1:0".to_owned())
            .metrics(false)
            .build();

        let listener = TcpListener::bind(config.gateway_listen.as_str())
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        let gateway = build_gateway(&config, store, None);

        let (tx, rx) = oneshot::channel();
        let handle = tokio::spawn(async move {
            let shutdown = async {
                rx.await.ok();
            };
            if let Err(e) = serve(listener, gateway, shutdown).await {
                tracing::error!(error = %e, "test server failed");
            }
        });

        let client = reqwest::Client::builder()
            .no_proxy()
            .build()
            .expect("reqwest client");

        Self {
            addr,
            client,
            shutdown: Some(tx),
            handle: Some(handle),
        }
    }

    /// Absolute URL for a path-and-query on this server.
    #[must_use]
    pub fn url(&self, path_and_query: &str) -> String {
        format!("http://{}{path_and_query}", self.addr)
    }

    /// Send an anonymous request.
    pub async fn request(
        &self,
        method: reqwest::Method,
        path_and_query: &str,
    ) -> reqwest::Response {
        self.client
            .request(method, self.url(path_and_query))
            .send()
            .await
            .expect("request sent")
    }

    /// Send an anonymous GET.
    pub async fn get(&self, path_and_query: &str) -> reqwest::Response {
        self.request(reqwest::Method::GET, path_and_query).await
    }

    /// The underlying HTTP client.
    #[must_use]
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Stop accepting connections and wait for in-flight requests.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Read a response header as a string.
#[must_use]
pub fn header<'a>(resp: &'a reqwest::Response, name: &str) -> Option<&'a str> {
    resp.headers().get(name).and_then(|v| v.to_str().ok())
}

mod test_gateway;
mod test_public_access;
