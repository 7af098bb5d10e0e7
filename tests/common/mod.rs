//! Shared utilities for integration testing.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use api_gateway::config::{GatewayConfig, OperationConfig};
use api_gateway::http::NormalizedPayload;
use api_gateway::lifecycle::Shutdown;
use api_gateway::{BackendError, BackendInvoker, Endpoint, GatewayServer, Method, RawResponse};
use async_trait::async_trait;
use axum::http::{HeaderMap, StatusCode};
use axum::Router;
use bytes::Bytes;
use serde_json::{Map, Value};
use tokio::net::TcpListener;

/// Serve `router` as a mock backend on an ephemeral port.
pub async fn start_mock_backend(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    addr
}

/// An address nothing is listening on.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Gateway config pointing at `backend` with the given operations.
pub fn gateway_config(backend: SocketAddr, operations: &[(&str, &str, Method)]) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.backend.base_url = format!("http://{}", backend);
    config.backend.use_system_proxy = false;
    config.cors.allowed_origin = "https://app.example.com".into();
    config.timeouts.request_secs = 5;
    config.operations = operations
        .iter()
        .map(|(name, path, method)| {
            (
                name.to_string(),
                OperationConfig::Endpoint {
                    path: path.to_string(),
                    method: *method,
                },
            )
        })
        .collect::<BTreeMap<_, _>>();
    config
}

/// A running gateway. Shuts down when dropped.
pub struct TestGateway {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl TestGateway {
    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the gateway with its real HTTP backend client.
pub async fn start_gateway(config: GatewayConfig) -> TestGateway {
    let server = GatewayServer::new(config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestGateway { addr, shutdown }
}

/// Client that never goes through a system proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(15))
        .build()
        .unwrap()
}

/// What a `RecordingBackend` saw for one call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub endpoint: Endpoint,
    pub fields: Map<String, Value>,
    pub files: Vec<(String, String, Vec<u8>)>,
    pub headers: HeaderMap,
}

/// In-process backend answering every call with a fixed JSON body.
#[derive(Clone)]
pub struct RecordingBackend {
    calls: Arc<AtomicUsize>,
    recorded: Arc<Mutex<Vec<RecordedCall>>>,
    reply: Bytes,
}

impl RecordingBackend {
    pub fn new(reply: Value) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            recorded: Arc::new(Mutex::new(Vec::new())),
            reply: Bytes::from(reply.to_string()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_call(&self) -> Option<RecordedCall> {
        self.recorded.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl BackendInvoker for RecordingBackend {
    async fn invoke(
        &self,
        endpoint: &Endpoint,
        payload: &NormalizedPayload,
        headers: HeaderMap,
    ) -> Result<RawResponse, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let files = payload
            .files()
            .iter()
            .map(|f| {
                let contents = std::fs::read(f.path()).unwrap();
                (f.field.clone(), f.file_name.clone(), contents)
            })
            .collect();

        self.recorded.lock().unwrap().push(RecordedCall {
            endpoint: endpoint.clone(),
            fields: payload.fields().clone(),
            files,
            headers,
        });

        let mut response_headers = HeaderMap::new();
        response_headers.insert(
            axum::http::header::CONTENT_TYPE,
            "application/json".parse().unwrap(),
        );
        Ok(RawResponse {
            status: StatusCode::OK,
            headers: response_headers,
            body: self.reply.clone(),
        })
    }
}
