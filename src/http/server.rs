//! HTTP server setup and the gateway handler.
//!
//! # Responsibilities
//! - Create Axum Router with the single gateway entry point
//! - Wire up middleware (CORS, request ID, tracing, body limit)
//! - Run each request through normalize → resolve → invoke → frame
//! - Bind server to listener with graceful shutdown

use std::io;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, Method, Request},
    middleware,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::http::normalize::{BodyKind, RequestNormalizer};
use crate::http::request::{request_id, UuidRequestId, X_REQUEST_ID};
use crate::http::response::ResponseFramer;
use crate::lifecycle::startup::StartupError;
use crate::observability::metrics;
use crate::routing::ResolutionTable;
use crate::security::{cors_middleware, CorsHeaders, CredentialPropagator};
use crate::upstream::{BackendInvoker, HttpBackend};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<ResolutionTable>,
    pub backend: Arc<dyn BackendInvoker>,
    pub normalizer: Arc<RequestNormalizer>,
    pub credentials: Arc<CredentialPropagator>,
    pub framer: Arc<ResponseFramer>,
}

/// HTTP server for the gateway.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
    table: Arc<ResolutionTable>,
}

impl GatewayServer {
    /// Create a server calling the configured backend over HTTP.
    pub fn new(config: GatewayConfig) -> Result<Self, StartupError> {
        let backend = HttpBackend::new(&config.backend, &config.timeouts)?;
        let table = ResolutionTable::from_config(&config.operations);
        Self::with_backend(config, table, Arc::new(backend))
    }

    /// Create a server with an explicit resolution table and invoker.
    pub fn with_backend(
        config: GatewayConfig,
        table: ResolutionTable,
        backend: Arc<dyn BackendInvoker>,
    ) -> Result<Self, StartupError> {
        let table = Arc::new(table);
        let state = AppState {
            table: table.clone(),
            backend,
            normalizer: Arc::new(RequestNormalizer::new(config.limits.upload_dir.clone())),
            credentials: Arc::new(CredentialPropagator::new(&config.credentials)?),
            framer: Arc::new(ResponseFramer::new(config.backend.document_types.clone())),
        };
        let cors = CorsHeaders::new(&config.cors)?;

        let router = Self::build_router(&config, state, cors);
        Ok(Self {
            router,
            config,
            table,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState, cors: CorsHeaders) -> Router {
        Router::new()
            .route("/", any(gateway_handler))
            .route("/{*path}", any(gateway_handler))
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.limits.max_body_size))
            .layer(middleware::from_fn_with_state(cors, cors_middleware))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId))
    }

    /// The router, for serving or for driving in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn table(&self) -> &ResolutionTable {
        &self.table
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            operations = self.table.len(),
            backend = %self.config.backend.base_url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Gateway entry point.
async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let request_id = request_id(request.headers()).unwrap_or_else(|| "unknown".to_string());

    let mut operation = None;
    let response = match forward(&state, request, &request_id, &mut operation).await {
        Ok(response) => response,
        Err(err) => {
            err.log(&request_id);
            if let GatewayError::Backend(backend_err) = &err {
                metrics::record_backend_error(backend_err.kind());
            }
            err.into_response()
        }
    };

    let status = response.status();
    tracing::debug!(
        request_id = %request_id,
        operation = operation.as_deref().unwrap_or("-"),
        status = %status,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Request completed"
    );
    metrics::record_request(
        operation.as_deref().unwrap_or("unresolved"),
        status.as_u16(),
        start,
    );
    response
}

/// Normalize, resolve, invoke and frame one request.
///
/// `operation` is filled once the identifier resolves, for logging and metrics.
async fn forward(
    state: &AppState,
    request: Request<Body>,
    request_id: &str,
    operation: &mut Option<String>,
) -> Result<Response, GatewayError> {
    if request.method() != Method::POST {
        return Err(GatewayError::MethodNotAllowed);
    }

    // Rejected before any body bytes are read.
    let kind = BodyKind::detect(request.headers())?;
    let credentials = state.credentials.extract(request.headers());

    let mut payload = state.normalizer.normalize(kind, request).await?;

    let name = payload.take_operation().ok_or(GatewayError::MissingOperation)?;
    let endpoint = state
        .table
        .resolve(&name)
        .ok_or_else(|| GatewayError::RouteNotFound(name.clone()))?;
    *operation = Some(name);

    tracing::debug!(
        request_id = %request_id,
        operation = operation.as_deref().unwrap_or_default(),
        method = %endpoint.method,
        path = %endpoint.path,
        fields = payload.fields().len(),
        files = payload.files().len(),
        "Forwarding to backend"
    );

    let mut headers = state.credentials.outbound_headers(&credentials);
    if let Ok(value) = HeaderValue::from_str(request_id) {
        headers.insert(X_REQUEST_ID, value);
    }

    let raw = state
        .backend
        .invoke(endpoint, &payload, headers)
        .await
        .map_err(GatewayError::from)?;

    // `payload` (and its staged files) is dropped once framing completes.
    state.framer.frame(raw)
}
