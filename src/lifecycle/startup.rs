//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize subsystems in dependency order (metrics, backend client, router)
//! - Bind the listener and begin accepting traffic
//! - Wire OS signals to graceful shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last (traffic only when ready)

use axum::http::header::{InvalidHeaderName, InvalidHeaderValue};
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::GatewayConfig;
use crate::http::GatewayServer;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::upstream::BackendError;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("backend client: {0}")]
    Backend(#[from] BackendError),

    #[error("credentials.csrf_header: {0}")]
    CsrfHeader(#[from] InvalidHeaderName),

    #[error("cors.allowed_origin: {0}")]
    AllowedOrigin(#[from] InvalidHeaderValue),

    #[error("metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("invalid metrics address: {0}")]
    MetricsAddress(#[from] std::net::AddrParseError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Start the gateway and serve until a shutdown signal arrives.
pub async fn run(config: GatewayConfig) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?)?;
    }

    let bind_address = config.listener.bind_address.clone();
    let server = GatewayServer::new(config)?;

    let listener = TcpListener::bind(&bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: bind_address.clone(),
            source,
        })?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(shutdown.on_signal());

    server.run(listener, server_shutdown).await?;
    Ok(())
}
