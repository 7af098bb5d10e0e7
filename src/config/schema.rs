//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::routing::Method;

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Backend service location and response classification.
    pub backend: BackendConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// CORS settings applied to every response.
    pub cors: CorsConfig,

    /// Names of the cookies and header carrying session credentials.
    pub credentials: CredentialConfig,

    /// Request size limits and upload staging.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Operation identifier → backend endpoint. Replaces the built-in
    /// catalogue when non-empty.
    pub operations: BTreeMap<String, OperationConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Backend service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL every resolved path is appended to.
    pub base_url: String,

    /// Content types framed as downloadable documents instead of JSON.
    pub document_types: Vec<String>,

    /// Route backend calls through `HTTP_PROXY`/`HTTPS_PROXY` when set.
    pub use_system_proxy: bool,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            document_types: vec!["application/pdf".to_string()],
            use_system_proxy: true,
        }
    }
}

/// Timeout configuration for the backend call.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Total time allowed for one backend call in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Value of `Access-Control-Allow-Origin`.
    pub allowed_origin: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origin: "*".to_string(),
        }
    }
}

/// Session credential names shared with the backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CredentialConfig {
    pub session_cookie: String,
    pub csrf_cookie: String,
    pub csrf_header: String,
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            session_cookie: "sessionid".to_string(),
            csrf_cookie: "csrftoken".to_string(),
            csrf_header: "X-CSRFToken".to_string(),
        }
    }
}

/// Request limits and upload staging.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum body size in bytes, attachments included.
    pub max_body_size: usize,

    /// Directory for staged uploads. Defaults to the system temp dir.
    pub upload_dir: Option<PathBuf>,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_size: 50 * 1024 * 1024, // 50MB
            upload_dir: None,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// One entry of the `[operations]` table.
///
/// Accepts either a bare path (`login = "/auth/login/"`) or a table with an
/// explicit method (`report = { path = "/reports/", method = "GET" }`).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum OperationConfig {
    Path(String),
    Endpoint {
        path: String,
        #[serde(default)]
        method: Method,
    },
}

impl OperationConfig {
    pub fn path(&self) -> &str {
        match self {
            OperationConfig::Path(path) => path,
            OperationConfig::Endpoint { path, .. } => path,
        }
    }

    pub fn method(&self) -> Method {
        match self {
            OperationConfig::Path(_) => Method::default(),
            OperationConfig::Endpoint { method, .. } => *method,
        }
    }
}
