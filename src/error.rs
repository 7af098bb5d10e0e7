//! Client-facing errors.
//!
//! Every failure, whatever the stage, leaves the gateway as
//! `{ "error": "<message>" }` with a single status code. Backend failures
//! take the backend's status and, when its body is JSON, its `detail` or
//! `message` text.

use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::http::normalize::NormalizeError;
use crate::http::{is_json, media_type};
use crate::security::propagate_set_cookies;
use crate::upstream::{BackendError, RawResponse};

/// Message used when a transport failure prevents any backend response.
pub const UNREACHABLE_MESSAGE: &str = "Backend service unreachable";
pub const TIMEOUT_MESSAGE: &str = "Backend request timed out";
/// Message used when the gateway itself could not assemble the backend call.
pub const FORWARD_MESSAGE: &str = "Gateway could not forward the request";

/// The only body shape returned on failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
}

/// Gateway error type that implements `IntoResponse`.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("Request body too large")]
    PayloadTooLarge,

    /// Detail is logged, never returned.
    #[error("Malformed request body")]
    MalformedBody(String),

    #[error("Failed to stage upload")]
    UploadStaging(#[source] std::io::Error),

    #[error("Missing apiRoute")]
    MissingOperation,

    #[error("Unknown apiRoute: {0}")]
    RouteNotFound(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The backend answered 2xx with a body that is neither a document nor JSON.
    /// Its headers travel along so session cookies still reach the client.
    #[error("Invalid response from backend")]
    InvalidBackendResponse { detail: String, headers: HeaderMap },
}

impl GatewayError {
    /// Status and client message for this error.
    pub fn resolve(&self) -> (StatusCode, String) {
        match self {
            GatewayError::UnsupportedContentType(_) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, self.to_string())
            }
            GatewayError::PayloadTooLarge => (StatusCode::PAYLOAD_TOO_LARGE, self.to_string()),
            GatewayError::MalformedBody(_)
            | GatewayError::MissingOperation
            | GatewayError::RouteNotFound(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            GatewayError::MethodNotAllowed => (StatusCode::METHOD_NOT_ALLOWED, self.to_string()),
            GatewayError::UploadStaging(_) | GatewayError::InvalidBackendResponse { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            GatewayError::Backend(err) => resolve_backend(err),
        }
    }

    /// Emit a log line at a level matching who is at fault.
    pub fn log(&self, request_id: &str) {
        match self {
            GatewayError::MalformedBody(detail) => {
                tracing::warn!(request_id = %request_id, detail = %detail, "Malformed request body");
            }
            GatewayError::UploadStaging(e) => {
                tracing::error!(request_id = %request_id, error = %e, "Failed to stage upload");
            }
            GatewayError::Backend(BackendError::Status(raw)) => {
                tracing::warn!(request_id = %request_id, status = %raw.status, "Backend rejected request");
            }
            GatewayError::Backend(err @ BackendError::Upload { .. }) => {
                tracing::error!(request_id = %request_id, error = %err, "Failed to reopen staged upload");
            }
            GatewayError::Backend(err @ BackendError::Url(_)) => {
                tracing::error!(request_id = %request_id, error = %err, "Resolved path does not form a valid backend URL");
            }
            GatewayError::Backend(err) => {
                tracing::error!(request_id = %request_id, error = %err, "Backend call failed");
            }
            GatewayError::InvalidBackendResponse { detail, .. } => {
                tracing::error!(request_id = %request_id, detail = %detail, "Backend returned unreadable body");
            }
            other => {
                tracing::warn!(request_id = %request_id, error = %other, "Request rejected");
            }
        }
    }
}

impl From<NormalizeError> for GatewayError {
    fn from(err: NormalizeError) -> Self {
        match err {
            NormalizeError::UnsupportedContentType(ct) => GatewayError::UnsupportedContentType(ct),
            NormalizeError::TooLarge => GatewayError::PayloadTooLarge,
            NormalizeError::Malformed(detail) => GatewayError::MalformedBody(detail),
            NormalizeError::Staging(e) => GatewayError::UploadStaging(e),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, message) = self.resolve();
        let mut response = (status, Json(ErrorEnvelope { error: message })).into_response();

        match &self {
            GatewayError::Backend(BackendError::Status(raw)) => {
                propagate_set_cookies(&raw.headers, response.headers_mut());
            }
            GatewayError::InvalidBackendResponse { headers, .. } => {
                propagate_set_cookies(headers, response.headers_mut());
            }
            _ => {}
        }

        response
    }
}

fn resolve_backend(err: &BackendError) -> (StatusCode, String) {
    match err {
        BackendError::Status(raw) => {
            let message = backend_message(raw)
                .unwrap_or_else(|| format!("Request failed with status code {}", raw.status.as_u16()));
            (raw.status, message)
        }
        BackendError::Timeout(_) => (StatusCode::INTERNAL_SERVER_ERROR, TIMEOUT_MESSAGE.to_string()),
        BackendError::Transport(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, UNREACHABLE_MESSAGE.to_string())
        }
        BackendError::Upload { .. } | BackendError::Url(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, FORWARD_MESSAGE.to_string())
        }
    }
}

/// `detail` or `message` from a JSON error body, in that order.
fn backend_message(raw: &RawResponse) -> Option<String> {
    let media = media_type(&raw.headers)?;
    if !is_json(&media) {
        return None;
    }

    let body: Value = serde_json::from_slice(&raw.body).ok()?;
    ["detail", "message"]
        .iter()
        .find_map(|key| body.get(key).and_then(Value::as_str))
        .map(str::to_owned)
}
