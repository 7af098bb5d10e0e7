//! Backend invocation subsystem.
//!
//! # Data Flow
//! ```text
//! Endpoint + NormalizedPayload + credential headers
//!     → client.rs (one HTTP call, body shaped by method and files)
//!     → resilience::timeouts (deadline on the whole exchange)
//!     → RawResponse (status, headers, raw bytes)
//!     → Ok for 2xx, BackendError::Status otherwise
//! ```
//!
//! # Design Decisions
//! - Exactly one attempt; backend operations are not assumed idempotent
//! - Response bodies are read as bytes; interpretation is left to the framer
//! - `BackendInvoker` is a trait so handlers can run against a fake

pub mod client;
pub mod error;

use async_trait::async_trait;
use axum::http::{HeaderMap, StatusCode};
use bytes::Bytes;

use crate::http::NormalizedPayload;
use crate::routing::Endpoint;

pub use client::HttpBackend;
pub use error::BackendError;

/// Uninterpreted backend response.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Performs the backend call for a resolved operation.
#[async_trait]
pub trait BackendInvoker: Send + Sync {
    async fn invoke(
        &self,
        endpoint: &Endpoint,
        payload: &NormalizedPayload,
        headers: HeaderMap,
    ) -> Result<RawResponse, BackendError>;
}
