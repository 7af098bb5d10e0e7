//! HTTP backend client.
//!
//! # Responsibilities
//! - Build the backend URL from the base URL and resolved path
//! - Shape the request body (JSON, streamed multipart, or query string)
//! - Read the full response as bytes within the configured deadline

use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::http::HeaderMap;
use reqwest::multipart::{Form, Part};
use url::Url;

use crate::config::{BackendConfig, TimeoutConfig};
use crate::http::NormalizedPayload;
use crate::resilience::timeouts::with_deadline;
use crate::routing::Endpoint;
use crate::upstream::{BackendError, BackendInvoker, RawResponse};

/// Invokes backend operations over HTTP with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    /// Base URL without trailing slash.
    base_url: String,
    request_timeout: Duration,
}

impl HttpBackend {
    pub fn new(backend: &BackendConfig, timeouts: &TimeoutConfig) -> Result<Self, BackendError> {
        let base_url = Url::parse(&backend.base_url)?;
        let mut builder =
            reqwest::Client::builder().connect_timeout(Duration::from_secs(timeouts.connect_secs));
        if !backend.use_system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(timeouts.request_secs),
        })
    }

    /// Full URL for a resolved path. The base URL's own path is kept.
    pub fn url_for(&self, path: &str) -> Result<Url, BackendError> {
        Ok(Url::parse(&format!("{}{}", self.base_url, path))?)
    }
}

#[async_trait]
impl BackendInvoker for HttpBackend {
    async fn invoke(
        &self,
        endpoint: &Endpoint,
        payload: &NormalizedPayload,
        headers: HeaderMap,
    ) -> Result<RawResponse, BackendError> {
        let start = Instant::now();
        let url = self.url_for(&endpoint.path)?;

        let mut request = self
            .client
            .request(endpoint.method.into(), url.clone())
            .headers(headers);

        request = if !endpoint.method.has_body() {
            if payload.has_files() {
                tracing::warn!(
                    method = %endpoint.method,
                    path = %endpoint.path,
                    files = payload.files().len(),
                    "Dropping uploads for bodiless backend method"
                );
            }
            request.query(&payload.text_pairs())
        } else if payload.has_files() {
            request.multipart(multipart_form(payload).await?)
        } else {
            request.json(payload.fields())
        };

        let raw = with_deadline(self.request_timeout, async {
            let response = request.send().await?;
            let status = response.status();
            let headers = response.headers().clone();
            let body = response.bytes().await?;
            Ok::<_, BackendError>(RawResponse {
                status,
                headers,
                body,
            })
        })
        .await?;

        tracing::debug!(
            url = %url,
            method = %endpoint.method,
            status = %raw.status,
            bytes = raw.body.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Backend responded"
        );

        if raw.status.is_success() {
            Ok(raw)
        } else {
            Err(BackendError::Status(raw))
        }
    }
}

/// Multipart body streaming each staged file from disk.
async fn multipart_form(payload: &NormalizedPayload) -> Result<Form, BackendError> {
    let mut form = Form::new();
    for (name, value) in payload.text_pairs() {
        form = form.text(name, value);
    }

    for file in payload.files() {
        let handle = tokio::fs::File::open(file.path())
            .await
            .map_err(|source| BackendError::Upload {
                file: file.file_name.clone(),
                source,
            })?;

        let part = Part::stream_with_length(reqwest::Body::from(handle), file.size)
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)?;
        form = form.part(file.field.clone(), part);
    }

    Ok(form)
}
