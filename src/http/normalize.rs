//! Request body normalization.
//!
//! # Responsibilities
//! - Decide the body encoding from `Content-Type` before reading the body
//! - Parse JSON, multipart and URL-encoded bodies into one `NormalizedPayload`
//! - Stream multipart file parts to request-scoped temporary files
//!
//! # Design Decisions
//! - Unknown encodings are rejected without touching the body
//! - Repeated form fields become lists; single values collapse to scalars
//! - Staged files are deleted when the payload is dropped

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use axum::body::Body;
use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{FromRequest, Multipart};
use axum::http::{header::CONTENT_TYPE, HeaderMap, Request, StatusCode};
use bytes::Bytes;
use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

/// Field naming the operation to invoke.
pub const OPERATION_FIELD: &str = "apiRoute";

/// MIME type for file parts sent without one.
pub const DEFAULT_FILE_TYPE: &str = "application/octet-stream";

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("request body exceeds the configured limit")]
    TooLarge,

    #[error("malformed request body: {0}")]
    Malformed(String),

    #[error("failed to stage upload: {0}")]
    Staging(#[from] std::io::Error),
}

/// Supported body encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Json,
    Multipart,
    UrlEncoded,
}

impl BodyKind {
    /// Classify the request by its `Content-Type` header alone.
    pub fn detect(headers: &HeaderMap) -> Result<Self, NormalizeError> {
        match super::media_type(headers).as_deref() {
            Some("application/json") => Ok(BodyKind::Json),
            Some("multipart/form-data") => Ok(BodyKind::Multipart),
            Some("application/x-www-form-urlencoded") => Ok(BodyKind::UrlEncoded),
            _ => {
                let raw = headers
                    .get(CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("none");
                Err(NormalizeError::UnsupportedContentType(raw.to_string()))
            }
        }
    }
}

/// A file part staged on disk for the lifetime of the request.
#[derive(Debug)]
pub struct UploadedFile {
    /// Form field the file was submitted under.
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub size: u64,
    staged: NamedTempFile,
}

impl UploadedFile {
    /// Location of the staged contents.
    pub fn path(&self) -> &Path {
        self.staged.path()
    }
}

/// Encoding-independent request body.
#[derive(Debug, Default)]
pub struct NormalizedPayload {
    fields: Map<String, Value>,
    files: Vec<UploadedFile>,
}

impl NormalizedPayload {
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self {
            fields,
            files: Vec::new(),
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn files(&self) -> &[UploadedFile] {
        &self.files
    }

    pub fn has_files(&self) -> bool {
        !self.files.is_empty()
    }

    /// Remove the operation identifier from the fields.
    ///
    /// Returns `None` when it is absent, empty, or not a string.
    pub fn take_operation(&mut self) -> Option<String> {
        match self.fields.remove(OPERATION_FIELD) {
            Some(Value::String(operation)) if !operation.is_empty() => Some(operation),
            _ => None,
        }
    }

    /// Fields flattened to string pairs; list values repeat the key.
    pub fn text_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.fields.len());
        for (name, value) in &self.fields {
            match value {
                Value::Array(items) => {
                    for item in items {
                        pairs.push((name.clone(), scalar_text(item)));
                    }
                }
                Value::Null => {}
                other => pairs.push((name.clone(), scalar_text(other))),
            }
        }
        pairs
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Parses incoming bodies into `NormalizedPayload`s.
#[derive(Debug, Clone, Default)]
pub struct RequestNormalizer {
    upload_dir: Option<PathBuf>,
}

impl RequestNormalizer {
    /// Files are staged in `upload_dir`, or the system temp dir when `None`.
    pub fn new(upload_dir: Option<PathBuf>) -> Self {
        Self { upload_dir }
    }

    pub async fn normalize(
        &self,
        kind: BodyKind,
        request: Request<Body>,
    ) -> Result<NormalizedPayload, NormalizeError> {
        match kind {
            BodyKind::Json => parse_json(&read_body(request).await?),
            BodyKind::UrlEncoded => parse_urlencoded(&read_body(request).await?),
            BodyKind::Multipart => self.parse_multipart(request).await,
        }
    }

    async fn parse_multipart(
        &self,
        request: Request<Body>,
    ) -> Result<NormalizedPayload, NormalizeError> {
        let mut multipart = Multipart::from_request(request, &())
            .await
            .map_err(|rejection| NormalizeError::Malformed(rejection.body_text()))?;

        let mut values = Vec::new();
        let mut files = Vec::new();

        while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
            let Some(name) = field.name().map(str::to_owned) else {
                tracing::debug!("Skipping unnamed multipart field");
                continue;
            };

            match field.file_name().map(str::to_owned) {
                Some(file_name) if !file_name.is_empty() => {
                    let content_type = field
                        .content_type()
                        .unwrap_or(DEFAULT_FILE_TYPE)
                        .to_owned();
                    let file = self.stage(&mut field, name, file_name, content_type).await?;
                    tracing::debug!(
                        field = %file.field,
                        file_name = %file.file_name,
                        size = file.size,
                        "Staged upload"
                    );
                    files.push(file);
                }
                // Empty file inputs are submitted with filename="".
                Some(_) => continue,
                None => {
                    let text = field.text().await.map_err(multipart_error)?;
                    values.push((name, text));
                }
            }
        }

        Ok(NormalizedPayload {
            fields: collapse(values),
            files,
        })
    }

    async fn stage(
        &self,
        field: &mut Field<'_>,
        name: String,
        file_name: String,
        content_type: String,
    ) -> Result<UploadedFile, NormalizeError> {
        let staged = match &self.upload_dir {
            Some(dir) => tempfile::Builder::new().prefix("upload-").tempfile_in(dir)?,
            None => tempfile::Builder::new().prefix("upload-").tempfile()?,
        };

        let mut out = tokio::fs::File::from_std(staged.as_file().try_clone()?);
        let mut size = 0u64;
        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            out.write_all(&chunk).await?;
            size += chunk.len() as u64;
        }
        out.flush().await?;

        Ok(UploadedFile {
            field: name,
            file_name,
            content_type,
            size,
            staged,
        })
    }
}

async fn read_body(request: Request<Body>) -> Result<Bytes, NormalizeError> {
    Bytes::from_request(request, &()).await.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            NormalizeError::TooLarge
        } else {
            NormalizeError::Malformed(rejection.body_text())
        }
    })
}

fn multipart_error(err: MultipartError) -> NormalizeError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        NormalizeError::TooLarge
    } else {
        NormalizeError::Malformed(err.body_text())
    }
}

fn parse_json(bytes: &[u8]) -> Result<NormalizedPayload, NormalizeError> {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(fields)) => Ok(NormalizedPayload::from_fields(fields)),
        Ok(_) => Err(NormalizeError::Malformed("expected a JSON object".into())),
        Err(e) => Err(NormalizeError::Malformed(e.to_string())),
    }
}

fn parse_urlencoded(bytes: &[u8]) -> Result<NormalizedPayload, NormalizeError> {
    std::str::from_utf8(bytes).map_err(|e| NormalizeError::Malformed(e.to_string()))?;
    let pairs = url::form_urlencoded::parse(bytes).into_owned().collect();
    Ok(NormalizedPayload::from_fields(collapse(pairs)))
}

/// Group repeated keys; single-element groups collapse to a plain string.
fn collapse(pairs: Vec<(String, String)>) -> Map<String, Value> {
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in pairs {
        grouped.entry(name).or_default().push(value);
    }

    grouped
        .into_iter()
        .map(|(name, mut values)| {
            let value = if values.len() == 1 {
                Value::String(values.remove(0))
            } else {
                Value::Array(values.into_iter().map(Value::String).collect())
            };
            (name, value)
        })
        .collect()
}
