//! Response framing.
//!
//! # Responsibilities
//! - Classify the backend response once: document or text
//! - Return documents byte-for-byte with their disposition
//! - Parse text as JSON and re-emit it as structured data
//! - Re-apply backend `Set-Cookie` headers on both paths
//!
//! # Design Decisions
//! - The client never receives an unframed byte buffer
//! - Success is always reported as 200, whatever 2xx the backend used

use axum::{
    body::Body,
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde_json::Value;

use crate::error::GatewayError;
use crate::http::{essence, media_type};
use crate::security::propagate_set_cookies;
use crate::upstream::RawResponse;

/// Disposition used when a document arrives without one.
pub const DEFAULT_DISPOSITION: &str = "attachment; filename=\"file.pdf\"";

/// A backend response after classification.
#[derive(Debug)]
pub enum BackendResponse {
    Document {
        content_type: HeaderValue,
        disposition: Option<HeaderValue>,
        body: Bytes,
        headers: HeaderMap,
    },
    Text {
        body: Bytes,
        headers: HeaderMap,
    },
}

impl BackendResponse {
    /// Decide the variant from the response content type.
    pub fn classify(raw: RawResponse, document_types: &[String]) -> Self {
        let is_document = media_type(&raw.headers)
            .map(|media| document_types.iter().any(|doc| essence(doc) == media))
            .unwrap_or(false);

        if is_document {
            let content_type = raw
                .headers
                .get(CONTENT_TYPE)
                .cloned()
                .unwrap_or_else(|| HeaderValue::from_static("application/octet-stream"));
            let disposition = raw.headers.get(CONTENT_DISPOSITION).cloned();
            BackendResponse::Document {
                content_type,
                disposition,
                body: raw.body,
                headers: raw.headers,
            }
        } else {
            BackendResponse::Text {
                body: raw.body,
                headers: raw.headers,
            }
        }
    }
}

/// Turns successful backend responses into client responses.
#[derive(Debug, Clone)]
pub struct ResponseFramer {
    document_types: Vec<String>,
}

impl ResponseFramer {
    pub fn new(document_types: Vec<String>) -> Self {
        Self { document_types }
    }

    pub fn frame(&self, raw: RawResponse) -> Result<Response, GatewayError> {
        match BackendResponse::classify(raw, &self.document_types) {
            BackendResponse::Document {
                content_type,
                disposition,
                body,
                headers,
            } => {
                let disposition =
                    disposition.unwrap_or_else(|| HeaderValue::from_static(DEFAULT_DISPOSITION));
                let mut response = (
                    StatusCode::OK,
                    [(CONTENT_TYPE, content_type), (CONTENT_DISPOSITION, disposition)],
                    Body::from(body),
                )
                    .into_response();
                propagate_set_cookies(&headers, response.headers_mut());
                Ok(response)
            }
            BackendResponse::Text { body, headers } => match parse_text(&body) {
                Ok(value) => {
                    let mut response = (StatusCode::OK, Json(value)).into_response();
                    propagate_set_cookies(&headers, response.headers_mut());
                    Ok(response)
                }
                Err(detail) => Err(GatewayError::InvalidBackendResponse { detail, headers }),
            },
        }
    }
}

fn parse_text(body: &[u8]) -> Result<Value, String> {
    let text = std::str::from_utf8(body).map_err(|e| e.to_string())?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(text).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::SET_COOKIE;
    use serde_json::json;

    fn raw(content_type: Option<&'static str>, body: &'static [u8]) -> RawResponse {
        let mut headers = HeaderMap::new();
        if let Some(ct) = content_type {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(ct));
        }
        RawResponse {
            status: StatusCode::OK,
            headers,
            body: Bytes::from_static(body),
        }
    }

    fn framer() -> ResponseFramer {
        ResponseFramer::new(vec!["application/pdf".into()])
    }

    async fn body_bytes(response: Response) -> Bytes {
        axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap()
    }

    #[test]
    fn test_classifies_by_media_type() {
        let docs = vec!["application/pdf".to_string()];
        assert!(matches!(
            BackendResponse::classify(raw(Some("Application/PDF; q=1"), b""), &docs),
            BackendResponse::Document { .. }
        ));
        assert!(matches!(
            BackendResponse::classify(raw(Some("application/json"), b"{}"), &docs),
            BackendResponse::Text { .. }
        ));
        assert!(matches!(
            BackendResponse::classify(raw(None, b"{}"), &docs),
            BackendResponse::Text { .. }
        ));
    }

    #[tokio::test]
    async fn test_pdf_is_returned_unchanged_with_default_disposition() {
        let pdf: &'static [u8] = b"%PDF-1.7\n\x00\xff\xfe binary";
        let response = framer().frame(raw(Some("application/pdf"), pdf)).unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/pdf");
        assert_eq!(response.headers()[CONTENT_DISPOSITION], DEFAULT_DISPOSITION);
        assert_eq!(body_bytes(response).await, Bytes::from_static(pdf));
    }

    #[tokio::test]
    async fn test_pdf_keeps_backend_disposition_and_cookies() {
        let mut backend = raw(Some("application/pdf"), b"%PDF");
        backend.headers.insert(
            CONTENT_DISPOSITION,
            HeaderValue::from_static("attachment; filename=\"invoice-42.pdf\""),
        );
        backend
            .headers
            .append(SET_COOKIE, HeaderValue::from_static("sessionid=abc; Path=/"));

        let response = framer().frame(backend).unwrap();
        assert_eq!(
            response.headers()[CONTENT_DISPOSITION],
            "attachment; filename=\"invoice-42.pdf\""
        );
        assert_eq!(response.headers().get_all(SET_COOKIE).iter().count(), 1);
    }

    #[tokio::test]
    async fn test_json_is_reemitted() {
        let mut backend = raw(Some("application/json"), b"{\"id\": 7, \"ok\": true}");
        backend.status = StatusCode::CREATED;
        backend
            .headers
            .append(SET_COOKIE, HeaderValue::from_static("sessionid=abc; Path=/"));
        backend
            .headers
            .append(SET_COOKIE, HeaderValue::from_static("csrftoken=xyz; Path=/"));

        let response = framer().frame(backend).unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(response.headers().get_all(SET_COOKIE).iter().count(), 2);

        let value: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(value, json!({"id": 7, "ok": true}));
    }

    #[tokio::test]
    async fn test_empty_text_frames_as_null() {
        let response = framer().frame(raw(None, b"")).unwrap();
        assert_eq!(&body_bytes(response).await[..], b"null");
    }

    #[test]
    fn test_non_json_text_is_rejected() {
        let err = framer().frame(raw(Some("text/html"), b"<html>")).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidBackendResponse { .. }));

        let err = framer().frame(raw(Some("text/plain"), b"\xff\xfe")).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidBackendResponse { .. }));
    }

    #[test]
    fn test_unreadable_body_keeps_backend_cookies() {
        let mut backend = raw(Some("text/html"), b"<p>Welcome back</p>");
        backend
            .headers
            .append(SET_COOKIE, HeaderValue::from_static("sessionid=abc; Path=/"));
        backend
            .headers
            .append(SET_COOKIE, HeaderValue::from_static("csrftoken=xyz; Path=/"));

        let response = framer().frame(backend).unwrap_err().into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers().get_all(SET_COOKIE).iter().count(), 2);
    }
}
