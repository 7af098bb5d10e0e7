//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Client POST (json | multipart | urlencoded)
//!     → server.rs (Axum setup, CORS + request ID middleware)
//!     → normalize.rs (content-type dispatch → NormalizedPayload)
//!     → [routing resolves apiRoute → Endpoint]
//!     → [upstream invokes backend → RawResponse]
//!     → response.rs (frame as document or JSON)
//!     → Send to client
//! ```

pub mod normalize;
pub mod request;
pub mod response;
pub mod server;

use axum::http::{header::CONTENT_TYPE, HeaderMap};

pub use normalize::{BodyKind, NormalizeError, NormalizedPayload, RequestNormalizer, UploadedFile};
pub use request::{request_id, UuidRequestId, X_REQUEST_ID};
pub use response::{BackendResponse, ResponseFramer};
pub use server::{AppState, GatewayServer};

/// Lowercased media type of the `Content-Type` header, parameters stripped.
pub fn media_type(headers: &HeaderMap) -> Option<String> {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(essence)
}

/// `"Application/JSON; charset=utf-8"` → `"application/json"`.
pub fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Whether a media type carries JSON (`application/json` or `+json` suffix).
pub fn is_json(media_type: &str) -> bool {
    media_type == "application/json" || media_type.ends_with("+json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn essence_strips_parameters_and_case() {
        assert_eq!(essence("Application/JSON; charset=utf-8"), "application/json");
        assert_eq!(
            essence("multipart/form-data; boundary=----x"),
            "multipart/form-data"
        );
        assert_eq!(essence(""), "");
    }

    #[test]
    fn media_type_reads_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(media_type(&headers), None);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/pdf"));
        assert_eq!(media_type(&headers).as_deref(), Some("application/pdf"));
    }

    #[test]
    fn json_detection() {
        assert!(is_json("application/json"));
        assert!(is_json("application/problem+json"));
        assert!(!is_json("text/html"));
    }
}
