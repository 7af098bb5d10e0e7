//! CORS headers and preflight handling.
//!
//! # Responsibilities
//! - Answer every `OPTIONS` request with 204 and an empty body
//! - Stamp the fixed CORS headers on every response, errors included
//!
//! # Design Decisions
//! - Preflight is answered before routing, regardless of path or payload
//! - Only the allowed origin is configurable; methods and headers are fixed

use axum::{
    body::Body,
    extract::State,
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
            ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, InvalidHeaderValue,
        },
        HeaderMap, HeaderValue, Method, Request, StatusCode,
    },
    middleware::Next,
    response::Response,
};

use crate::config::CorsConfig;

const ALLOW_METHODS: HeaderValue = HeaderValue::from_static("POST, OPTIONS");
const ALLOW_HEADERS: HeaderValue = HeaderValue::from_static("Content-Type, Authorization");
const ALLOW_CREDENTIALS: HeaderValue = HeaderValue::from_static("true");

/// Precomputed CORS response headers.
#[derive(Debug, Clone)]
pub struct CorsHeaders {
    allow_origin: HeaderValue,
}

impl CorsHeaders {
    pub fn new(config: &CorsConfig) -> Result<Self, InvalidHeaderValue> {
        Ok(Self {
            allow_origin: HeaderValue::from_str(&config.allowed_origin)?,
        })
    }

    /// Overwrite the CORS headers on a response.
    pub fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, self.allow_origin.clone());
        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, ALLOW_METHODS);
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, ALLOW_HEADERS);
        headers.insert(ACCESS_CONTROL_ALLOW_CREDENTIALS, ALLOW_CREDENTIALS);
    }
}

/// Middleware answering preflights and decorating all other responses.
pub async fn cors_middleware(
    State(cors): State<CorsHeaders>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let mut response = if request.method() == Method::OPTIONS {
        let mut preflight = Response::new(Body::empty());
        *preflight.status_mut() = StatusCode::NO_CONTENT;
        preflight
    } else {
        next.run(request).await
    };

    cors.apply(response.headers_mut());
    response
}
