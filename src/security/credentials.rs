//! Session credential propagation.
//!
//! # Responsibilities
//! - Extract the session and CSRF cookies from the client request
//! - Build the outbound CSRF header and synthesized `Cookie` header
//! - Copy every backend `Set-Cookie` onto the client response
//!
//! # Design Decisions
//! - Missing cookies are forwarded as empty values; the backend decides
//! - `Set-Cookie` entries are appended one by one, never merged

use axum::http::header::{InvalidHeaderName, COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderName, HeaderValue};

use crate::config::CredentialConfig;

/// Session credentials carried by the client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub session_id: String,
    pub csrf_token: String,
}

/// Moves session credentials across the gateway boundary.
#[derive(Debug, Clone)]
pub struct CredentialPropagator {
    session_cookie: String,
    csrf_cookie: String,
    csrf_header: HeaderName,
}

impl CredentialPropagator {
    pub fn new(config: &CredentialConfig) -> Result<Self, InvalidHeaderName> {
        Ok(Self {
            session_cookie: config.session_cookie.clone(),
            csrf_cookie: config.csrf_cookie.clone(),
            csrf_header: HeaderName::from_bytes(config.csrf_header.as_bytes())?,
        })
    }

    /// Read the session and CSRF cookies from the request headers.
    pub fn extract(&self, headers: &HeaderMap) -> Credentials {
        Credentials {
            session_id: cookie_value(headers, &self.session_cookie).unwrap_or_default(),
            csrf_token: cookie_value(headers, &self.csrf_cookie).unwrap_or_default(),
        }
    }

    /// Headers to attach to the backend call.
    pub fn outbound_headers(&self, credentials: &Credentials) -> HeaderMap {
        let mut headers = HeaderMap::new();

        let cookie = format!(
            "{}={}; {}={}",
            self.session_cookie, credentials.session_id, self.csrf_cookie, credentials.csrf_token
        );

        match HeaderValue::from_str(&credentials.csrf_token) {
            Ok(value) => {
                headers.insert(self.csrf_header.clone(), value);
            }
            Err(_) => tracing::warn!("CSRF token is not a valid header value, dropping it"),
        }
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                headers.insert(COOKIE, value);
            }
            Err(_) => tracing::warn!("Session cookie is not a valid header value, dropping it"),
        }

        headers
    }
}

/// Find a cookie by name across every `Cookie` header.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().to_string())
}

/// Append every `Set-Cookie` from `from` onto `to`. Returns how many were copied.
pub fn propagate_set_cookies(from: &HeaderMap, to: &mut HeaderMap) -> usize {
    let mut copied = 0;
    for value in from.get_all(SET_COOKIE) {
        to.append(SET_COOKIE, value.clone());
        copied += 1;
    }
    copied
}
