//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → headers.rs (answer preflight, stamp CORS headers on the way out)
//!     → credentials.rs (session + CSRF cookies → outbound headers)
//!     → Pass to backend invocation
//!
//! Backend response:
//!     → credentials.rs (re-apply every Set-Cookie onto the client response)
//! ```
//!
//! # Design Decisions
//! - The gateway never judges credentials; the backend is the authority
//! - CORS headers are present on every response, errors included

pub mod credentials;
pub mod headers;

pub use credentials::{propagate_set_cookies, CredentialPropagator, Credentials};
pub use headers::{cors_middleware, CorsHeaders};
