//! Protocol gateway between a browser client and backend HTTP services.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod routing;
pub mod security;
pub mod upstream;

pub use config::schema::GatewayConfig;
pub use error::{ErrorEnvelope, GatewayError};
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
pub use routing::{Endpoint, Method, ResolutionTable};
pub use upstream::{BackendError, BackendInvoker, RawResponse};
