//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Normalized payload
//!     → `apiRoute` field (operation identifier)
//!     → router.rs (exact lookup in ResolutionTable)
//!     → Return: Endpoint { path, method } or not-found
//!
//! Table construction (at startup):
//!     [operations] from config, or catalog.rs when none configured
//!     → Freeze as immutable ResolutionTable
//!     → shared via Arc with every request
//! ```
//!
//! # Design Decisions
//! - Table built at startup, immutable at runtime
//! - No wildcards or pattern matching
//! - Deterministic: same identifier always resolves to the same endpoint

pub mod catalog;
pub mod router;

pub use router::{Endpoint, Method, ResolutionTable};
