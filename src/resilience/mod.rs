//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to backend:
//!     → timeouts.rs (deadline on connect + exchange)
//!     → On failure: surfaced once to the error normalizer
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every backend call has a deadline
//! - No retries: operations like record creation or email dispatch are
//!   not idempotent

pub mod timeouts;
