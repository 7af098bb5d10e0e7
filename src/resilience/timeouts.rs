//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap backend calls with a deadline covering send and body read
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from other transport errors

use std::future::Future;
use std::time::Duration;

use tokio::time;

use crate::upstream::BackendError;

/// Run `fut`, failing with `BackendError::Timeout` once `deadline` elapses.
pub async fn with_deadline<F, T>(deadline: Duration, fut: F) -> Result<T, BackendError>
where
    F: Future<Output = Result<T, BackendError>>,
{
    match time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => Err(BackendError::Timeout(deadline.as_secs())),
    }
}
