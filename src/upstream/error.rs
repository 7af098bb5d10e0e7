//! Backend invocation errors.

use thiserror::Error;

use crate::upstream::RawResponse;

/// Why a backend call did not produce a successful response.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend answered with a non-2xx status.
    #[error("backend responded with status {}", .0.status)]
    Status(RawResponse),

    #[error("backend request timed out after {0} seconds")]
    Timeout(u64),

    #[error("backend transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to read staged upload '{file}': {source}")]
    Upload {
        file: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid backend url: {0}")]
    Url(#[from] url::ParseError),
}

impl BackendError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            BackendError::Status(_) => "status",
            BackendError::Timeout(_) => "timeout",
            BackendError::Transport(_) => "transport",
            BackendError::Upload { .. } => "upload",
            BackendError::Url(_) => "url",
        }
    }
}
