use core::result::Result as CoreResult;
use thiserror::Error;

/// Result type for backend catalog operations.
pub type Result<T> = CoreResult<T, BackendError>;

/// Errors raised while querying a single backend catalog.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Error from kestrel-core.
    #[error("Core error: {0}")]
    Core(#[from] kestrel_core::Error),

    /// HTTP request to the backend failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend is not reachable.
    #[error("Backend not available: {0}")]
    Unavailable(String),
}

impl From<BackendError> for kestrel_core::Error {
    fn from(error: BackendError) -> Self {
        match error {
            BackendError::Core(inner) => inner,
            other => Self::Backend(other.to_string()),
        }
    }
}
