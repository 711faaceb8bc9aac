use core::result::Result as CoreResult;
use std::io::Error as IoError;

use serde_json::Error as SerdeJsonError;
use thiserror::Error;
use toml::de::Error as TomlError;

/// Result type for core operations.
pub type Result<T> = CoreResult<T, Error>;

/// Errors that can occur in the core library.
#[derive(Debug, Error)]
pub enum Error {
    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization or deserialization failed.
    #[error("JSON serialization error: {0}")]
    Json(#[from] SerdeJsonError),

    /// TOML deserialization failed.
    #[error("TOML deserialization error: {0}")]
    Toml(#[from] TomlError),

    /// Settings are invalid or missing.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A backend catalog encountered an error.
    #[error("Backend error: {0}")]
    Backend(String),

    /// Required API key was not found.
    #[error("API key not found: {0}")]
    MissingApiKey(String),

    /// A general error not covered by other variants.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Determines whether this error may succeed if retried.
    ///
    /// Returns `true` for transient errors like backend failures.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Backend(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value as JsonValue, from_str};
    use std::io;

    #[test]
    fn test_error_display() {
        let error1 = Error::Config("invalid settings".to_owned());
        assert_eq!(error1.to_string(), "Configuration error: invalid settings");

        let error2 = Error::Backend("daemon refused connection".to_owned());
        assert_eq!(
            error2.to_string(),
            "Backend error: daemon refused connection"
        );

        let error3 = Error::MissingApiKey("KESTREL_CLOUD_API_KEY".to_owned());
        assert_eq!(error3.to_string(), "API key not found: KESTREL_CLOUD_API_KEY");
    }

    #[test]
    fn test_error_is_retryable() {
        let error1 = Error::Backend("timeout".to_owned());
        assert!(error1.is_retryable());

        let error2 = Error::Config("bad settings".to_owned());
        assert!(!error2.is_retryable());

        let error3 = Error::MissingApiKey("KEY".to_owned());
        assert!(!error3.is_retryable());
    }

    #[test]
    fn test_error_from_io() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error: Error = io_error.into();
        assert!(matches!(error, Error::Io(_)));
    }

    #[test]
    fn test_error_from_json() {
        let json_error = from_str::<JsonValue>("invalid json").unwrap_err();
        let error: Error = json_error.into();
        assert!(matches!(error, Error::Json(_)));
    }
}
