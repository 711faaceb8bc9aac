//! Catalog for a local Ollama-compatible inference daemon.

use crate::error::{BackendError, Result};
use async_trait::async_trait;
use kestrel_core::{Backend, BackendCatalog, RawModelDescriptor, Result as CoreResult};
use reqwest::Client;
use serde::Deserialize;

/// Catalog that enumerates models installed in a local inference daemon.
pub struct DaemonCatalog {
    /// HTTP client used to talk to the daemon.
    client: Client,
    /// Base URL pointing to the daemon HTTP API.
    base_url: String,
}

impl DaemonCatalog {
    /// Creates a catalog pointing at the default daemon address.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: "http://localhost:11434".to_owned(),
        }
    }

    /// Overrides the daemon base URL.
    #[must_use]
    pub fn with_url<T: Into<String>>(mut self, url: T) -> Self {
        self.base_url = url.into();
        self
    }

    /// Fetches the daemon's installed-model list.
    async fn fetch_tags(&self) -> Result<TagsResponse> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .map_err(|error| BackendError::Unavailable(error.to_string()))?;

        Ok(response.json().await?)
    }
}

impl Default for DaemonCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BackendCatalog for DaemonCatalog {
    fn name(&self) -> &'static str {
        "local-daemon"
    }

    fn backend(&self) -> Backend {
        Backend::LocalDaemon
    }

    async fn list_models(&self) -> CoreResult<Vec<RawModelDescriptor>> {
        let tags = self
            .fetch_tags()
            .await
            .map_err(kestrel_core::Error::from)?;

        let descriptors = tags
            .models
            .into_iter()
            .map(|model| {
                let mut descriptor =
                    RawModelDescriptor::new(model.name).with_size_bytes(model.size);
                if let Some(details) = model.details {
                    if let Some(family) = details.family {
                        descriptor = descriptor.with_family(family);
                    }
                    if let Some(parameter_size) = details.parameter_size {
                        descriptor = descriptor.with_parameter_count(parameter_size);
                    }
                }
                descriptor
            })
            .collect();

        Ok(descriptors)
    }

    async fn health_check(&self) -> bool {
        self.client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .is_ok()
    }
}

/// Daemon response for the model list endpoint.
#[derive(Debug, Deserialize)]
struct TagsResponse {
    /// Models installed in the daemon.
    models: Vec<DaemonModel>,
}

/// One installed model as reported by the daemon.
#[derive(Debug, Deserialize)]
struct DaemonModel {
    /// Model identifier.
    name: String,
    /// Size of the model in bytes.
    size: u64,
    /// Structured metadata, when the daemon provides it.
    #[serde(default)]
    details: Option<DaemonModelDetails>,
}

/// Structured model metadata from the daemon.
#[derive(Debug, Deserialize)]
struct DaemonModelDetails {
    /// Model family (e.g. "qwen", "llama").
    #[serde(default)]
    family: Option<String>,
    /// Declared parameter count (e.g. "7.6B").
    #[serde(default)]
    parameter_size: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_url() {
        let catalog = DaemonCatalog::new();
        assert_eq!(catalog.base_url, "http://localhost:11434");
        assert_eq!(catalog.backend(), Backend::LocalDaemon);
    }

    #[test]
    fn test_custom_url() {
        let catalog = DaemonCatalog::new().with_url("http://custom:8080");
        assert_eq!(catalog.base_url, "http://custom:8080");
    }

    #[test]
    fn test_tags_response_parsing() {
        let payload = r#"{
            "models": [
                {
                    "name": "qwen2.5-coder:7b",
                    "size": 4400000000,
                    "details": {"family": "qwen2", "parameter_size": "7.6B"}
                },
                {"name": "llama3:8b", "size": 4700000000}
            ]
        }"#;

        let parsed: TagsResponse = match serde_json::from_str(payload) {
            Ok(response) => response,
            Err(error) => panic!("parse failed: {error}"),
        };
        assert_eq!(parsed.models.len(), 2);
        assert_eq!(parsed.models[0].name, "qwen2.5-coder:7b");
        let details = parsed.models[0]
            .details
            .as_ref()
            .map(|details| details.parameter_size.clone());
        assert_eq!(details, Some(Some("7.6B".to_owned())));
        assert!(parsed.models[1].details.is_none());
    }
}
