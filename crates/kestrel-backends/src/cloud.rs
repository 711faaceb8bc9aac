//! Catalog for configurable cloud API providers.
//!
//! Cloud enumeration is a stub by design: the curated model table from
//! settings is the source of truth, and availability reflects whether an
//! API key is configured. No generation calls are made here.

use async_trait::async_trait;
use kestrel_core::{
    Backend, BackendCatalog, CloudModelEntry, RawModelDescriptor, Result as CoreResult, Settings,
};

/// Catalog that surfaces the curated cloud model table.
pub struct CloudCatalog {
    /// Curated cloud models.
    models: Vec<CloudModelEntry>,
    /// Whether an API key is configured for the provider.
    has_api_key: bool,
}

impl CloudCatalog {
    /// Creates a catalog from persisted settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            models: settings.cloud.models.clone(),
            has_api_key: settings.cloud_api_key().is_some(),
        }
    }

    /// Creates a catalog from an explicit model table (useful for tests).
    pub fn new(models: Vec<CloudModelEntry>, has_api_key: bool) -> Self {
        Self {
            models,
            has_api_key,
        }
    }
}

#[async_trait]
impl BackendCatalog for CloudCatalog {
    fn name(&self) -> &'static str {
        "cloud"
    }

    fn backend(&self) -> Backend {
        Backend::Cloud
    }

    async fn list_models(&self) -> CoreResult<Vec<RawModelDescriptor>> {
        let available = self.has_api_key;
        let descriptors = self
            .models
            .iter()
            .map(|entry| {
                let mut descriptor = RawModelDescriptor::new(entry.name.clone())
                    .with_trust_score(entry.trust_score)
                    .with_context_window(entry.context_window);
                if let Some(parameter_count) = &entry.parameter_count {
                    descriptor = descriptor.with_parameter_count(parameter_count.clone());
                }
                if !available {
                    descriptor = descriptor.unavailable();
                }
                descriptor
            })
            .collect();
        Ok(descriptors)
    }

    async fn health_check(&self) -> bool {
        self.has_api_key
    }
}
