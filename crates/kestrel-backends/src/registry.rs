//! Catalog registry populated once at startup.
//!
//! Separates catalog instantiation from discovery, so backends are
//! configured in one place and the routing engine only sees the
//! [`BackendCatalog`] interface. Registration order is preserved and
//! determines discovery concatenation order.

use crate::{CloudCatalog, DaemonCatalog, FileStoreCatalog};
use kestrel_core::{Backend, BackendCatalog, Settings};
use std::sync::Arc;

/// Registry of backend catalogs in registration order.
#[derive(Clone, Default)]
pub struct CatalogRegistry {
    /// Registered catalogs, queried in insertion order.
    catalogs: Vec<Arc<dyn BackendCatalog>>,
}

impl CatalogRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with every backend enabled in settings.
    pub fn from_settings(settings: &Settings) -> Self {
        let mut registry = Self::new();

        if settings.daemon.enabled {
            registry.register(Arc::new(
                DaemonCatalog::new().with_url(settings.daemon.url.clone()),
            ));
        }
        if settings.file_store.enabled {
            registry.register(Arc::new(FileStoreCatalog::new(
                settings.file_store.model_dir.clone(),
            )));
        }
        if settings.cloud.enabled {
            registry.register(Arc::new(CloudCatalog::from_settings(settings)));
        }

        registry
    }

    /// Registers a catalog. Later registrations are queried later.
    pub fn register(&mut self, catalog: Arc<dyn BackendCatalog>) {
        tracing::debug!("Registered backend catalog: {}", catalog.name());
        self.catalogs.push(catalog);
    }

    /// Returns the registered catalogs in registration order.
    pub fn catalogs(&self) -> &[Arc<dyn BackendCatalog>] {
        &self.catalogs
    }

    /// Returns the number of registered catalogs.
    pub fn len(&self) -> usize {
        self.catalogs.len()
    }

    /// Returns whether no catalogs are registered.
    pub fn is_empty(&self) -> bool {
        self.catalogs.is_empty()
    }

    /// Returns the registered backend kinds in registration order.
    pub fn backends(&self) -> Vec<Backend> {
        self.catalogs.iter().map(|catalog| catalog.backend()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockCatalog;
    use kestrel_core::CloudSettings;

    #[test]
    fn test_from_settings_registers_enabled_backends() {
        let settings = Settings {
            cloud: CloudSettings {
                enabled: false,
                ..CloudSettings::default()
            },
            ..Settings::default()
        };

        let registry = CatalogRegistry::from_settings(&settings);
        assert_eq!(
            registry.backends(),
            vec![Backend::LocalDaemon, Backend::LocalFile]
        );
    }

    #[test]
    fn test_registration_order_preserved() {
        let mut registry = CatalogRegistry::new();
        assert!(registry.is_empty());

        registry.register(Arc::new(MockCatalog::new("first", Backend::Cloud)));
        registry.register(Arc::new(MockCatalog::new("second", Backend::LocalDaemon)));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.catalogs()[0].name(), "first");
        assert_eq!(registry.catalogs()[1].name(), "second");
    }
}
