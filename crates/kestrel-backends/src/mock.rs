//! Mock catalog for testing discovery and routing.
//!
//! Allows defining canned descriptors, injected failures, and artificial
//! delays, enabling end-to-end routing tests without real backends.

use async_trait::async_trait;
use kestrel_core::{Backend, BackendCatalog, RawModelDescriptor, Result as CoreResult};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Mock catalog returning pre-defined descriptors.
#[derive(Clone)]
pub struct MockCatalog {
    /// Catalog name reported through the trait.
    name: &'static str,
    /// Backend kind reported through the trait.
    backend: Backend,
    /// Canned descriptors returned from `list_models`.
    descriptors: Vec<RawModelDescriptor>,
    /// When set, every `list_models` call fails with this message.
    failure: Option<String>,
    /// Artificial delay before responding.
    delay: Option<Duration>,
    /// Number of `list_models` calls made, for cache verification.
    call_count: Arc<AtomicUsize>,
}

impl MockCatalog {
    /// Creates an empty, healthy mock catalog.
    #[must_use]
    pub fn new(name: &'static str, backend: Backend) -> Self {
        Self {
            name,
            backend,
            descriptors: Vec::new(),
            failure: None,
            delay: None,
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Adds a canned descriptor.
    #[must_use]
    pub fn with_model(mut self, descriptor: RawModelDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    /// Makes every `list_models` call fail.
    #[must_use]
    pub fn with_failure<T: Into<String>>(mut self, message: T) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Adds an artificial delay before responding, to simulate a hang.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `list_models` calls made so far.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BackendCatalog for MockCatalog {
    fn name(&self) -> &'static str {
        self.name
    }

    fn backend(&self) -> Backend {
        self.backend
    }

    async fn list_models(&self) -> CoreResult<Vec<RawModelDescriptor>> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = &self.failure {
            return Err(kestrel_core::Error::Backend(message.clone()));
        }
        Ok(self.descriptors.clone())
    }

    async fn health_check(&self) -> bool {
        self.failure.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_returns_canned_descriptors() {
        let catalog = MockCatalog::new("mock", Backend::LocalDaemon)
            .with_model(RawModelDescriptor::new("qwen2.5-coder:7b"))
            .with_model(RawModelDescriptor::new("llama3:8b").unavailable());

        let models = match catalog.list_models().await {
            Ok(models) => models,
            Err(error) => panic!("list failed: {error}"),
        };
        assert_eq!(models.len(), 2);
        assert!(models[0].available);
        assert!(!models[1].available);
        assert_eq!(catalog.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_failure_injection() {
        let catalog = MockCatalog::new("broken", Backend::Cloud).with_failure("boom");
        assert!(!catalog.health_check().await);
        assert!(catalog.list_models().await.is_err());
    }
}
