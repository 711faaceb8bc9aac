use async_trait::async_trait;

use crate::types::{Backend, RawModelDescriptor};
use crate::Result;

/// Trait for backend catalogs that enumerate available models.
///
/// A catalog never performs generation; it only lists models and reports
/// backend health. One registry of catalogs is populated at startup and
/// queried on every discovery pass.
#[async_trait]
pub trait BackendCatalog: Send + Sync {
    /// Returns the unique identifier for this catalog.
    fn name(&self) -> &'static str;

    /// Returns which backend kind this catalog enumerates.
    fn backend(&self) -> Backend;

    /// Enumerates the models this backend currently offers.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or its response
    /// cannot be parsed. Callers treat failures as "zero models from
    /// this backend", never as a fatal discovery error.
    async fn list_models(&self) -> Result<Vec<RawModelDescriptor>>;

    /// Checks whether this backend is currently reachable and usable.
    async fn health_check(&self) -> bool;
}
