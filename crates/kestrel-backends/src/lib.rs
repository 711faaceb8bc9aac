//! Backend catalogs for the kestrel model router.
//!
//! Each catalog enumerates models from one backend kind (local daemon,
//! local file store, cloud API) without performing any generation. The
//! [`CatalogRegistry`] is populated once at startup from [`Settings`]
//! and handed to the routing engine.
//!
//! [`Settings`]: kestrel_core::Settings
#![cfg_attr(
    test,
    allow(
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::missing_panics_doc,
        reason = "Allow for tests"
    )
)]

/// Cloud catalog backed by the curated model table.
pub mod cloud;
/// Local inference daemon catalog.
pub mod daemon;
/// Error types and result definitions.
pub mod error;
/// Local model-file store catalog.
pub mod files;
/// Mock catalog for tests.
pub mod mock;
/// Catalog registry populated at startup.
pub mod registry;

pub use cloud::CloudCatalog;
pub use daemon::DaemonCatalog;
pub use error::{BackendError, Result};
pub use files::FileStoreCatalog;
pub use mock::MockCatalog;
pub use registry::CatalogRegistry;
