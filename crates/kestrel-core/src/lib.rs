//! Core types and traits for the kestrel model router.
//!
//! This crate provides the shared data model (unified models, routing
//! requests, system resources), the error taxonomy, persisted settings,
//! and the backend catalog trait implemented by `kestrel-backends`.
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

/// Error types and result definitions.
pub mod error;
/// Error types for the routing engine.
pub mod routing_error;
/// Persisted settings file handling.
pub mod settings;
/// Trait definitions for backend catalogs.
pub mod traits;
/// Core data types for models, tasks, constraints, and routing requests.
pub mod types;

pub use error::{Error, Result};
pub use routing_error::{FilterSummary, Result as RoutingResult, RoutingError};
pub use settings::{CloudModelEntry, CloudSettings, DaemonSettings, FileStoreSettings, Settings};
pub use traits::BackendCatalog;
pub use types::{
    Backend, HardwareConstraints, RawModelDescriptor, RoutingConfig, SizePreference,
    SystemResources, TaskSuitability, TaskType, UnifiedModel,
};
