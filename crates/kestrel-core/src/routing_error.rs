//! Error types for the routing engine.

use crate::Error as CoreError;
use crate::types::TaskType;
use serde::{Deserialize, Serialize};
use serde_json::Error as JsonError;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::io;
use std::result::Result as StdResult;
use thiserror::Error;

/// Result type alias using [`RoutingError`].
pub type Result<T> = StdResult<T, RoutingError>;

/// Error types that can occur during model routing.
///
/// Only [`RoutingError::NoSuitableModels`] crosses the `route` boundary
/// for an empty candidate set; backend and probe failures are absorbed
/// earlier with degraded data.
#[derive(Debug, Error)]
pub enum RoutingError {
    /// Error from kestrel-core
    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] JsonError),

    /// Every discovered model was removed by filtering.
    #[error("No suitable models: {0}")]
    NoSuitableModels(FilterSummary),

    /// Operation timed out
    #[error("Timeout after {0}ms")]
    Timeout(u64),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl RoutingError {
    /// Checks if this error is retryable (transient failure).
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

/// Per-stage removal counts attached to a `NoSuitableModels` failure.
///
/// The CLI layer uses these to tell the user which predicate emptied the
/// candidate set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSummary {
    /// Models discovered before any filtering.
    pub total_discovered: usize,
    /// Removed because the backend reported them unavailable.
    pub availability_filtered: usize,
    /// Removed because their task-suitability rating was too low.
    pub task_filtered: usize,
    /// Removed because they exceeded the hardware budget.
    pub hardware_filtered: usize,
    /// Removed by the hard trust-score threshold.
    pub trust_filtered: usize,
    /// Task the request was filtered for, when one was given.
    pub task: Option<TaskType>,
}

impl Display for FilterSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "{} discovered, {} unavailable, {} unsuited, {} over hardware budget, {} under trust threshold",
            self.total_discovered,
            self.availability_filtered,
            self.task_filtered,
            self.hardware_filtered,
            self.trust_filtered
        )?;
        if let Some(task) = self.task {
            write!(f, " (task: {task})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_suitable_models_display() {
        let summary = FilterSummary {
            total_discovered: 4,
            availability_filtered: 1,
            task_filtered: 2,
            hardware_filtered: 1,
            trust_filtered: 0,
            task: Some(TaskType::Coding),
        };
        let error = RoutingError::NoSuitableModels(summary);
        let message = error.to_string();
        assert!(message.contains("No suitable models"));
        assert!(message.contains("4 discovered"));
        assert!(message.contains("task: coding"));
    }

    #[test]
    fn test_retryable_classification() {
        assert!(RoutingError::Timeout(5000).is_retryable());
        assert!(!RoutingError::NoSuitableModels(FilterSummary::default()).is_retryable());
        assert!(!RoutingError::Other("broken".to_owned()).is_retryable());
    }
}
