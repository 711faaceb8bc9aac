//! Pure candidate filtering.
//!
//! An ordered predicate chain over unified models, tracking the removal
//! count of each stage separately so the routing decision can attribute
//! every exclusion. No I/O; the trust threshold and preferred-backend
//! effects belong to the pipeline, not here.

use kestrel_core::{HardwareConstraints, TaskType, UnifiedModel};

/// Minimum task-suitability rating a model needs for a non-general task.
const SUITABILITY_THRESHOLD: f32 = 6.0;

/// Result of one filtering pass.
#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    /// Models that survived every predicate, in input order.
    pub remaining: Vec<UnifiedModel>,
    /// Removed because the backend reported them unavailable.
    pub availability_filtered: usize,
    /// Removed because their task-suitability rating was below threshold.
    pub task_filtered: usize,
    /// Removed because they exceeded the hardware budget.
    pub hardware_filtered: usize,
}

/// Applies the availability, task-suitability, and hardware predicates
/// in order, diffing counts before and after each stage.
///
/// The output is always a subset of the input; a model removed by one
/// predicate is never seen by a later one.
pub fn filter_candidates(
    models: Vec<UnifiedModel>,
    task: Option<TaskType>,
    constraints: Option<&HardwareConstraints>,
) -> FilterOutcome {
    let mut outcome = FilterOutcome::default();

    let before = models.len();
    let available: Vec<UnifiedModel> = models.into_iter().filter(|model| model.available).collect();
    outcome.availability_filtered = before - available.len();

    let suited: Vec<UnifiedModel> = match task {
        Some(task) if task != TaskType::General => {
            let before = available.len();
            let suited: Vec<UnifiedModel> = available
                .into_iter()
                .filter(|model| model.task_suitability.for_task(task) >= SUITABILITY_THRESHOLD)
                .collect();
            outcome.task_filtered = before - suited.len();
            suited
        }
        _ => available,
    };

    let fitting: Vec<UnifiedModel> = match constraints {
        Some(constraints) => {
            let before = suited.len();
            let fitting: Vec<UnifiedModel> = suited
                .into_iter()
                .filter(|model| fits_hardware(model, constraints))
                .collect();
            outcome.hardware_filtered = before - fitting.len();
            fitting
        }
        None => suited,
    };

    outcome.remaining = fitting;
    outcome
}

/// Checks one model against the hardware budget.
fn fits_hardware(model: &UnifiedModel, constraints: &HardwareConstraints) -> bool {
    if let Some(budget) = constraints.available_ram_gb
        && model.ram_gb() > budget
    {
        return false;
    }
    if let Some(max_download) = constraints.max_download_gb
        && model.download_gb().is_some_and(|size| size > max_download)
    {
        return false;
    }
    true
}
