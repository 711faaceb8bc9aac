//! Advisory routing recommendations.
//!
//! Turns a resource probe into a suggested routing configuration
//! without discovering or routing anything, so callers can preview
//! what a routing run would be asked to do.

use crate::probe::SystemResourceProbe;
use kestrel_core::{
    Backend, HardwareConstraints, RoutingConfig, SizePreference, SystemResources, TaskType,
};

/// An advisory configuration derived from host resources.
#[derive(Debug, Clone)]
pub struct RoutingRecommendation {
    /// Configuration a caller could pass to a routing run as-is.
    pub recommended_config: RoutingConfig,
    /// Why this configuration fits the host.
    pub reasoning: String,
    /// The probe snapshot the recommendation was derived from.
    pub system_info: SystemResources,
}

impl RoutingRecommendation {
    /// Builds a recommendation from a fresh probe snapshot.
    pub fn generate(probe: &SystemResourceProbe, task: Option<TaskType>) -> Self {
        let system_info = probe.detect();

        let preference = if system_info.available_ram_gb < 8.0 {
            SizePreference::Small
        } else if system_info.available_ram_gb < 24.0 {
            SizePreference::Balanced
        } else {
            SizePreference::Large
        };

        let constraints = HardwareConstraints::new()
            .with_available_ram_gb(system_info.available_ram_gb)
            .with_preferred_size(preference);

        let mut config = RoutingConfig::new()
            .with_hardware_constraints(constraints)
            .with_preferred_backend(Backend::LocalDaemon);
        if let Some(task) = task {
            config = config.with_task(task);
        }

        let mut reasoning = format!(
            "Host has {:.1}GB of {:.1}GB RAM free across {} cores, suggesting {preference:?} models",
            system_info.available_ram_gb, system_info.total_ram_gb, system_info.cpu_cores
        );
        if let Some(task) = task {
            reasoning.push_str(&format!(" tuned for {task} work"));
        }

        Self {
            recommended_config: config,
            reasoning,
            system_info,
        }
    }
}
