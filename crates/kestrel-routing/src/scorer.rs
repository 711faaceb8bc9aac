//! Weighted multi-factor scoring of filtered candidates.

use kestrel_core::{SystemResources, TaskType, UnifiedModel};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Weight of the trust component.
const WEIGHT_TRUST: f64 = 0.3;
/// Weight of the task-suitability component.
const WEIGHT_TASK: f64 = 0.3;
/// Weight of the performance proxy.
const WEIGHT_PERFORMANCE: f64 = 0.2;
/// Weight of the availability component.
const WEIGHT_AVAILABILITY: f64 = 0.1;
/// Weight of the efficiency proxy.
const WEIGHT_EFFICIENCY: f64 = 0.1;

/// Parameter-count ceiling used to normalize the performance proxy.
const PERFORMANCE_CEILING_B: f64 = 70.0;

/// One scored candidate with its full score breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredCandidate {
    /// The candidate model.
    pub model: UnifiedModel,
    /// Weighted composite score in [0, 1].
    pub composite: f64,
    /// Individual components, each in [0, 1].
    pub breakdown: ScoreBreakdown,
}

/// Individual score components, all normalized to [0, 1].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Normalized trust score.
    pub trust: f64,
    /// Normalized task-suitability rating.
    pub task_suitability: f64,
    /// Monotonic proxy for raw capability (favors larger models).
    pub performance: f64,
    /// Always 1.0 after filtering; kept visible for auditability.
    pub availability: f64,
    /// Monotonic proxy for resource thrift (favors small models with
    /// ample RAM headroom).
    pub efficiency: f64,
}

impl ScoreBreakdown {
    /// Recomputes the composite from the declared weights.
    pub fn composite(&self) -> f64 {
        WEIGHT_TRUST * self.trust
            + WEIGHT_TASK * self.task_suitability
            + WEIGHT_PERFORMANCE * self.performance
            + WEIGHT_AVAILABILITY * self.availability
            + WEIGHT_EFFICIENCY * self.efficiency
    }
}

/// Scores candidates and sorts them best-first.
///
/// The sort is stable, so candidates with equal composites keep their
/// discovery (insertion) order and repeated runs over the same input
/// rank identically.
pub fn score_candidates(
    models: &[UnifiedModel],
    task: Option<TaskType>,
    resources: &SystemResources,
) -> Vec<ScoredCandidate> {
    let mut scored: Vec<ScoredCandidate> = models
        .iter()
        .map(|model| score_one(model, task, resources))
        .collect();

    scored.sort_by(|left, right| {
        right
            .composite
            .partial_cmp(&left.composite)
            .unwrap_or(Ordering::Equal)
    });
    scored
}

/// Scores a single candidate.
fn score_one(
    model: &UnifiedModel,
    task: Option<TaskType>,
    resources: &SystemResources,
) -> ScoredCandidate {
    let trust = f64::from(model.trust_score.clamp(0.0, 10.0)) / 10.0;

    let suitability_rating = task.map_or(model.task_suitability.general, |task| {
        model.task_suitability.for_task(task)
    });
    let task_suitability = f64::from(suitability_rating.clamp(0.0, 10.0)) / 10.0;

    // When no parameter count is declared or inferable, the RAM
    // requirement stands in (8GB behaves like an 8B model).
    let effective_params = model.parameter_billions().unwrap_or_else(|| model.ram_gb());
    let performance = (effective_params / PERFORMANCE_CEILING_B).clamp(0.0, 1.0);

    let headroom = resources.available_ram_gb.max(1.0);
    let efficiency = (1.0 - model.ram_gb() / headroom).clamp(0.0, 1.0);

    let breakdown = ScoreBreakdown {
        trust,
        task_suitability,
        performance,
        availability: 1.0,
        efficiency,
    };

    ScoredCandidate {
        model: model.clone(),
        composite: breakdown.composite(),
        breakdown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kestrel_core::{Backend, TaskSuitability};
    use std::collections::HashMap;

    fn model(name: &str, params: &str, ram: &str, trust: f32) -> UnifiedModel {
        UnifiedModel {
            name: name.to_owned(),
            backend: Backend::LocalDaemon,
            declared_type: "llama".to_owned(),
            parameter_size: Some(params.to_owned()),
            context_size: 8192,
            ram_requirement: ram.to_owned(),
            trust_score: trust,
            task_suitability: TaskSuitability::default(),
            available: true,
            metadata: HashMap::new(),
        }
    }

    fn resources() -> SystemResources {
        SystemResources {
            available_ram_gb: 16.0,
            total_ram_gb: 32.0,
            cpu_cores: 8,
            disk_space_gb: 500.0,
            gpu_memory_gb: None,
            platform: "linux".to_owned(),
        }
    }

    #[test]
    fn test_all_components_in_unit_range() {
        let models = vec![
            model("tiny", "350M", "2GB", 3.0),
            model("mid", "7B", "8GB", 7.0),
            model("huge", "70B", "48GB", 12.0),
        ];
        let scored = score_candidates(&models, Some(TaskType::Coding), &resources());

        for candidate in &scored {
            let breakdown = candidate.breakdown;
            for component in [
                breakdown.trust,
                breakdown.task_suitability,
                breakdown.performance,
                breakdown.availability,
                breakdown.efficiency,
            ] {
                assert!((0.0..=1.0).contains(&component), "component {component}");
            }
            assert!((0.0..=1.0).contains(&candidate.composite));
        }
    }

    #[test]
    fn test_composite_matches_weighted_formula() {
        let models = vec![model("mid", "7B", "8GB", 7.0)];
        let scored = score_candidates(&models, None, &resources());

        let breakdown = scored[0].breakdown;
        let expected = 0.3 * breakdown.trust
            + 0.3 * breakdown.task_suitability
            + 0.2 * breakdown.performance
            + 0.1 * breakdown.availability
            + 0.1 * breakdown.efficiency;
        assert!((scored[0].composite - expected).abs() < 1e-9);
    }

    #[test]
    fn test_higher_trust_wins_all_else_equal() {
        let models = vec![
            model("low-trust", "7B", "8GB", 4.0),
            model("high-trust", "7B", "8GB", 9.0),
        ];
        let scored = score_candidates(&models, None, &resources());
        assert_eq!(scored[0].model.name, "high-trust");
    }

    #[test]
    fn test_performance_proxy_is_monotonic_in_size() {
        let small = score_candidates(&[model("s", "3B", "4GB", 7.0)], None, &resources());
        let large = score_candidates(&[model("l", "30B", "24GB", 7.0)], None, &resources());
        assert!(large[0].breakdown.performance > small[0].breakdown.performance);
        assert!(small[0].breakdown.efficiency > large[0].breakdown.efficiency);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let models = vec![
            model("first", "7B", "8GB", 7.0),
            model("second", "7B", "8GB", 7.0),
            model("third", "7B", "8GB", 7.0),
        ];
        let scored = score_candidates(&models, None, &resources());
        let names: Vec<&str> = scored
            .iter()
            .map(|candidate| candidate.model.name.as_str())
            .collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_availability_component_is_visible_and_fixed() {
        let scored = score_candidates(&[model("m", "7B", "8GB", 7.0)], None, &resources());
        assert!((scored[0].breakdown.availability - 1.0).abs() < f64::EPSILON);
    }
}
