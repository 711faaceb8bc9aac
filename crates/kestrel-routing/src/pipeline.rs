//! Routing pipeline orchestration.
//!
//! A linear state machine (`Idle → Consolidating → Filtering → Scoring →
//! Routing → Done | Failed`, no back-edges) that turns a routing request
//! into an immutable, serializable decision with a per-stage audit
//! trail.

use crate::consolidator::ModelConsolidator;
use crate::filter::filter_candidates;
use crate::heuristics::format_ram_gb;
use crate::probe::SystemResourceProbe;
use crate::scorer::score_candidates;
use kestrel_core::{FilterSummary, RoutingConfig, RoutingError, RoutingResult, UnifiedModel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult, Write as _};
use std::sync::Arc;
use std::time::Instant;

/// Fixed composite bonus for candidates from a preferred backend.
///
/// A soft boost rather than a hard filter: a non-preferred candidate can
/// still win when no preferred candidate survives filtering.
const PREFERRED_BACKEND_BONUS: f64 = 0.15;

/// Stages of one routing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineStage {
    /// No run in progress.
    Idle,
    /// Discovering models across backends.
    Consolidating,
    /// Applying the filter predicate chain.
    Filtering,
    /// Scoring and ranking survivors.
    Scoring,
    /// Selecting the winner and building reasoning.
    Routing,
    /// Run completed with a decision.
    Done,
    /// Run failed.
    Failed,
}

impl Display for PipelineStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Consolidating => write!(f, "consolidating"),
            Self::Filtering => write!(f, "filtering"),
            Self::Scoring => write!(f, "scoring"),
            Self::Routing => write!(f, "routing"),
            Self::Done => write!(f, "done"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Audit record of the consolidation stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsolidationRecord {
    /// Models discovered across all backends.
    pub total_models: usize,
    /// Discovered models per backend.
    pub backend_counts: BTreeMap<String, usize>,
    /// Wall-clock duration of the stage in milliseconds.
    pub duration_ms: u64,
}

/// Audit record of the filtering stage.
///
/// Each count is the number of models removed at that specific
/// sub-step, diffed before and after the predicate — not cumulative.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterRecord {
    /// Removed because the backend reported them unavailable.
    pub availability_filtered: usize,
    /// Removed for insufficient task suitability.
    pub task_filtered: usize,
    /// Removed for exceeding the hardware budget.
    pub hardware_filtered: usize,
    /// Removed by the hard trust-score threshold.
    pub trust_filtered: usize,
    /// Candidates surviving every predicate.
    pub remaining: usize,
    /// Wall-clock duration of the stage in milliseconds.
    pub duration_ms: u64,
}

/// Audit record of the scoring stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoringRecord {
    /// Candidates that were scored and ranked.
    pub candidates_scored: usize,
    /// Composite score of the winner.
    pub top_score: f64,
    /// Wall-clock duration of the stage in milliseconds.
    pub duration_ms: u64,
}

/// Immutable result of one routing run.
///
/// Created once per call and never mutated; the next run produces a
/// fresh decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRoutingDecision {
    /// The winning model.
    pub selected_model: UnifiedModel,
    /// Ranked runner-ups, at most three.
    pub alternatives: Vec<UnifiedModel>,
    /// Human-readable selection rationale.
    pub reasoning: String,
    /// Consolidation stage audit record.
    pub consolidation: ConsolidationRecord,
    /// Filtering stage audit record.
    pub filtering: FilterRecord,
    /// Scoring stage audit record.
    pub scoring: ScoringRecord,
    /// Total wall-clock duration in milliseconds. At least the sum of
    /// the stage durations, since each boundary reads the clock
    /// independently.
    pub total_duration_ms: u64,
}

/// Orchestrates probe, consolidator, filter, and scorer into decisions.
pub struct RoutingPipeline {
    /// Model discovery across backends.
    consolidator: Arc<ModelConsolidator>,
    /// Host resource probe.
    probe: Arc<SystemResourceProbe>,
}

impl RoutingPipeline {
    /// Creates a pipeline over the given consolidator and probe.
    pub fn new(consolidator: Arc<ModelConsolidator>, probe: Arc<SystemResourceProbe>) -> Self {
        Self {
            consolidator,
            probe,
        }
    }

    /// Returns the consolidator backing this pipeline.
    pub fn consolidator(&self) -> &Arc<ModelConsolidator> {
        &self.consolidator
    }

    /// Returns the probe backing this pipeline.
    pub fn probe(&self) -> &Arc<SystemResourceProbe> {
        &self.probe
    }

    /// Routes a request to the best available model.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::NoSuitableModels`] when every discovered
    /// model is removed by filtering, including the trust threshold
    /// applied here. Fallback behavior belongs to the caller.
    pub async fn route(&self, config: &RoutingConfig) -> RoutingResult<ModelRoutingDecision> {
        let run_started = Instant::now();
        let mut stage = PipelineStage::Idle;

        // Stage 1: consolidation.
        stage = advance(stage, PipelineStage::Consolidating);
        let stage_started = Instant::now();
        let models = self.consolidator.discover(false).await;
        let mut backend_counts = BTreeMap::new();
        for model in &models {
            *backend_counts.entry(model.backend.to_string()).or_insert(0) += 1;
        }
        let consolidation = ConsolidationRecord {
            total_models: models.len(),
            backend_counts,
            duration_ms: stage_started.elapsed().as_millis() as u64,
        };

        // Stage 2: filtering, including the trust threshold so the
        // decision record attributes it separately from suitability.
        stage = advance(stage, PipelineStage::Filtering);
        let stage_started = Instant::now();
        let total_discovered = models.len();
        let outcome =
            filter_candidates(models, config.task, config.hardware_constraints.as_ref());

        let (candidates, trust_filtered) = match config.minimum_trust_score {
            Some(threshold) => {
                let before = outcome.remaining.len();
                let trusted: Vec<UnifiedModel> = outcome
                    .remaining
                    .into_iter()
                    .filter(|model| model.trust_score >= threshold)
                    .collect();
                let removed = before - trusted.len();
                (trusted, removed)
            }
            None => (outcome.remaining, 0),
        };

        let filtering = FilterRecord {
            availability_filtered: outcome.availability_filtered,
            task_filtered: outcome.task_filtered,
            hardware_filtered: outcome.hardware_filtered,
            trust_filtered,
            remaining: candidates.len(),
            duration_ms: stage_started.elapsed().as_millis() as u64,
        };

        if candidates.is_empty() {
            advance(stage, PipelineStage::Failed);
            return Err(RoutingError::NoSuitableModels(FilterSummary {
                total_discovered,
                availability_filtered: filtering.availability_filtered,
                task_filtered: filtering.task_filtered,
                hardware_filtered: filtering.hardware_filtered,
                trust_filtered: filtering.trust_filtered,
                task: config.task,
            }));
        }

        // Stage 3: scoring with the preferred-backend soft boost.
        stage = advance(stage, PipelineStage::Scoring);
        let stage_started = Instant::now();
        let resources = self.probe.detect();
        let mut scored = score_candidates(&candidates, config.task, &resources);

        if !config.preferred_backends.is_empty() {
            for candidate in &mut scored {
                if config.preferred_backends.contains(&candidate.model.backend) {
                    candidate.composite += PREFERRED_BACKEND_BONUS;
                }
            }
            scored.sort_by(|left, right| {
                right
                    .composite
                    .partial_cmp(&left.composite)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }
        scored.truncate(config.max_candidates.max(1));

        let scoring = ScoringRecord {
            candidates_scored: scored.len(),
            top_score: scored.first().map_or(0.0, |candidate| candidate.composite),
            duration_ms: stage_started.elapsed().as_millis() as u64,
        };

        // Stage 4: selection.
        stage = advance(stage, PipelineStage::Routing);
        let mut ranked = scored.into_iter();
        let winner = ranked.next().ok_or_else(|| {
            RoutingError::Other("scoring produced no candidates from a non-empty set".to_owned())
        })?;
        let alternatives: Vec<UnifiedModel> =
            ranked.take(3).map(|candidate| candidate.model).collect();

        let reasoning = build_reasoning(config, &winner.model, &filtering, total_discovered);

        advance(stage, PipelineStage::Done);
        let decision = ModelRoutingDecision {
            selected_model: winner.model,
            alternatives,
            reasoning,
            consolidation,
            filtering,
            scoring,
            total_duration_ms: run_started.elapsed().as_millis() as u64,
        };

        tracing::info!(
            "Routing decision: {} via {} | score {:.3} | {}ms",
            decision.selected_model.name,
            decision.selected_model.backend,
            decision.scoring.top_score,
            decision.total_duration_ms
        );

        Ok(decision)
    }
}

/// Logs and performs one stage transition.
fn advance(from: PipelineStage, to: PipelineStage) -> PipelineStage {
    tracing::debug!("Routing stage: {from} -> {to}");
    to
}

/// Builds the human-readable selection rationale.
///
/// Always names the winner's backend and trust score; mentions the task
/// when one was given and quotes the literal RAM budget (e.g. "4GB
/// RAM") when one was supplied, for auditability.
fn build_reasoning(
    config: &RoutingConfig,
    winner: &UnifiedModel,
    filtering: &FilterRecord,
    total_discovered: usize,
) -> String {
    let mut reasoning = format!(
        "Selected {} from {} backend (trust {:.1}/10)",
        winner.name, winner.backend, winner.trust_score
    );

    if let Some(task) = config.task {
        let _ = write!(reasoning, " for {task} tasks");
    }

    if let Some(constraints) = &config.hardware_constraints
        && let Some(budget) = constraints.available_ram_gb
    {
        let _ = write!(
            reasoning,
            " within a {} RAM budget",
            format_ram_gb(budget)
        );
    }

    let _ = write!(
        reasoning,
        "; {} of {} discovered models were suitable",
        filtering.remaining, total_discovered
    );

    reasoning
}
