//! High-level routing service with caching and graceful degradation.
//!
//! Wraps the pipeline so callers always get a usable answer: a cached
//! decision when one is fresh, a full routing run otherwise, a
//! smallest-available-model fallback when routing fails, and a built-in
//! placeholder when even discovery comes back empty.

use crate::clock::{Clock, SystemClock};
use crate::consolidator::ModelConsolidator;
use crate::pipeline::{ModelRoutingDecision, RoutingPipeline};
use crate::probe::SystemResourceProbe;
use kestrel_backends::CatalogRegistry;
use kestrel_core::{
    Backend, HardwareConstraints, RoutingConfig, RoutingResult, TaskSuitability, TaskType,
    UnifiedModel,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// How long a successful routing decision stays reusable.
const DECISION_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// RAM budget ceiling in GB when the caller is in a hurry.
const HIGH_URGENCY_RAM_CAP_GB: f64 = 4.0;

/// How the service arrived at a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionReason {
    /// Served from the decision cache.
    Cached,
    /// Produced by a full routing run.
    IntelligentRouting,
    /// Routing failed; smallest available model was chosen instead.
    Fallback,
    /// Nothing was available; a built-in placeholder was returned.
    SystemDefault,
}

/// Caller context for a smart-default request.
#[derive(Debug, Clone, Copy)]
pub struct RoutingContext {
    /// Task the caller is about to run, when known.
    pub task: Option<TaskType>,
    /// How quickly the caller needs a model loaded.
    pub urgency: Urgency,
    /// Whether a routing failure may degrade to the smallest available
    /// model. When false, failures go straight to the built-in default.
    pub allow_fallback: bool,
}

impl Default for RoutingContext {
    fn default() -> Self {
        Self {
            task: None,
            urgency: Urgency::Normal,
            allow_fallback: true,
        }
    }
}

impl RoutingContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the task hint.
    #[must_use]
    pub fn with_task(mut self, task: TaskType) -> Self {
        self.task = Some(task);
        self
    }

    /// Sets the urgency.
    #[must_use]
    pub fn with_urgency(mut self, urgency: Urgency) -> Self {
        self.urgency = urgency;
        self
    }

    /// Sets whether fallback selection is permitted.
    #[must_use]
    pub fn with_fallback_allowed(mut self, allowed: bool) -> Self {
        self.allow_fallback = allowed;
        self
    }
}

/// How quickly the caller needs a model loaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Urgency {
    /// No particular hurry; the full RAM budget is usable.
    #[default]
    Normal,
    /// Caps the RAM budget so a small model loads fast.
    High,
}

/// The model the service settled on, with provenance and confidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultModelSelection {
    /// The selected model.
    pub model: UnifiedModel,
    /// How the selection was made.
    pub reason: SelectionReason,
    /// Confidence in [0.1, 1.0]; lower for degraded paths.
    pub confidence: f64,
    /// Human-readable rationale.
    pub reasoning: String,
}

/// Routing facade that never fails.
pub struct SmartRoutingService {
    /// The underlying pipeline.
    pipeline: RoutingPipeline,
    /// Last successful decision and the instant it was taken.
    cache: Mutex<Option<(DefaultModelSelection, Instant)>>,
    /// Decision cache validity window.
    ttl: Duration,
    /// Time source, injectable for tests.
    clock: Arc<dyn Clock>,
}

impl SmartRoutingService {
    /// Creates a service over the given backend registry.
    pub fn new(registry: Arc<CatalogRegistry>) -> Self {
        Self::with_clock(registry, Arc::new(SystemClock))
    }

    /// Creates a service with an injected clock shared by every cache
    /// layer.
    pub fn with_clock(registry: Arc<CatalogRegistry>, clock: Arc<dyn Clock>) -> Self {
        let consolidator = Arc::new(ModelConsolidator::with_clock(registry, Arc::clone(&clock)));
        let probe = Arc::new(SystemResourceProbe::with_clock(Arc::clone(&clock)));
        let pipeline = RoutingPipeline::new(consolidator, probe);
        Self {
            pipeline,
            cache: Mutex::new(None),
            ttl: DECISION_CACHE_TTL,
            clock,
        }
    }

    /// Returns the underlying pipeline.
    pub fn pipeline(&self) -> &RoutingPipeline {
        &self.pipeline
    }

    /// Runs one full routing pass without the cache or fallbacks.
    ///
    /// # Errors
    ///
    /// Propagates pipeline errors, including
    /// [`kestrel_core::RoutingError::NoSuitableModels`].
    pub async fn route(&self, config: &RoutingConfig) -> RoutingResult<ModelRoutingDecision> {
        self.pipeline.route(config).await
    }

    /// Picks a default model for the given context.
    ///
    /// Never fails: routing errors degrade to the smallest available
    /// model, and an empty catalog degrades to a built-in placeholder.
    pub async fn get_smart_default(&self, context: &RoutingContext) -> DefaultModelSelection {
        if let Some(cached) = self.cached_selection() {
            return cached;
        }

        let config = self.config_for(context);
        match self.pipeline.route(&config).await {
            Ok(decision) => {
                let selection = DefaultModelSelection {
                    model: decision.selected_model.clone(),
                    reason: SelectionReason::IntelligentRouting,
                    confidence: confidence_for(&decision),
                    reasoning: decision.reasoning.clone(),
                };
                self.store_selection(&selection);
                selection
            }
            Err(error) => {
                if config.allow_fallback {
                    tracing::warn!("Routing failed ({error}), degrading to fallback selection");
                    self.fallback_selection(&error.to_string()).await
                } else {
                    tracing::warn!("Routing failed ({error}) with fallback disabled");
                    system_default_selection(format!(
                        "Routing failed ({error}) and fallback selection is disabled; returning the built-in default"
                    ))
                }
            }
        }
    }

    /// Builds a routing config from the caller context and a fresh
    /// resource probe.
    fn config_for(&self, context: &RoutingContext) -> RoutingConfig {
        let resources = self.pipeline.probe().detect();
        let budget = match context.urgency {
            Urgency::Normal => resources.available_ram_gb,
            Urgency::High => (resources.available_ram_gb * 0.5).min(HIGH_URGENCY_RAM_CAP_GB),
        };

        let mut config = RoutingConfig::new()
            .with_hardware_constraints(HardwareConstraints::new().with_available_ram_gb(budget))
            .with_allow_fallback(context.allow_fallback);
        if let Some(task) = context.task {
            config = config.with_task(task);
        }
        config
    }

    /// Returns the cached selection if it is still within its TTL.
    ///
    /// The check compares against the instant the decision was taken,
    /// so a stale entry is never served.
    fn cached_selection(&self) -> Option<DefaultModelSelection> {
        let now = self.clock.now();
        let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.as_ref().and_then(|(selection, taken_at)| {
            if now.duration_since(*taken_at) < self.ttl {
                let mut cached = selection.clone();
                cached.reason = SelectionReason::Cached;
                Some(cached)
            } else {
                None
            }
        })
    }

    /// Stores a successful selection in the decision cache.
    fn store_selection(&self, selection: &DefaultModelSelection) {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        *cache = Some((selection.clone(), self.clock.now()));
    }

    /// Degraded path: force a re-discovery and pick the smallest
    /// available model. Falls through to the built-in placeholder when
    /// nothing at all is available.
    async fn fallback_selection(&self, original_error: &str) -> DefaultModelSelection {
        let models = self.pipeline.consolidator().discover(true).await;
        let smallest = models
            .into_iter()
            .filter(|model| model.available)
            .min_by(|left, right| {
                effective_size(left)
                    .partial_cmp(&effective_size(right))
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

        match smallest {
            Some(model) => {
                let reasoning = format!(
                    "Routing failed ({original_error}); fell back to the smallest available model {} on the {} backend",
                    model.name, model.backend
                );
                DefaultModelSelection {
                    model,
                    reason: SelectionReason::Fallback,
                    confidence: 0.3,
                    reasoning,
                }
            }
            None => {
                tracing::error!("No models available on any backend, returning system default");
                system_default_selection(format!(
                    "No models are available on any backend ({original_error}); returning the built-in default, which must be installed before use"
                ))
            }
        }
    }
}

/// Last-resort selection built around the placeholder model.
fn system_default_selection(reasoning: String) -> DefaultModelSelection {
    DefaultModelSelection {
        model: placeholder_model(),
        reason: SelectionReason::SystemDefault,
        confidence: 0.1,
        reasoning,
    }
}

/// Confidence heuristic over a successful decision.
///
/// Starts at 0.6, rewards a deep candidate pool and a strong winner,
/// penalizes a pool where filtering removed most of the catalog.
fn confidence_for(decision: &ModelRoutingDecision) -> f64 {
    let mut confidence = 0.6;
    if decision.scoring.candidates_scored >= 3 {
        confidence += 0.2;
    }
    confidence += 0.2 * decision.scoring.top_score;

    let total = decision.consolidation.total_models;
    if total > 0 && (decision.filtering.remaining as f64) < 0.3 * total as f64 {
        confidence -= 0.1;
    }
    confidence.clamp(0.1, 1.0)
}

/// Ordering key for the fallback path: declared parameters when
/// parseable, RAM requirement otherwise.
fn effective_size(model: &UnifiedModel) -> f64 {
    model.parameter_billions().unwrap_or_else(|| model.ram_gb())
}

/// The built-in placeholder returned when every backend is empty.
///
/// Marked unavailable so callers know it still has to be installed.
fn placeholder_model() -> UnifiedModel {
    UnifiedModel {
        name: "llama3.2:3b".to_owned(),
        backend: Backend::LocalDaemon,
        declared_type: "llama".to_owned(),
        parameter_size: Some("3B".to_owned()),
        context_size: 8192,
        ram_requirement: "4GB".to_owned(),
        trust_score: 7.0,
        task_suitability: TaskSuitability::default(),
        available: false,
        metadata: HashMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use kestrel_backends::MockCatalog;
    use kestrel_core::RawModelDescriptor;

    fn registry_with(catalogs: Vec<MockCatalog>) -> Arc<CatalogRegistry> {
        let mut registry = CatalogRegistry::new();
        for catalog in catalogs {
            registry.register(Arc::new(catalog));
        }
        Arc::new(registry)
    }

    fn healthy_registry() -> Arc<CatalogRegistry> {
        registry_with(vec![
            MockCatalog::new("daemon", Backend::LocalDaemon)
                .with_model(RawModelDescriptor::new("qwen2.5-coder:7b"))
                .with_model(RawModelDescriptor::new("llama3-instruct:7b"))
                .with_model(RawModelDescriptor::new("tinyllama:1b")),
        ])
    }

    #[tokio::test]
    async fn test_first_call_routes_then_second_is_cached() {
        let service = SmartRoutingService::new(healthy_registry());
        let context = RoutingContext::new();

        let first = service.get_smart_default(&context).await;
        assert_eq!(first.reason, SelectionReason::IntelligentRouting);

        let second = service.get_smart_default(&context).await;
        assert_eq!(second.reason, SelectionReason::Cached);
        assert_eq!(second.model.name, first.model.name);
        assert!((second.confidence - first.confidence).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_cache_expires_after_ttl() {
        let clock = Arc::new(ManualClock::new());
        let service =
            SmartRoutingService::with_clock(healthy_registry(), Arc::clone(&clock) as Arc<dyn Clock>);
        let context = RoutingContext::new();

        let first = service.get_smart_default(&context).await;
        assert_eq!(first.reason, SelectionReason::IntelligentRouting);

        clock.advance(Duration::from_secs(5 * 60 + 1));
        let third = service.get_smart_default(&context).await;
        assert_eq!(third.reason, SelectionReason::IntelligentRouting);
    }

    #[tokio::test]
    async fn test_all_backends_failing_yields_system_default() {
        let registry = registry_with(vec![
            MockCatalog::new("daemon", Backend::LocalDaemon).with_failure("connection refused"),
            MockCatalog::new("cloud", Backend::Cloud).with_failure("dns failure"),
        ]);
        let service = SmartRoutingService::new(registry);

        let selection = service.get_smart_default(&RoutingContext::new()).await;
        assert_eq!(selection.reason, SelectionReason::SystemDefault);
        assert!(selection.confidence <= 0.1 + f64::EPSILON);
        assert!(!selection.model.available);
        assert!(selection.reasoning.contains("No models are available"));
    }

    #[tokio::test]
    async fn test_impossible_filters_fall_back_to_smallest_available() {
        // A healthy catalog whose models all fail a coding-task filter.
        let registry = registry_with(vec![
            MockCatalog::new("daemon", Backend::LocalDaemon)
                .with_model(RawModelDescriptor::new("plain-model:7b"))
                .with_model(RawModelDescriptor::new("tiny-plain:1b")),
        ]);
        let service = SmartRoutingService::new(registry);
        let context = RoutingContext::new().with_task(TaskType::Coding);

        let selection = service.get_smart_default(&context).await;
        assert_eq!(selection.reason, SelectionReason::Fallback);
        assert!((selection.confidence - 0.3).abs() < f64::EPSILON);
        assert_eq!(selection.model.name, "tiny-plain:1b");
    }

    #[tokio::test]
    async fn test_disabled_fallback_skips_to_system_default() {
        // Same catalog as the fallback test, but the caller forbids
        // degradation: the smallest-model path must not run.
        let registry = registry_with(vec![
            MockCatalog::new("daemon", Backend::LocalDaemon)
                .with_model(RawModelDescriptor::new("plain-model:7b")),
        ]);
        let service = SmartRoutingService::new(registry);
        let context = RoutingContext::new()
            .with_task(TaskType::Coding)
            .with_fallback_allowed(false);

        let selection = service.get_smart_default(&context).await;
        assert_eq!(selection.reason, SelectionReason::SystemDefault);
        assert!((selection.confidence - 0.1).abs() < f64::EPSILON);
        assert!(!selection.model.available);
        assert!(selection.reasoning.contains("fallback selection is disabled"));
        assert!(selection.reasoning.contains("No suitable models"));
    }

    #[tokio::test]
    async fn test_fallback_is_not_cached() {
        let registry = registry_with(vec![
            MockCatalog::new("daemon", Backend::LocalDaemon)
                .with_model(RawModelDescriptor::new("plain-model:7b")),
        ]);
        let service = SmartRoutingService::new(registry);
        let context = RoutingContext::new().with_task(TaskType::Coding);

        let first = service.get_smart_default(&context).await;
        assert_eq!(first.reason, SelectionReason::Fallback);
        let second = service.get_smart_default(&context).await;
        assert_eq!(second.reason, SelectionReason::Fallback);
    }

    #[tokio::test]
    async fn test_confidence_stays_in_range() {
        let service = SmartRoutingService::new(healthy_registry());
        let selection = service.get_smart_default(&RoutingContext::new()).await;
        assert!((0.1..=1.0).contains(&selection.confidence));
    }

    #[tokio::test]
    async fn test_high_urgency_prefers_a_small_model() {
        let registry = registry_with(vec![
            MockCatalog::new("daemon", Backend::LocalDaemon)
                .with_model(RawModelDescriptor::new("llama3:70b"))
                .with_model(RawModelDescriptor::new("tinyllama:1b")),
        ]);
        let service = SmartRoutingService::new(registry);
        let context = RoutingContext::new().with_urgency(Urgency::High);

        let selection = service.get_smart_default(&context).await;
        // The 4GB urgency cap excludes the 70B model outright.
        assert!(selection.model.ram_gb() <= HIGH_URGENCY_RAM_CAP_GB);
    }
}
