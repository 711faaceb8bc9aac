//! Core data types for models, tasks, constraints, and routing requests.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::Error;

/// RAM requirement assumed when a model's requirement string cannot be parsed.
pub const DEFAULT_RAM_GB: f64 = 8.0;

/// A source of models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    /// Local inference daemon (Ollama-compatible HTTP API).
    LocalDaemon,
    /// Local model-file store (directory of weight files).
    LocalFile,
    /// Cloud API provider.
    Cloud,
}

impl Display for Backend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::LocalDaemon => write!(f, "local-daemon"),
            Self::LocalFile => write!(f, "local-file"),
            Self::Cloud => write!(f, "cloud"),
        }
    }
}

/// Task category a model can be routed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    /// Code generation and editing.
    Coding,
    /// Multi-step reasoning and logic.
    Reasoning,
    /// General conversation and instruction following.
    General,
    /// Creative writing.
    Creative,
}

impl Display for TaskType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Coding => write!(f, "coding"),
            Self::Reasoning => write!(f, "reasoning"),
            Self::General => write!(f, "general"),
            Self::Creative => write!(f, "creative"),
        }
    }
}

impl FromStr for TaskType {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "coding" | "code" => Ok(Self::Coding),
            "reasoning" => Ok(Self::Reasoning),
            "general" => Ok(Self::General),
            "creative" => Ok(Self::Creative),
            other => Err(Error::Config(format!("unknown task type: {other}"))),
        }
    }
}

/// Per-task fit ratings for a model, each on a 0-10 scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaskSuitability {
    /// Fit for coding tasks.
    pub coding: f32,
    /// Fit for reasoning tasks.
    pub reasoning: f32,
    /// Fit for general tasks.
    pub general: f32,
    /// Fit for creative tasks.
    pub creative: f32,
}

impl TaskSuitability {
    /// Returns the rating for the given task category.
    pub fn for_task(&self, task: TaskType) -> f32 {
        match task {
            TaskType::Coding => self.coding,
            TaskType::Reasoning => self.reasoning,
            TaskType::General => self.general,
            TaskType::Creative => self.creative,
        }
    }

    /// Returns a copy with every rating clamped to the 0-10 scale.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            coding: self.coding.clamp(0.0, 10.0),
            reasoning: self.reasoning.clamp(0.0, 10.0),
            general: self.general.clamp(0.0, 10.0),
            creative: self.creative.clamp(0.0, 10.0),
        }
    }
}

impl Default for TaskSuitability {
    /// Unknown models default to 5 everywhere, 7 for general use.
    fn default() -> Self {
        Self {
            coding: 5.0,
            reasoning: 5.0,
            general: 7.0,
            creative: 5.0,
        }
    }
}

/// A model record unified across backends.
///
/// Rebuilt fresh on every discovery pass and never mutated in place. The
/// same model name appearing in two backends produces two distinct
/// entries, since trust and availability differ per backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedModel {
    /// Model identifier as reported by its backend.
    pub name: String,
    /// Backend this record was discovered from.
    pub backend: Backend,
    /// Declared model type or family (e.g. "llama", "gguf").
    pub declared_type: String,
    /// Human-readable parameter count (e.g. "7B"), when known.
    pub parameter_size: Option<String>,
    /// Context window size in tokens.
    pub context_size: u32,
    /// RAM requirement as a "NGB" string (e.g. "8GB").
    pub ram_requirement: String,
    /// Curated confidence rating, 0-10, independent of task.
    pub trust_score: f32,
    /// Per-task fit ratings.
    pub task_suitability: TaskSuitability,
    /// Whether the backend reports this model as usable right now.
    pub available: bool,
    /// Backend-specific free-form metadata.
    pub metadata: HashMap<String, String>,
}

impl UnifiedModel {
    /// Parses the RAM requirement into gigabytes.
    ///
    /// Always yields a positive number; unparseable strings fall back to
    /// [`DEFAULT_RAM_GB`].
    pub fn ram_gb(&self) -> f64 {
        let trimmed = self
            .ram_requirement
            .trim()
            .trim_end_matches("GB")
            .trim_end_matches("gb")
            .trim();
        match trimmed.parse::<f64>() {
            Ok(value) if value > 0.0 => value,
            _ => DEFAULT_RAM_GB,
        }
    }

    /// Parses the parameter count into billions, when declared.
    ///
    /// Accepts suffixed forms like "7B", "6.7B" or "350M".
    pub fn parameter_billions(&self) -> Option<f64> {
        let raw = self.parameter_size.as_deref()?.trim().to_lowercase();
        if let Some(stripped) = raw.strip_suffix('b') {
            return stripped.trim().parse::<f64>().ok();
        }
        if let Some(stripped) = raw.strip_suffix('m') {
            return stripped.trim().parse::<f64>().ok().map(|value| value / 1000.0);
        }
        raw.parse::<f64>().ok()
    }

    /// Declared download size in gigabytes, when the backend reported one.
    pub fn download_gb(&self) -> Option<f64> {
        self.metadata
            .get("size_bytes")
            .and_then(|raw| raw.parse::<f64>().ok())
            .map(|bytes| bytes / 1_073_741_824.0)
    }
}

/// Hardware limits for one routing call. Immutable per call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HardwareConstraints {
    /// RAM budget in gigabytes.
    pub available_ram_gb: Option<f64>,
    /// Maximum acceptable download size in gigabytes.
    pub max_download_gb: Option<f64>,
    /// Preferred model size class. Advisory only: recommendations set
    /// it for callers assembling their own budgets, while the engine
    /// derives size effects from the RAM and download limits instead.
    pub preferred_size: Option<SizePreference>,
}

impl HardwareConstraints {
    /// Creates an empty constraint set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the RAM budget in gigabytes.
    #[must_use]
    pub fn with_available_ram_gb(mut self, gigabytes: f64) -> Self {
        self.available_ram_gb = Some(gigabytes);
        self
    }

    /// Sets the maximum download size in gigabytes.
    #[must_use]
    pub fn with_max_download_gb(mut self, gigabytes: f64) -> Self {
        self.max_download_gb = Some(gigabytes);
        self
    }

    /// Sets the preferred model size class.
    #[must_use]
    pub fn with_preferred_size(mut self, preference: SizePreference) -> Self {
        self.preferred_size = Some(preference);
        self
    }
}

/// Preferred model size class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizePreference {
    /// Favor small, fast models.
    Small,
    /// No strong preference.
    Balanced,
    /// Favor large, capable models.
    Large,
}

/// Request parameters for one routing call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Task the selected model will be used for.
    pub task: Option<TaskType>,
    /// Hardware limits to filter against.
    pub hardware_constraints: Option<HardwareConstraints>,
    /// Backends whose candidates receive a score bonus.
    pub preferred_backends: Vec<Backend>,
    /// Hard lower bound on trust score, when set.
    pub minimum_trust_score: Option<f32>,
    /// Whether the caller permits fallback selection on failure.
    pub allow_fallback: bool,
    /// Maximum number of candidates retained after scoring.
    pub max_candidates: usize,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            task: None,
            hardware_constraints: None,
            preferred_backends: Vec::new(),
            minimum_trust_score: None,
            allow_fallback: true,
            max_candidates: 5,
        }
    }
}

impl RoutingConfig {
    /// Creates a request with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the task category.
    #[must_use]
    pub fn with_task(mut self, task: TaskType) -> Self {
        self.task = Some(task);
        self
    }

    /// Sets hardware constraints.
    #[must_use]
    pub fn with_hardware_constraints(mut self, constraints: HardwareConstraints) -> Self {
        self.hardware_constraints = Some(constraints);
        self
    }

    /// Adds a preferred backend.
    #[must_use]
    pub fn with_preferred_backend(mut self, backend: Backend) -> Self {
        self.preferred_backends.push(backend);
        self
    }

    /// Sets the hard trust-score threshold.
    #[must_use]
    pub fn with_minimum_trust_score(mut self, score: f32) -> Self {
        self.minimum_trust_score = Some(score);
        self
    }

    /// Sets whether fallback selection is permitted on routing failure.
    #[must_use]
    pub fn with_allow_fallback(mut self, allowed: bool) -> Self {
        self.allow_fallback = allowed;
        self
    }

    /// Sets the maximum number of retained candidates.
    #[must_use]
    pub fn with_max_candidates(mut self, count: usize) -> Self {
        self.max_candidates = count;
        self
    }
}

/// Snapshot of host resources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemResources {
    /// RAM currently available, in gigabytes.
    pub available_ram_gb: f64,
    /// Total installed RAM, in gigabytes.
    pub total_ram_gb: f64,
    /// Logical CPU core count.
    pub cpu_cores: usize,
    /// Free disk space, in gigabytes.
    pub disk_space_gb: f64,
    /// Dedicated GPU memory in gigabytes, when detectable.
    pub gpu_memory_gb: Option<f64>,
    /// Operating system identifier (e.g. "linux", "macos").
    pub platform: String,
}

impl SystemResources {
    /// Conservative defaults used when OS queries fail.
    pub fn conservative_defaults() -> Self {
        Self {
            available_ram_gb: 8.0,
            total_ram_gb: 16.0,
            cpu_cores: 4,
            disk_space_gb: 100.0,
            gpu_memory_gb: None,
            platform: std::env::consts::OS.to_owned(),
        }
    }
}

/// Raw model descriptor as reported by a single backend catalog.
///
/// Fields a backend cannot report are left `None`; the consolidator
/// fills gaps with deterministic name heuristics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawModelDescriptor {
    /// Model identifier.
    pub name: String,
    /// Download size in bytes, when known.
    pub size_bytes: Option<u64>,
    /// Declared parameter count (e.g. "7.6B"), when known.
    pub parameter_count: Option<String>,
    /// Model family (e.g. "qwen", "llama"), when known.
    pub family: Option<String>,
    /// Context window in tokens, when declared.
    pub context_window: Option<u32>,
    /// Curated trust score, when the backend carries one.
    pub trust_score: Option<f32>,
    /// Whether the backend reports the model as usable right now.
    pub available: bool,
    /// Backend-specific free-form metadata.
    pub metadata: HashMap<String, String>,
}

impl RawModelDescriptor {
    /// Creates an available descriptor with the given name.
    pub fn new<T: Into<String>>(name: T) -> Self {
        Self {
            name: name.into(),
            available: true,
            ..Self::default()
        }
    }

    /// Sets the download size in bytes.
    #[must_use]
    pub fn with_size_bytes(mut self, bytes: u64) -> Self {
        self.size_bytes = Some(bytes);
        self
    }

    /// Sets the declared parameter count.
    #[must_use]
    pub fn with_parameter_count<T: Into<String>>(mut self, count: T) -> Self {
        self.parameter_count = Some(count.into());
        self
    }

    /// Sets the model family.
    #[must_use]
    pub fn with_family<T: Into<String>>(mut self, family: T) -> Self {
        self.family = Some(family.into());
        self
    }

    /// Sets the declared context window.
    #[must_use]
    pub fn with_context_window(mut self, tokens: u32) -> Self {
        self.context_window = Some(tokens);
        self
    }

    /// Sets the curated trust score.
    #[must_use]
    pub fn with_trust_score(mut self, score: f32) -> Self {
        self.trust_score = Some(score);
        self
    }

    /// Marks the descriptor unavailable.
    #[must_use]
    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model_with_ram(requirement: &str) -> UnifiedModel {
        UnifiedModel {
            name: "test-model".to_owned(),
            backend: Backend::LocalDaemon,
            declared_type: "llama".to_owned(),
            parameter_size: Some("7B".to_owned()),
            context_size: 8192,
            ram_requirement: requirement.to_owned(),
            trust_score: 7.0,
            task_suitability: TaskSuitability::default(),
            available: true,
            metadata: HashMap::new(),
        }
    }

    #[test]
    fn test_ram_requirement_parsing() {
        assert!((model_with_ram("8GB").ram_gb() - 8.0).abs() < f64::EPSILON);
        assert!((model_with_ram("2.5GB").ram_gb() - 2.5).abs() < f64::EPSILON);
        assert!((model_with_ram("16gb").ram_gb() - 16.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ram_requirement_defaults_when_unparseable() {
        assert!((model_with_ram("lots").ram_gb() - DEFAULT_RAM_GB).abs() < f64::EPSILON);
        assert!((model_with_ram("").ram_gb() - DEFAULT_RAM_GB).abs() < f64::EPSILON);
        assert!((model_with_ram("-4GB").ram_gb() - DEFAULT_RAM_GB).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parameter_billions() {
        let mut model = model_with_ram("8GB");
        assert_eq!(model.parameter_billions(), Some(7.0));

        model.parameter_size = Some("6.7B".to_owned());
        assert_eq!(model.parameter_billions(), Some(6.7));

        model.parameter_size = Some("350M".to_owned());
        assert_eq!(model.parameter_billions(), Some(0.35));

        model.parameter_size = None;
        assert_eq!(model.parameter_billions(), None);
    }

    #[test]
    fn test_task_type_from_str() {
        assert_eq!("coding".parse::<TaskType>().ok(), Some(TaskType::Coding));
        assert_eq!("Code".parse::<TaskType>().ok(), Some(TaskType::Coding));
        assert_eq!("creative".parse::<TaskType>().ok(), Some(TaskType::Creative));
        assert!("juggling".parse::<TaskType>().is_err());
    }

    #[test]
    fn test_routing_config_builder() {
        let config = RoutingConfig::new()
            .with_task(TaskType::Coding)
            .with_minimum_trust_score(6.0)
            .with_preferred_backend(Backend::LocalDaemon);

        assert_eq!(config.task, Some(TaskType::Coding));
        assert_eq!(config.minimum_trust_score, Some(6.0));
        assert_eq!(config.preferred_backends, vec![Backend::LocalDaemon]);
        assert!(config.allow_fallback);
        assert_eq!(config.max_candidates, 5);
    }

    #[test]
    fn test_suitability_lookup_and_clamp() {
        let suitability = TaskSuitability {
            coding: 12.0,
            reasoning: -1.0,
            general: 7.0,
            creative: 5.0,
        }
        .clamped();

        assert!((suitability.for_task(TaskType::Coding) - 10.0).abs() < f32::EPSILON);
        assert!(suitability.for_task(TaskType::Reasoning).abs() < f32::EPSILON);
        assert!((suitability.for_task(TaskType::General) - 7.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_backend_display() {
        assert_eq!(Backend::LocalDaemon.to_string(), "local-daemon");
        assert_eq!(Backend::LocalFile.to_string(), "local-file");
        assert_eq!(Backend::Cloud.to_string(), "cloud");
    }
}
