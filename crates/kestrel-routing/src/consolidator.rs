//! Model discovery and consolidation across backend catalogs.

use crate::clock::{Clock, SystemClock};
use crate::heuristics;
use futures::future::join_all;
use kestrel_backends::CatalogRegistry;
use kestrel_core::{Backend, RawModelDescriptor, UnifiedModel};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::timeout;

/// How long a consolidated model list stays valid.
const DISCOVERY_CACHE_TTL: Duration = Duration::from_secs(30);

/// Budget for a single backend catalog query.
const BACKEND_TIMEOUT: Duration = Duration::from_secs(5);

/// Cached discovery pass.
struct CacheEntry {
    /// Consolidated models from the pass.
    models: Vec<UnifiedModel>,
    /// When the pass completed.
    taken_at: Instant,
}

/// Merges per-backend catalogs into unified model records.
///
/// One backend failing or hanging never blocks discovery: it simply
/// contributes zero models for that pass. Results from all backends are
/// concatenated in registry order with no cross-backend de-duplication,
/// since trust and availability differ per backend.
pub struct ModelConsolidator {
    /// Backend catalogs queried on every pass.
    registry: Arc<CatalogRegistry>,
    /// Cached pass, guarded by one critical section so concurrent
    /// discoveries cannot interleave partial writes.
    cache: Mutex<Option<CacheEntry>>,
    /// Cache validity window.
    ttl: Duration,
    /// Per-backend query budget.
    backend_timeout: Duration,
    /// Time source, injectable for tests.
    clock: Arc<dyn Clock>,
}

impl ModelConsolidator {
    /// Creates a consolidator over the given registry.
    pub fn new(registry: Arc<CatalogRegistry>) -> Self {
        Self::with_clock(registry, Arc::new(SystemClock))
    }

    /// Creates a consolidator with an injected clock.
    pub fn with_clock(registry: Arc<CatalogRegistry>, clock: Arc<dyn Clock>) -> Self {
        Self {
            registry,
            cache: Mutex::new(None),
            ttl: DISCOVERY_CACHE_TTL,
            backend_timeout: BACKEND_TIMEOUT,
            clock,
        }
    }

    /// Overrides the per-backend query budget.
    #[must_use]
    pub fn with_backend_timeout(mut self, budget: Duration) -> Self {
        self.backend_timeout = budget;
        self
    }

    /// Discovers all models across registered backends.
    ///
    /// Serves the cached pass when it is fresh and non-empty, unless
    /// `force_refresh` is set. Never fails: backend errors degrade to
    /// empty per-backend results.
    pub async fn discover(&self, force_refresh: bool) -> Vec<UnifiedModel> {
        let mut cache = self.cache.lock().await;

        if !force_refresh
            && let Some(entry) = cache.as_ref()
            && !entry.models.is_empty()
            && self.clock.now().duration_since(entry.taken_at) < self.ttl
        {
            return entry.models.clone();
        }

        let models = self.refresh().await;
        *cache = Some(CacheEntry {
            models: models.clone(),
            taken_at: self.clock.now(),
        });
        models
    }

    /// Queries every catalog concurrently and unifies the results.
    async fn refresh(&self) -> Vec<UnifiedModel> {
        let queries = self.registry.catalogs().iter().map(|catalog| {
            let catalog = Arc::clone(catalog);
            let budget = self.backend_timeout;
            async move {
                let backend = catalog.backend();
                let name = catalog.name();
                match timeout(budget, catalog.list_models()).await {
                    Ok(Ok(descriptors)) => (backend, descriptors),
                    Ok(Err(error)) => {
                        tracing::warn!("Backend catalog {name} failed: {error}");
                        (backend, Vec::new())
                    }
                    Err(_) => {
                        tracing::warn!(
                            "Backend catalog {name} timed out after {}ms",
                            budget.as_millis()
                        );
                        (backend, Vec::new())
                    }
                }
            }
        });

        let mut models = Vec::new();
        for (backend, descriptors) in join_all(queries).await {
            for descriptor in descriptors {
                models.push(Self::unify(backend, descriptor));
            }
        }

        tracing::debug!("Discovery pass consolidated {} models", models.len());
        models
    }

    /// Builds a unified record from a raw descriptor, filling metadata
    /// gaps with deterministic name heuristics.
    fn unify(backend: Backend, descriptor: RawModelDescriptor) -> UnifiedModel {
        let parameter_billions = descriptor
            .parameter_count
            .as_deref()
            .and_then(parse_declared_parameters)
            .or_else(|| heuristics::parse_parameter_count(&descriptor.name));

        let ram_gb = heuristics::ram_requirement_gb(parameter_billions);
        let context_size = descriptor
            .context_window
            .unwrap_or_else(|| {
                heuristics::infer_context_size(&descriptor.name, descriptor.family.as_deref())
            });

        let trust_score = descriptor
            .trust_score
            .unwrap_or_else(|| heuristics::default_trust_score(backend))
            .clamp(0.0, 10.0);

        let parameter_size = descriptor.parameter_count.clone().or_else(|| {
            parameter_billions.map(|params| {
                if params < 1.0 {
                    format!("{:.0}M", params * 1000.0)
                } else if params.fract() == 0.0 {
                    format!("{params:.0}B")
                } else {
                    format!("{params}B")
                }
            })
        });

        let declared_type = descriptor
            .family
            .clone()
            .unwrap_or_else(|| "unknown".to_owned());

        let mut metadata = descriptor.metadata;
        if let Some(bytes) = descriptor.size_bytes {
            metadata.insert("size_bytes".to_owned(), bytes.to_string());
        }

        let task_suitability = heuristics::infer_task_suitability(&descriptor.name);

        UnifiedModel {
            name: descriptor.name,
            backend,
            declared_type,
            parameter_size,
            context_size,
            ram_requirement: heuristics::format_ram_gb(ram_gb),
            trust_score,
            task_suitability,
            available: descriptor.available,
            metadata,
        }
    }
}

/// Parses declared parameter strings like "7.6B" or "350M" to billions.
pub(crate) fn parse_declared_parameters(declared: &str) -> Option<f64> {
    let lowered = declared.trim().to_lowercase();
    if let Some(stripped) = lowered.strip_suffix('b') {
        return stripped.trim().parse::<f64>().ok();
    }
    if let Some(stripped) = lowered.strip_suffix('m') {
        return stripped
            .trim()
            .parse::<f64>()
            .ok()
            .map(|value| value / 1000.0);
    }
    lowered.parse::<f64>().ok()
}
