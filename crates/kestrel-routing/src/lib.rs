//! Multi-backend model routing engine for kestrel.
//!
//! Given a task intent and hardware limits, the engine discovers models
//! across every registered backend catalog, filters unusable candidates,
//! scores survivors, and deterministically selects one model plus ranked
//! alternatives. Decisions are cached briefly and every entry point
//! degrades gracefully when discovery or scoring fails.
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

/// Injectable clock for deterministic cache tests.
pub mod clock;
/// Model discovery and consolidation across backends.
pub mod consolidator;
/// Pure candidate filtering predicates.
pub mod filter;
/// Pure name-based inference tables.
pub mod heuristics;
/// Routing pipeline orchestration.
pub mod pipeline;
/// Host resource probing.
pub mod probe;
/// Advisory routing recommendations.
pub mod recommend;
/// Weighted candidate scoring.
pub mod scorer;
/// Smart default selection with caching and fallback.
pub mod service;

pub use clock::{Clock, ManualClock, SystemClock};
pub use consolidator::ModelConsolidator;
pub use filter::{FilterOutcome, filter_candidates};
pub use pipeline::{
    ConsolidationRecord, FilterRecord, ModelRoutingDecision, PipelineStage, RoutingPipeline,
    ScoringRecord,
};
pub use probe::SystemResourceProbe;
pub use recommend::RoutingRecommendation;
pub use scorer::{ScoreBreakdown, ScoredCandidate, score_candidates};
pub use service::{
    DefaultModelSelection, RoutingContext, SelectionReason, SmartRoutingService, Urgency,
};
