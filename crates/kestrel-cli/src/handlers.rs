//! Command handlers for CLI operations.

use anyhow::Result;
use kestrel_backends::CatalogRegistry;
use kestrel_core::{HardwareConstraints, RoutingConfig, Settings, TaskType};
use kestrel_routing::{RoutingContext, RoutingRecommendation, SmartRoutingService, Urgency};
use std::sync::Arc;

/// Builds the routing service from persisted settings.
///
/// # Errors
///
/// Returns an error when the settings file cannot be loaded or created.
pub fn build_service() -> Result<SmartRoutingService> {
    let settings = Settings::load_or_create()?;
    let registry = Arc::new(CatalogRegistry::from_settings(&settings));
    Ok(SmartRoutingService::new(registry))
}

/// Runs a full routing pass and prints the decision.
///
/// # Errors
///
/// Returns an error when setup fails or no model survives filtering.
#[allow(clippy::print_stdout, reason = "CLI output")]
pub async fn handle_route(
    task: Option<TaskType>,
    ram: Option<f64>,
    min_trust: Option<f32>,
    json: bool,
) -> Result<()> {
    let service = build_service()?;

    let mut config = RoutingConfig::new();
    if let Some(task) = task {
        config = config.with_task(task);
    }
    if let Some(budget) = ram {
        config = config
            .with_hardware_constraints(HardwareConstraints::new().with_available_ram_gb(budget));
    }
    if let Some(threshold) = min_trust {
        config = config.with_minimum_trust_score(threshold);
    }

    let decision = service.route(&config).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&decision)?);
        return Ok(());
    }

    println!(
        "Selected: {} ({}, {}, trust {:.1}/10)",
        decision.selected_model.name,
        decision.selected_model.backend,
        decision.selected_model.ram_requirement,
        decision.selected_model.trust_score
    );
    for alternative in &decision.alternatives {
        println!("Alternative: {} ({})", alternative.name, alternative.backend);
    }
    println!("Reasoning: {}", decision.reasoning);
    println!(
        "Stages: consolidation {}ms ({} models), filtering {}ms ({} remaining), scoring {}ms (top {:.3}), total {}ms",
        decision.consolidation.duration_ms,
        decision.consolidation.total_models,
        decision.filtering.duration_ms,
        decision.filtering.remaining,
        decision.scoring.duration_ms,
        decision.scoring.top_score,
        decision.total_duration_ms
    );
    Ok(())
}

/// Lists every model discovered across enabled backends.
///
/// # Errors
///
/// Returns an error when setup fails.
#[allow(clippy::print_stdout, reason = "CLI output")]
pub async fn handle_models(refresh: bool, json: bool) -> Result<()> {
    let service = build_service()?;
    let models = service.pipeline().consolidator().discover(refresh).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&models)?);
        return Ok(());
    }

    if models.is_empty() {
        println!("No models discovered; check which backends are enabled in the settings file");
        return Ok(());
    }

    for model in &models {
        let status = if model.available { "" } else { " [unavailable]" };
        println!(
            "{} | {} | {} | {} ctx | trust {:.1}{status}",
            model.name, model.backend, model.ram_requirement, model.context_size, model.trust_score
        );
    }
    println!("{} models across all backends", models.len());
    Ok(())
}

/// Picks a default model with graceful degradation.
///
/// # Errors
///
/// Returns an error only when setup fails; the selection itself cannot.
#[allow(clippy::print_stdout, reason = "CLI output")]
pub async fn handle_default(task: Option<TaskType>, urgent: bool, json: bool) -> Result<()> {
    let service = build_service()?;

    let mut context = RoutingContext::new();
    if let Some(task) = task {
        context = context.with_task(task);
    }
    if urgent {
        context = context.with_urgency(Urgency::High);
    }

    let selection = service.get_smart_default(&context).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&selection)?);
        return Ok(());
    }

    println!(
        "Default: {} ({}) via {:?}, confidence {:.2}",
        selection.model.name, selection.model.backend, selection.reason, selection.confidence
    );
    println!("Reasoning: {}", selection.reasoning);
    Ok(())
}

/// Prints an advisory routing configuration for this host.
///
/// # Errors
///
/// Returns an error when JSON serialization fails.
#[allow(clippy::print_stdout, reason = "CLI output")]
pub fn handle_recommend(task: Option<TaskType>, json: bool) -> Result<()> {
    let probe = kestrel_routing::SystemResourceProbe::new();
    let recommendation = RoutingRecommendation::generate(&probe, task);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&recommendation.recommended_config)?
        );
        return Ok(());
    }

    println!("{}", recommendation.reasoning);
    println!(
        "Host: {:.1}GB RAM free / {:.1}GB total, {} cores, {:.0}GB disk free ({})",
        recommendation.system_info.available_ram_gb,
        recommendation.system_info.total_ram_gb,
        recommendation.system_info.cpu_cores,
        recommendation.system_info.disk_space_gb,
        recommendation.system_info.platform
    );
    if let Some(constraints) = &recommendation.recommended_config.hardware_constraints
        && let Some(budget) = constraints.available_ram_gb
    {
        println!("Suggested RAM budget: {budget:.1}GB");
    }
    Ok(())
}
