//! Pure, table-driven inference from model names.
//!
//! Backends without structured metadata (file stores, older daemons)
//! only give us a name string. These functions derive parameter count,
//! RAM requirement, context size, and task suitability from it. All of
//! them are deterministic for a given input so repeated discovery passes
//! produce identical records.

use kestrel_core::{Backend, TaskSuitability};
use regex::Regex;
use std::sync::LazyLock;

/// Matches parameter counts like "7b", "6.7b", or "350m" in model names.
#[allow(clippy::expect_used, reason = "pattern is a compile-time constant")]
static PARAMETER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*([bm])\b").expect("Valid regex"));

/// Infers the parameter count in billions from a model name.
///
/// Returns `None` when the name carries no recognizable count.
pub fn parse_parameter_count(name: &str) -> Option<f64> {
    let lowered = name.to_lowercase();
    let captures = PARAMETER_PATTERN.captures(&lowered)?;
    let value: f64 = captures.get(1)?.as_str().parse().ok()?;
    match captures.get(2)?.as_str() {
        "m" => Some(value / 1000.0),
        _ => Some(value),
    }
}

/// Maps a parameter count to an approximate RAM requirement in GB.
///
/// Step table mirrors common quantized-inference footprints; unknown
/// sizes get the smallest step.
pub fn ram_requirement_gb(parameter_billions: Option<f64>) -> f64 {
    match parameter_billions {
        Some(params) if params >= 70.0 => 48.0,
        Some(params) if params >= 30.0 => 24.0,
        Some(params) if params >= 13.0 => 16.0,
        Some(params) if params >= 7.0 => 8.0,
        Some(params) if params >= 3.0 => 4.0,
        _ => 2.0,
    }
}

/// Formats a RAM amount as the canonical "NGB" requirement string.
pub fn format_ram_gb(gigabytes: f64) -> String {
    if gigabytes.fract() == 0.0 {
        format!("{gigabytes:.0}GB")
    } else {
        format!("{gigabytes}GB")
    }
}

/// Infers the context window in tokens from name markers, falling back
/// to a per-family default.
pub fn infer_context_size(name: &str, family: Option<&str>) -> u32 {
    let lowered = name.to_lowercase();
    for (marker, tokens) in [
        ("32k", 32_768_u32),
        ("16k", 16_384),
        ("8k", 8_192),
        ("4k", 4_096),
    ] {
        if lowered.contains(marker) {
            return tokens;
        }
    }

    let family_hint = family.map(str::to_lowercase);
    let haystack = family_hint.as_deref().unwrap_or(&lowered);
    if haystack.contains("qwen") || haystack.contains("deepseek") {
        32_768
    } else if haystack.contains("llama") || haystack.contains("mistral") {
        8_192
    } else {
        4_096
    }
}

/// Infers per-task suitability ratings from name keywords.
///
/// Unmatched dimensions stay at the defaults (5 everywhere, 7 general).
pub fn infer_task_suitability(name: &str) -> TaskSuitability {
    let lowered = name.to_lowercase();
    let mut suitability = TaskSuitability::default();

    if lowered.contains("code") || lowered.contains("coding") || lowered.contains("coder") {
        suitability.coding = 9.0;
    }
    if lowered.contains("reason") || lowered.contains("logic") {
        suitability.reasoning = 9.0;
    }
    if lowered.contains("instruct") || lowered.contains("chat") {
        suitability.general = 9.0;
    }
    if lowered.contains("creative") || lowered.contains("story") {
        suitability.creative = 9.0;
    }

    suitability.clamped()
}

/// Default trust score for backends without curated ratings.
///
/// The local daemon serves vetted, installed models; loose weight files
/// rank lower; cloud models normally carry curated scores already.
pub fn default_trust_score(backend: Backend) -> f32 {
    match backend {
        Backend::LocalDaemon => 7.0,
        Backend::LocalFile => 5.0,
        Backend::Cloud => 6.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kestrel_core::TaskType;

    #[test]
    fn test_parameter_parsing_table() {
        let cases = [
            ("qwen2.5-coder:7b", Some(7.0)),
            ("deepseek-coder:6.7b", Some(6.7)),
            ("llama-3.1-70b-versatile", Some(70.0)),
            ("tiny-350m", Some(0.35)),
            ("mystery-model", None),
        ];
        for (name, expected) in cases {
            assert_eq!(parse_parameter_count(name), expected, "name: {name}");
        }
    }

    #[test]
    fn test_ram_step_table() {
        let cases = [
            (Some(70.0), 48.0),
            (Some(34.0), 24.0),
            (Some(13.0), 16.0),
            (Some(7.0), 8.0),
            (Some(3.0), 4.0),
            (Some(1.5), 2.0),
            (None, 2.0),
        ];
        for (params, expected) in cases {
            assert!(
                (ram_requirement_gb(params) - expected).abs() < f64::EPSILON,
                "params: {params:?}"
            );
        }
    }

    #[test]
    fn test_format_ram() {
        assert_eq!(format_ram_gb(8.0), "8GB");
        assert_eq!(format_ram_gb(2.5), "2.5GB");
        assert_eq!(format_ram_gb(48.0), "48GB");
    }

    #[test]
    fn test_context_size_markers_win_over_family() {
        assert_eq!(infer_context_size("llama-2-32k", Some("llama")), 32_768);
        assert_eq!(infer_context_size("some-8k-model", None), 8_192);
        assert_eq!(infer_context_size("qwen2.5-coder:7b", Some("qwen2")), 32_768);
        assert_eq!(infer_context_size("llama3:8b", None), 8_192);
        assert_eq!(infer_context_size("mystery", None), 4_096);
    }

    #[test]
    fn test_task_suitability_keywords() {
        let coder = infer_task_suitability("qwen2.5-coder:7b");
        assert!((coder.for_task(TaskType::Coding) - 9.0).abs() < f32::EPSILON);
        assert!((coder.for_task(TaskType::Creative) - 5.0).abs() < f32::EPSILON);

        let chat = infer_task_suitability("llama-3-8b-instruct");
        assert!((chat.for_task(TaskType::General) - 9.0).abs() < f32::EPSILON);

        let plain = infer_task_suitability("mystery");
        assert!((plain.for_task(TaskType::General) - 7.0).abs() < f32::EPSILON);
        assert!((plain.for_task(TaskType::Coding) - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_inference_is_deterministic() {
        let first = infer_task_suitability("deepseek-reasoner:32b");
        let second = infer_task_suitability("deepseek-reasoner:32b");
        assert_eq!(first, second);
        assert_eq!(
            parse_parameter_count("deepseek-reasoner:32b"),
            parse_parameter_count("deepseek-reasoner:32b")
        );
    }
}
