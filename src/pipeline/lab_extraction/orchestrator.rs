use std::sync::LazyLock;

use super::confidence::{into_candidate, score_match};
use super::dedup::{deduplicate, sort_by_confidence};
use super::matcher::{find_raw_matches, suppress_shadowed};
use super::normalize::normalize_match;
use super::reference::resolve_match;
use super::sanitize::{cap_input, sanitize_report_text};
use super::types::{CandidateValue, ExtractionReport};
use super::LabExtractionError;
use crate::pipeline_config::LabExtractionConfig;

/// Process-wide extractor over the built-in catalog.
static STANDARD_EXTRACTOR: LazyLock<LabExtractor> = LazyLock::new(|| {
    let config = LabExtractionConfig::from_env().expect("Invalid built-in lab pattern catalog");
    LabExtractor::new(config)
});

/// Runs the full extraction pipeline against an owned, immutable configuration.
///
/// Holds no mutable state, so one instance can serve any number of threads.
#[derive(Debug, Clone)]
pub struct LabExtractor {
    config: LabExtractionConfig,
}

impl LabExtractor {
    pub fn new(config: LabExtractionConfig) -> Self {
        Self { config }
    }

    /// Build an extractor over the built-in catalog.
    pub fn try_standard() -> Result<Self, LabExtractionError> {
        Ok(Self::new(LabExtractionConfig::standard()?))
    }

    /// The shared built-in extractor.
    pub fn standard() -> &'static LabExtractor {
        &STANDARD_EXTRACTOR
    }

    pub fn config(&self) -> &LabExtractionConfig {
        &self.config
    }

    /// Extract candidate values, most confident first.
    pub fn extract(&self, text: &str) -> Vec<CandidateValue> {
        self.extract_with_report(text).candidates
    }

    /// Extract candidate values along with match bookkeeping.
    pub fn extract_with_report(&self, text: &str) -> ExtractionReport {
        let config = &self.config;

        let (capped, truncated) = cap_input(text, config.max_input_bytes);
        if truncated {
            tracing::warn!(
                input_bytes = text.len(),
                max_input_bytes = config.max_input_bytes,
                "Lab report text exceeds input cap, scanning prefix only"
            );
        }

        let clean = sanitize_report_text(capped);
        if clean.is_empty() {
            return ExtractionReport {
                truncated,
                ..Default::default()
            };
        }

        let raw = find_raw_matches(&clean, &config.patterns, config.min_parameter_chars);
        let raw_match_count = raw.len();
        let (raw, shadowed) = suppress_shadowed(raw);

        let normalized: Vec<_> = raw
            .into_iter()
            .filter_map(|m| {
                normalize_match(
                    m,
                    &config.units,
                    &config.stop_phrases,
                    config.min_parameter_chars,
                )
            })
            .collect();
        let rejected_count = raw_match_count - shadowed - normalized.len();

        let scored: Vec<CandidateValue> = normalized
            .into_iter()
            .map(|n| {
                let resolved = resolve_match(n, &config.parameters, &config.references);
                let confidence = score_match(&resolved, &config.recognized_units);
                into_candidate(resolved, confidence)
            })
            .collect();

        let (mut candidates, duplicates_removed) = deduplicate(scored);
        sort_by_confidence(&mut candidates);

        tracing::debug!(
            raw_matches = raw_match_count,
            shadowed,
            rejected = rejected_count,
            duplicates_removed,
            kept = candidates.len(),
            "Lab value extraction complete"
        );

        ExtractionReport {
            candidates,
            raw_match_count,
            rejected_count: rejected_count + shadowed,
            duplicates_removed,
            truncated,
        }
    }
}

/// Extract candidate values with the shared built-in extractor.
pub fn extract_lab_values(text: &str) -> Vec<CandidateValue> {
    LabExtractor::standard().extract(text)
}

/// Serialize candidates for the upload/review hand-off.
pub fn candidates_to_json(candidates: &[CandidateValue]) -> Result<String, serde_json::Error> {
    serde_json::to_string(candidates)
}
