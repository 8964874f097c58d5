use serde::{Deserialize, Serialize};

use super::patterns::PatternDef;
use crate::models::LabStatus;

/// One regex hit, sliced straight out of the report text by a pattern's role map.
/// Lives only for the duration of a single extraction call.
#[derive(Debug, Clone, Copy)]
pub struct RawMatch<'a> {
    pub value: &'a str,
    /// `value` parsed; always finite.
    pub numeric: f64,
    pub parameter_text: &'a str,
    pub unit_text: &'a str,
    pub full_match: &'a str,
    /// Byte span of `full_match` in the scanned text.
    pub start: usize,
    pub end: usize,
    pub pattern: &'a PatternDef,
}

/// A raw match after text cleanup and stop-phrase filtering.
#[derive(Debug, Clone)]
pub struct NormalizedMatch<'a> {
    pub value: f64,
    /// Lower-cased, parenthesis-free, whitespace-collapsed parameter text.
    pub parameter: String,
    /// Standardized unit, or `None` when the layout carried no unit.
    pub unit: Option<String>,
    pub raw: RawMatch<'a>,
}

/// A heuristically extracted measurement pending human review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateValue {
    pub parameter_name: String,
    pub value: f64,
    pub unit: Option<String>,
    pub reference_range: Option<String>,
    pub status: LabStatus,
    pub raw_match: String,
    pub confidence: f32,
}

/// Expected interval for one canonical parameter. Either bound may be open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRange {
    pub parameter_key: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub unit: String,
}

impl ReferenceRange {
    pub fn new(parameter_key: &str, min: Option<f64>, max: Option<f64>, unit: &str) -> Self {
        Self {
            parameter_key: parameter_key.to_string(),
            min,
            max,
            unit: unit.to_string(),
        }
    }

    /// Classify a value against this range. A missing bound is never violated.
    pub fn classify(&self, value: f64) -> LabStatus {
        if self.min.is_some_and(|min| value < min) {
            LabStatus::Low
        } else if self.max.is_some_and(|max| value > max) {
            LabStatus::High
        } else {
            LabStatus::Normal
        }
    }

    /// `"{min}-{max}"`, `"<{max}"`, `">{min}"`, or `None` when both bounds are open.
    pub fn display(&self) -> Option<String> {
        format_bounds(self.min, self.max)
    }

    /// Inverse of [`ReferenceRange::display`]: recover `(min, max)` from a range string.
    ///
    /// Accepts an optional trailing unit (`"70-100 mg/dL"`) and an en-dash separator,
    /// since reviewers often type ranges by hand.
    pub fn parse_display(text: &str) -> Option<(Option<f64>, Option<f64>)> {
        let trimmed = text.trim();
        let numeric = trimmed
            .split_whitespace()
            .next()
            .unwrap_or("")
            .replace('\u{2013}', "-");

        if let Some(rest) = numeric.strip_prefix('<') {
            return parse_bound(rest).map(|max| (None, Some(max)));
        }
        if let Some(rest) = numeric.strip_prefix('>') {
            return parse_bound(rest).map(|min| (Some(min), None));
        }

        let (low, high) = numeric.split_once('-')?;
        let min = parse_bound(low)?;
        let max = parse_bound(high)?;
        (min <= max).then_some((Some(min), Some(max)))
    }
}

pub(crate) fn format_bounds(min: Option<f64>, max: Option<f64>) -> Option<String> {
    match (min, max) {
        (Some(min), Some(max)) => Some(format!("{min}-{max}")),
        (None, Some(max)) => Some(format!("<{max}")),
        (Some(min), None) => Some(format!(">{min}")),
        (None, None) => None,
    }
}

fn parse_bound(text: &str) -> Option<f64> {
    text.trim()
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Full result of one extraction call, with the bookkeeping the review surface shows.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractionReport {
    pub candidates: Vec<CandidateValue>,
    pub raw_match_count: usize,
    /// Matches dropped by the normalizer (stop phrases, unusable parameter text).
    pub rejected_count: usize,
    pub duplicates_removed: usize,
    /// Input exceeded the configured cap and only its prefix was scanned.
    pub truncated: bool,
}

impl ExtractionReport {
    /// Candidates that need a closer look before saving.
    pub fn flagged(&self, threshold: f32) -> Vec<&CandidateValue> {
        self.candidates
            .iter()
            .filter(|c| c.confidence < threshold)
            .collect()
    }
}
