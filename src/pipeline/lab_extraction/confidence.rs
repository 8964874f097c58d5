use std::collections::HashSet;

use super::reference::ResolvedMatch;
use super::types::CandidateValue;

/// Confidence thresholds used by the review surface
pub mod thresholds {
    /// Below this: probably noise picked up by a generic pattern.
    pub const LOW: f32 = 0.50;

    /// Below this: parameter or unit not recognized. Flag for review.
    pub const MODERATE: f32 = 0.70;

    /// Above this: layout-aware pattern with a known parameter and unit.
    pub const HIGH: f32 = 0.85;
}

/// Bonus for a unit from [`RECOGNIZED_UNITS`].
pub const UNIT_BONUS: f32 = 0.10;

/// Canonical units that earn [`UNIT_BONUS`].
pub const RECOGNIZED_UNITS: &[&str] = &[
    "g/dL",
    "mg/dL",
    "mg/L",
    "µg/dL",
    "ng/mL",
    "pg/mL",
    "mmol/L",
    "mEq/L",
    "U/L",
    "IU/L",
    "mIU/L",
    "µIU/mL",
    "/µL",
    "million/µL",
    "Lakhs/µL",
    "10^3/µL",
    "10^6/µL",
    "%",
    "fL",
    "pg",
    "mm/hr",
];

pub fn recognized_unit_set() -> HashSet<String> {
    RECOGNIZED_UNITS.iter().map(|u| u.to_string()).collect()
}

/// Combine pattern base score, unit recognition and parameter recognition.
///
/// Only a unit printed on the report counts; a unit backfilled from the
/// reference table says nothing about how well the line was read.
pub fn score_match(resolved: &ResolvedMatch<'_>, recognized_units: &HashSet<String>) -> f32 {
    let base = resolved.normalized.raw.pattern.base_confidence;

    let unit_bonus = match (&resolved.unit, resolved.unit_extracted) {
        (Some(unit), true) if recognized_units.contains(unit) => UNIT_BONUS,
        _ => 0.0,
    };

    let parameter_bonus = resolved.recognition_bonus.clamp(0.0, 0.3);

    round_confidence(base + unit_bonus + parameter_bonus)
}

/// Clamp to [0, 1] and round to two decimals so output is stable across platforms.
pub fn round_confidence(raw: f32) -> f32 {
    if !raw.is_finite() {
        return 0.0;
    }
    ((raw.clamp(0.0, 1.0) * 100.0).round() / 100.0).clamp(0.0, 1.0)
}

/// Turn a scored match into the output record.
pub fn into_candidate(resolved: ResolvedMatch<'_>, confidence: f32) -> CandidateValue {
    CandidateValue {
        parameter_name: resolved.display_name,
        value: resolved.normalized.value,
        unit: resolved.unit,
        reference_range: resolved.reference_range,
        status: resolved.status,
        raw_match: resolved.normalized.raw.full_match.trim().to_string(),
        confidence,
    }
}
