//! Canonical parameter resolution and reference-range classification.
//!
//! Resolution is an ordered list of rules, first match wins. Rules that are
//! substrings of later rules' vocabulary come first (MCHC before MCH before
//! hemoglobin, ESR before RBC, HDL/LDL before cholesterol, BUN before urea).

use std::collections::HashMap;

use super::types::{NormalizedMatch, ReferenceRange};
use crate::models::LabStatus;

/// One resolution rule: matches if the cleaned text has a whitespace-separated
/// token equal to any `words` entry, or contains any `contains` phrase. When
/// `qualifiers` is non-empty a `contains` hit also needs one of them as a token.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterRule {
    pub key: String,
    pub display_name: String,
    pub contains: Vec<String>,
    pub words: Vec<String>,
    pub qualifiers: Vec<String>,
    /// Added to confidence when this rule resolves a match. 0.1..=0.3.
    pub recognition_bonus: f32,
}

impl ParameterRule {
    pub fn new(
        key: &str,
        display_name: &str,
        contains: &[&str],
        words: &[&str],
        recognition_bonus: f32,
    ) -> Self {
        Self {
            key: key.to_string(),
            display_name: display_name.to_string(),
            contains: contains.iter().map(|s| s.to_string()).collect(),
            words: words.iter().map(|s| s.to_string()).collect(),
            qualifiers: Vec::new(),
            recognition_bonus,
        }
    }

    pub fn qualified_by(mut self, qualifiers: &[&str]) -> Self {
        self.qualifiers = qualifiers.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn matches(&self, text: &str) -> bool {
        let has_token = |set: &[String]| {
            text.split_whitespace()
                .any(|token| set.iter().any(|w| w == token))
        };
        if has_token(&self.words) {
            return true;
        }
        self.contains.iter().any(|phrase| text.contains(phrase.as_str()))
            && (self.qualifiers.is_empty() || has_token(&self.qualifiers))
    }
}

/// Tokens marking an absolute cell count rather than a percentage.
const ABSOLUTE: &[&str] = &["absolute", "abs", "abs."];

/// Ordered resolution rules.
#[derive(Debug, Clone, Default)]
pub struct ParameterAliasTable {
    rules: Vec<ParameterRule>,
}

impl ParameterAliasTable {
    pub fn new(rules: Vec<ParameterRule>) -> Self {
        Self { rules }
    }

    pub fn standard() -> Self {
        let r = ParameterRule::new;
        Self::new(vec![
            r(
                "mchc",
                "MCHC",
                &[
                    "mchc",
                    "corpuscular hemoglobin concentration",
                    "corpuscular haemoglobin concentration",
                    "cell hemoglobin concentration",
                    "cell haemoglobin concentration",
                ],
                &[],
                0.1,
            ),
            r(
                "mch",
                "MCH",
                &[
                    "corpuscular hemoglobin",
                    "corpuscular haemoglobin",
                    "cell hemoglobin",
                    "cell haemoglobin",
                ],
                &["mch"],
                0.1,
            ),
            r(
                "mcv",
                "MCV",
                &["corpuscular volume", "mean cell volume"],
                &["mcv"],
                0.1,
            ),
            r(
                "hba1c",
                "HbA1c",
                &["hba1c", "hb a1c", "a1c", "glycated", "glycosylated"],
                &[],
                0.2,
            ),
            r(
                "hemoglobin",
                "Hemoglobin",
                &["hemoglobin", "haemoglobin"],
                &["hb", "hgb"],
                0.2,
            ),
            r(
                "hematocrit",
                "Hematocrit",
                &["hematocrit", "haematocrit", "packed cell volume"],
                &["hct", "pcv"],
                0.15,
            ),
            r("esr", "ESR", &["sedimentation"], &["esr"], 0.15),
            r(
                "wbc",
                "WBC Count",
                &["wbc", "w.b.c", "white blood", "leukocyte", "leucocyte"],
                &["tlc"],
                0.2,
            ),
            r(
                "rbc",
                "RBC Count",
                &["rbc", "r.b.c", "red blood", "erythrocyte"],
                &[],
                0.15,
            ),
            r(
                "mpv",
                "MPV",
                &["mean platelet volume"],
                &["mpv"],
                0.1,
            ),
            r(
                "pdw",
                "PDW",
                &["platelet distribution width"],
                &["pdw"],
                0.1,
            ),
            r(
                "platelets",
                "Platelet Count",
                &["platelet", "thrombocyte"],
                &["plt"],
                0.2,
            ),
            // Absolute counts before percentages: both name the same cell.
            r(
                "absolute_neutrophils",
                "Absolute Neutrophil Count",
                &["neutrophil", "polymorph"],
                &["anc"],
                0.15,
            )
            .qualified_by(ABSOLUTE),
            r(
                "absolute_lymphocytes",
                "Absolute Lymphocyte Count",
                &["lymphocyte"],
                &["alc"],
                0.15,
            )
            .qualified_by(ABSOLUTE),
            r(
                "absolute_eosinophils",
                "Absolute Eosinophil Count",
                &["eosinophil"],
                &["aec"],
                0.15,
            )
            .qualified_by(ABSOLUTE),
            r(
                "absolute_monocytes",
                "Absolute Monocyte Count",
                &["monocyte"],
                &["amc"],
                0.15,
            )
            .qualified_by(ABSOLUTE),
            r(
                "absolute_basophils",
                "Absolute Basophil Count",
                &["basophil"],
                &[],
                0.15,
            )
            .qualified_by(ABSOLUTE),
            r("neutrophils", "Neutrophils", &["neutrophil", "polymorph"], &[], 0.15),
            r("lymphocytes", "Lymphocytes", &["lymphocyte"], &[], 0.15),
            r("eosinophils", "Eosinophils", &["eosinophil"], &[], 0.15),
            r("monocytes", "Monocytes", &["monocyte"], &[], 0.15),
            r("basophils", "Basophils", &["basophil"], &[], 0.15),
            r("vldl", "VLDL Cholesterol", &["vldl"], &[], 0.1),
            r("hdl", "HDL Cholesterol", &["hdl"], &[], 0.15),
            r("ldl", "LDL Cholesterol", &["ldl"], &[], 0.15),
            r("cholesterol", "Cholesterol", &["cholesterol"], &[], 0.2),
            r("triglycerides", "Triglycerides", &["triglyceride"], &["tg"], 0.2),
            r(
                "bun",
                "BUN",
                &["blood urea nitrogen", "urea nitrogen"],
                &["bun"],
                0.1,
            ),
            r("urea", "Urea", &["urea"], &[], 0.15),
            r("creatinine", "Creatinine", &["creatinine"], &[], 0.2),
            r(
                "glucose",
                "Glucose",
                &["glucose", "sugar"],
                &["fbs", "rbs", "ppbs"],
                0.2,
            ),
            r("sodium", "Sodium", &["sodium"], &[], 0.15),
            r("potassium", "Potassium", &["potassium"], &[], 0.15),
        ])
    }

    /// First rule whose predicate matches the cleaned parameter text.
    pub fn resolve(&self, parameter: &str) -> Option<&ParameterRule> {
        self.rules.iter().find(|rule| rule.matches(parameter))
    }

    pub fn rules(&self) -> &[ParameterRule] {
        &self.rules
    }
}

/// Reference ranges by canonical key.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTable {
    ranges: HashMap<String, ReferenceRange>,
}

impl ReferenceTable {
    pub fn new(ranges: impl IntoIterator<Item = ReferenceRange>) -> Self {
        Self {
            ranges: ranges
                .into_iter()
                .map(|r| (r.parameter_key.clone(), r))
                .collect(),
        }
    }

    /// Adult ranges as printed on common Indian and US lab panels.
    pub fn standard() -> Self {
        let r = ReferenceRange::new;
        Self::new([
            r("hemoglobin", Some(13.0), Some(16.0), "g/dL"),
            r("hba1c", Some(4.0), Some(5.6), "%"),
            r("hematocrit", Some(40.0), Some(50.0), "%"),
            r("esr", None, Some(15.0), "mm/hr"),
            r("wbc", Some(4000.0), Some(10000.0), "/µL"),
            r("rbc", Some(4.5), Some(5.5), "million/µL"),
            r("platelets", Some(150_000.0), Some(410_000.0), "/µL"),
            r("mpv", Some(7.5), Some(11.5), "fL"),
            r("neutrophils", Some(40.0), Some(80.0), "%"),
            r("lymphocytes", Some(20.0), Some(40.0), "%"),
            r("eosinophils", Some(1.0), Some(6.0), "%"),
            r("monocytes", Some(2.0), Some(10.0), "%"),
            r("basophils", Some(0.0), Some(2.0), "%"),
            r("absolute_neutrophils", Some(2000.0), Some(7000.0), "/µL"),
            r("absolute_lymphocytes", Some(1000.0), Some(3000.0), "/µL"),
            r("absolute_eosinophils", Some(20.0), Some(500.0), "/µL"),
            r("absolute_monocytes", Some(200.0), Some(1000.0), "/µL"),
            r("absolute_basophils", Some(20.0), Some(100.0), "/µL"),
            r("mcv", Some(83.0), Some(101.0), "fL"),
            r("mch", Some(27.0), Some(32.0), "pg"),
            r("mchc", Some(31.5), Some(34.5), "g/dL"),
            r("glucose", Some(70.0), Some(100.0), "mg/dL"),
            r("cholesterol", None, Some(200.0), "mg/dL"),
            r("hdl", Some(40.0), None, "mg/dL"),
            r("ldl", None, Some(100.0), "mg/dL"),
            r("triglycerides", None, Some(150.0), "mg/dL"),
            r("creatinine", Some(0.7), Some(1.3), "mg/dL"),
            r("bun", Some(7.0), Some(20.0), "mg/dL"),
            r("urea", Some(15.0), Some(40.0), "mg/dL"),
            r("sodium", Some(135.0), Some(145.0), "mEq/L"),
            r("potassium", Some(3.5), Some(5.1), "mEq/L"),
        ])
    }

    pub fn get(&self, key: &str) -> Option<&ReferenceRange> {
        self.ranges.get(key)
    }
}

/// A normalized match after canonical resolution and classification.
#[derive(Debug, Clone)]
pub struct ResolvedMatch<'a> {
    pub display_name: String,
    /// Canonical key, `None` when no rule matched.
    pub key: Option<String>,
    pub recognition_bonus: f32,
    pub status: LabStatus,
    pub reference_range: Option<String>,
    /// Final unit: extracted if present, else backfilled from the reference table.
    pub unit: Option<String>,
    /// Whether `unit` came from the report rather than the reference table.
    pub unit_extracted: bool,
    pub normalized: NormalizedMatch<'a>,
}

/// Resolve a normalized match to a canonical parameter and classify its value.
pub fn resolve_match<'a>(
    normalized: NormalizedMatch<'a>,
    aliases: &ParameterAliasTable,
    references: &ReferenceTable,
) -> ResolvedMatch<'a> {
    let unit_extracted = normalized.unit.is_some();

    let Some(rule) = aliases.resolve(&normalized.parameter) else {
        return ResolvedMatch {
            display_name: title_case(&normalized.parameter),
            key: None,
            recognition_bonus: 0.0,
            status: LabStatus::Normal,
            reference_range: None,
            unit: normalized.unit.clone(),
            unit_extracted,
            normalized,
        };
    };

    let range = references.get(&rule.key);
    let status = range.map_or(LabStatus::Normal, |r| r.classify(normalized.value));
    let unit = match (&normalized.unit, range) {
        (Some(unit), _) => Some(unit.clone()),
        (None, Some(r)) if !r.unit.is_empty() => Some(r.unit.clone()),
        (None, _) => None,
    };

    ResolvedMatch {
        display_name: rule.display_name.clone(),
        key: Some(rule.key.clone()),
        recognition_bonus: rule.recognition_bonus,
        status,
        reference_range: range.and_then(ReferenceRange::display),
        unit,
        unit_extracted,
        normalized,
    }
}

/// Best-effort display name for unresolved parameters: `"serum iron"` → `"Serum Iron"`.
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
