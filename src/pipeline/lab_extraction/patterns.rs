//! Regex catalog for lab report layouts.
//!
//! Every pattern carries an explicit [`GroupRoles`] map saying which capture
//! group holds the value, the parameter label and (optionally) the unit, so the
//! matcher never decodes groups by position.
//!
//! Two families:
//! - **Specific** patterns, two per known parameter: label-first
//!   (`Hemoglobin: 15.5 g/dL`) and value-first (`15.5 HAEMOGLOBIN (HB) gm/dL`,
//!   as printed by consolidated panel reports).
//! - **Generic** fallbacks for arbitrary `words + number (+unit)` and
//!   `number + words + unit` shapes.
//!
//! All patterns are confined to a single line (`[ \t]` instead of `\s`) and run
//! on the `regex` crate's linear-time engine.

use std::collections::HashSet;

use regex::Regex;

use super::LabExtractionError;

/// Which capture group carries which piece of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupRoles {
    pub value: usize,
    pub parameter: usize,
    pub unit: Option<usize>,
}

/// Layout family a pattern belongs to. Drives base confidence and overlap handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    /// `Label: value unit` for a known parameter.
    LabelFirst,
    /// `value LABEL (ABBR) unit` for a known parameter.
    ValueFirst,
    /// Catch-all shape, parameter not known in advance.
    Generic,
}

impl PatternKind {
    pub fn is_specific(&self) -> bool {
        !matches!(self, Self::Generic)
    }
}

/// A compiled pattern with its role map and scoring metadata.
#[derive(Debug, Clone)]
pub struct PatternDef {
    pub id: String,
    pub regex: Regex,
    pub roles: GroupRoles,
    pub kind: PatternKind,
    /// Starting confidence before unit/parameter recognition bonuses.
    pub base_confidence: f32,
}

impl PatternDef {
    /// Compile a pattern and check that its role map points at real groups.
    pub fn new(
        id: &str,
        regex_str: &str,
        roles: GroupRoles,
        kind: PatternKind,
        base_confidence: f32,
    ) -> Result<Self, LabExtractionError> {
        let regex = Regex::new(regex_str).map_err(|source| LabExtractionError::InvalidPattern {
            id: id.to_string(),
            source,
        })?;

        // captures_len() counts the implicit whole-match group 0
        let groups = regex.captures_len() - 1;
        for group in [Some(roles.value), Some(roles.parameter), roles.unit]
            .into_iter()
            .flatten()
        {
            if group == 0 || group > groups {
                return Err(LabExtractionError::InvalidRoleMap {
                    id: id.to_string(),
                    group,
                    groups,
                });
            }
        }

        Ok(Self {
            id: id.to_string(),
            regex,
            roles,
            kind,
            base_confidence: base_confidence.clamp(0.0, 1.0),
        })
    }
}

/// Ordered, immutable set of patterns. Order matters only as the tie-breaker
/// between equally confident candidates.
#[derive(Debug, Clone)]
pub struct PatternLibrary {
    patterns: Vec<PatternDef>,
}

impl PatternLibrary {
    pub fn new(patterns: Vec<PatternDef>) -> Result<Self, LabExtractionError> {
        let mut seen = HashSet::new();
        for p in &patterns {
            if !seen.insert(p.id.as_str()) {
                return Err(LabExtractionError::DuplicatePatternId(p.id.clone()));
            }
        }
        Ok(Self { patterns })
    }

    /// Specific patterns for every parameter in [`PARAMETER_LABELS`], then the generic fallbacks.
    pub fn standard() -> Result<Self, LabExtractionError> {
        let mut patterns = Vec::with_capacity(PARAMETER_LABELS.len() * 2 + 5);

        for (key, label) in PARAMETER_LABELS {
            patterns.push(PatternDef::new(
                &format!("{key}.label_first"),
                &label_first_regex(label),
                GroupRoles { value: 2, parameter: 1, unit: Some(3) },
                PatternKind::LabelFirst,
                LABEL_FIRST_CONFIDENCE,
            )?);
            patterns.push(PatternDef::new(
                &format!("{key}.value_first"),
                &value_first_regex(label),
                GroupRoles { value: 1, parameter: 2, unit: Some(3) },
                PatternKind::ValueFirst,
                VALUE_FIRST_CONFIDENCE,
            )?);
        }

        patterns.extend(generic_patterns()?);
        Self::new(patterns)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PatternDef> {
        self.patterns.iter()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&PatternDef> {
        self.patterns.iter().find(|p| p.id == id)
    }
}

const LABEL_FIRST_CONFIDENCE: f32 = 0.85;
const VALUE_FIRST_CONFIDENCE: f32 = 0.90;

/// Number with optional digit grouping and decimals: `8,570`, `1,50,000` (lakh
/// grouping), `15.5`, `150000`.
const NUM: &str = r"([0-9]{1,3}(?:,[0-9]{2,3})+(?:\.[0-9]+)?|[0-9]+(?:\.[0-9]+)?)";

/// Unit spellings seen on printed reports. Alphabetic ones must end on a word
/// boundary so `fl` does not fire on `flagged`.
const ALPHA_UNITS: &str = concat!(
    r"lakhs?[ \t]*/[ \t]*cu\.?[ \t]*mm",
    r"|mill(?:ions?)?[ \t]*/[ \t]*cu\.?[ \t]*mm",
    r"|mill(?:ions?)?[ \t]*/[ \t]*[uµ]l",
    r"|cells[ \t]*/[ \t]*cu\.?[ \t]*mm",
    r"|/[ \t]*cu\.?[ \t]*mm",
    r"|/[ \t]*[uµ]l",
    r"|/mm3",
    r"|x?[ \t]*10\^?[36][ \t]*/[ \t]*[uµ]l",
    r"|gms?[ \t]*/[ \t]*dl",
    r"|mg[ \t]*/[ \t]*dl|mg/l|[uµ]g/dl|ng/ml|pg/ml",
    r"|mmol/l|meq/l|[uµ]iu/ml|m?iu/l|u/l",
    r"|mm[ \t]*/[ \t]*(?:1st[ \t]*)?hr",
    r"|g/dl|fl|pg|cumm",
);

const SYMBOL_UNITS: &str = r"gms?[ \t]*%|%";

/// Parameter text for generic patterns: starts with a letter, stays on one line.
const WORDS: &str = r"[A-Za-z][A-Za-z \t().\-/]{1,40}?";
/// Like [`WORDS`] but without `/` and `.`, for layouts where a unit follows the words.
const WORDS_NO_UNIT_CHARS: &str = r"[A-Za-z][A-Za-z \t()\-]{1,40}?";

fn unit_group() -> String {
    format!(r"((?:{ALPHA_UNITS})\b|{SYMBOL_UNITS})")
}

/// `LABEL[:=-] value [unit]`, unit optional.
fn label_first_regex(label: &str) -> String {
    format!(
        r"(?i)\b({label})[ \t]*[:=\-]?[ \t]*{NUM}(?:[ \t]*{unit})?",
        unit = unit_group()
    )
}

/// `value LABEL [(ABBR)] unit`, unit required.
fn value_first_regex(label: &str) -> String {
    format!(
        r"(?i)\b{NUM}[ \t]+((?:{label})(?:[ \t]*\([^()\n]{{1,15}}\))?)[ \t]*{unit}",
        unit = unit_group()
    )
}

fn generic_patterns() -> Result<Vec<PatternDef>, LabExtractionError> {
    let unit = unit_group();
    Ok(vec![
        PatternDef::new(
            "generic.colon_value_unit",
            &format!(r"(?i)\b({WORDS})[ \t]*:[ \t]*{NUM}[ \t]*{unit}"),
            GroupRoles { value: 2, parameter: 1, unit: Some(3) },
            PatternKind::Generic,
            0.75,
        )?,
        PatternDef::new(
            "generic.panel_line",
            &format!(r"(?im)^[ \t]*{NUM}[ \t]+({WORDS_NO_UNIT_CHARS})[ \t]+{unit}"),
            GroupRoles { value: 1, parameter: 2, unit: Some(3) },
            PatternKind::Generic,
            0.75,
        )?,
        PatternDef::new(
            "generic.words_value_unit",
            &format!(r"(?i)\b({WORDS_NO_UNIT_CHARS})[ \t]+{NUM}[ \t]*{unit}"),
            GroupRoles { value: 2, parameter: 1, unit: Some(3) },
            PatternKind::Generic,
            0.65,
        )?,
        PatternDef::new(
            "generic.colon_value",
            &format!(r"(?i)\b({WORDS})[ \t]*[:=][ \t]*{NUM}"),
            GroupRoles { value: 2, parameter: 1, unit: None },
            PatternKind::Generic,
            0.55,
        )?,
        PatternDef::new(
            "generic.value_words_unit",
            &format!(r"(?i)\b{NUM}[ \t]+({WORDS_NO_UNIT_CHARS})[ \t]+{unit}"),
            GroupRoles { value: 1, parameter: 2, unit: Some(3) },
            PatternKind::Generic,
            0.50,
        )?,
    ])
}

/// Label alternations per canonical parameter key, matched case-insensitively.
pub const PARAMETER_LABELS: &[(&str, &str)] = &[
    ("hemoglobin", r"h(?:a)?emoglobin|hgb|hb"),
    (
        "hba1c",
        r"hb[ \t]*a1c|glycated[ \t]+h(?:a)?emoglobin|glycosylated[ \t]+h(?:a)?emoglobin|a1c",
    ),
    (
        "wbc",
        r"(?:total[ \t]+)?(?:wbc|w\.b\.c\.?|white[ \t]+blood[ \t]+cells?|leu[kc]ocytes?|tlc)(?:[ \t]+count)?",
    ),
    (
        "rbc",
        r"(?:total[ \t]+)?(?:rbc|r\.b\.c\.?|red[ \t]+blood[ \t]+cells?|erythrocytes?)(?:[ \t]+count)?",
    ),
    ("mpv", r"mpv|mean[ \t]+platelet[ \t]+volume"),
    ("pdw", r"pdw|platelet[ \t]+distribution[ \t]+width"),
    ("platelets", r"(?:platelets?|plt|thrombocytes?)(?:[ \t]+count)?"),
    (
        "hematocrit",
        r"h(?:a)?ematocrit|hct|pcv|packed[ \t]+cell[ \t]+volume",
    ),
    ("esr", r"esr|erythrocyte[ \t]+sedimentation[ \t]+rate"),
    // Differentials take an optional "absolute" prefix so the absolute count
    // line is read as one label instead of its bare cell-name tail.
    (
        "neutrophils",
        r"(?:abs(?:olute|\.)?[ \t]+)?(?:neutrophils?|polymorphs?)(?:[ \t]+count)?",
    ),
    (
        "lymphocytes",
        r"(?:abs(?:olute|\.)?[ \t]+)?lymphocytes?(?:[ \t]+count)?",
    ),
    (
        "eosinophils",
        r"(?:abs(?:olute|\.)?[ \t]+)?eosinophils?(?:[ \t]+count)?",
    ),
    ("monocytes", r"(?:abs(?:olute|\.)?[ \t]+)?monocytes?(?:[ \t]+count)?"),
    ("basophils", r"(?:abs(?:olute|\.)?[ \t]+)?basophils?(?:[ \t]+count)?"),
    ("mcv", r"mcv|mean[ \t]+corpuscular[ \t]+volume|mean[ \t]+cell[ \t]+volume"),
    (
        "mch",
        r"mch|mean[ \t]+corpuscular[ \t]+h(?:a)?emoglobin|mean[ \t]+cell[ \t]+h(?:a)?emoglobin",
    ),
    (
        "mchc",
        r"mchc|mean[ \t]+(?:corpuscular|cell)[ \t]+h(?:a)?emoglobin[ \t]+concentration",
    ),
    (
        "glucose",
        r"(?:(?:fasting|random|post[ \t]*prandial)[ \t]+)?(?:blood[ \t]+)?(?:glucose|sugar)|fbs|rbs|ppbs",
    ),
    ("cholesterol", r"(?:total[ \t]+)?cholesterol"),
    ("hdl", r"hdl(?:[ \t\-]+c(?:holesterol)?)?"),
    ("ldl", r"ldl(?:[ \t\-]+c(?:holesterol)?)?"),
    ("triglycerides", r"triglycerides?|tg"),
    ("creatinine", r"(?:serum[ \t]+)?creatinine"),
    ("bun", r"bun|blood[ \t]+urea[ \t]+nitrogen"),
    ("urea", r"(?:blood[ \t]+|serum[ \t]+)?urea"),
    ("sodium", r"(?:serum[ \t]+)?sodium"),
    ("potassium", r"(?:serum[ \t]+)?potassium"),
];
