//! Parameter and unit cleanup, plus false-positive rejection.

use std::collections::HashMap;

use super::types::{NormalizedMatch, RawMatch};

/// Phrases that show up next to numbers on lab reports without being analytes
/// (reference range columns, sample metadata, demographic lines).
pub const STOP_PHRASES: &[&str] = &[
    "reference",
    "range",
    "sample",
    "years",
    "adult",
    "male",
    "female",
];

/// Raw unit spelling → canonical unit. Keys are compared after [`unit_key`] folding.
const UNIT_ALIASES: &[(&str, &str)] = &[
    ("g/dl", "g/dL"),
    ("gm/dl", "g/dL"),
    ("gms/dl", "g/dL"),
    ("gm%", "g/dL"),
    ("gms%", "g/dL"),
    ("mg/dl", "mg/dL"),
    ("mg/l", "mg/L"),
    ("ug/dl", "µg/dL"),
    ("ng/ml", "ng/mL"),
    ("pg/ml", "pg/mL"),
    ("mmol/l", "mmol/L"),
    ("meq/l", "mEq/L"),
    ("u/l", "U/L"),
    ("iu/l", "IU/L"),
    ("miu/l", "mIU/L"),
    ("uiu/ml", "µIU/mL"),
    ("/ul", "/µL"),
    ("/cumm", "/µL"),
    ("cumm", "/µL"),
    ("cells/cumm", "/µL"),
    ("/mm3", "/µL"),
    ("lakhs/cumm", "Lakhs/µL"),
    ("lakh/cumm", "Lakhs/µL"),
    ("million/cumm", "million/µL"),
    ("millions/cumm", "million/µL"),
    ("mill/cumm", "million/µL"),
    ("million/ul", "million/µL"),
    ("millions/ul", "million/µL"),
    ("mill/ul", "million/µL"),
    ("10^3/ul", "10^3/µL"),
    ("x10^3/ul", "10^3/µL"),
    ("103/ul", "10^3/µL"),
    ("10^6/ul", "10^6/µL"),
    ("x10^6/ul", "10^6/µL"),
    ("106/ul", "10^6/µL"),
    ("fl", "fL"),
    ("pg", "pg"),
    ("%", "%"),
    ("mm/hr", "mm/hr"),
    ("mm/1sthr", "mm/hr"),
];

/// Case-insensitive unit spelling table.
#[derive(Debug, Clone, Default)]
pub struct UnitAliasTable {
    aliases: HashMap<String, String>,
}

impl UnitAliasTable {
    pub fn new<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let aliases = entries
            .into_iter()
            .map(|(raw, canonical)| (unit_key(raw), canonical.to_string()))
            .collect();
        Self { aliases }
    }

    pub fn standard() -> Self {
        Self::new(UNIT_ALIASES.iter().copied())
    }

    /// Canonical spelling for `unit`, or the cleaned input when the spelling is unknown.
    pub fn standardize(&self, unit: &str) -> String {
        self.aliases
            .get(&unit_key(unit))
            .cloned()
            .unwrap_or_else(|| unit.to_string())
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

/// Fold a unit for lookup: lower-case, drop whitespace and dots, micro sign → `u`.
fn unit_key(unit: &str) -> String {
    unit.chars()
        .filter(|c| !c.is_whitespace() && *c != '.')
        .flat_map(char::to_lowercase)
        .map(|c| if matches!(c, 'µ' | 'μ') { 'u' } else { c })
        .collect()
}

/// Lower-case, drop parentheses, collapse whitespace and trim stray punctuation
/// from both ends (`"  HAEMOGLOBIN (HB) "` → `"haemoglobin hb"`).
pub fn clean_parameter_text(text: &str) -> String {
    let lowered = text.to_lowercase().replace(['(', ')'], " ");
    let collapsed = lowered.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_string()
}

/// Trim and strip parentheses from a unit token.
pub fn clean_unit_text(text: &str) -> String {
    text.replace(['(', ')'], "").trim().to_string()
}

/// True when the cleaned parameter text contains a stop phrase.
pub fn is_stop_phrase(parameter: &str, stop_phrases: &[String]) -> bool {
    stop_phrases.iter().any(|p| parameter.contains(p.as_str()))
}

/// Clean a raw match, or reject it as a false positive.
pub fn normalize_match<'a>(
    raw: RawMatch<'a>,
    units: &UnitAliasTable,
    stop_phrases: &[String],
    min_parameter_chars: usize,
) -> Option<NormalizedMatch<'a>> {
    let parameter = clean_parameter_text(raw.parameter_text);
    if parameter.chars().count() < min_parameter_chars {
        return None;
    }
    if is_stop_phrase(&parameter, stop_phrases) {
        return None;
    }

    let unit = clean_unit_text(raw.unit_text);
    let unit = (!unit.is_empty()).then(|| units.standardize(&unit));

    Some(NormalizedMatch {
        value: raw.numeric,
        parameter,
        unit,
        raw,
    })
}
