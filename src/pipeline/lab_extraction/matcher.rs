//! Runs every pattern over the report text and slices out raw matches.

use super::patterns::PatternLibrary;
use super::types::RawMatch;

/// Apply every pattern in the library to `text`, collecting raw matches.
///
/// Each pattern does its own non-overlapping scan, so the same line may be
/// reported by several patterns. Matches whose value is not a finite number or
/// whose parameter text is shorter than `min_parameter_chars` are dropped here.
pub fn find_raw_matches<'a>(
    text: &'a str,
    library: &'a PatternLibrary,
    min_parameter_chars: usize,
) -> Vec<RawMatch<'a>> {
    let mut matches = Vec::new();

    for pattern in library.iter() {
        let roles = pattern.roles;
        for caps in pattern.regex.captures_iter(text) {
            let (Some(whole), Some(value), Some(parameter)) =
                (caps.get(0), caps.get(roles.value), caps.get(roles.parameter))
            else {
                continue;
            };

            let Some(numeric) = parse_numeric(value.as_str()) else {
                continue;
            };

            let parameter_text = parameter.as_str().trim();
            if parameter_text.chars().count() < min_parameter_chars {
                continue;
            }

            let unit_text = roles
                .unit
                .and_then(|i| caps.get(i))
                .map_or("", |m| m.as_str());

            matches.push(RawMatch {
                value: value.as_str(),
                numeric,
                parameter_text,
                unit_text,
                full_match: whole.as_str(),
                start: whole.start(),
                end: whole.end(),
                pattern,
            });
        }
    }

    matches
}

/// Parse a printed number, tolerating thousands separators (`8,570`).
/// Returns `None` for anything that is not a finite float.
pub fn parse_numeric(token: &str) -> Option<f64> {
    let cleaned: String = token.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Drop matches that sit strictly inside the span of a parameter-specific match.
///
/// `Mean Corpuscular Hemoglobin: 29 pg` is a specific MCH hit; the hemoglobin
/// pattern also fires on its `Hemoglobin: 29 pg` tail. The inner hit reads the
/// same digits under the wrong label and is discarded. Equal spans are kept
/// and left to deduplication. Returns the surviving matches and the number dropped.
pub fn suppress_shadowed(matches: Vec<RawMatch<'_>>) -> (Vec<RawMatch<'_>>, usize) {
    let mut spans: Vec<(usize, usize)> = matches
        .iter()
        .filter(|m| m.pattern.kind.is_specific())
        .map(|m| (m.start, m.end))
        .collect();
    if spans.is_empty() {
        return (matches, 0);
    }
    spans.sort_unstable();

    // prefix_max_end[i] = furthest end among spans[..i]
    let mut prefix_max_end = Vec::with_capacity(spans.len() + 1);
    prefix_max_end.push(0usize);
    for &(_, end) in &spans {
        let last = prefix_max_end.last().copied().unwrap_or(0);
        prefix_max_end.push(last.max(end));
    }

    let is_shadowed = |m: &RawMatch<'_>| {
        let lo = spans.partition_point(|&(start, _)| start < m.start);
        let hi = spans.partition_point(|&(start, _)| start <= m.start);
        // Starts strictly earlier and reaches at least as far
        if lo > 0 && prefix_max_end[lo] >= m.end {
            return true;
        }
        // Starts at the same place and reaches further
        spans[lo..hi].iter().any(|&(_, end)| end > m.end)
    };

    let before = matches.len();
    let kept: Vec<RawMatch<'_>> = matches.into_iter().filter(|m| !is_shadowed(m)).collect();
    let dropped = before - kept.len();
    (kept, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::lab_extraction::patterns::{GroupRoles, PatternDef, PatternKind};

    fn standard() -> PatternLibrary {
        PatternLibrary::standard().unwrap()
    }

    fn fixture_library() -> PatternLibrary {
        PatternLibrary::new(vec![PatternDef::new(
            "fixture.unit_value_label",
            r"(mg/dL) ([0-9.,]+) ([A-Za-z]+)",
            GroupRoles { value: 2, parameter: 3, unit: Some(1) },
            PatternKind::LabelFirst,
            0.9,
        )
        .unwrap()])
        .unwrap()
    }

    #[test]
    fn parse_numeric_handles_separators() {
        assert_eq!(parse_numeric("8,570"), Some(8570.0));
        assert_eq!(parse_numeric("1,50,000"), Some(150_000.0));
        assert_eq!(parse_numeric("15.5"), Some(15.5));
        assert_eq!(parse_numeric(" 95 "), Some(95.0));
    }

    #[test]
    fn parse_numeric_rejects_garbage() {
        assert_eq!(parse_numeric(""), None);
        assert_eq!(parse_numeric(","), None);
        assert_eq!(parse_numeric("1.2.3"), None);
        assert_eq!(parse_numeric("abc"), None);
        assert_eq!(parse_numeric(&"9".repeat(400)), None);
        assert_eq!(parse_numeric("NaN"), None);
        assert_eq!(parse_numeric("inf"), None);
    }

    #[test]
    fn role_map_drives_group_extraction() {
        let lib = fixture_library();
        let matches = find_raw_matches("mg/dL 95 Glucose", &lib, 2);
        assert_eq!(matches.len(), 1);
        let m = &matches[0];
        assert_eq!(m.value, "95");
        assert_eq!(m.numeric, 95.0);
        assert_eq!(m.parameter_text, "Glucose");
        assert_eq!(m.unit_text, "mg/dL");
        assert_eq!(m.full_match, "mg/dL 95 Glucose");
        assert_eq!((m.start, m.end), (0, 16));
    }

    #[test]
    fn unparsable_value_dropped() {
        let lib = fixture_library();
        assert!(find_raw_matches("mg/dL 9.5.1 Glucose", &lib, 2).is_empty());
    }

    #[test]
    fn short_parameter_dropped() {
        let lib = fixture_library();
        assert!(find_raw_matches("mg/dL 95 G", &lib, 2).is_empty());
    }

    #[test]
    fn every_pattern_scans_full_text() {
        let lib = standard();
        let text = "Glucose: 95 mg/dL\nCreatinine: 1.1 mg/dL";
        let matches = find_raw_matches(text, &lib, 2);
        let ids: Vec<&str> = matches.iter().map(|m| m.pattern.id.as_str()).collect();
        assert!(ids.contains(&"glucose.label_first"));
        assert!(ids.contains(&"creatinine.label_first"));
        assert!(ids.contains(&"generic.colon_value_unit"));
    }

    #[test]
    fn comma_value_parsed_from_panel_line() {
        let lib = standard();
        let matches = find_raw_matches("8,570 TOTAL WBC COUNT (TC) /cumm", &lib, 2);
        let wbc = matches
            .iter()
            .find(|m| m.pattern.id == "wbc.value_first")
            .expect("wbc value-first match");
        assert_eq!(wbc.numeric, 8570.0);
    }

    #[test]
    fn empty_text_yields_nothing() {
        assert!(find_raw_matches("", &standard(), 2).is_empty());
    }

    #[test]
    fn inner_hemoglobin_hit_shadowed_by_mch() {
        let lib = standard();
        let text = "Mean Corpuscular Hemoglobin: 29 pg";
        let matches = find_raw_matches(text, &lib, 2);
        assert!(matches.iter().any(|m| m.pattern.id == "hemoglobin.label_first"));

        let (kept, dropped) = suppress_shadowed(matches);
        assert!(dropped >= 1);
        assert!(kept.iter().all(|m| m.pattern.id != "hemoglobin.label_first"));
        assert!(kept.iter().any(|m| m.pattern.id == "mch.label_first"));
    }

    #[test]
    fn equal_spans_are_not_shadowed() {
        let lib = standard();
        let matches = find_raw_matches("15.5 HAEMOGLOBIN (HB) gm/dL", &lib, 2);
        let (kept, _) = suppress_shadowed(matches);
        assert!(kept.iter().any(|m| m.pattern.id == "hemoglobin.value_first"));
        assert!(kept.iter().any(|m| m.pattern.id == "generic.panel_line"));
    }

    #[test]
    fn generic_container_does_not_shadow_specific() {
        let lib = standard();
        let matches = find_raw_matches("CBC Report Hemoglobin 15.5 g/dL", &lib, 2);
        let (kept, _) = suppress_shadowed(matches);
        assert!(kept.iter().any(|m| m.pattern.id == "hemoglobin.label_first"));
    }
}
