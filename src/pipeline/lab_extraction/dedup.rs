//! Collapse duplicate detections of the same clinical parameter.
//!
//! A single report line is routinely caught by a specific pattern and one or
//! more generic ones. Only the most confident candidate per parameter survives.

use std::collections::{HashMap, HashSet};

use super::types::CandidateValue;

/// Lower-cased display name with every non-alphabetic character removed.
/// `"WBC Count"`, `"wbc-count"` and `"WBC  COUNT:"` all map to `"wbccount"`.
pub fn dedup_key(parameter_name: &str) -> String {
    parameter_name
        .chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Keep the most confident candidate per key; on a tie the first one seen wins.
/// Survivors stay in input order. Returns them and how many were discarded.
pub fn deduplicate(candidates: Vec<CandidateValue>) -> (Vec<CandidateValue>, usize) {
    let mut best: HashMap<String, usize> = HashMap::new();
    for (i, c) in candidates.iter().enumerate() {
        best.entry(dedup_key(&c.parameter_name))
            .and_modify(|kept| {
                if c.confidence > candidates[*kept].confidence {
                    *kept = i;
                }
            })
            .or_insert(i);
    }

    let before = candidates.len();
    let winners: HashSet<usize> = best.into_values().collect();
    let survivors: Vec<CandidateValue> = candidates
        .into_iter()
        .enumerate()
        .filter(|(i, _)| winners.contains(i))
        .map(|(_, c)| c)
        .collect();

    let removed = before - survivors.len();
    (survivors, removed)
}

/// Highest confidence first; ties keep their existing order.
pub fn sort_by_confidence(candidates: &mut [CandidateValue]) {
    candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
}
