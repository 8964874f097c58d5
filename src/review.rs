//! Review finalization: turns the reviewer's edited candidate list into
//! [`LabResult`] records for the save collaborator.
//!
//! The reviewer may drop candidates, edit any field, or add values by hand.
//! Everything that comes back is re-validated here: extraction output is
//! advisory and never saved without passing through this step.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{LabResult, LabStatus, ValueSource};
use crate::pipeline::lab_extraction::{dedup_key, CandidateValue, ReferenceRange};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReviewError {
    #[error("Lab value #{index} has an empty parameter name")]
    EmptyParameterName { index: usize },

    #[error("Lab value '{parameter}' is not a finite number")]
    NonFiniteValue { parameter: String },

    #[error("Lab value '{parameter}' appears more than once")]
    DuplicateParameter { parameter: String },

    #[error("Lab value '{parameter}' has confidence {confidence} outside [0, 1]")]
    ConfidenceOutOfRange { parameter: String, confidence: f32 },

    #[error("Lab value '{parameter}' has unreadable reference range '{range}'")]
    InvalidReferenceRange { parameter: String, range: String },
}

/// A candidate as returned by the review surface. Hand-added values usually
/// carry no confidence and no status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewedLabValue {
    pub parameter_name: String,
    pub value: f64,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub reference_range: Option<String>,
    #[serde(default)]
    pub status: Option<LabStatus>,
    #[serde(default)]
    pub confidence: Option<f32>,
}

impl From<&CandidateValue> for ReviewedLabValue {
    fn from(c: &CandidateValue) -> Self {
        Self {
            parameter_name: c.parameter_name.clone(),
            value: c.value,
            unit: c.unit.clone(),
            reference_range: c.reference_range.clone(),
            status: Some(c.status),
            confidence: Some(c.confidence),
        }
    }
}

/// Validate reviewed values and build the records to persist.
///
/// All-or-nothing: the first invalid entry rejects the whole set, so the
/// reviewer fixes it before anything is saved.
pub fn finalize_reviewed_values(
    values: &[ReviewedLabValue],
    document_id: Uuid,
    collection_date: NaiveDate,
) -> Result<Vec<LabResult>, ReviewError> {
    let mut seen = HashSet::new();
    let mut results = Vec::with_capacity(values.len());

    for (index, v) in values.iter().enumerate() {
        let name = v.parameter_name.trim();
        if name.is_empty() || dedup_key(name).is_empty() {
            return Err(ReviewError::EmptyParameterName { index });
        }
        if !v.value.is_finite() {
            return Err(ReviewError::NonFiniteValue {
                parameter: name.to_string(),
            });
        }
        if !seen.insert(dedup_key(name)) {
            return Err(ReviewError::DuplicateParameter {
                parameter: name.to_string(),
            });
        }
        if let Some(confidence) = v.confidence {
            if !(0.0..=1.0).contains(&confidence) {
                return Err(ReviewError::ConfidenceOutOfRange {
                    parameter: name.to_string(),
                    confidence,
                });
            }
        }

        let (low, high) = match v.reference_range.as_deref().map(str::trim) {
            None | Some("") => (None, None),
            Some(range) => ReferenceRange::parse_display(range).ok_or_else(|| {
                ReviewError::InvalidReferenceRange {
                    parameter: name.to_string(),
                    range: range.to_string(),
                }
            })?,
        };

        let abnormal_flag = v.status.unwrap_or_else(|| {
            ReferenceRange {
                parameter_key: String::new(),
                min: low,
                max: high,
                unit: String::new(),
            }
            .classify(v.value)
        });

        let unit = v
            .unit
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string);

        results.push(LabResult {
            id: Uuid::new_v4(),
            test_name: name.to_string(),
            value: v.value,
            unit,
            reference_range_low: low,
            reference_range_high: high,
            abnormal_flag,
            source: if v.confidence.is_some() {
                ValueSource::Extracted
            } else {
                ValueSource::Manual
            },
            confidence: v.confidence,
            collection_date,
            document_id,
        });
    }

    tracing::info!(
        document_id = %document_id,
        count = results.len(),
        "Reviewed lab values finalized"
    );

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::lab_extraction::extract_lab_values;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
    }

    fn make_value(name: &str, value: f64) -> ReviewedLabValue {
        ReviewedLabValue {
            parameter_name: name.to_string(),
            value,
            unit: None,
            reference_range: None,
            status: None,
            confidence: None,
        }
    }

    #[test]
    fn extracted_candidates_finalize() {
        let candidates = extract_lab_values("Glucose: 95 mg/dL\nHemoglobin: 10.2 g/dL");
        let reviewed: Vec<ReviewedLabValue> = candidates.iter().map(Into::into).collect();
        let doc = Uuid::new_v4();

        let results = finalize_reviewed_values(&reviewed, doc, date()).unwrap();
        assert_eq!(results.len(), candidates.len());

        let hb = results.iter().find(|r| r.test_name == "Hemoglobin").unwrap();
        assert_eq!(hb.abnormal_flag, LabStatus::Low);
        assert_eq!(hb.reference_range_low, Some(13.0));
        assert_eq!(hb.reference_range_high, Some(16.0));
        assert_eq!(hb.source, ValueSource::Extracted);
        assert_eq!(hb.document_id, doc);
        assert_eq!(hb.collection_date, date());
    }

    #[test]
    fn hand_added_value_is_manual_and_classified() {
        let mut v = make_value("Vitamin D", 12.0);
        v.unit = Some(" ng/mL ".into());
        v.reference_range = Some("30-100".into());

        let results = finalize_reviewed_values(&[v], Uuid::new_v4(), date()).unwrap();
        let r = &results[0];
        assert_eq!(r.source, ValueSource::Manual);
        assert_eq!(r.confidence, None);
        assert_eq!(r.abnormal_flag, LabStatus::Low);
        assert_eq!(r.unit.as_deref(), Some("ng/mL"));
    }

    #[test]
    fn reviewer_status_is_kept() {
        let mut v = make_value("Glucose", 95.0);
        v.reference_range = Some("70-100".into());
        v.status = Some(LabStatus::High);
        let results = finalize_reviewed_values(&[v], Uuid::new_v4(), date()).unwrap();
        assert_eq!(results[0].abnormal_flag, LabStatus::High);
    }

    #[test]
    fn no_range_defaults_to_normal() {
        let results =
            finalize_reviewed_values(&[make_value("Serum Iron", 5.0)], Uuid::new_v4(), date())
                .unwrap();
        assert_eq!(results[0].abnormal_flag, LabStatus::Normal);
        assert_eq!(results[0].reference_range_low, None);
    }

    #[test]
    fn empty_name_rejected() {
        let err = finalize_reviewed_values(
            &[make_value("Glucose", 1.0), make_value("  ", 2.0)],
            Uuid::new_v4(),
            date(),
        )
        .unwrap_err();
        assert_eq!(err, ReviewError::EmptyParameterName { index: 1 });
    }

    #[test]
    fn non_finite_value_rejected() {
        let err = finalize_reviewed_values(&[make_value("Glucose", f64::NAN)], Uuid::new_v4(), date())
            .unwrap_err();
        assert!(matches!(err, ReviewError::NonFiniteValue { .. }));
    }

    #[test]
    fn duplicate_parameter_rejected() {
        let err = finalize_reviewed_values(
            &[make_value("WBC Count", 8000.0), make_value("wbc-count", 8100.0)],
            Uuid::new_v4(),
            date(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ReviewError::DuplicateParameter {
                parameter: "wbc-count".into()
            }
        );
    }

    #[test]
    fn confidence_out_of_range_rejected() {
        let mut v = make_value("Glucose", 95.0);
        v.confidence = Some(1.5);
        let err = finalize_reviewed_values(&[v], Uuid::new_v4(), date()).unwrap_err();
        assert!(matches!(err, ReviewError::ConfidenceOutOfRange { .. }));
    }

    #[test]
    fn bad_reference_range_rejected() {
        let mut v = make_value("Glucose", 95.0);
        v.reference_range = Some("normal".into());
        let err = finalize_reviewed_values(&[v], Uuid::new_v4(), date()).unwrap_err();
        assert!(matches!(err, ReviewError::InvalidReferenceRange { .. }));
    }

    #[test]
    fn deserializes_partial_hand_added_json() {
        let v: ReviewedLabValue =
            serde_json::from_str(r#"{"parameter_name": "TSH", "value": 2.1}"#).unwrap();
        assert_eq!(v.unit, None);
        assert_eq!(v.status, None);
        assert_eq!(v.confidence, None);
    }

    #[test]
    fn ids_are_unique() {
        let results = finalize_reviewed_values(
            &[make_value("Glucose", 95.0), make_value("Creatinine", 1.0)],
            Uuid::new_v4(),
            date(),
        )
        .unwrap();
        assert_ne!(results[0].id, results[1].id);
    }
}
