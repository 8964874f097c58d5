//! End-to-end extraction over report-shaped text, through the public API only.

use chrono::NaiveDate;
use clinic_labs::{
    candidates_to_json, extract_lab_values, finalize_reviewed_values, CandidateValue,
    LabExtractionConfig, LabExtractor, LabStatus, ReviewedLabValue, ValueSource,
};
use uuid::Uuid;

const MIXED_REPORT: &str = "\
Sample Collected: 12/03/2026
HAEMATOLOGY
15.5 HAEMOGLOBIN (HB) gm/dL 13.0 - 16.0
8,570 TOTAL WBC COUNT (TC) /cumm 4000 - 10000
5.1 RBC COUNT millions/cumm 4.5 - 5.5
BIOCHEMISTRY
Fasting Blood Sugar: 142 mg/dL
Serum Creatinine: 0.9 mg/dL
HDL Cholesterol: 35 mg/dL
Potassium: 5.8 mEq/L
";

fn find<'a>(candidates: &'a [CandidateValue], name: &str) -> &'a CandidateValue {
    candidates
        .iter()
        .find(|c| c.parameter_name == name)
        .unwrap_or_else(|| panic!("{name} missing from {candidates:#?}"))
}

#[test]
fn mixed_layout_report() {
    let candidates = extract_lab_values(MIXED_REPORT);
    assert_eq!(candidates.len(), 7, "{candidates:#?}");

    let hb = find(&candidates, "Hemoglobin");
    assert_eq!((hb.value, hb.unit.as_deref(), hb.status), (15.5, Some("g/dL"), LabStatus::Normal));

    let wbc = find(&candidates, "WBC Count");
    assert_eq!((wbc.value, wbc.unit.as_deref()), (8570.0, Some("/µL")));

    let rbc = find(&candidates, "RBC Count");
    assert_eq!((rbc.value, rbc.unit.as_deref()), (5.1, Some("million/µL")));
    assert_eq!(rbc.reference_range.as_deref(), Some("4.5-5.5"));

    let glucose = find(&candidates, "Glucose");
    assert_eq!((glucose.value, glucose.status), (142.0, LabStatus::High));

    let creatinine = find(&candidates, "Creatinine");
    assert_eq!((creatinine.value, creatinine.status), (0.9, LabStatus::Normal));

    let hdl = find(&candidates, "HDL Cholesterol");
    assert_eq!((hdl.value, hdl.status), (35.0, LabStatus::Low));
    assert_eq!(hdl.reference_range.as_deref(), Some(">40"));

    let potassium = find(&candidates, "Potassium");
    assert_eq!((potassium.value, potassium.status), (5.8, LabStatus::High));
}

#[test]
fn sample_metadata_is_not_a_lab_value() {
    let candidates = extract_lab_values(MIXED_REPORT);
    assert!(candidates
        .iter()
        .all(|c| !c.parameter_name.to_lowercase().contains("sample")));
}

#[test]
fn cholesterol_inside_hdl_line_is_not_reported() {
    let candidates = extract_lab_values("HDL Cholesterol: 35 mg/dL");
    assert_eq!(candidates.len(), 1, "{candidates:#?}");
    assert_eq!(candidates[0].parameter_name, "HDL Cholesterol");
}

#[test]
fn windows_line_endings_and_pipes() {
    let text = "Glucose | 95 | mg/dL\r\nSodium: 139 mEq/L\r\n";
    let candidates = extract_lab_values(text);
    assert_eq!(find(&candidates, "Glucose").value, 95.0);
    assert_eq!(find(&candidates, "Sodium").status, LabStatus::Normal);
}

#[test]
fn confidences_descend_and_stay_in_bounds() {
    let candidates = extract_lab_values(MIXED_REPORT);
    for c in &candidates {
        assert!((0.0..=1.0).contains(&c.confidence), "{c:?}");
    }
    for pair in candidates.windows(2) {
        assert!(pair[0].confidence >= pair[1].confidence);
    }
}

#[test]
fn report_counts_add_up() {
    let report = LabExtractor::try_standard()
        .unwrap()
        .extract_with_report(MIXED_REPORT);
    assert!(!report.truncated);
    assert_eq!(
        report.raw_match_count,
        report.candidates.len() + report.rejected_count + report.duplicates_removed
    );
}

#[test]
fn oversized_repetitive_input_is_capped() {
    let text = "Glucose: 95 mg/dL\n".repeat(20_000);
    let extractor = LabExtractor::new(LabExtractionConfig::standard().unwrap());
    let report = extractor.extract_with_report(&text);
    assert!(report.truncated);
    assert_eq!(report.candidates.len(), 1);
    assert_eq!(report.candidates[0].parameter_name, "Glucose");
}

#[test]
fn json_hand_off_round_trips_into_review() {
    let json = candidates_to_json(&extract_lab_values(MIXED_REPORT)).unwrap();
    let reviewed: Vec<ReviewedLabValue> = serde_json::from_str(&json).unwrap();
    assert_eq!(reviewed.len(), 7);

    let document_id = Uuid::new_v4();
    let collected = NaiveDate::from_ymd_opt(2026, 3, 12).unwrap();
    let results = finalize_reviewed_values(&reviewed, document_id, collected).unwrap();

    assert_eq!(results.len(), 7);
    assert!(results.iter().all(|r| r.source == ValueSource::Extracted));
    assert!(results.iter().all(|r| r.document_id == document_id));

    let hdl = results.iter().find(|r| r.test_name == "HDL Cholesterol").unwrap();
    assert_eq!(hdl.reference_range_low, Some(40.0));
    assert_eq!(hdl.reference_range_high, None);
    assert_eq!(hdl.abnormal_flag, LabStatus::Low);
}

#[test]
fn reviewer_edits_and_additions() {
    let mut reviewed: Vec<ReviewedLabValue> = extract_lab_values("Glucose: 95 mg/dL")
        .iter()
        .map(Into::into)
        .collect();
    // Reviewer corrects a misread value and adds a result the extractor missed
    reviewed[0].value = 195.0;
    reviewed[0].status = None;
    reviewed.push(ReviewedLabValue {
        parameter_name: "TSH".into(),
        value: 2.1,
        unit: Some("mIU/L".into()),
        reference_range: Some("0.4-4.0".into()),
        status: None,
        confidence: None,
    });

    let results = finalize_reviewed_values(
        &reviewed,
        Uuid::new_v4(),
        NaiveDate::from_ymd_opt(2026, 3, 12).unwrap(),
    )
    .unwrap();

    assert_eq!(results[0].abnormal_flag, LabStatus::High);
    assert_eq!(results[1].source, ValueSource::Manual);
    assert_eq!(results[1].abnormal_flag, LabStatus::Normal);
}
