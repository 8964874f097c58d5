use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{LabStatus, ValueSource};

/// A reviewed lab value, ready to be handed to the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabResult {
    pub id: Uuid,
    pub test_name: String,
    pub value: f64,
    pub unit: Option<String>,
    pub reference_range_low: Option<f64>,
    pub reference_range_high: Option<f64>,
    pub abnormal_flag: LabStatus,
    pub source: ValueSource,
    pub confidence: Option<f32>,
    pub collection_date: NaiveDate,
    pub document_id: Uuid,
}
