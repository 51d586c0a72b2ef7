use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::PrescriptionStatus;

/// An uploaded prescription and, once processed, the medicine names
/// extracted from it.
#[derive(Debug, Clone, Serialize)]
pub struct Prescription {
    pub id: i64,
    pub patient_name: String,
    pub notes: Option<String>,
    pub file_name: String,
    pub status: PrescriptionStatus,
    pub extracted_medicines: Option<Vec<String>>,
    pub uploaded_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPrescription {
    pub patient_name: String,
    pub notes: Option<String>,
    pub file_name: String,
}
