//! Prescription lifecycle and the bridge from extracted names to search.
//!
//! Text extraction itself lives behind [`MedicineNameExtractor`]; this
//! module only drives the status machine
//! (`pending -> processing -> completed | failed`) and forwards the first
//! extracted name to the stock search.

use chrono::Utc;
use rusqlite::Connection;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::db::repository::{self, list_active_medicines};
use crate::db::DatabaseError;
use crate::error::StockError;
use crate::models::enums::PrescriptionStatus;
use crate::models::{NewPrescription, Prescription};
use crate::search::{search_stock_result, SearchConfig, StockSearchRequest, StockSearchResult};

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("No text available for prescription {0}")]
    NoText(i64),

    #[error("Extraction failed: {0}")]
    Failed(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Turns an uploaded prescription into a list of medicine names.
pub trait MedicineNameExtractor {
    fn extract_names(
        &self,
        conn: &Connection,
        prescription: &Prescription,
    ) -> Result<Vec<String>, ExtractionError>;
}

/// Finds catalogue medicine names in transcribed prescription text.
///
/// Uses the supplied text, or the prescription's notes when none is given.
/// Matching ignores ASCII case; names come back in catalogue spelling,
/// ordered by where they first appear in the text.
#[derive(Debug, Clone, Default)]
pub struct KeywordNameExtractor {
    text: Option<String>,
}

impl KeywordNameExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

impl MedicineNameExtractor for KeywordNameExtractor {
    fn extract_names(
        &self,
        conn: &Connection,
        prescription: &Prescription,
    ) -> Result<Vec<String>, ExtractionError> {
        let text = self
            .text
            .as_deref()
            .or(prescription.notes.as_deref())
            .filter(|t| !t.trim().is_empty())
            .ok_or(ExtractionError::NoText(prescription.id))?
            .to_ascii_lowercase();

        let mut found: Vec<(usize, String)> = Vec::new();
        for medicine in list_active_medicines(conn)? {
            let position = std::iter::once(medicine.name.as_str())
                .chain(medicine.generic_name.as_deref())
                .filter_map(|name| text.find(&name.to_ascii_lowercase()))
                .min();
            if let Some(position) = position {
                if !found.iter().any(|(_, name)| *name == medicine.name) {
                    found.push((position, medicine.name));
                }
            }
        }

        found.sort_by_key(|(position, _)| *position);
        Ok(found.into_iter().map(|(_, name)| name).collect())
    }
}

// ═══════════════════════════════════════════
// Lifecycle
// ═══════════════════════════════════════════

pub fn register_prescription(
    conn: &Connection,
    new: &NewPrescription,
) -> Result<Prescription, StockError> {
    if new.patient_name.trim().is_empty() {
        return Err(StockError::validation("Patient name must not be empty"));
    }
    if new.file_name.trim().is_empty() {
        return Err(StockError::validation("File name must not be empty"));
    }

    let rx = repository::insert_prescription(conn, new, Utc::now())?;
    tracing::info!(prescription_id = rx.id, "Prescription registered");
    Ok(rx)
}

pub fn get_prescription(conn: &Connection, id: i64) -> Result<Prescription, StockError> {
    repository::get_prescription(conn, id)?
        .ok_or_else(|| DatabaseError::not_found("prescription", id).into())
}

/// Run extraction for a pending prescription.
///
/// Returns `true` when it completed, `false` when the extractor failed and
/// the prescription was marked failed. The claim and the final status write
/// share one transaction, so an error leaves the prescription pending.
pub fn process_prescription(
    conn: &Connection,
    id: i64,
    extractor: &dyn MedicineNameExtractor,
) -> Result<bool, StockError> {
    let rx = get_prescription(conn, id)?;

    let tx = conn.unchecked_transaction()?;
    let claimed = repository::transition_prescription_status(
        &tx,
        id,
        PrescriptionStatus::Pending,
        PrescriptionStatus::Processing,
    )?;
    if claimed == 0 {
        return Err(StockError::validation(format!(
            "Prescription {id} is {}, only pending prescriptions can be processed",
            rx.status.as_str()
        )));
    }

    let completed = match extractor.extract_names(&tx, &rx) {
        Ok(names) => {
            repository::complete_prescription(&tx, id, &names, Utc::now())?;
            tracing::info!(prescription_id = id, names = names.len(), "Prescription processed");
            true
        }
        Err(e) => {
            tracing::warn!(prescription_id = id, error = %e, "Prescription extraction failed");
            repository::fail_prescription(&tx, id, Utc::now())?;
            false
        }
    };

    tx.commit()?;
    Ok(completed)
}

// ═══════════════════════════════════════════
// Search bridge
// ═══════════════════════════════════════════

pub fn search_from_extracted_names(
    conn: &Connection,
    prescription_id: i64,
    origin_lat: Option<Decimal>,
    origin_lng: Option<Decimal>,
) -> Result<StockSearchResult, StockError> {
    search_from_extracted_names_with(
        conn,
        prescription_id,
        origin_lat,
        origin_lng,
        &SearchConfig::default(),
    )
}

/// Searches for the first extracted name only, at the default radius.
pub fn search_from_extracted_names_with(
    conn: &Connection,
    prescription_id: i64,
    origin_lat: Option<Decimal>,
    origin_lng: Option<Decimal>,
    config: &SearchConfig,
) -> Result<StockSearchResult, StockError> {
    let rx = get_prescription(conn, prescription_id)?;

    if rx.status != PrescriptionStatus::Completed {
        return Err(StockError::validation(format!(
            "Prescription {prescription_id} has not been processed"
        )));
    }
    let first = rx
        .extracted_medicines
        .as_deref()
        .and_then(|names| names.first())
        .ok_or_else(|| {
            StockError::validation(format!(
                "No medicines were extracted from prescription {prescription_id}"
            ))
        })?;

    let mut request = StockSearchRequest::new(first.as_str());
    request.origin_lat = origin_lat;
    request.origin_lng = origin_lng;

    search_stock_result(conn, &request, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;
    use crate::db::repository::fixtures::*;

    struct FixedExtractor(Vec<&'static str>);

    impl MedicineNameExtractor for FixedExtractor {
        fn extract_names(
            &self,
            _conn: &Connection,
            _prescription: &Prescription,
        ) -> Result<Vec<String>, ExtractionError> {
            Ok(self.0.iter().map(|s| s.to_string()).collect())
        }
    }

    struct FailingExtractor;

    impl MedicineNameExtractor for FailingExtractor {
        fn extract_names(
            &self,
            _conn: &Connection,
            _prescription: &Prescription,
        ) -> Result<Vec<String>, ExtractionError> {
            Err(ExtractionError::Failed("unreadable scan".into()))
        }
    }

    fn dec(v: f64) -> Decimal {
        Decimal::try_from(v).unwrap()
    }

    #[test]
    fn register_starts_pending_and_validates() {
        let conn = open_memory_database().unwrap();
        let rx = register_prescription(
            &conn,
            &NewPrescription {
                patient_name: "Ada".into(),
                notes: Some("take twice daily".into()),
                file_name: "ada.png".into(),
            },
        )
        .unwrap();
        assert_eq!(rx.status, PrescriptionStatus::Pending);

        let err = register_prescription(
            &conn,
            &NewPrescription {
                patient_name: " ".into(),
                notes: None,
                file_name: "x.png".into(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, StockError::Validation(_)));
    }

    #[test]
    fn processing_completes_with_names() {
        let conn = open_memory_database().unwrap();
        let rx = make_prescription(&conn, "Ada");

        assert!(process_prescription(&conn, rx.id, &FixedExtractor(vec!["Aspirin"])).unwrap());
        let stored = get_prescription(&conn, rx.id).unwrap();
        assert_eq!(stored.status, PrescriptionStatus::Completed);
        assert_eq!(stored.extracted_medicines, Some(vec!["Aspirin".to_string()]));
    }

    #[test]
    fn extractor_failure_marks_failed() {
        let conn = open_memory_database().unwrap();
        let rx = make_prescription(&conn, "Ada");

        assert!(!process_prescription(&conn, rx.id, &FailingExtractor).unwrap());
        let stored = get_prescription(&conn, rx.id).unwrap();
        assert_eq!(stored.status, PrescriptionStatus::Failed);
        assert!(stored.processed_at.is_some());
    }

    #[test]
    fn only_pending_prescriptions_are_processed() {
        let conn = open_memory_database().unwrap();
        let rx = make_prescription(&conn, "Ada");
        process_prescription(&conn, rx.id, &FixedExtractor(vec!["Aspirin"])).unwrap();

        let err = process_prescription(&conn, rx.id, &FixedExtractor(vec![])).unwrap_err();
        assert!(matches!(err, StockError::Validation(_)));
        assert!(process_prescription(&conn, 404, &FailingExtractor)
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn failed_status_write_leaves_prescription_pending() {
        let conn = open_memory_database().unwrap();
        let rx = make_prescription(&conn, "Ada");
        conn.execute_batch(
            "CREATE TRIGGER reject_names BEFORE UPDATE OF extracted_medicines ON prescriptions
             BEGIN SELECT RAISE(ABORT, 'write rejected'); END;",
        )
        .unwrap();

        let extractor = FixedExtractor(vec!["Aspirin"]);
        let err = process_prescription(&conn, rx.id, &extractor).unwrap_err();
        assert!(matches!(err, StockError::Database(_)));
        let stored = get_prescription(&conn, rx.id).unwrap();
        assert_eq!(stored.status, PrescriptionStatus::Pending);
        assert!(stored.processed_at.is_none());

        conn.execute_batch("DROP TRIGGER reject_names;").unwrap();
        assert!(process_prescription(&conn, rx.id, &extractor).unwrap());
        assert_eq!(
            get_prescription(&conn, rx.id).unwrap().status,
            PrescriptionStatus::Completed
        );
    }

    #[test]
    fn keyword_extractor_finds_catalogue_names_in_text_order() {
        let conn = open_memory_database().unwrap();
        make_medicine(&conn, "Amoxicillin", None);
        make_medicine(&conn, "Panadol", Some("Paracetamol"));
        make_medicine(&conn, "Warfarin", None);
        let rx = make_prescription(&conn, "Ada");

        let extractor =
            KeywordNameExtractor::with_text("PARACETAMOL 500mg tds; amoxicillin 250mg bd");
        let names = extractor.extract_names(&conn, &rx).unwrap();
        assert_eq!(names, ["Panadol", "Amoxicillin"]);
    }

    #[test]
    fn keyword_extractor_needs_text() {
        let conn = open_memory_database().unwrap();
        let rx = make_prescription(&conn, "Ada");
        let err = KeywordNameExtractor::new().extract_names(&conn, &rx).unwrap_err();
        assert!(matches!(err, ExtractionError::NoText(id) if id == rx.id));
    }

    #[test]
    fn bridge_searches_first_extracted_name() {
        let conn = open_memory_database().unwrap();
        let seller = make_seller(&conn, "Nearby", 40.0, -74.0, true);
        let para = make_medicine(&conn, "Paracetamol", None);
        let ibu = make_medicine(&conn, "Ibuprofen", None);
        make_stock(&conn, seller, para, 5, "4.00");
        make_stock(&conn, seller, ibu, 5, "6.00");

        let rx = make_prescription(&conn, "Ada");
        let extractor = FixedExtractor(vec!["Paracetamol", "Ibuprofen"]);
        process_prescription(&conn, rx.id, &extractor).unwrap();

        let result =
            search_from_extracted_names(&conn, rx.id, Some(dec(40.0)), Some(dec(-74.0))).unwrap();
        assert_eq!(result.medicine_name, "Paracetamol");
        assert_eq!(result.available_stocks.len(), 1);
        assert_eq!(result.available_stocks[0].price.to_string(), "4.00");
    }

    #[test]
    fn bridge_uses_default_radius() {
        let conn = open_memory_database().unwrap();
        // About 22 km north of the origin
        let seller = make_seller(&conn, "Too far", 40.2, -74.0, true);
        let med = make_medicine(&conn, "Paracetamol", None);
        make_stock(&conn, seller, med, 5, "4.00");

        let rx = make_prescription(&conn, "Ada");
        process_prescription(&conn, rx.id, &FixedExtractor(vec!["Paracetamol"])).unwrap();

        let result =
            search_from_extracted_names(&conn, rx.id, Some(dec(40.0)), Some(dec(-74.0))).unwrap();
        assert!(result.available_stocks.is_empty());
    }

    #[test]
    fn bridge_rejects_unprocessed_or_empty_prescriptions() {
        let conn = open_memory_database().unwrap();
        let pending = make_prescription(&conn, "Ada");
        assert!(matches!(
            search_from_extracted_names(&conn, pending.id, None, None),
            Err(StockError::Validation(_))
        ));

        let empty = make_prescription(&conn, "Bob");
        process_prescription(&conn, empty.id, &FixedExtractor(vec![])).unwrap();
        assert!(matches!(
            search_from_extracted_names(&conn, empty.id, None, None),
            Err(StockError::Validation(_))
        ));

        assert!(search_from_extracted_names(&conn, 777, None, None)
            .unwrap_err()
            .is_not_found());
    }
}
