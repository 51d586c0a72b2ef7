use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::DatabaseError;
use crate::models::enums::PrescriptionStatus;
use crate::models::*;

const PRESCRIPTION_COLUMNS: &str =
    "id, patient_name, notes, file_name, status, extracted_medicines, uploaded_at, processed_at";

pub fn insert_prescription(
    conn: &Connection,
    rx: &NewPrescription,
    uploaded_at: DateTime<Utc>,
) -> Result<Prescription, DatabaseError> {
    conn.execute(
        "INSERT INTO prescriptions (patient_name, notes, file_name, status, uploaded_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            rx.patient_name,
            rx.notes,
            rx.file_name,
            PrescriptionStatus::Pending.as_str(),
            uploaded_at,
        ],
    )?;

    let id = conn.last_insert_rowid();
    get_prescription(conn, id)?.ok_or_else(|| DatabaseError::not_found("prescription", id))
}

pub fn get_prescription(conn: &Connection, id: i64) -> Result<Option<Prescription>, DatabaseError> {
    let sql = format!("SELECT {PRESCRIPTION_COLUMNS} FROM prescriptions WHERE id = ?1");
    let row = conn
        .query_row(&sql, params![id], prescription_row_from_rusqlite)
        .optional()?;

    row.map(prescription_from_row).transpose()
}

/// Move a prescription from `from` to `to` only if it is still in `from`.
/// Returns rows affected, so 0 means another caller got there first (or the
/// prescription does not exist).
pub fn transition_prescription_status(
    conn: &Connection,
    id: i64,
    from: PrescriptionStatus,
    to: PrescriptionStatus,
) -> Result<usize, DatabaseError> {
    let changed = conn.execute(
        "UPDATE prescriptions SET status = ?1 WHERE id = ?2 AND status = ?3",
        params![to.as_str(), id, from.as_str()],
    )?;
    Ok(changed)
}

/// Record extracted names and mark the prescription completed.
pub fn complete_prescription(
    conn: &Connection,
    id: i64,
    names: &[String],
    processed_at: DateTime<Utc>,
) -> Result<usize, DatabaseError> {
    let json = serde_json::to_string(names)?;
    let changed = conn.execute(
        "UPDATE prescriptions SET status = ?1, extracted_medicines = ?2, processed_at = ?3
         WHERE id = ?4",
        params![PrescriptionStatus::Completed.as_str(), json, processed_at, id],
    )?;
    Ok(changed)
}

pub fn fail_prescription(
    conn: &Connection,
    id: i64,
    processed_at: DateTime<Utc>,
) -> Result<usize, DatabaseError> {
    let changed = conn.execute(
        "UPDATE prescriptions SET status = ?1, processed_at = ?2 WHERE id = ?3",
        params![PrescriptionStatus::Failed.as_str(), processed_at, id],
    )?;
    Ok(changed)
}

struct PrescriptionRow {
    id: i64,
    patient_name: String,
    notes: Option<String>,
    file_name: String,
    status: String,
    extracted_medicines: Option<String>,
    uploaded_at: DateTime<Utc>,
    processed_at: Option<DateTime<Utc>>,
}

fn prescription_row_from_rusqlite(row: &Row<'_>) -> rusqlite::Result<PrescriptionRow> {
    Ok(PrescriptionRow {
        id: row.get(0)?,
        patient_name: row.get(1)?,
        notes: row.get(2)?,
        file_name: row.get(3)?,
        status: row.get(4)?,
        extracted_medicines: row.get(5)?,
        uploaded_at: row.get(6)?,
        processed_at: row.get(7)?,
    })
}

fn prescription_from_row(row: PrescriptionRow) -> Result<Prescription, DatabaseError> {
    let extracted_medicines = match row.extracted_medicines {
        Some(json) => Some(serde_json::from_str::<Vec<String>>(&json)?),
        None => None,
    };

    Ok(Prescription {
        id: row.id,
        patient_name: row.patient_name,
        notes: row.notes,
        file_name: row.file_name,
        status: PrescriptionStatus::from_str(&row.status)?,
        extracted_medicines,
        uploaded_at: row.uploaded_at,
        processed_at: row.processed_at,
    })
}
