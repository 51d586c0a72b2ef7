use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::DatabaseError;
use crate::models::enums::MedicineForm;
use crate::models::*;

const MEDICINE_COLUMNS: &str = "id, name, generic_name, manufacturer, form, strength, unit,
     requires_prescription, description, active, created_at";

pub fn insert_medicine(conn: &Connection, med: &NewMedicine) -> Result<Medicine, DatabaseError> {
    conn.execute(
        "INSERT INTO medicines (name, generic_name, manufacturer, form, strength, unit,
         requires_prescription, description, active, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 1, ?9)",
        params![
            med.name,
            med.generic_name,
            med.manufacturer,
            med.form.as_str(),
            med.strength,
            med.unit,
            med.requires_prescription as i32,
            med.description,
            Utc::now(),
        ],
    )?;

    let id = conn.last_insert_rowid();
    get_medicine(conn, id)?.ok_or_else(|| DatabaseError::not_found("medicine", id))
}

pub fn get_medicine(conn: &Connection, id: i64) -> Result<Option<Medicine>, DatabaseError> {
    let sql = format!("SELECT {MEDICINE_COLUMNS} FROM medicines WHERE id = ?1");
    let row = conn
        .query_row(&sql, params![id], medicine_row_from_rusqlite)
        .optional()?;

    row.map(medicine_from_row).transpose()
}

pub fn medicine_exists(conn: &Connection, id: i64) -> Result<bool, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM medicines WHERE id = ?1",
        params![id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Active medicines whose name, generic name or manufacturer contains
/// `term`. `instr` keeps the match case-sensitive.
pub fn search_medicines(conn: &Connection, term: &str) -> Result<Vec<Medicine>, DatabaseError> {
    let sql = format!(
        "SELECT {MEDICINE_COLUMNS} FROM medicines
         WHERE active = 1
           AND (instr(name, ?1) > 0
                OR (generic_name IS NOT NULL AND instr(generic_name, ?1) > 0)
                OR (manufacturer IS NOT NULL AND instr(manufacturer, ?1) > 0))
         ORDER BY name, id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![term], medicine_row_from_rusqlite)?;

    let mut meds = Vec::new();
    for row in rows {
        meds.push(medicine_from_row(row?)?);
    }
    Ok(meds)
}

pub fn list_active_medicines(conn: &Connection) -> Result<Vec<Medicine>, DatabaseError> {
    let sql =
        format!("SELECT {MEDICINE_COLUMNS} FROM medicines WHERE active = 1 ORDER BY name, id");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], medicine_row_from_rusqlite)?;

    let mut meds = Vec::new();
    for row in rows {
        meds.push(medicine_from_row(row?)?);
    }
    Ok(meds)
}

struct MedicineRow {
    id: i64,
    name: String,
    generic_name: Option<String>,
    manufacturer: Option<String>,
    form: String,
    strength: Option<String>,
    unit: Option<String>,
    requires_prescription: i32,
    description: Option<String>,
    active: i32,
    created_at: DateTime<Utc>,
}

fn medicine_row_from_rusqlite(row: &Row<'_>) -> rusqlite::Result<MedicineRow> {
    Ok(MedicineRow {
        id: row.get(0)?,
        name: row.get(1)?,
        generic_name: row.get(2)?,
        manufacturer: row.get(3)?,
        form: row.get(4)?,
        strength: row.get(5)?,
        unit: row.get(6)?,
        requires_prescription: row.get(7)?,
        description: row.get(8)?,
        active: row.get(9)?,
        created_at: row.get(10)?,
    })
}

fn medicine_from_row(row: MedicineRow) -> Result<Medicine, DatabaseError> {
    Ok(Medicine {
        id: row.id,
        name: row.name,
        generic_name: row.generic_name,
        manufacturer: row.manufacturer,
        form: MedicineForm::from_str(&row.form)?,
        strength: row.strength,
        unit: row.unit,
        requires_prescription: row.requires_prescription != 0,
        description: row.description,
        active: row.active != 0,
        created_at: row.created_at,
    })
}
