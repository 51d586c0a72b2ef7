//! Medicine catalogue operations.

use rusqlite::Connection;

use crate::db::repository::{insert_medicine, list_active_medicines, search_medicines as find};
use crate::error::StockError;
use crate::models::{Medicine, NewMedicine};

pub fn create_medicine(conn: &Connection, new: &NewMedicine) -> Result<Medicine, StockError> {
    if new.name.trim().is_empty() {
        return Err(StockError::validation("Medicine name must not be empty"));
    }
    let medicine = insert_medicine(conn, new)?;
    tracing::info!(medicine_id = medicine.id, "Medicine created");
    Ok(medicine)
}

/// Active medicines matching `term`; a blank term lists the whole catalogue.
pub fn search_medicines(conn: &Connection, term: &str) -> Result<Vec<Medicine>, StockError> {
    let term = term.trim();
    if term.is_empty() {
        return Ok(list_active_medicines(conn)?);
    }
    Ok(find(conn, term)?)
}
