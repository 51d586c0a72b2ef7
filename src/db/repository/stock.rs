use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;

use super::{decimal_column, optional_decimal_column};
use crate::db::DatabaseError;
use crate::geo::{BoundingBox, Coordinate};
use crate::models::*;

const STOCK_COLUMNS: &str = "id, seller_id, medicine_id, quantity, price, discount_price,
     batch_number, expiry_date, last_updated, is_available";

pub fn get_stock_record(
    conn: &Connection,
    seller_id: i64,
    medicine_id: i64,
) -> Result<Option<StockRecord>, DatabaseError> {
    let sql = format!(
        "SELECT {STOCK_COLUMNS} FROM stock_records WHERE seller_id = ?1 AND medicine_id = ?2"
    );
    let record = conn
        .query_row(&sql, params![seller_id, medicine_id], stock_record_from_rusqlite)
        .optional()?;
    Ok(record)
}

pub fn count_stock_records(
    conn: &Connection,
    seller_id: i64,
    medicine_id: i64,
) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM stock_records WHERE seller_id = ?1 AND medicine_id = ?2",
        params![seller_id, medicine_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Insert the first record for a pair. Returns rows affected.
pub fn insert_stock_record(
    conn: &Connection,
    seller_id: i64,
    medicine_id: i64,
    update: &StockUpdate,
    now: DateTime<Utc>,
) -> Result<usize, DatabaseError> {
    let inserted = conn.execute(
        "INSERT INTO stock_records (seller_id, medicine_id, quantity, price, discount_price,
         batch_number, expiry_date, last_updated, is_available)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            seller_id,
            medicine_id,
            update.quantity,
            update.price.to_string(),
            update.discount_price.map(|d| d.to_string()),
            update.batch_number,
            update.expiry_date,
            now,
            StockRecord::availability_for(update.quantity) as i32,
        ],
    )?;
    Ok(inserted)
}

/// Overwrite every mutable field of an existing record. Returns rows affected.
pub fn update_stock_record(
    conn: &Connection,
    stock_id: i64,
    update: &StockUpdate,
    now: DateTime<Utc>,
) -> Result<usize, DatabaseError> {
    let updated = conn.execute(
        "UPDATE stock_records
         SET quantity = ?1, price = ?2, discount_price = ?3, batch_number = ?4,
             expiry_date = ?5, last_updated = ?6, is_available = ?7
         WHERE id = ?8",
        params![
            update.quantity,
            update.price.to_string(),
            update.discount_price.map(|d| d.to_string()),
            update.batch_number,
            update.expiry_date,
            now,
            StockRecord::availability_for(update.quantity) as i32,
            stock_id,
        ],
    )?;
    Ok(updated)
}

/// Set only the quantity (and its derived availability).
pub fn update_stock_quantity(
    conn: &Connection,
    stock_id: i64,
    quantity: i64,
    now: DateTime<Utc>,
) -> Result<usize, DatabaseError> {
    let updated = conn.execute(
        "UPDATE stock_records SET quantity = ?1, last_updated = ?2, is_available = ?3
         WHERE id = ?4",
        params![
            quantity,
            now,
            StockRecord::availability_for(quantity) as i32,
            stock_id
        ],
    )?;
    Ok(updated)
}

/// Records one seller currently holds (quantity above zero), joined with
/// the medicine name.
pub fn list_stock_for_seller(
    conn: &Connection,
    seller_id: i64,
) -> Result<Vec<StockListing>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT s.id, s.medicine_id, m.name, m.generic_name, s.quantity, s.price,
                s.discount_price, s.batch_number, s.expiry_date, s.last_updated, s.is_available
         FROM stock_records s
         JOIN medicines m ON m.id = s.medicine_id
         WHERE s.seller_id = ?1 AND s.quantity > 0
         ORDER BY m.name, s.id",
    )?;

    let rows = stmt.query_map(params![seller_id], |row| {
        Ok(StockListing {
            stock_id: row.get(0)?,
            medicine_id: row.get(1)?,
            medicine_name: row.get(2)?,
            generic_name: row.get(3)?,
            quantity: row.get(4)?,
            price: decimal_column(row, 5)?,
            discount_price: optional_decimal_column(row, 6)?,
            batch_number: row.get(7)?,
            expiry_date: row.get(8)?,
            last_updated: row.get(9)?,
            is_available: row.get::<_, i32>(10)? != 0,
        })
    })?;

    let mut listing = Vec::new();
    for row in rows {
        listing.push(row?);
    }
    Ok(listing)
}

/// A search candidate: the stock columns plus exactly the seller columns
/// the search projection needs.
#[derive(Debug, Clone)]
pub struct StockCandidate {
    pub stock_id: i64,
    pub quantity: i64,
    pub price: Decimal,
    pub discount_price: Option<Decimal>,
    pub last_updated: DateTime<Utc>,
    pub seller_id: i64,
    pub seller_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub location: Coordinate,
}

/// Lexical half of the stock search: in-stock records at approved sellers
/// whose medicine name or generic name contains `term` (case-sensitive) and
/// whose seller lies inside `area`.
///
/// Ordered by price then id so a truncated set keeps the cheapest rows.
pub fn find_stock_candidates(
    conn: &Connection,
    term: &str,
    area: &BoundingBox,
    limit: usize,
) -> Result<Vec<StockCandidate>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT s.id, s.quantity, s.price, s.discount_price, s.last_updated,
                sel.id, sel.name, sel.address, sel.city, sel.state, sel.zip_code,
                sel.latitude, sel.longitude
         FROM stock_records s
         JOIN sellers sel ON sel.id = s.seller_id
         JOIN medicines m ON m.id = s.medicine_id
         WHERE s.quantity > 0
           AND sel.approved = 1
           AND (instr(m.name, ?1) > 0
                OR (m.generic_name IS NOT NULL AND instr(m.generic_name, ?1) > 0))
           AND CAST(sel.latitude AS REAL) BETWEEN ?3 AND ?4
           AND (CAST(sel.longitude AS REAL) BETWEEN ?5 AND ?6
                OR CAST(sel.longitude AS REAL) BETWEEN ?7 AND ?8)
         ORDER BY CAST(s.price AS REAL), s.id
         LIMIT ?2",
    )?;

    let [(lng_lo_a, lng_hi_a), (lng_lo_b, lng_hi_b)] = area.longitude_ranges();
    let rows = stmt.query_map(
        params![
            term,
            limit as i64,
            area.min_lat,
            area.max_lat,
            lng_lo_a,
            lng_hi_a,
            lng_lo_b,
            lng_hi_b
        ],
        candidate_row_from_rusqlite,
    )?;

    let mut candidates = Vec::new();
    for row in rows {
        let (row, lat, lng) = row?;
        let location = Coordinate::new(lat, lng)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?;
        candidates.push(row.into_candidate(location));
    }
    Ok(candidates)
}

struct StockCandidateRow {
    stock_id: i64,
    quantity: i64,
    price: Decimal,
    discount_price: Option<Decimal>,
    last_updated: DateTime<Utc>,
    seller_id: i64,
    seller_name: String,
    address: String,
    city: String,
    state: String,
    zip_code: String,
}

impl StockCandidateRow {
    fn into_candidate(self, location: Coordinate) -> StockCandidate {
        StockCandidate {
            stock_id: self.stock_id,
            quantity: self.quantity,
            price: self.price,
            discount_price: self.discount_price,
            last_updated: self.last_updated,
            seller_id: self.seller_id,
            seller_name: self.seller_name,
            address: self.address,
            city: self.city,
            state: self.state,
            zip_code: self.zip_code,
            location,
        }
    }
}

fn candidate_row_from_rusqlite(
    row: &Row<'_>,
) -> rusqlite::Result<(StockCandidateRow, Decimal, Decimal)> {
    Ok((
        StockCandidateRow {
            stock_id: row.get(0)?,
            quantity: row.get(1)?,
            price: decimal_column(row, 2)?,
            discount_price: optional_decimal_column(row, 3)?,
            last_updated: row.get(4)?,
            seller_id: row.get(5)?,
            seller_name: row.get(6)?,
            address: row.get(7)?,
            city: row.get(8)?,
            state: row.get(9)?,
            zip_code: row.get(10)?,
        },
        decimal_column(row, 11)?,
        decimal_column(row, 12)?,
    ))
}

fn stock_record_from_rusqlite(row: &Row<'_>) -> rusqlite::Result<StockRecord> {
    Ok(StockRecord {
        id: row.get(0)?,
        seller_id: row.get(1)?,
        medicine_id: row.get(2)?,
        quantity: row.get(3)?,
        price: decimal_column(row, 4)?,
        discount_price: optional_decimal_column(row, 5)?,
        batch_number: row.get(6)?,
        expiry_date: row.get::<_, Option<NaiveDate>>(7)?,
        last_updated: row.get(8)?,
        is_available: row.get::<_, i32>(9)? != 0,
    })
}
