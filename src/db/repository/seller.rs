use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::decimal_column;
use crate::db::DatabaseError;
use crate::geo::Coordinate;
use crate::models::*;

const SELLER_COLUMNS: &str = "id, name, address, city, state, zip_code, phone_number, email,
     license_number, latitude, longitude, description, approved, registered_at, updated_at";

/// Insert a new, unapproved seller and return the stored row.
pub fn insert_seller(
    conn: &Connection,
    seller: &NewSeller,
    location: &Coordinate,
) -> Result<Seller, DatabaseError> {
    let registered_at = Utc::now();
    conn.execute(
        "INSERT INTO sellers (name, address, city, state, zip_code, phone_number, email,
         license_number, latitude, longitude, description, approved, registered_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, 0, ?12)",
        params![
            seller.name,
            seller.address,
            seller.city,
            seller.state,
            seller.zip_code,
            seller.phone_number,
            seller.email,
            seller.license_number,
            location.latitude().to_string(),
            location.longitude().to_string(),
            seller.description,
            registered_at,
        ],
    )?;

    let id = conn.last_insert_rowid();
    get_seller(conn, id)?.ok_or_else(|| DatabaseError::not_found("seller", id))
}

pub fn get_seller(conn: &Connection, id: i64) -> Result<Option<Seller>, DatabaseError> {
    let sql = format!("SELECT {SELLER_COLUMNS} FROM sellers WHERE id = ?1");
    let row = conn
        .query_row(&sql, params![id], seller_row_from_rusqlite)
        .optional()?;

    row.map(seller_from_row).transpose()
}

pub fn seller_exists(conn: &Connection, id: i64) -> Result<bool, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sellers WHERE id = ?1",
        params![id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn license_exists(conn: &Connection, license_number: &str) -> Result<bool, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sellers WHERE license_number = ?1",
        params![license_number],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Returns the number of rows changed (0 when the seller does not exist).
pub fn set_seller_approved(
    conn: &Connection,
    id: i64,
    approved: bool,
    updated_at: DateTime<Utc>,
) -> Result<usize, DatabaseError> {
    let changed = conn.execute(
        "UPDATE sellers SET approved = ?1, updated_at = ?2 WHERE id = ?3",
        params![approved as i32, updated_at, id],
    )?;
    Ok(changed)
}

pub fn list_pending_sellers(conn: &Connection) -> Result<Vec<Seller>, DatabaseError> {
    list_sellers_where(conn, "approved = 0")
}

pub fn list_approved_sellers(conn: &Connection) -> Result<Vec<Seller>, DatabaseError> {
    list_sellers_where(conn, "approved = 1")
}

fn list_sellers_where(conn: &Connection, predicate: &str) -> Result<Vec<Seller>, DatabaseError> {
    let sql = format!("SELECT {SELLER_COLUMNS} FROM sellers WHERE {predicate} ORDER BY id");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], seller_row_from_rusqlite)?;

    let mut sellers = Vec::new();
    for row in rows {
        sellers.push(seller_from_row(row?)?);
    }
    Ok(sellers)
}

// Internal row type for Seller mapping
struct SellerRow {
    id: i64,
    name: String,
    address: String,
    city: String,
    state: String,
    zip_code: String,
    phone_number: String,
    email: Option<String>,
    license_number: String,
    latitude: rust_decimal::Decimal,
    longitude: rust_decimal::Decimal,
    description: Option<String>,
    approved: i32,
    registered_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

fn seller_row_from_rusqlite(row: &Row<'_>) -> rusqlite::Result<SellerRow> {
    Ok(SellerRow {
        id: row.get(0)?,
        name: row.get(1)?,
        address: row.get(2)?,
        city: row.get(3)?,
        state: row.get(4)?,
        zip_code: row.get(5)?,
        phone_number: row.get(6)?,
        email: row.get(7)?,
        license_number: row.get(8)?,
        latitude: decimal_column(row, 9)?,
        longitude: decimal_column(row, 10)?,
        description: row.get(11)?,
        approved: row.get(12)?,
        registered_at: row.get(13)?,
        updated_at: row.get(14)?,
    })
}

fn seller_from_row(row: SellerRow) -> Result<Seller, DatabaseError> {
    let location = Coordinate::new(row.latitude, row.longitude)
        .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?;

    Ok(Seller {
        id: row.id,
        name: row.name,
        address: row.address,
        city: row.city,
        state: row.state,
        zip_code: row.zip_code,
        phone_number: row.phone_number,
        email: row.email,
        license_number: row.license_number,
        location,
        description: row.description,
        approved: row.approved != 0,
        registered_at: row.registered_at,
        updated_at: row.updated_at,
    })
}
