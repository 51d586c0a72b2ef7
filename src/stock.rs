//! Stock mutation: seller-driven upsert of one (seller, medicine) record,
//! relative quantity adjustments, and the seller's inventory view.
//!
//! Writes are last-writer-wins. Two concurrent upserts on the same pair
//! may lose one update; a lost insert race surfaces as `Conflict`.

use chrono::Utc;
use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::config::{MAX_BATCH_NUMBER_LEN, MAX_STOCK_PRICE};
use crate::db::repository::{
    get_stock_record, insert_stock_record, list_stock_for_seller, medicine_exists,
    seller_exists, update_stock_quantity, update_stock_record,
};
use crate::db::DatabaseError;
use crate::error::StockError;
use crate::models::{StockListing, StockUpdate};

/// Insert the record for the pair if absent, else overwrite it in place.
///
/// Returns `false` only when the write touched no rows.
pub fn upsert_stock(
    conn: &Connection,
    seller_id: i64,
    medicine_id: i64,
    update: &StockUpdate,
) -> Result<bool, StockError> {
    validate_update(update)?;

    let tx = conn.unchecked_transaction()?;

    if !seller_exists(&tx, seller_id)? {
        return Err(DatabaseError::not_found("seller", seller_id).into());
    }
    if !medicine_exists(&tx, medicine_id)? {
        return Err(DatabaseError::not_found("medicine", medicine_id).into());
    }

    let now = Utc::now();
    let affected = match get_stock_record(&tx, seller_id, medicine_id)? {
        Some(existing) => {
            let n = update_stock_record(&tx, existing.id, update, now)?;
            tracing::info!(
                seller_id,
                medicine_id,
                stock_id = existing.id,
                quantity = update.quantity,
                "Stock record updated"
            );
            n
        }
        None => {
            let n = insert_stock_record(&tx, seller_id, medicine_id, update, now)?;
            tracing::info!(
                seller_id,
                medicine_id,
                quantity = update.quantity,
                "Stock record created"
            );
            n
        }
    };

    tx.commit()?;
    Ok(affected > 0)
}

/// Apply a signed change to the quantity of an existing record.
///
/// Returns `false` when the pair has no record yet.
pub fn adjust_stock_quantity(
    conn: &Connection,
    seller_id: i64,
    medicine_id: i64,
    delta: i64,
) -> Result<bool, StockError> {
    let tx = conn.unchecked_transaction()?;

    let Some(record) = get_stock_record(&tx, seller_id, medicine_id)? else {
        return Ok(false);
    };

    let quantity = record
        .quantity
        .checked_add(delta)
        .filter(|q| *q >= 0)
        .ok_or_else(|| {
            StockError::validation(format!(
                "Adjusting quantity {} by {delta} would leave it negative",
                record.quantity
            ))
        })?;

    let affected = update_stock_quantity(&tx, record.id, quantity, Utc::now())?;
    tx.commit()?;

    tracing::info!(seller_id, medicine_id, delta, quantity, "Stock quantity adjusted");
    Ok(affected > 0)
}

/// A seller's in-stock records by medicine name. Empty records are left out.
pub fn list_stock(conn: &Connection, seller_id: i64) -> Result<Vec<StockListing>, StockError> {
    if !seller_exists(conn, seller_id)? {
        return Err(DatabaseError::not_found("seller", seller_id).into());
    }
    Ok(list_stock_for_seller(conn, seller_id)?)
}

fn validate_update(update: &StockUpdate) -> Result<(), StockError> {
    if update.quantity < 0 {
        return Err(StockError::validation(format!(
            "Quantity must not be negative, got {}",
            update.quantity
        )));
    }
    check_price("Price", update.price)?;
    if let Some(discount) = update.discount_price {
        check_price("Discount price", discount)?;
    }
    if let Some(batch) = &update.batch_number {
        if batch.chars().count() > MAX_BATCH_NUMBER_LEN {
            return Err(StockError::validation(format!(
                "Batch number must be at most {MAX_BATCH_NUMBER_LEN} characters"
            )));
        }
    }
    Ok(())
}

fn check_price(label: &str, price: Decimal) -> Result<(), StockError> {
    if price <= Decimal::ZERO || price > MAX_STOCK_PRICE {
        return Err(StockError::validation(format!(
            "{label} must be greater than 0 and at most {MAX_STOCK_PRICE}, got {price}"
        )));
    }
    Ok(())
}
