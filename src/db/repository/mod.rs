//! Repository layer: entity-scoped database operations.
//!
//! Each component gets a narrow set of functions over `&Connection` rather
//! than a generic CRUD interface. Joins are spelled out per query.

mod medicine;
mod prescription;
mod seller;
mod stock;

#[cfg(test)]
pub(crate) mod fixtures;

use std::str::FromStr;

use rusqlite::types::Type;
use rusqlite::Row;
use rust_decimal::Decimal;

pub use medicine::*;
pub use prescription::*;
pub use seller::*;
pub use stock::*;

/// Read a TEXT column holding a canonical decimal.
pub(crate) fn decimal_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let raw: String = row.get(idx)?;
    Decimal::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn optional_decimal_column(
    row: &Row<'_>,
    idx: usize,
) -> rusqlite::Result<Option<Decimal>> {
    match row.get::<_, Option<String>>(idx)? {
        Some(raw) => Decimal::from_str(&raw)
            .map(Some)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))),
        None => Ok(None),
    }
}
