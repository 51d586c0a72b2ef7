//! Seller registration, approval and proximity lookup.

use chrono::Utc;
use rusqlite::Connection;
use serde::Serialize;

use crate::db::repository::{
    self, insert_seller, license_exists, list_approved_sellers, list_pending_sellers,
    set_seller_approved,
};
use crate::db::DatabaseError;
use crate::error::StockError;
use crate::geo::Coordinate;
use crate::models::{NewSeller, Seller};

/// An approved seller with its distance from a query point.
#[derive(Debug, Clone, Serialize)]
pub struct NearbySeller {
    #[serde(flatten)]
    pub seller: Seller,
    pub distance_km: f64,
}

/// Register a seller; it stays hidden from search until approved.
pub fn register_seller(conn: &Connection, new: &NewSeller) -> Result<Seller, StockError> {
    for (label, value) in [
        ("Name", &new.name),
        ("Address", &new.address),
        ("Phone number", &new.phone_number),
        ("License number", &new.license_number),
    ] {
        if value.trim().is_empty() {
            return Err(StockError::validation(format!("{label} must not be empty")));
        }
    }
    let location = Coordinate::new(new.latitude, new.longitude)?;

    if license_exists(conn, &new.license_number)? {
        return Err(StockError::Conflict(format!(
            "License number {} is already registered",
            new.license_number
        )));
    }

    let seller = insert_seller(conn, new, &location)?;
    tracing::info!(seller_id = seller.id, "Seller registered");
    Ok(seller)
}

pub fn get_seller(conn: &Connection, seller_id: i64) -> Result<Seller, StockError> {
    repository::get_seller(conn, seller_id)?
        .ok_or_else(|| DatabaseError::not_found("seller", seller_id).into())
}

pub fn approve_seller(conn: &Connection, seller_id: i64) -> Result<(), StockError> {
    if set_seller_approved(conn, seller_id, true, Utc::now())? == 0 {
        return Err(DatabaseError::not_found("seller", seller_id).into());
    }
    tracing::info!(seller_id, "Seller approved");
    Ok(())
}

pub fn pending_sellers(conn: &Connection) -> Result<Vec<Seller>, StockError> {
    Ok(list_pending_sellers(conn)?)
}

/// Approved sellers within `radius_km` of `origin`, nearest first.
pub fn sellers_near(
    conn: &Connection,
    origin: &Coordinate,
    radius_km: f64,
) -> Result<Vec<NearbySeller>, StockError> {
    if !radius_km.is_finite() || radius_km < 0.0 {
        return Err(StockError::validation(format!(
            "Radius must be a non-negative number of kilometres, got {radius_km}"
        )));
    }

    let mut nearby: Vec<NearbySeller> = list_approved_sellers(conn)?
        .into_iter()
        .filter_map(|seller| {
            let distance_km = origin.distance_km(&seller.location);
            (distance_km <= radius_km).then_some(NearbySeller {
                seller,
                distance_km,
            })
        })
        .collect();

    nearby.sort_by(|a, b| {
        a.distance_km
            .total_cmp(&b.distance_km)
            .then(a.seller.id.cmp(&b.seller.id))
    });
    Ok(nearby)
}
