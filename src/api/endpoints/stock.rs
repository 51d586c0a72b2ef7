//! Seller stock endpoints.
//!
//! - `PUT /api/sellers/:seller_id/stock`: upsert one record
//! - `GET /api/sellers/:seller_id/stock`: seller inventory
//! - `PATCH /api/sellers/:seller_id/stock/:medicine_id`: quantity delta

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::{StockListing, StockUpdate};
use crate::stock;

#[derive(Deserialize)]
pub struct UpsertStockBody {
    pub medicine_id: i64,
    #[serde(flatten)]
    pub update: StockUpdate,
}

#[derive(Deserialize)]
pub struct AdjustStockBody {
    pub delta: i64,
}

#[derive(Serialize)]
pub struct WriteResponse {
    pub updated: bool,
}

pub async fn upsert(
    State(ctx): State<ApiContext>,
    seller_id: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpsertStockBody>, JsonRejection>,
) -> Result<Json<WriteResponse>, ApiError> {
    let Path(seller_id) = seller_id?;
    let Json(body) = body?;

    let conn = ctx.open_db()?;
    let updated = stock::upsert_stock(&conn, seller_id, body.medicine_id, &body.update)?;
    Ok(Json(WriteResponse { updated }))
}

pub async fn list(
    State(ctx): State<ApiContext>,
    seller_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<StockListing>>, ApiError> {
    let Path(seller_id) = seller_id?;

    let conn = ctx.open_db()?;
    Ok(Json(stock::list_stock(&conn, seller_id)?))
}

/// Responds 404 when the pair has no record to adjust.
pub async fn adjust(
    State(ctx): State<ApiContext>,
    ids: Result<Path<(i64, i64)>, PathRejection>,
    body: Result<Json<AdjustStockBody>, JsonRejection>,
) -> Result<Json<WriteResponse>, ApiError> {
    let Path((seller_id, medicine_id)) = ids?;
    let Json(body) = body?;

    let conn = ctx.open_db()?;
    if !stock::adjust_stock_quantity(&conn, seller_id, medicine_id, body.delta)? {
        return Err(ApiError::NotFound(format!(
            "No stock record for seller {seller_id} and medicine {medicine_id}"
        )));
    }
    Ok(Json(WriteResponse { updated: true }))
}
