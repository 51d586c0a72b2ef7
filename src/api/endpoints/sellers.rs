//! Seller registration and lookup endpoints.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::config::DEFAULT_RADIUS_KM;
use crate::geo::Coordinate;
use crate::models::{NewSeller, Seller};
use crate::sellers::{self, NearbySeller};

#[derive(Deserialize)]
pub struct NearbyQuery {
    pub latitude: Decimal,
    pub longitude: Decimal,
    pub radius_km: Option<f64>,
}

/// `POST /api/sellers`
pub async fn register(
    State(ctx): State<ApiContext>,
    body: Result<Json<NewSeller>, JsonRejection>,
) -> Result<(StatusCode, Json<Seller>), ApiError> {
    let Json(new) = body?;
    let conn = ctx.open_db()?;
    let seller = sellers::register_seller(&conn, &new)?;
    Ok((StatusCode::CREATED, Json(seller)))
}

/// `GET /api/sellers/:id`
pub async fn get(
    State(ctx): State<ApiContext>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Seller>, ApiError> {
    let Path(id) = id?;
    let conn = ctx.open_db()?;
    Ok(Json(sellers::get_seller(&conn, id)?))
}

/// `PUT /api/sellers/:id/approve`
pub async fn approve(
    State(ctx): State<ApiContext>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    let conn = ctx.open_db()?;
    sellers::approve_seller(&conn, id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/sellers/pending`
pub async fn pending(State(ctx): State<ApiContext>) -> Result<Json<Vec<Seller>>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(sellers::pending_sellers(&conn)?))
}

/// `GET /api/sellers/nearby?latitude=&longitude=&radius_km=`
pub async fn nearby(
    State(ctx): State<ApiContext>,
    query: Result<Query<NearbyQuery>, QueryRejection>,
) -> Result<Json<Vec<NearbySeller>>, ApiError> {
    let Query(query) = query?;
    let origin = Coordinate::new(query.latitude, query.longitude)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let conn = ctx.open_db()?;
    let radius_km = query.radius_km.unwrap_or(DEFAULT_RADIUS_KM);
    Ok(Json(sellers::sellers_near(&conn, &origin, radius_km)?))
}
