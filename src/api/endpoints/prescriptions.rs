//! Prescription endpoints.
//!
//! - `POST /api/prescriptions`: register an uploaded prescription
//! - `GET /api/prescriptions/:id`: current state
//! - `POST /api/prescriptions/:id/process`: run name extraction
//! - `GET /api/prescriptions/:id/search`: stock search for the first name

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, OriginQuery};
use crate::models::{NewPrescription, Prescription};
use crate::prescription::{self, KeywordNameExtractor};
use crate::search::StockSearchResult;

/// Transcribed text to extract from; falls back to the prescription notes.
#[derive(Debug, Default, Deserialize)]
pub struct ProcessBody {
    pub text: Option<String>,
}

pub async fn register(
    State(ctx): State<ApiContext>,
    body: Result<Json<NewPrescription>, JsonRejection>,
) -> Result<(StatusCode, Json<Prescription>), ApiError> {
    let Json(new) = body?;
    let conn = ctx.open_db()?;
    let rx = prescription::register_prescription(&conn, &new)?;
    Ok((StatusCode::CREATED, Json(rx)))
}

pub async fn get(
    State(ctx): State<ApiContext>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Prescription>, ApiError> {
    let Path(id) = id?;
    let conn = ctx.open_db()?;
    Ok(Json(prescription::get_prescription(&conn, id)?))
}

/// Responds with the prescription after processing, whether it completed
/// or failed.
pub async fn process(
    State(ctx): State<ApiContext>,
    id: Result<Path<i64>, PathRejection>,
    body: Option<Json<ProcessBody>>,
) -> Result<Json<Prescription>, ApiError> {
    let Path(id) = id?;
    let extractor = match body.and_then(|Json(b)| b.text) {
        Some(text) => KeywordNameExtractor::with_text(text),
        None => KeywordNameExtractor::new(),
    };

    let conn = ctx.open_db()?;
    prescription::process_prescription(&conn, id, &extractor)?;
    Ok(Json(prescription::get_prescription(&conn, id)?))
}

pub async fn search(
    State(ctx): State<ApiContext>,
    id: Result<Path<i64>, PathRejection>,
    origin: Result<Query<OriginQuery>, QueryRejection>,
) -> Result<Json<StockSearchResult>, ApiError> {
    let Path(id) = id?;
    let Query(origin) = origin?;

    let conn = ctx.open_db()?;
    let result = prescription::search_from_extracted_names_with(
        &conn,
        id,
        origin.latitude,
        origin.longitude,
        ctx.search_config(),
    )?;
    Ok(Json(result))
}
