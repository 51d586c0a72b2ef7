//! Medicine catalogue endpoints.
//!
//! - `POST /api/medicines`: add a catalogue entry
//! - `GET /api/medicines/search?term=`: catalogue search

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::medicines;
use crate::models::{Medicine, NewMedicine};

#[derive(Deserialize)]
pub struct MedicineSearchQuery {
    #[serde(default)]
    pub term: String,
}

pub async fn create(
    State(ctx): State<ApiContext>,
    body: Result<Json<NewMedicine>, JsonRejection>,
) -> Result<(StatusCode, Json<Medicine>), ApiError> {
    let Json(new) = body?;
    let conn = ctx.open_db()?;
    let medicine = medicines::create_medicine(&conn, &new)?;
    Ok((StatusCode::CREATED, Json(medicine)))
}

pub async fn search(
    State(ctx): State<ApiContext>,
    query: Result<Query<MedicineSearchQuery>, QueryRejection>,
) -> Result<Json<Vec<Medicine>>, ApiError> {
    let Query(query) = query?;
    let conn = ctx.open_db()?;
    Ok(Json(medicines::search_medicines(&conn, &query.term)?))
}
