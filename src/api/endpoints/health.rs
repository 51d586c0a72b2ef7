//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::get_current_version;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub schema_version: i64,
    pub version: &'static str,
}

/// `GET /api/health`: verifies the database opens and reports its schema.
pub async fn check(State(ctx): State<ApiContext>) -> Result<Json<HealthResponse>, ApiError> {
    let conn = ctx.open_db()?;

    Ok(Json(HealthResponse {
        status: "ok",
        schema_version: get_current_version(&conn),
        version: crate::config::APP_VERSION,
    }))
}
