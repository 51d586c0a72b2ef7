//! Stock search endpoint.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::config::DEFAULT_RADIUS_KM;
use crate::search::{search_stock_result, StockSearchRequest, StockSearchResult};

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub term: String,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub radius_km: Option<f64>,
}

/// `GET /api/stock/search?term=&latitude=&longitude=&radius_km=`
pub async fn search(
    State(ctx): State<ApiContext>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<StockSearchResult>, ApiError> {
    let Query(query) = query?;
    let request = StockSearchRequest {
        term: query.term,
        origin_lat: query.latitude,
        origin_lng: query.longitude,
        radius_km: query.radius_km.unwrap_or(DEFAULT_RADIUS_KM),
    };

    let conn = ctx.open_db()?;
    let result = search_stock_result(&conn, &request, ctx.search_config())?;
    Ok(Json(result))
}
