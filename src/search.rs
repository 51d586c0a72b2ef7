//! Location-aware stock search.
//!
//! Two phases: a lexical filter in SQL (term match, approved seller,
//! positive quantity, and a bounding box around the origin when there is
//! one, capped), then an exact in-memory haversine filter and sort over the
//! loaded candidates.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_RADIUS_KM, MAX_SEARCH_CANDIDATES};
use crate::db::repository::{find_stock_candidates, StockCandidate};
use crate::error::StockError;
use crate::geo::{BoundingBox, Coordinate};
use crate::models::compose_address;

// ═══════════════════════════════════════════
// Request / result types
// ═══════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StockSearchRequest {
    pub term: String,
    pub origin_lat: Option<Decimal>,
    pub origin_lng: Option<Decimal>,
    #[serde(default = "default_radius_km")]
    pub radius_km: f64,
}

fn default_radius_km() -> f64 {
    DEFAULT_RADIUS_KM
}

impl StockSearchRequest {
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            origin_lat: None,
            origin_lng: None,
            radius_km: DEFAULT_RADIUS_KM,
        }
    }

    pub fn with_origin(mut self, lat: Decimal, lng: Decimal) -> Self {
        self.origin_lat = Some(lat);
        self.origin_lng = Some(lng);
        self
    }

    pub fn with_radius(mut self, radius_km: f64) -> Self {
        self.radius_km = radius_km;
        self
    }
}

/// Tunables for the candidate phase.
#[derive(Debug, Clone, Copy)]
pub struct SearchConfig {
    pub max_candidates: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_candidates: MAX_SEARCH_CANDIDATES,
        }
    }
}

/// One seller's offer for the searched medicine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockSearchHit {
    pub stock_id: i64,
    pub seller_id: i64,
    pub seller_name: String,
    pub address: String,
    /// 0 when the search had no origin.
    pub distance_km: f64,
    pub quantity: i64,
    pub price: Decimal,
    pub discount_price: Option<Decimal>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StockSearchResult {
    pub medicine_name: String,
    pub available_stocks: Vec<StockSearchHit>,
}

// ═══════════════════════════════════════════
// Search
// ═══════════════════════════════════════════

pub fn search_stock(
    conn: &Connection,
    request: &StockSearchRequest,
) -> Result<Vec<StockSearchHit>, StockError> {
    search_stock_with(conn, request, &SearchConfig::default())
}

pub fn search_stock_with(
    conn: &Connection,
    request: &StockSearchRequest,
    config: &SearchConfig,
) -> Result<Vec<StockSearchHit>, StockError> {
    let term = request.term.trim();
    if term.is_empty() {
        return Err(StockError::validation("Search term must not be empty"));
    }
    if !request.radius_km.is_finite() || request.radius_km < 0.0 {
        return Err(StockError::validation(format!(
            "Radius must be a non-negative number of kilometres, got {}",
            request.radius_km
        )));
    }
    let origin = Coordinate::from_parts(request.origin_lat, request.origin_lng)?;

    // The cap applies after the box, so distant rows never crowd out nearby ones
    let area = origin
        .map(|o| o.bounding_box(request.radius_km))
        .unwrap_or(BoundingBox::WORLD);
    let candidates = find_stock_candidates(conn, term, &area, config.max_candidates)?;
    if candidates.len() >= config.max_candidates {
        tracing::warn!(
            term,
            cap = config.max_candidates,
            "Stock search hit the candidate cap; results may be incomplete"
        );
    }

    let hits = rank_candidates(candidates, origin.as_ref(), request.radius_km);
    tracing::debug!(term, has_origin = origin.is_some(), hits = hits.len(), "Stock search");
    Ok(hits)
}

/// Search wrapped in the boundary envelope.
pub fn search_stock_result(
    conn: &Connection,
    request: &StockSearchRequest,
    config: &SearchConfig,
) -> Result<StockSearchResult, StockError> {
    let available_stocks = search_stock_with(conn, request, config)?;
    Ok(StockSearchResult {
        medicine_name: request.term.trim().to_string(),
        available_stocks,
    })
}

/// Distance filter, ordering and projection over loaded candidates.
fn rank_candidates(
    candidates: Vec<StockCandidate>,
    origin: Option<&Coordinate>,
    radius_km: f64,
) -> Vec<StockSearchHit> {
    let mut hits: Vec<StockSearchHit> = match origin {
        Some(origin) => candidates
            .into_iter()
            .filter_map(|c| {
                let distance = origin.distance_km(&c.location);
                (distance <= radius_km).then(|| project(c, distance))
            })
            .collect(),
        None => candidates.into_iter().map(|c| project(c, 0.0)).collect(),
    };

    if origin.is_some() {
        hits.sort_by(|a, b| {
            a.distance_km
                .total_cmp(&b.distance_km)
                .then_with(|| by_price_then_id(a, b))
        });
    } else {
        hits.sort_by(by_price_then_id);
    }
    hits
}

fn by_price_then_id(a: &StockSearchHit, b: &StockSearchHit) -> Ordering {
    a.price.cmp(&b.price).then(a.stock_id.cmp(&b.stock_id))
}

fn project(c: StockCandidate, distance_km: f64) -> StockSearchHit {
    StockSearchHit {
        stock_id: c.stock_id,
        seller_id: c.seller_id,
        address: compose_address(&c.address, &c.city, &c.state, &c.zip_code),
        seller_name: c.seller_name,
        distance_km,
        quantity: c.quantity,
        price: c.price,
        discount_price: c.discount_price,
        last_updated: c.last_updated,
    }
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════
