//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`. No authentication layer: callers are
//! expected to sit behind one.

use axum::http::header::{HeaderValue, CACHE_CONTROL};
use axum::routing::{get, patch, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;

/// Build the API router.
///
/// NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
pub fn api_router(ctx: ApiContext) -> Router {
    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/stock/search", get(endpoints::search::search))
        .route("/sellers", post(endpoints::sellers::register))
        .route("/sellers/pending", get(endpoints::sellers::pending))
        .route("/sellers/nearby", get(endpoints::sellers::nearby))
        .route("/sellers/:id", get(endpoints::sellers::get))
        .route("/sellers/:id/approve", put(endpoints::sellers::approve))
        .route(
            "/sellers/:id/stock",
            put(endpoints::stock::upsert).get(endpoints::stock::list),
        )
        .route(
            "/sellers/:id/stock/:medicine_id",
            patch(endpoints::stock::adjust),
        )
        .route("/medicines", post(endpoints::medicines::create))
        .route("/medicines/search", get(endpoints::medicines::search))
        .route("/prescriptions", post(endpoints::prescriptions::register))
        .route("/prescriptions/:id", get(endpoints::prescriptions::get))
        .route(
            "/prescriptions/:id/process",
            post(endpoints::prescriptions::process),
        )
        .route(
            "/prescriptions/:id/search",
            get(endpoints::prescriptions::search),
        )
        .with_state(ctx);

    Router::new()
        .nest("/api", api)
        // Stock changes constantly; never serve a cached answer
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(CorsLayer::permissive())
}
