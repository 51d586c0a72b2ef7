//! Shared types for the HTTP API layer.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::config::AppConfig;
use crate::db::{open_database_with_timeout, DatabaseError};
use crate::search::SearchConfig;

// ═══════════════════════════════════════════════════════════
// API context: shared state for the router
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes.
///
/// Holds no connection: each request opens its own, so requests never
/// share in-process locks.
#[derive(Clone)]
pub struct ApiContext {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    db_path: PathBuf,
    busy_timeout: Duration,
    search: SearchConfig,
}

impl ApiContext {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                db_path: config.db_path.clone(),
                busy_timeout: config.busy_timeout,
                search: SearchConfig {
                    max_candidates: config.max_candidates,
                },
            }),
        }
    }

    /// Open a request-scoped connection.
    pub fn open_db(&self) -> Result<Connection, DatabaseError> {
        open_database_with_timeout(&self.inner.db_path, self.inner.busy_timeout)
    }

    pub fn search_config(&self) -> &SearchConfig {
        &self.inner.search
    }
}

// ═══════════════════════════════════════════════════════════
// Query strings shared by several endpoints
// ═══════════════════════════════════════════════════════════

/// Optional origin point. Both parts must be present to count.
#[derive(Debug, Default, Deserialize)]
pub struct OriginQuery {
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
}
