//! Error taxonomy shared by the search, stock and prescription services.

use thiserror::Error;

use crate::db::DatabaseError;
use crate::geo::GeoError;

#[derive(Error, Debug)]
pub enum StockError {
    /// Rejected before any storage access.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A uniqueness constraint lost a race with a concurrent writer.
    #[error("Conflicting write: {0}")]
    Conflict(String),

    /// Storage failures, including `NotFound`, passed through unmodified.
    #[error(transparent)]
    Database(DatabaseError),
}

impl StockError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Database(DatabaseError::NotFound { .. }))
    }
}

impl From<DatabaseError> for StockError {
    fn from(err: DatabaseError) -> Self {
        if err.is_unique_violation() {
            return Self::Conflict(err.to_string());
        }
        Self::Database(err)
    }
}

impl From<rusqlite::Error> for StockError {
    fn from(err: rusqlite::Error) -> Self {
        DatabaseError::Sqlite(err).into()
    }
}

impl From<GeoError> for StockError {
    fn from(err: GeoError) -> Self {
        Self::Validation(err.to_string())
    }
}
