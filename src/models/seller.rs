use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// A pharmacy (or any other point of sale) that can hold stock.
#[derive(Debug, Clone, Serialize)]
pub struct Seller {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub phone_number: String,
    pub email: Option<String>,
    pub license_number: String,
    #[serde(flatten)]
    pub location: Coordinate,
    pub description: Option<String>,
    /// Only approved sellers are visible in public search.
    pub approved: bool,
    pub registered_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Seller {
    pub fn full_address(&self) -> String {
        compose_address(&self.address, &self.city, &self.state, &self.zip_code)
    }
}

/// "street, city, state zip", skipping blank parts.
pub fn compose_address(address: &str, city: &str, state: &str, zip_code: &str) -> String {
    let region = [state.trim(), zip_code.trim()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    [address.trim(), city.trim(), region.as_str()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Registration payload. Sellers always start unapproved.
#[derive(Debug, Clone, Deserialize)]
pub struct NewSeller {
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub phone_number: String,
    pub email: Option<String>,
    pub license_number: String,
    pub latitude: rust_decimal::Decimal,
    pub longitude: rust_decimal::Decimal,
    pub description: Option<String>,
}
