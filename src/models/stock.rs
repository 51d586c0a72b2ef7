use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One seller's on-hand quantity and price for one medicine.
///
/// Unique per `(seller_id, medicine_id)`; created on the first upsert for
/// the pair and only updated in place afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockRecord {
    pub id: i64,
    pub seller_id: i64,
    pub medicine_id: i64,
    pub quantity: i64,
    pub price: Decimal,
    pub discount_price: Option<Decimal>,
    pub batch_number: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub last_updated: DateTime<Utc>,
    pub is_available: bool,
}

impl StockRecord {
    /// The only source of `is_available` for any write.
    pub fn availability_for(quantity: i64) -> bool {
        quantity > 0
    }
}

/// Mutable fields of a stock record, as supplied by the seller.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StockUpdate {
    pub quantity: i64,
    pub price: Decimal,
    pub discount_price: Option<Decimal>,
    pub batch_number: Option<String>,
    pub expiry_date: Option<NaiveDate>,
}

impl StockUpdate {
    pub fn new(quantity: i64, price: Decimal) -> Self {
        Self {
            quantity,
            price,
            discount_price: None,
            batch_number: None,
            expiry_date: None,
        }
    }
}

/// A stock record joined with the medicine it tracks, for a seller's
/// inventory view.
#[derive(Debug, Clone, Serialize)]
pub struct StockListing {
    pub stock_id: i64,
    pub medicine_id: i64,
    pub medicine_name: String,
    pub generic_name: Option<String>,
    pub quantity: i64,
    pub price: Decimal,
    pub discount_price: Option<Decimal>,
    pub batch_number: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub last_updated: DateTime<Utc>,
    pub is_available: bool,
}
