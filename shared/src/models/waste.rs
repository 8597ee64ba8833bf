//! Waste model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A write-off of stock, typically produced by the expiry reaper
///
/// Append-only audit record, never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Waste {
    pub id: i64,
    pub stock_id: i64,
    pub waste_amount: Decimal,
    pub unit: String,
    pub waste_date: DateTime<Utc>,
    pub reason: String,
    pub notes: Option<String>,
}
