//! Stock lot model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single purchased or produced batch of an ingredient
///
/// `amount` is the quantity still remaining and `cost` is the monetary cost
/// of that remainder. Both shrink together as the lot is consumed, so the
/// cost-per-unit of what is left stays constant. A lot at zero amount is
/// exhausted but kept until the expiry reaper (or an explicit delete)
/// removes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockLot {
    pub id: i64,
    pub ingredient_id: i64,
    pub name: String,
    pub amount: Decimal,
    pub unit: String,
    pub purchase_date: DateTime<Utc>,
    pub expiry_date: DateTime<Utc>,
    pub cost: Decimal,
}

impl StockLot {
    /// A lot is expired once its expiry date is reached
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry_date <= now
    }
}
