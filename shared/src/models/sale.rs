//! Sale model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A sale of a full recipe, recorded at execution time
///
/// Append-only audit record. Per-lot ingredient consumption is not stored
/// here; it is reconstructed as `required_amount x quantity` when needed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    pub id: i64,
    pub recipe_id: i64,
    pub quantity: Decimal,
    pub sale_price: Decimal,
    pub sale_date: DateTime<Utc>,
    pub restaurant_id: Option<i64>,
}
