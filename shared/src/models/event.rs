//! Event model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A scheduled kitchen event (delivery, deep clean, banquet prep)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub name: String,
    pub time: DateTime<Utc>,
    pub created_by_id: Option<i64>,
    pub restaurant_id: Option<i64>,
}
