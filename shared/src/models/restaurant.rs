//! Restaurant model

use serde::{Deserialize, Serialize};

/// A restaurant location recipes and sales belong to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: i64,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
}
