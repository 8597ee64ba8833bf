//! User model

use serde::{Deserialize, Serialize};

/// A staff account
///
/// The password hash is a persistence detail and never leaves the backend;
/// this model is the externally visible shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub login_id: String,
    pub name: String,
    pub role: String,
}
