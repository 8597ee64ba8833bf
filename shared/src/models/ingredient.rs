//! Ingredient model

use serde::{Deserialize, Serialize};

/// Whether an ingredient is purchased as-is or produced in-house
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngredientKind {
    Raw,
    Processed,
}

impl IngredientKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IngredientKind::Raw => "raw",
            IngredientKind::Processed => "processed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "raw" => Some(IngredientKind::Raw),
            "processed" => Some(IngredientKind::Processed),
            _ => None,
        }
    }
}

/// An ingredient tracked by the inventory
///
/// Categories are free-text tags. The database stores them in a single
/// comma-separated column; the model exposes them as a list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
    pub unit: String,
    pub categories: Vec<String>,
    pub kind: IngredientKind,
}
