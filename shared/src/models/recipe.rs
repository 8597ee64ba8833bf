//! Recipe models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// What executing a recipe produces
///
/// A processed recipe yields a new stocked ingredient (dough, sauce); a full
/// recipe is a menu item sold directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipeKind {
    Processed,
    FullRecipe,
}

impl RecipeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecipeKind::Processed => "processed",
            RecipeKind::FullRecipe => "full_recipe",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "processed" => Some(RecipeKind::Processed),
            "full_recipe" => Some(RecipeKind::FullRecipe),
            _ => None,
        }
    }
}

/// A recipe composed of ingredients and preparation steps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,
    pub name: String,
    pub kind: RecipeKind,
    pub creation_time: DateTime<Utc>,
    pub restaurant_id: Option<i64>,
}

/// One ingredient requirement of a recipe
///
/// `required_amount` is per single unit of recipe output; execution scales it
/// by the requested quantity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub id: i64,
    pub recipe_id: i64,
    pub ingredient_id: i64,
    pub required_amount: Decimal,
    pub unit: String,
}

/// One preparation step of a recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeStep {
    pub id: i64,
    pub recipe_id: i64,
    pub step_number: i32,
    pub instruction: String,
}
