//! Ingredient management service

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use shared::{
    join_categories, split_categories, validate_categories, validate_name, validate_unit,
    Ingredient, IngredientKind,
};

/// Ingredient service
#[derive(Clone)]
pub struct IngredientService {
    db: PgPool,
}

/// Database row for an ingredient
#[derive(Debug, sqlx::FromRow)]
struct IngredientRow {
    id: i64,
    name: String,
    unit: String,
    categories: String,
    kind: String,
}

impl IngredientRow {
    fn into_model(self) -> AppResult<Ingredient> {
        let kind = IngredientKind::parse(&self.kind)
            .ok_or_else(|| AppError::Internal(format!("Unknown ingredient kind '{}'", self.kind)))?;
        Ok(Ingredient {
            id: self.id,
            name: self.name,
            unit: self.unit,
            categories: split_categories(&self.categories),
            kind,
        })
    }
}

/// Input for creating an ingredient
#[derive(Debug, Deserialize)]
pub struct CreateIngredientInput {
    pub name: String,
    pub unit: String,
    #[serde(default)]
    pub categories: Vec<String>,
    pub kind: IngredientKind,
}

/// Input for updating an ingredient
#[derive(Debug, Deserialize)]
pub struct UpdateIngredientInput {
    pub name: Option<String>,
    pub unit: Option<String>,
    pub categories: Option<Vec<String>>,
    pub kind: Option<IngredientKind>,
}

impl IngredientService {
    /// Create a new IngredientService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List all ingredients
    pub async fn list_ingredients(&self) -> AppResult<Vec<Ingredient>> {
        let rows = sqlx::query_as::<_, IngredientRow>(
            "SELECT id, name, unit, categories, kind FROM ingredient ORDER BY name ASC",
        )
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(IngredientRow::into_model).collect()
    }

    /// Get an ingredient by id
    pub async fn get_ingredient(&self, ingredient_id: i64) -> AppResult<Ingredient> {
        let row = sqlx::query_as::<_, IngredientRow>(
            "SELECT id, name, unit, categories, kind FROM ingredient WHERE id = $1",
        )
        .bind(ingredient_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Ingredient".to_string()))?;

        row.into_model()
    }

    /// Create an ingredient
    pub async fn create_ingredient(&self, input: CreateIngredientInput) -> AppResult<Ingredient> {
        validate_name(&input.name).map_err(|msg| AppError::Validation {
            field: "name".to_string(),
            message: msg.to_string(),
        })?;
        validate_unit(&input.unit).map_err(|msg| AppError::Validation {
            field: "unit".to_string(),
            message: msg.to_string(),
        })?;
        validate_categories(&input.categories).map_err(|msg| AppError::Validation {
            field: "categories".to_string(),
            message: msg.to_string(),
        })?;

        self.ensure_name_free(&input.name, None).await?;

        let row = sqlx::query_as::<_, IngredientRow>(
            r#"
            INSERT INTO ingredient (name, unit, categories, kind)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, unit, categories, kind
            "#,
        )
        .bind(input.name.trim())
        .bind(input.unit.trim())
        .bind(join_categories(&input.categories))
        .bind(input.kind.as_str())
        .fetch_one(&self.db)
        .await?;

        row.into_model()
    }

    /// Update an ingredient
    pub async fn update_ingredient(
        &self,
        ingredient_id: i64,
        input: UpdateIngredientInput,
    ) -> AppResult<Ingredient> {
        let existing = self.get_ingredient(ingredient_id).await?;

        let name = input.name.unwrap_or(existing.name);
        let unit = input.unit.unwrap_or(existing.unit);
        let categories = input.categories.unwrap_or(existing.categories);
        let kind = input.kind.unwrap_or(existing.kind);

        validate_name(&name).map_err(|msg| AppError::Validation {
            field: "name".to_string(),
            message: msg.to_string(),
        })?;
        validate_unit(&unit).map_err(|msg| AppError::Validation {
            field: "unit".to_string(),
            message: msg.to_string(),
        })?;
        validate_categories(&categories).map_err(|msg| AppError::Validation {
            field: "categories".to_string(),
            message: msg.to_string(),
        })?;

        self.ensure_name_free(&name, Some(ingredient_id)).await?;

        let row = sqlx::query_as::<_, IngredientRow>(
            r#"
            UPDATE ingredient
            SET name = $1, unit = $2, categories = $3, kind = $4
            WHERE id = $5
            RETURNING id, name, unit, categories, kind
            "#,
        )
        .bind(name.trim())
        .bind(unit.trim())
        .bind(join_categories(&categories))
        .bind(kind.as_str())
        .bind(ingredient_id)
        .fetch_one(&self.db)
        .await?;

        row.into_model()
    }

    /// Delete an ingredient
    ///
    /// Refused while stock lots or recipe requirements still reference it.
    pub async fn delete_ingredient(&self, ingredient_id: i64) -> AppResult<()> {
        let stocked = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM stock WHERE ingredient_id = $1",
        )
        .bind(ingredient_id)
        .fetch_one(&self.db)
        .await?;

        if stocked > 0 {
            return Err(AppError::Conflict {
                resource: "ingredient".to_string(),
                message: "Ingredient still has stock lots".to_string(),
            });
        }

        let referenced = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM recipe_ingredient WHERE ingredient_id = $1",
        )
        .bind(ingredient_id)
        .fetch_one(&self.db)
        .await?;

        if referenced > 0 {
            return Err(AppError::Conflict {
                resource: "ingredient".to_string(),
                message: "Ingredient is used by recipes".to_string(),
            });
        }

        let result = sqlx::query("DELETE FROM ingredient WHERE id = $1")
            .bind(ingredient_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Ingredient".to_string()));
        }

        Ok(())
    }

    /// Total unexpired quantity currently stocked for an ingredient
    pub async fn total_quantity(&self, ingredient_id: i64) -> AppResult<Decimal> {
        // Validate ingredient exists first
        self.get_ingredient(ingredient_id).await?;

        let total = sqlx::query_scalar::<_, Option<Decimal>>(
            r#"
            SELECT SUM(amount)
            FROM stock
            WHERE ingredient_id = $1 AND expiry_date > NOW()
            "#,
        )
        .bind(ingredient_id)
        .fetch_one(&self.db)
        .await?;

        Ok(total.unwrap_or(Decimal::ZERO))
    }

    /// Reject a name already taken by a different ingredient
    async fn ensure_name_free(&self, name: &str, exclude_id: Option<i64>) -> AppResult<()> {
        let taken_by = sqlx::query_scalar::<_, i64>("SELECT id FROM ingredient WHERE name = $1")
            .bind(name.trim())
            .fetch_optional(&self.db)
            .await?;

        if let Some(id) = taken_by {
            if Some(id) != exclude_id {
                return Err(AppError::Conflict {
                    resource: "ingredient".to_string(),
                    message: "Ingredient with this name already exists".to_string(),
                });
            }
        }

        Ok(())
    }
}
