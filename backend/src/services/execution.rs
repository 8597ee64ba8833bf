//! Recipe execution engine
//!
//! Runs a recipe against the stock ledger: every ingredient requirement is
//! allocated FIFO inside one transaction, so a shortfall on the last
//! ingredient rolls back the deductions already made for the first.
//! Processed recipes produce a new stock lot of a processed ingredient;
//! full recipes produce a sale record.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::{AppError, AppResult};
use crate::services::allocation::allocate_in_tx;
use shared::{validate_non_negative_cost, validate_positive_amount, IngredientKind, RecipeKind};

/// Shelf life given to a freshly produced processed lot when the caller does
/// not override it
const DEFAULT_PROCESSED_EXPIRY_DAYS: i64 = 60;

/// Recipe execution service
#[derive(Clone)]
pub struct ExecutionService {
    db: PgPool,
}

/// Input for executing a processed recipe
#[derive(Debug, Deserialize)]
pub struct ExecuteProcessedInput {
    pub recipe_id: i64,
    /// Units of recipe output to produce
    pub quantity: Decimal,
    /// Extra cost of the processing itself (labour, energy)
    pub processing_cost: Option<Decimal>,
    /// Shelf life of the produced lot in days
    pub expiry_days: Option<i64>,
}

/// Input for executing a full recipe
#[derive(Debug, Deserialize)]
pub struct ExecuteFullInput {
    pub recipe_id: i64,
    /// Units prepared and sold
    pub quantity: Decimal,
    pub sale_price: Decimal,
}

/// Result of a processed recipe execution
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedExecution {
    /// The stock lot holding the produced output
    pub stock_id: i64,
    /// Ingredient the lot belongs to (created on first execution)
    pub ingredient_id: i64,
    /// Allocated ingredient cost plus processing cost
    pub total_cost: Decimal,
}

/// Result of a full recipe execution
#[derive(Debug, Clone, Serialize)]
pub struct FullExecution {
    pub sale_id: i64,
    /// Allocated ingredient cost of the prepared units
    pub ingredient_cost: Decimal,
}

/// Recipe header row used by both execution paths
#[derive(Debug, sqlx::FromRow)]
struct RecipeRow {
    id: i64,
    name: String,
    kind: String,
    restaurant_id: Option<i64>,
}

/// Ingredient requirement row
#[derive(Debug, sqlx::FromRow)]
struct RequirementRow {
    ingredient_id: i64,
    required_amount: Decimal,
    unit: String,
}

impl ExecutionService {
    /// Create a new ExecutionService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Execute a processed recipe, producing a new stock lot
    pub async fn execute_processed(
        &self,
        input: ExecuteProcessedInput,
    ) -> AppResult<ProcessedExecution> {
        validate_positive_amount(input.quantity).map_err(|msg| AppError::Validation {
            field: "quantity".to_string(),
            message: msg.to_string(),
        })?;

        let processing_cost = input.processing_cost.unwrap_or(Decimal::ZERO);
        validate_non_negative_cost(processing_cost).map_err(|msg| AppError::Validation {
            field: "processing_cost".to_string(),
            message: msg.to_string(),
        })?;

        let expiry_days = input.expiry_days.unwrap_or(DEFAULT_PROCESSED_EXPIRY_DAYS);
        if expiry_days < 1 {
            return Err(AppError::Validation {
                field: "expiry_days".to_string(),
                message: "Expiry days must be at least 1".to_string(),
            });
        }

        let now = Utc::now();
        let mut tx = self.db.begin().await?;

        let (recipe, requirements) =
            load_recipe(&mut tx, input.recipe_id, RecipeKind::Processed).await?;

        let mut total_cost = processing_cost;
        for requirement in &requirements {
            let required = requirement.required_amount * input.quantity;
            let outcome =
                allocate_in_tx(&mut tx, requirement.ingredient_id, required, now).await?;
            total_cost += outcome.total_cost;
        }

        // The processed output is stocked under an ingredient named after the
        // recipe. Its unit is copied from the first recipe ingredient; mixed
        // units fall through uncorrected (long-standing behavior callers
        // depend on).
        let output_unit = requirements[0].unit.clone();
        let ingredient_id =
            find_or_create_processed_ingredient(&mut tx, &recipe.name, &output_unit).await?;

        let expiry_date = now + Duration::days(expiry_days);
        let stock_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO stock (ingredient_id, name, amount, unit, purchase_date, expiry_date, cost)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(ingredient_id)
        .bind(&recipe.name)
        .bind(input.quantity)
        .bind(&output_unit)
        .bind(now)
        .bind(expiry_date)
        .bind(total_cost)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            recipe_id = recipe.id,
            stock_id,
            quantity = %input.quantity,
            total_cost = %total_cost,
            "executed processed recipe"
        );

        Ok(ProcessedExecution {
            stock_id,
            ingredient_id,
            total_cost,
        })
    }

    /// Execute a full recipe, recording a sale
    pub async fn execute_full(&self, input: ExecuteFullInput) -> AppResult<FullExecution> {
        validate_positive_amount(input.quantity).map_err(|msg| AppError::Validation {
            field: "quantity".to_string(),
            message: msg.to_string(),
        })?;
        validate_non_negative_cost(input.sale_price).map_err(|msg| AppError::Validation {
            field: "sale_price".to_string(),
            message: msg.to_string(),
        })?;

        let now = Utc::now();
        let mut tx = self.db.begin().await?;

        let (recipe, requirements) =
            load_recipe(&mut tx, input.recipe_id, RecipeKind::FullRecipe).await?;

        let mut ingredient_cost = Decimal::ZERO;
        for requirement in &requirements {
            let required = requirement.required_amount * input.quantity;
            let outcome =
                allocate_in_tx(&mut tx, requirement.ingredient_id, required, now).await?;
            ingredient_cost += outcome.total_cost;
        }

        let sale_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO sales (recipe_id, quantity, sale_price, sale_date, restaurant_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(recipe.id)
        .bind(input.quantity)
        .bind(input.sale_price)
        .bind(now)
        .bind(recipe.restaurant_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            recipe_id = recipe.id,
            sale_id,
            quantity = %input.quantity,
            sale_price = %input.sale_price,
            "executed full recipe"
        );

        Ok(FullExecution {
            sale_id,
            ingredient_cost,
        })
    }
}

/// Fetch the recipe and its ingredient requirements, enforcing the kind
///
/// A recipe without ingredients cannot be executed: there would be nothing
/// to allocate and, for the processed path, no unit to give the output.
async fn load_recipe(
    tx: &mut Transaction<'_, Postgres>,
    recipe_id: i64,
    expected_kind: RecipeKind,
) -> AppResult<(RecipeRow, Vec<RequirementRow>)> {
    let recipe = sqlx::query_as::<_, RecipeRow>(
        "SELECT id, name, kind, restaurant_id FROM recipe WHERE id = $1",
    )
    .bind(recipe_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| AppError::NotFound("Recipe".to_string()))?;

    let kind = RecipeKind::parse(&recipe.kind)
        .ok_or_else(|| AppError::Internal(format!("Unknown recipe kind '{}'", recipe.kind)))?;
    if kind != expected_kind {
        return Err(AppError::InvalidRecipeKind {
            expected: expected_kind.as_str(),
            actual: recipe.kind.clone(),
        });
    }

    let requirements = sqlx::query_as::<_, RequirementRow>(
        r#"
        SELECT ingredient_id, required_amount, unit
        FROM recipe_ingredient
        WHERE recipe_id = $1
        ORDER BY id ASC
        "#,
    )
    .bind(recipe_id)
    .fetch_all(&mut **tx)
    .await?;

    if requirements.is_empty() {
        return Err(AppError::Validation {
            field: "recipe_id".to_string(),
            message: "Recipe has no ingredients".to_string(),
        });
    }

    Ok((recipe, requirements))
}

/// Look up the processed ingredient a recipe stocks into, creating it on
/// first execution
async fn find_or_create_processed_ingredient(
    tx: &mut Transaction<'_, Postgres>,
    name: &str,
    unit: &str,
) -> AppResult<i64> {
    let existing = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM ingredient WHERE name = $1 AND kind = $2",
    )
    .bind(name)
    .bind(IngredientKind::Processed.as_str())
    .fetch_optional(&mut **tx)
    .await?;

    if let Some(id) = existing {
        return Ok(id);
    }

    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO ingredient (name, unit, categories, kind)
        VALUES ($1, $2, '', $3)
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(unit)
    .bind(IngredientKind::Processed.as_str())
    .fetch_one(&mut **tx)
    .await?;

    Ok(id)
}
