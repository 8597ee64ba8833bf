//! Recipe management service
//!
//! Recipes own their ingredient requirements and preparation steps. Both
//! child lists are replaced wholesale on update; there is no per-row child
//! editing.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::{AppError, AppResult};
use shared::{
    validate_name, validate_positive_amount, validate_step_numbers, validate_unit, Recipe,
    RecipeIngredient, RecipeKind, RecipeStep,
};

/// Recipe service
#[derive(Clone)]
pub struct RecipeService {
    db: PgPool,
}

/// Database row for a recipe
#[derive(Debug, sqlx::FromRow)]
struct RecipeRow {
    id: i64,
    name: String,
    kind: String,
    creation_time: DateTime<Utc>,
    restaurant_id: Option<i64>,
}

impl RecipeRow {
    fn into_model(self) -> AppResult<Recipe> {
        let kind = RecipeKind::parse(&self.kind)
            .ok_or_else(|| AppError::Internal(format!("Unknown recipe kind '{}'", self.kind)))?;
        Ok(Recipe {
            id: self.id,
            name: self.name,
            kind,
            creation_time: self.creation_time,
            restaurant_id: self.restaurant_id,
        })
    }
}

/// A recipe with its ingredient requirements and steps
#[derive(Debug, Clone, Serialize)]
pub struct RecipeWithDetails {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub ingredients: Vec<RecipeIngredient>,
    pub steps: Vec<RecipeStep>,
}

/// One ingredient requirement in a create/update payload
#[derive(Debug, Deserialize)]
pub struct RecipeIngredientInput {
    pub ingredient_id: i64,
    /// Per single unit of recipe output
    pub required_amount: Decimal,
    pub unit: String,
}

/// One step in a create/update payload
#[derive(Debug, Deserialize)]
pub struct RecipeStepInput {
    pub step_number: i32,
    pub instruction: String,
}

/// Input for creating a recipe
#[derive(Debug, Deserialize)]
pub struct CreateRecipeInput {
    pub name: String,
    pub kind: RecipeKind,
    pub restaurant_id: Option<i64>,
    #[serde(default)]
    pub ingredients: Vec<RecipeIngredientInput>,
    #[serde(default)]
    pub steps: Vec<RecipeStepInput>,
}

/// Input for updating a recipe
///
/// `ingredients`/`steps`, when present, replace the stored lists entirely.
#[derive(Debug, Deserialize)]
pub struct UpdateRecipeInput {
    pub name: Option<String>,
    pub kind: Option<RecipeKind>,
    pub restaurant_id: Option<Option<i64>>,
    pub ingredients: Option<Vec<RecipeIngredientInput>>,
    pub steps: Option<Vec<RecipeStepInput>>,
}

impl RecipeService {
    /// Create a new RecipeService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List all recipes (headers only)
    pub async fn list_recipes(&self) -> AppResult<Vec<Recipe>> {
        let rows = sqlx::query_as::<_, RecipeRow>(
            "SELECT id, name, kind, creation_time, restaurant_id FROM recipe ORDER BY name ASC",
        )
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(RecipeRow::into_model).collect()
    }

    /// Get a recipe with its ingredients and steps
    pub async fn get_recipe(&self, recipe_id: i64) -> AppResult<RecipeWithDetails> {
        let row = sqlx::query_as::<_, RecipeRow>(
            "SELECT id, name, kind, creation_time, restaurant_id FROM recipe WHERE id = $1",
        )
        .bind(recipe_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Recipe".to_string()))?;

        let recipe = row.into_model()?;

        let ingredients = sqlx::query_as::<_, RecipeIngredientRow>(
            r#"
            SELECT id, recipe_id, ingredient_id, required_amount, unit
            FROM recipe_ingredient
            WHERE recipe_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(recipe_id)
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .map(RecipeIngredient::from)
        .collect();

        let steps = sqlx::query_as::<_, RecipeStepRow>(
            r#"
            SELECT id, recipe_id, step_number, instruction
            FROM recipe_step
            WHERE recipe_id = $1
            ORDER BY step_number ASC
            "#,
        )
        .bind(recipe_id)
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .map(RecipeStep::from)
        .collect();

        Ok(RecipeWithDetails {
            recipe,
            ingredients,
            steps,
        })
    }

    /// Create a recipe with its children
    pub async fn create_recipe(&self, input: CreateRecipeInput) -> AppResult<RecipeWithDetails> {
        validate_name(&input.name).map_err(|msg| AppError::Validation {
            field: "name".to_string(),
            message: msg.to_string(),
        })?;
        validate_children(&input.ingredients, &input.steps)?;

        self.ensure_name_free(&input.name, None).await?;
        if let Some(restaurant_id) = input.restaurant_id {
            self.ensure_restaurant_exists(restaurant_id).await?;
        }
        self.ensure_ingredients_exist(&input.ingredients).await?;

        let mut tx = self.db.begin().await?;

        let recipe_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO recipe (name, kind, creation_time, restaurant_id)
            VALUES ($1, $2, NOW(), $3)
            RETURNING id
            "#,
        )
        .bind(input.name.trim())
        .bind(input.kind.as_str())
        .bind(input.restaurant_id)
        .fetch_one(&mut *tx)
        .await?;

        insert_children(&mut tx, recipe_id, &input.ingredients, &input.steps).await?;

        tx.commit().await?;

        self.get_recipe(recipe_id).await
    }

    /// Update a recipe; child lists given in the input replace the stored
    /// ones wholesale
    pub async fn update_recipe(
        &self,
        recipe_id: i64,
        input: UpdateRecipeInput,
    ) -> AppResult<RecipeWithDetails> {
        let existing = self.get_recipe(recipe_id).await?;

        let name = input.name.unwrap_or(existing.recipe.name);
        let kind = input.kind.unwrap_or(existing.recipe.kind);
        let restaurant_id = input.restaurant_id.unwrap_or(existing.recipe.restaurant_id);

        validate_name(&name).map_err(|msg| AppError::Validation {
            field: "name".to_string(),
            message: msg.to_string(),
        })?;
        if let Some(ref ingredients) = input.ingredients {
            validate_children(ingredients, input.steps.as_deref().unwrap_or(&[]))?;
            self.ensure_ingredients_exist(ingredients).await?;
        } else if let Some(ref steps) = input.steps {
            validate_children(&[], steps)?;
        }

        self.ensure_name_free(&name, Some(recipe_id)).await?;
        if let Some(restaurant_id) = restaurant_id {
            self.ensure_restaurant_exists(restaurant_id).await?;
        }

        let mut tx = self.db.begin().await?;

        sqlx::query(
            "UPDATE recipe SET name = $1, kind = $2, restaurant_id = $3 WHERE id = $4",
        )
        .bind(name.trim())
        .bind(kind.as_str())
        .bind(restaurant_id)
        .bind(recipe_id)
        .execute(&mut *tx)
        .await?;

        if let Some(ref ingredients) = input.ingredients {
            sqlx::query("DELETE FROM recipe_ingredient WHERE recipe_id = $1")
                .bind(recipe_id)
                .execute(&mut *tx)
                .await?;
            insert_ingredients(&mut tx, recipe_id, ingredients).await?;
        }

        if let Some(ref steps) = input.steps {
            sqlx::query("DELETE FROM recipe_step WHERE recipe_id = $1")
                .bind(recipe_id)
                .execute(&mut *tx)
                .await?;
            insert_steps(&mut tx, recipe_id, steps).await?;
        }

        tx.commit().await?;

        self.get_recipe(recipe_id).await
    }

    /// Delete a recipe and its children
    ///
    /// Refused once sales reference it; the sales ledger is append-only
    /// history.
    pub async fn delete_recipe(&self, recipe_id: i64) -> AppResult<()> {
        let sold =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sales WHERE recipe_id = $1")
                .bind(recipe_id)
                .fetch_one(&self.db)
                .await?;

        if sold > 0 {
            return Err(AppError::Conflict {
                resource: "recipe".to_string(),
                message: "Recipe has recorded sales".to_string(),
            });
        }

        let result = sqlx::query("DELETE FROM recipe WHERE id = $1")
            .bind(recipe_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Recipe".to_string()));
        }

        Ok(())
    }

    async fn ensure_name_free(&self, name: &str, exclude_id: Option<i64>) -> AppResult<()> {
        let taken_by = sqlx::query_scalar::<_, i64>("SELECT id FROM recipe WHERE name = $1")
            .bind(name.trim())
            .fetch_optional(&self.db)
            .await?;

        if let Some(id) = taken_by {
            if Some(id) != exclude_id {
                return Err(AppError::Conflict {
                    resource: "recipe".to_string(),
                    message: "Recipe with this name already exists".to_string(),
                });
            }
        }

        Ok(())
    }

    async fn ensure_restaurant_exists(&self, restaurant_id: i64) -> AppResult<()> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM restaurant WHERE id = $1)")
                .bind(restaurant_id)
                .fetch_one(&self.db)
                .await?;

        if !exists {
            return Err(AppError::NotFound("Restaurant".to_string()));
        }

        Ok(())
    }

    async fn ensure_ingredients_exist(
        &self,
        ingredients: &[RecipeIngredientInput],
    ) -> AppResult<()> {
        for entry in ingredients {
            let exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM ingredient WHERE id = $1)",
            )
            .bind(entry.ingredient_id)
            .fetch_one(&self.db)
            .await?;

            if !exists {
                return Err(AppError::NotFound(format!(
                    "Ingredient {}",
                    entry.ingredient_id
                )));
            }
        }

        Ok(())
    }
}

/// Validate requirement amounts/units and step numbering
fn validate_children(
    ingredients: &[RecipeIngredientInput],
    steps: &[RecipeStepInput],
) -> AppResult<()> {
    for entry in ingredients {
        validate_positive_amount(entry.required_amount).map_err(|msg| AppError::Validation {
            field: "required_amount".to_string(),
            message: msg.to_string(),
        })?;
        validate_unit(&entry.unit).map_err(|msg| AppError::Validation {
            field: "unit".to_string(),
            message: msg.to_string(),
        })?;
    }

    let step_numbers: Vec<i32> = steps.iter().map(|s| s.step_number).collect();
    validate_step_numbers(&step_numbers).map_err(|msg| AppError::Validation {
        field: "steps".to_string(),
        message: msg.to_string(),
    })?;

    for step in steps {
        if step.instruction.trim().is_empty() {
            return Err(AppError::Validation {
                field: "steps".to_string(),
                message: "Step instruction cannot be empty".to_string(),
            });
        }
    }

    Ok(())
}

async fn insert_children(
    tx: &mut Transaction<'_, Postgres>,
    recipe_id: i64,
    ingredients: &[RecipeIngredientInput],
    steps: &[RecipeStepInput],
) -> AppResult<()> {
    insert_ingredients(tx, recipe_id, ingredients).await?;
    insert_steps(tx, recipe_id, steps).await
}

async fn insert_ingredients(
    tx: &mut Transaction<'_, Postgres>,
    recipe_id: i64,
    ingredients: &[RecipeIngredientInput],
) -> AppResult<()> {
    for entry in ingredients {
        sqlx::query(
            r#"
            INSERT INTO recipe_ingredient (recipe_id, ingredient_id, required_amount, unit)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(recipe_id)
        .bind(entry.ingredient_id)
        .bind(entry.required_amount)
        .bind(entry.unit.trim())
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

async fn insert_steps(
    tx: &mut Transaction<'_, Postgres>,
    recipe_id: i64,
    steps: &[RecipeStepInput],
) -> AppResult<()> {
    for step in steps {
        sqlx::query(
            r#"
            INSERT INTO recipe_step (recipe_id, step_number, instruction)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(recipe_id)
        .bind(step.step_number)
        .bind(step.instruction.trim())
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

/// Database row for a recipe ingredient
#[derive(Debug, sqlx::FromRow)]
struct RecipeIngredientRow {
    id: i64,
    recipe_id: i64,
    ingredient_id: i64,
    required_amount: Decimal,
    unit: String,
}

impl From<RecipeIngredientRow> for RecipeIngredient {
    fn from(row: RecipeIngredientRow) -> Self {
        RecipeIngredient {
            id: row.id,
            recipe_id: row.recipe_id,
            ingredient_id: row.ingredient_id,
            required_amount: row.required_amount,
            unit: row.unit,
        }
    }
}

/// Database row for a recipe step
#[derive(Debug, sqlx::FromRow)]
struct RecipeStepRow {
    id: i64,
    recipe_id: i64,
    step_number: i32,
    instruction: String,
}

impl From<RecipeStepRow> for RecipeStep {
    fn from(row: RecipeStepRow) -> Self {
        RecipeStep {
            id: row.id,
            recipe_id: row.recipe_id,
            step_number: row.step_number,
            instruction: row.instruction,
        }
    }
}
