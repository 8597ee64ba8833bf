//! Restaurant management service

use serde::Deserialize;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use shared::{validate_name, Restaurant};

/// Restaurant service
#[derive(Clone)]
pub struct RestaurantService {
    db: PgPool,
}

/// Database row for a restaurant
#[derive(Debug, sqlx::FromRow)]
struct RestaurantRow {
    id: i64,
    name: String,
    address: Option<String>,
    phone: Option<String>,
}

impl From<RestaurantRow> for Restaurant {
    fn from(row: RestaurantRow) -> Self {
        Restaurant {
            id: row.id,
            name: row.name,
            address: row.address,
            phone: row.phone,
        }
    }
}

/// Input for creating a restaurant
#[derive(Debug, Deserialize)]
pub struct CreateRestaurantInput {
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
}

/// Input for updating a restaurant
#[derive(Debug, Deserialize)]
pub struct UpdateRestaurantInput {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

impl RestaurantService {
    /// Create a new RestaurantService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List all restaurants
    pub async fn list_restaurants(&self) -> AppResult<Vec<Restaurant>> {
        let rows = sqlx::query_as::<_, RestaurantRow>(
            "SELECT id, name, address, phone FROM restaurant ORDER BY name ASC",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Restaurant::from).collect())
    }

    /// Get a restaurant by id
    pub async fn get_restaurant(&self, restaurant_id: i64) -> AppResult<Restaurant> {
        let row = sqlx::query_as::<_, RestaurantRow>(
            "SELECT id, name, address, phone FROM restaurant WHERE id = $1",
        )
        .bind(restaurant_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Restaurant".to_string()))?;

        Ok(row.into())
    }

    /// Create a restaurant
    pub async fn create_restaurant(
        &self,
        input: CreateRestaurantInput,
    ) -> AppResult<Restaurant> {
        validate_name(&input.name).map_err(|msg| AppError::Validation {
            field: "name".to_string(),
            message: msg.to_string(),
        })?;

        self.ensure_name_free(&input.name, None).await?;

        let row = sqlx::query_as::<_, RestaurantRow>(
            r#"
            INSERT INTO restaurant (name, address, phone)
            VALUES ($1, $2, $3)
            RETURNING id, name, address, phone
            "#,
        )
        .bind(input.name.trim())
        .bind(&input.address)
        .bind(&input.phone)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Update a restaurant
    pub async fn update_restaurant(
        &self,
        restaurant_id: i64,
        input: UpdateRestaurantInput,
    ) -> AppResult<Restaurant> {
        let existing = self.get_restaurant(restaurant_id).await?;

        let name = input.name.unwrap_or(existing.name);
        let address = input.address.or(existing.address);
        let phone = input.phone.or(existing.phone);

        validate_name(&name).map_err(|msg| AppError::Validation {
            field: "name".to_string(),
            message: msg.to_string(),
        })?;

        self.ensure_name_free(&name, Some(restaurant_id)).await?;

        let row = sqlx::query_as::<_, RestaurantRow>(
            r#"
            UPDATE restaurant
            SET name = $1, address = $2, phone = $3
            WHERE id = $4
            RETURNING id, name, address, phone
            "#,
        )
        .bind(name.trim())
        .bind(&address)
        .bind(&phone)
        .bind(restaurant_id)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Delete a restaurant
    pub async fn delete_restaurant(&self, restaurant_id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM restaurant WHERE id = $1")
            .bind(restaurant_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Restaurant".to_string()));
        }

        Ok(())
    }

    async fn ensure_name_free(&self, name: &str, exclude_id: Option<i64>) -> AppResult<()> {
        let taken_by = sqlx::query_scalar::<_, i64>("SELECT id FROM restaurant WHERE name = $1")
            .bind(name.trim())
            .fetch_optional(&self.db)
            .await?;

        if let Some(id) = taken_by {
            if Some(id) != exclude_id {
                return Err(AppError::Conflict {
                    resource: "restaurant".to_string(),
                    message: "Restaurant with this name already exists".to_string(),
                });
            }
        }

        Ok(())
    }
}
