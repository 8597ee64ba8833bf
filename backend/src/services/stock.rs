//! Stock ledger service: CRUD over stock lots

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use shared::{
    validate_name, validate_non_negative_cost, validate_positive_amount, validate_unit, StockLot,
};

/// Stock service
#[derive(Clone)]
pub struct StockService {
    db: PgPool,
}

/// Database row for a stock lot
#[derive(Debug, sqlx::FromRow)]
struct StockRow {
    id: i64,
    ingredient_id: i64,
    name: String,
    amount: Decimal,
    unit: String,
    purchase_date: DateTime<Utc>,
    expiry_date: DateTime<Utc>,
    cost: Decimal,
}

impl From<StockRow> for StockLot {
    fn from(row: StockRow) -> Self {
        StockLot {
            id: row.id,
            ingredient_id: row.ingredient_id,
            name: row.name,
            amount: row.amount,
            unit: row.unit,
            purchase_date: row.purchase_date,
            expiry_date: row.expiry_date,
            cost: row.cost,
        }
    }
}

/// Input for creating a stock lot
#[derive(Debug, Deserialize)]
pub struct CreateStockInput {
    pub ingredient_id: i64,
    pub name: String,
    pub amount: Decimal,
    pub unit: String,
    /// Defaults to now when omitted
    pub purchase_date: Option<DateTime<Utc>>,
    pub expiry_date: DateTime<Utc>,
    /// Total cost of the lot
    pub cost: Decimal,
}

/// Input for updating a stock lot
#[derive(Debug, Deserialize)]
pub struct UpdateStockInput {
    pub name: Option<String>,
    pub amount: Option<Decimal>,
    pub unit: Option<String>,
    pub purchase_date: Option<DateTime<Utc>>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub cost: Option<Decimal>,
}

/// List filter
#[derive(Debug, Default, Deserialize)]
pub struct StockListQuery {
    pub ingredient_id: Option<i64>,
    /// When true, lots already expired are left out
    #[serde(default)]
    pub only_unexpired: bool,
}

const SELECT_STOCK: &str =
    "SELECT id, ingredient_id, name, amount, unit, purchase_date, expiry_date, cost FROM stock";

impl StockService {
    /// Create a new StockService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List stock lots, optionally scoped to one ingredient, in FIFO order
    pub async fn list_stock(&self, query: StockListQuery) -> AppResult<Vec<StockLot>> {
        let rows = match (query.ingredient_id, query.only_unexpired) {
            (Some(ingredient_id), true) => {
                sqlx::query_as::<_, StockRow>(&format!(
                    "{SELECT_STOCK} WHERE ingredient_id = $1 AND expiry_date > NOW() \
                     ORDER BY purchase_date ASC, id ASC"
                ))
                .bind(ingredient_id)
                .fetch_all(&self.db)
                .await?
            }
            (Some(ingredient_id), false) => {
                sqlx::query_as::<_, StockRow>(&format!(
                    "{SELECT_STOCK} WHERE ingredient_id = $1 ORDER BY purchase_date ASC, id ASC"
                ))
                .bind(ingredient_id)
                .fetch_all(&self.db)
                .await?
            }
            (None, true) => {
                sqlx::query_as::<_, StockRow>(&format!(
                    "{SELECT_STOCK} WHERE expiry_date > NOW() ORDER BY purchase_date ASC, id ASC"
                ))
                .fetch_all(&self.db)
                .await?
            }
            (None, false) => {
                sqlx::query_as::<_, StockRow>(&format!(
                    "{SELECT_STOCK} ORDER BY purchase_date ASC, id ASC"
                ))
                .fetch_all(&self.db)
                .await?
            }
        };

        Ok(rows.into_iter().map(StockLot::from).collect())
    }

    /// Get a stock lot by id
    pub async fn get_stock(&self, stock_id: i64) -> AppResult<StockLot> {
        let row = sqlx::query_as::<_, StockRow>(&format!("{SELECT_STOCK} WHERE id = $1"))
            .bind(stock_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Stock lot".to_string()))?;

        Ok(row.into())
    }

    /// Create a stock lot
    pub async fn create_stock(&self, input: CreateStockInput) -> AppResult<StockLot> {
        validate_name(&input.name).map_err(|msg| AppError::Validation {
            field: "name".to_string(),
            message: msg.to_string(),
        })?;
        validate_unit(&input.unit).map_err(|msg| AppError::Validation {
            field: "unit".to_string(),
            message: msg.to_string(),
        })?;
        validate_positive_amount(input.amount).map_err(|msg| AppError::Validation {
            field: "amount".to_string(),
            message: msg.to_string(),
        })?;
        validate_non_negative_cost(input.cost).map_err(|msg| AppError::Validation {
            field: "cost".to_string(),
            message: msg.to_string(),
        })?;

        let ingredient_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM ingredient WHERE id = $1)")
                .bind(input.ingredient_id)
                .fetch_one(&self.db)
                .await?;
        if !ingredient_exists {
            return Err(AppError::NotFound("Ingredient".to_string()));
        }

        let purchase_date = input.purchase_date.unwrap_or_else(Utc::now);

        let row = sqlx::query_as::<_, StockRow>(
            r#"
            INSERT INTO stock (ingredient_id, name, amount, unit, purchase_date, expiry_date, cost)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, ingredient_id, name, amount, unit, purchase_date, expiry_date, cost
            "#,
        )
        .bind(input.ingredient_id)
        .bind(input.name.trim())
        .bind(input.amount)
        .bind(input.unit.trim())
        .bind(purchase_date)
        .bind(input.expiry_date)
        .bind(input.cost)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Update a stock lot
    ///
    /// Manual corrections only; allocation and reaping go through their own
    /// services.
    pub async fn update_stock(
        &self,
        stock_id: i64,
        input: UpdateStockInput,
    ) -> AppResult<StockLot> {
        let existing = self.get_stock(stock_id).await?;

        let name = input.name.unwrap_or(existing.name);
        let amount = input.amount.unwrap_or(existing.amount);
        let unit = input.unit.unwrap_or(existing.unit);
        let purchase_date = input.purchase_date.unwrap_or(existing.purchase_date);
        let expiry_date = input.expiry_date.unwrap_or(existing.expiry_date);
        let cost = input.cost.unwrap_or(existing.cost);

        validate_name(&name).map_err(|msg| AppError::Validation {
            field: "name".to_string(),
            message: msg.to_string(),
        })?;
        validate_unit(&unit).map_err(|msg| AppError::Validation {
            field: "unit".to_string(),
            message: msg.to_string(),
        })?;
        if amount < Decimal::ZERO {
            return Err(AppError::Validation {
                field: "amount".to_string(),
                message: "Amount cannot be negative".to_string(),
            });
        }
        validate_non_negative_cost(cost).map_err(|msg| AppError::Validation {
            field: "cost".to_string(),
            message: msg.to_string(),
        })?;

        let row = sqlx::query_as::<_, StockRow>(
            r#"
            UPDATE stock
            SET name = $1, amount = $2, unit = $3, purchase_date = $4, expiry_date = $5, cost = $6
            WHERE id = $7
            RETURNING id, ingredient_id, name, amount, unit, purchase_date, expiry_date, cost
            "#,
        )
        .bind(name.trim())
        .bind(amount)
        .bind(unit.trim())
        .bind(purchase_date)
        .bind(expiry_date)
        .bind(cost)
        .bind(stock_id)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Delete a stock lot
    pub async fn delete_stock(&self, stock_id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM stock WHERE id = $1")
            .bind(stock_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Stock lot".to_string()));
        }

        Ok(())
    }
}
