//! Sales audit reads
//!
//! Sales are created by the recipe execution engine only; this service is
//! read-only.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use shared::Sale;

/// Sale service
#[derive(Clone)]
pub struct SaleService {
    db: PgPool,
}

/// Database row for a sale
#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    id: i64,
    recipe_id: i64,
    quantity: Decimal,
    sale_price: Decimal,
    sale_date: DateTime<Utc>,
    restaurant_id: Option<i64>,
}

impl From<SaleRow> for Sale {
    fn from(row: SaleRow) -> Self {
        Sale {
            id: row.id,
            recipe_id: row.recipe_id,
            quantity: row.quantity,
            sale_price: row.sale_price,
            sale_date: row.sale_date,
            restaurant_id: row.restaurant_id,
        }
    }
}

/// List filter
#[derive(Debug, Default, Deserialize)]
pub struct SaleListQuery {
    pub recipe_id: Option<i64>,
    pub restaurant_id: Option<i64>,
}

impl SaleService {
    /// Create a new SaleService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List sales, newest first, optionally filtered
    pub async fn list_sales(&self, query: SaleListQuery) -> AppResult<Vec<Sale>> {
        let rows = sqlx::query_as::<_, SaleRow>(
            r#"
            SELECT id, recipe_id, quantity, sale_price, sale_date, restaurant_id
            FROM sales
            WHERE ($1::BIGINT IS NULL OR recipe_id = $1)
              AND ($2::BIGINT IS NULL OR restaurant_id = $2)
            ORDER BY sale_date DESC, id DESC
            "#,
        )
        .bind(query.recipe_id)
        .bind(query.restaurant_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Sale::from).collect())
    }

    /// Get a sale by id
    pub async fn get_sale(&self, sale_id: i64) -> AppResult<Sale> {
        let row = sqlx::query_as::<_, SaleRow>(
            r#"
            SELECT id, recipe_id, quantity, sale_price, sale_date, restaurant_id
            FROM sales
            WHERE id = $1
            "#,
        )
        .bind(sale_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Sale".to_string()))?;

        Ok(row.into())
    }
}
