//! Dashboard statistics service

use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use crate::error::AppResult;
use shared::IngredientKind;

/// Stats service
#[derive(Clone)]
pub struct StatsService {
    db: PgPool,
}

/// How many distinct ingredients currently have stock, by kind
#[derive(Debug, Clone, Serialize)]
pub struct StockCounts {
    pub raw_count: i64,
    pub processed_count: i64,
}

/// Daily purchased amounts over the trailing week, by kind
#[derive(Debug, Clone, Serialize)]
pub struct StockHistory {
    pub dates: Vec<NaiveDate>,
    pub raw_data: Vec<Decimal>,
    pub processed_data: Vec<Decimal>,
}

/// Row for the history aggregation
#[derive(Debug, sqlx::FromRow)]
struct HistoryRow {
    day: NaiveDate,
    kind: String,
    total: Decimal,
}

impl StatsService {
    /// Create a new StatsService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Count distinct stocked ingredients, raw vs processed
    pub async fn stock_counts(&self) -> AppResult<StockCounts> {
        let counts = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT
                COUNT(DISTINCT s.ingredient_id) FILTER (WHERE i.kind = 'raw'),
                COUNT(DISTINCT s.ingredient_id) FILTER (WHERE i.kind = 'processed')
            FROM stock s
            JOIN ingredient i ON i.id = s.ingredient_id
            "#,
        )
        .fetch_one(&self.db)
        .await?;

        Ok(StockCounts {
            raw_count: counts.0,
            processed_count: counts.1,
        })
    }

    /// Sum purchased amounts per day for the last 7 days, raw vs processed
    ///
    /// Days with no purchases appear as zero so the series always has seven
    /// points.
    pub async fn stock_history(&self) -> AppResult<StockHistory> {
        let today = Utc::now().date_naive();
        let window_start = today - Duration::days(6);

        let rows = sqlx::query_as::<_, HistoryRow>(
            r#"
            SELECT DATE(s.purchase_date) AS day, i.kind, SUM(s.amount) AS total
            FROM stock s
            JOIN ingredient i ON i.id = s.ingredient_id
            WHERE DATE(s.purchase_date) >= $1
            GROUP BY day, i.kind
            "#,
        )
        .bind(window_start)
        .fetch_all(&self.db)
        .await?;

        let dates: Vec<NaiveDate> = (0..7).map(|i| window_start + Duration::days(i)).collect();
        let mut raw_data = vec![Decimal::ZERO; dates.len()];
        let mut processed_data = vec![Decimal::ZERO; dates.len()];

        for row in rows {
            let Some(idx) = dates.iter().position(|d| *d == row.day) else {
                continue;
            };
            match IngredientKind::parse(&row.kind) {
                Some(IngredientKind::Raw) => raw_data[idx] += row.total,
                Some(IngredientKind::Processed) => processed_data[idx] += row.total,
                None => {}
            }
        }

        Ok(StockHistory {
            dates,
            raw_data,
            processed_data,
        })
    }
}
