//! Waste management service: expiry sweep and waste record access
//!
//! The sweep converts every expired stock lot into a waste record and
//! removes the lot from the ledger. It runs as one transaction, so a sweep
//! either lands completely or not at all and is simply retried at the next
//! tick.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use shared::Waste;

/// Reason recorded on waste rows created by the expiry sweep
const EXPIRY_REASON: &str = "Expired";

/// Waste service
#[derive(Clone)]
pub struct WasteService {
    db: PgPool,
}

/// Result of an expiry sweep
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SweepOutcome {
    pub waste_records_created: u64,
}

/// Database row for a waste record
#[derive(Debug, sqlx::FromRow)]
struct WasteRow {
    id: i64,
    stock_id: i64,
    waste_amount: Decimal,
    unit: String,
    waste_date: DateTime<Utc>,
    reason: String,
    notes: Option<String>,
}

impl From<WasteRow> for Waste {
    fn from(row: WasteRow) -> Self {
        Waste {
            id: row.id,
            stock_id: row.stock_id,
            waste_amount: row.waste_amount,
            unit: row.unit,
            waste_date: row.waste_date,
            reason: row.reason,
            notes: row.notes,
        }
    }
}

/// Expired lot row picked up by the sweep
#[derive(Debug, sqlx::FromRow)]
struct ExpiredLotRow {
    id: i64,
    amount: Decimal,
    unit: String,
    expiry_date: DateTime<Utc>,
}

impl WasteService {
    /// Create a new WasteService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Convert all lots expired at `now` into waste records
    ///
    /// Locks the expired rows so a lot cannot be allocated from and reaped
    /// at the same moment. Re-running with no new expirations creates no
    /// additional records.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> AppResult<SweepOutcome> {
        let mut tx = self.db.begin().await?;

        let expired = sqlx::query_as::<_, ExpiredLotRow>(
            r#"
            SELECT id, amount, unit, expiry_date
            FROM stock
            WHERE expiry_date <= $1
            ORDER BY id ASC
            FOR UPDATE
            "#,
        )
        .bind(now)
        .fetch_all(&mut *tx)
        .await?;

        if expired.is_empty() {
            tracing::debug!("expiry sweep found nothing to reap");
            return Ok(SweepOutcome {
                waste_records_created: 0,
            });
        }

        for lot in &expired {
            sqlx::query(
                r#"
                INSERT INTO waste (stock_id, waste_amount, unit, waste_date, reason, notes)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(lot.id)
            .bind(lot.amount)
            .bind(&lot.unit)
            .bind(now)
            .bind(EXPIRY_REASON)
            .bind(format!("Expired on {}", lot.expiry_date.to_rfc3339()))
            .execute(&mut *tx)
            .await?;

            sqlx::query("DELETE FROM stock WHERE id = $1")
                .bind(lot.id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        tracing::info!(reaped = expired.len(), "expiry sweep removed expired lots");

        Ok(SweepOutcome {
            waste_records_created: expired.len() as u64,
        })
    }

    /// List all waste records, newest first
    pub async fn list_waste(&self) -> AppResult<Vec<Waste>> {
        let rows = sqlx::query_as::<_, WasteRow>(
            r#"
            SELECT id, stock_id, waste_amount, unit, waste_date, reason, notes
            FROM waste
            ORDER BY waste_date DESC, id DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Waste::from).collect())
    }

    /// Get a waste record by id
    pub async fn get_waste(&self, waste_id: i64) -> AppResult<Waste> {
        let row = sqlx::query_as::<_, WasteRow>(
            r#"
            SELECT id, stock_id, waste_amount, unit, waste_date, reason, notes
            FROM waste
            WHERE id = $1
            "#,
        )
        .bind(waste_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Waste record".to_string()))?;

        Ok(row.into())
    }
}
