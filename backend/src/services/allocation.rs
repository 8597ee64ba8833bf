//! Stock allocation engine
//!
//! Satisfies a required amount of an ingredient by consuming stock lots
//! oldest-purchase-first. Planning is pure and operates on a snapshot of the
//! eligible lots; the database is only touched once a complete plan exists,
//! so a failed allocation never leaves a partial deduction behind.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::{AppError, AppResult};
use shared::{validate_positive_amount, StockLot};

/// Allocation service owning the transactional entry point
#[derive(Clone)]
pub struct AllocationService {
    db: PgPool,
}

/// One lot's share of an allocation
#[derive(Debug, Clone, Serialize)]
pub struct LotTake {
    pub stock_id: i64,
    /// Quantity taken from this lot
    pub taken: Decimal,
    /// Cost charged for the taken quantity, at the lot's pre-deduction
    /// cost-per-unit
    pub charged_cost: Decimal,
    /// Lot amount after the deduction
    pub remaining_amount: Decimal,
    /// Lot cost after the deduction
    pub remaining_cost: Decimal,
}

/// A complete, applicable allocation
#[derive(Debug, Clone, Serialize)]
pub struct AllocationOutcome {
    /// Takes in consumption order (oldest lot first)
    pub takes: Vec<LotTake>,
    /// Sum of charged costs across all takes
    pub total_cost: Decimal,
}

/// Planning failed: the eligible lots cannot cover the requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shortfall {
    /// Amount still uncovered after every eligible lot is drained
    pub short: Decimal,
}

/// Keep only lots the allocator may touch, in FIFO order
///
/// Mirrors the ledger contract: expired lots are never allocated, and lots
/// are consumed by ascending purchase date (id breaks ties so replays are
/// deterministic).
pub fn filter_eligible(mut lots: Vec<StockLot>, now: DateTime<Utc>) -> Vec<StockLot> {
    lots.retain(|lot| !lot.is_expired(now));
    lots.sort_by(|a, b| {
        a.purchase_date
            .cmp(&b.purchase_date)
            .then(a.id.cmp(&b.id))
    });
    lots
}

/// Build a FIFO allocation plan against a snapshot of eligible lots
///
/// Walks the lots in order, taking `min(lot.amount, remaining)` from each.
/// The cost charged per unit is `lot.cost / lot.amount` with the amount read
/// *before* the deduction; the lot's stored cost then shrinks by the charged
/// cost so its remaining cost-per-unit is unchanged. A fully drained lot
/// transfers its exact remaining cost, which keeps the charge free of
/// division rounding.
///
/// Lots already at zero amount are skipped; they have nothing to give and
/// stay in the ledger until reaped.
pub fn plan_fifo(lots: &[StockLot], required: Decimal) -> Result<AllocationOutcome, Shortfall> {
    let mut takes = Vec::new();
    let mut total_cost = Decimal::ZERO;
    let mut remaining = required;

    for lot in lots {
        if remaining <= Decimal::ZERO {
            break;
        }
        if lot.amount <= Decimal::ZERO {
            continue;
        }

        let taken = lot.amount.min(remaining);
        let charged_cost = if taken == lot.amount {
            lot.cost
        } else {
            (lot.cost / lot.amount) * taken
        };

        takes.push(LotTake {
            stock_id: lot.id,
            taken,
            charged_cost,
            remaining_amount: lot.amount - taken,
            remaining_cost: lot.cost - charged_cost,
        });
        total_cost += charged_cost;
        remaining -= taken;
    }

    if remaining > Decimal::ZERO {
        return Err(Shortfall { short: remaining });
    }

    Ok(AllocationOutcome { takes, total_cost })
}

/// Allocate inside a caller-owned transaction
///
/// Locks every lot of the ingredient (`FOR UPDATE`), so concurrent
/// allocations of the same ingredient serialize and the expiry reaper cannot
/// delete a lot mid-allocation. Eligibility and ordering are then applied to
/// the locked snapshot, the plan is built, and the deductions are written.
/// The caller decides when to commit; dropping the transaction discards
/// every deduction.
pub async fn allocate_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    ingredient_id: i64,
    required_amount: Decimal,
    now: DateTime<Utc>,
) -> AppResult<AllocationOutcome> {
    validate_positive_amount(required_amount).map_err(|msg| AppError::Validation {
        field: "required_amount".to_string(),
        message: msg.to_string(),
    })?;

    let ingredient_exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM ingredient WHERE id = $1)")
            .bind(ingredient_id)
            .fetch_one(&mut **tx)
            .await?;

    if !ingredient_exists {
        return Err(AppError::NotFound("Ingredient".to_string()));
    }

    let rows = sqlx::query_as::<_, StockRow>(
        r#"
        SELECT id, ingredient_id, name, amount, unit, purchase_date, expiry_date, cost
        FROM stock
        WHERE ingredient_id = $1
        ORDER BY purchase_date ASC, id ASC
        FOR UPDATE
        "#,
    )
    .bind(ingredient_id)
    .fetch_all(&mut **tx)
    .await?;

    let eligible = filter_eligible(rows.into_iter().map(StockLot::from).collect(), now);

    let outcome = plan_fifo(&eligible, required_amount).map_err(|shortfall| {
        AppError::InsufficientStock {
            ingredient_id,
            short: shortfall.short,
        }
    })?;

    for take in &outcome.takes {
        sqlx::query("UPDATE stock SET amount = $1, cost = $2 WHERE id = $3")
            .bind(take.remaining_amount)
            .bind(take.remaining_cost)
            .bind(take.stock_id)
            .execute(&mut **tx)
            .await?;
    }

    Ok(outcome)
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

impl AllocationService {
    /// Create a new AllocationService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Allocate stock for an ingredient as a standalone operation
    ///
    /// The whole read-plan-write cycle runs in one transaction; on
    /// insufficiency nothing is persisted.
    pub async fn allocate(
        &self,
        ingredient_id: i64,
        required_amount: Decimal,
    ) -> AppResult<AllocationOutcome> {
        let now = Utc::now();
        let mut tx = self.db.begin().await?;

        let outcome = allocate_in_tx(&mut tx, ingredient_id, required_amount, now).await?;

        tx.commit().await?;

        tracing::info!(
            ingredient_id,
            %required_amount,
            lots = outcome.takes.len(),
            total_cost = %outcome.total_cost,
            "allocated stock"
        );

        Ok(outcome)
    }
}
