//! Recipe execution engine tests
//!
//! Exercises the engine's arithmetic and its all-or-nothing contract at the
//! planning level:
//! - Requirements scale by the requested output quantity
//! - A shortfall on any ingredient aborts the whole execution with no
//!   deduction applied
//! - Processed output cost is the sum of allocation charges plus the
//!   processing cost
//! - Full recipe execution records the sale values it was given

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;

use larder_backend::services::allocation::{plan_fifo, AllocationOutcome, Shortfall};
use shared::{RecipeKind, StockLot};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 10, 12, 0, 0).unwrap()
}

fn lot(id: i64, ingredient_id: i64, amount: &str, cost: &str, purchased_days_ago: i64) -> StockLot {
    StockLot {
        id,
        ingredient_id,
        name: format!("lot-{}", id),
        amount: dec(amount),
        unit: "kg".to_string(),
        purchase_date: base_time() - Duration::days(purchased_days_ago),
        expiry_date: base_time() + Duration::days(30),
        cost: dec(cost),
    }
}

/// In-memory stand-in for the stock ledger, keyed by ingredient
type Ledger = HashMap<i64, Vec<StockLot>>;

/// Mirror of the engine's allocation loop: plan every ingredient requirement
/// scaled by `quantity`, applying nothing unless every plan succeeds.
///
/// Returns the per-ingredient outcomes, or the failing ingredient and its
/// shortfall.
fn plan_recipe(
    ledger: &Ledger,
    requirements: &[(i64, Decimal)],
    quantity: Decimal,
) -> Result<Vec<(i64, AllocationOutcome)>, (i64, Shortfall)> {
    let mut outcomes = Vec::new();
    let mut working: Ledger = ledger.clone();

    for &(ingredient_id, required_amount) in requirements {
        let lots = working.entry(ingredient_id).or_default();
        let required = required_amount * quantity;
        let outcome = plan_fifo(lots, required).map_err(|s| (ingredient_id, s))?;

        // Apply to the working copy so later requirements for the same
        // ingredient see the deductions
        for take in &outcome.takes {
            let lot = lots.iter_mut().find(|l| l.id == take.stock_id).unwrap();
            lot.amount = take.remaining_amount;
            lot.cost = take.remaining_cost;
        }
        outcomes.push((ingredient_id, outcome));
    }

    Ok(outcomes)
}

/// Apply planned outcomes to a ledger (the commit step)
fn apply(ledger: &mut Ledger, outcomes: &[(i64, AllocationOutcome)]) {
    for (ingredient_id, outcome) in outcomes {
        let lots = ledger.get_mut(ingredient_id).unwrap();
        for take in &outcome.takes {
            let lot = lots.iter_mut().find(|l| l.id == take.stock_id).unwrap();
            lot.amount = take.remaining_amount;
            lot.cost = take.remaining_cost;
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Requirements are per unit of output and scale by the quantity
    #[test]
    fn requirements_scale_by_output_quantity() {
        let mut ledger = Ledger::new();
        ledger.insert(1, vec![lot(1, 1, "10", "20", 1)]);
        ledger.insert(2, vec![lot(2, 2, "10", "30", 1)]);

        // 0.5 of ingredient 1 and 2 of ingredient 2 per unit; 4 units out
        let requirements = vec![(1, dec("0.5")), (2, dec("2"))];
        let outcomes = plan_recipe(&ledger, &requirements, dec("4")).unwrap();

        let taken_1: Decimal = outcomes[0].1.takes.iter().map(|t| t.taken).sum();
        let taken_2: Decimal = outcomes[1].1.takes.iter().map(|t| t.taken).sum();
        assert_eq!(taken_1, dec("2"));
        assert_eq!(taken_2, dec("8"));
    }

    /// A shortfall on the second ingredient leaves the first ingredient's
    /// lots exactly as they were: nothing is applied
    #[test]
    fn shortfall_on_later_ingredient_applies_nothing() {
        let mut ledger = Ledger::new();
        ledger.insert(1, vec![lot(1, 1, "10", "20", 1)]);
        ledger.insert(2, vec![lot(2, 2, "1", "5", 1)]);

        let requirements = vec![(1, dec("1")), (2, dec("3"))];
        let before = ledger.clone();

        let err = plan_recipe(&ledger, &requirements, dec("2")).unwrap_err();
        assert_eq!(err.0, 2);
        assert_eq!(err.1.short, dec("5")); // needed 6, had 1

        // No commit happened; the ledger is untouched
        assert_eq!(ledger[&1][0].amount, before[&1][0].amount);
        assert_eq!(ledger[&1][0].cost, before[&1][0].cost);
        assert_eq!(ledger[&2][0].amount, before[&2][0].amount);
    }

    /// Total processed cost is the sum of every ingredient's charges plus
    /// the processing cost, and the derived lot carries it all
    #[test]
    fn processed_cost_sums_charges_and_processing_cost() {
        let mut ledger = Ledger::new();
        ledger.insert(1, vec![lot(1, 1, "10", "100", 1)]); // 10/unit
        ledger.insert(2, vec![lot(2, 2, "8", "16", 1)]); // 2/unit

        let requirements = vec![(1, dec("2")), (2, dec("1"))];
        let quantity = dec("2");
        let processing_cost = dec("5");

        let outcomes = plan_recipe(&ledger, &requirements, quantity).unwrap();
        let ingredient_cost: Decimal = outcomes.iter().map(|(_, o)| o.total_cost).sum();
        // 4 x 10 + 2 x 2 = 44
        assert_eq!(ingredient_cost, dec("44"));

        let total_cost = ingredient_cost + processing_cost;
        assert_eq!(total_cost, dec("49"));

        // The derived lot stocks the full output at the full cost, so its
        // cost-per-unit is total / quantity
        let derived_unit_cost = total_cost / quantity;
        assert_eq!(derived_unit_cost, dec("24.5"));
    }

    /// Executing a full recipe with quantity 3 deducts required x 3 from
    /// each constituent ingredient's stock
    #[test]
    fn full_recipe_deducts_scaled_requirements() {
        let mut ledger = Ledger::new();
        ledger.insert(1, vec![lot(1, 1, "10", "20", 1)]);
        ledger.insert(2, vec![lot(2, 2, "10", "40", 1)]);

        let requirements = vec![(1, dec("1.5")), (2, dec("2"))];

        let outcomes = plan_recipe(&ledger, &requirements, dec("3")).unwrap();
        apply(&mut ledger, &outcomes);

        assert_eq!(ledger[&1][0].amount, dec("5.5")); // 10 - 4.5
        assert_eq!(ledger[&2][0].amount, dec("4")); // 10 - 6

        // 4.5 at 2/kg plus 6 at 4/kg
        let ingredient_cost: Decimal = outcomes.iter().map(|(_, o)| o.total_cost).sum();
        assert_eq!(ingredient_cost, dec("33"));
    }

    /// Two requirements for the same ingredient drain the same lots in
    /// sequence rather than double-spending them
    #[test]
    fn repeated_ingredient_sees_prior_deductions() {
        let mut ledger = Ledger::new();
        ledger.insert(1, vec![lot(1, 1, "5", "10", 1)]);

        let requirements = vec![(1, dec("2")), (1, dec("2"))];

        let outcomes = plan_recipe(&ledger, &requirements, dec("1")).unwrap();
        apply(&mut ledger, &outcomes);
        assert_eq!(ledger[&1][0].amount, dec("1"));

        // A third unit would not have fit
        let requirements = vec![(1, dec("3")), (1, dec("3"))];
        assert!(plan_recipe(&ledger, &requirements, dec("1")).is_err());
    }

    #[test]
    fn recipe_kind_round_trips() {
        for kind in [RecipeKind::Processed, RecipeKind::FullRecipe] {
            assert_eq!(RecipeKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(RecipeKind::parse("souffle"), None);
    }
}
