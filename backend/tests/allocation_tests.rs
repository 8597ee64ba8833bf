//! Stock allocation engine tests
//!
//! Covers the FIFO planner invariants:
//! - Oldest-purchase-first consumption with partial fill of the last lot
//! - Insufficiency produces a shortfall and no plan
//! - Expired lots are never eligible
//! - Cost is charged at the pre-deduction cost-per-unit and conserved

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use larder_backend::services::allocation::{filter_eligible, plan_fifo, Shortfall};
use shared::StockLot;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 10, 12, 0, 0).unwrap()
}

/// Build a lot purchased `purchased_days_ago` days before base time,
/// expiring `expires_in_days` days after it
fn lot(id: i64, amount: &str, cost: &str, purchased_days_ago: i64, expires_in_days: i64) -> StockLot {
    StockLot {
        id,
        ingredient_id: 1,
        name: format!("lot-{}", id),
        amount: dec(amount),
        unit: "kg".to_string(),
        purchase_date: base_time() - Duration::days(purchased_days_ago),
        expiry_date: base_time() + Duration::days(expires_in_days),
        cost: dec(cost),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Lots [5, 5, 5] purchased T1 < T2 < T3; allocating 7 drains lot 1 and
    /// takes 2 from lot 2, leaving lot 3 untouched
    #[test]
    fn fifo_consumes_oldest_first_with_partial_fill() {
        let lots = vec![
            lot(1, "5", "10", 3, 30),
            lot(2, "5", "10", 2, 30),
            lot(3, "5", "10", 1, 30),
        ];

        let outcome = plan_fifo(&lots, dec("7")).unwrap();

        assert_eq!(outcome.takes.len(), 2);

        assert_eq!(outcome.takes[0].stock_id, 1);
        assert_eq!(outcome.takes[0].taken, dec("5"));
        assert_eq!(outcome.takes[0].remaining_amount, Decimal::ZERO);

        assert_eq!(outcome.takes[1].stock_id, 2);
        assert_eq!(outcome.takes[1].taken, dec("2"));
        assert_eq!(outcome.takes[1].remaining_amount, dec("3"));
    }

    /// Requesting more than every eligible lot holds fails with the exact
    /// shortfall; no plan exists to apply
    #[test]
    fn insufficiency_reports_shortfall() {
        let lots = vec![lot(1, "5", "10", 2, 30), lot(2, "5", "10", 1, 30)];

        let err = plan_fifo(&lots, dec("12")).unwrap_err();
        assert_eq!(err, Shortfall { short: dec("2") });
    }

    #[test]
    fn zero_eligible_lots_fail_by_full_amount() {
        let err = plan_fifo(&[], dec("4")).unwrap_err();
        assert_eq!(err, Shortfall { short: dec("4") });
    }

    /// An expired lot is filtered out even when it has capacity
    #[test]
    fn expired_lots_are_not_eligible() {
        let lots = vec![
            lot(1, "100", "50", 5, -1), // expired yesterday
            lot(2, "3", "6", 1, 30),
        ];

        let eligible = filter_eligible(lots, base_time());
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].id, 2);

        let err = plan_fifo(&eligible, dec("10")).unwrap_err();
        assert_eq!(err.short, dec("7"));
    }

    /// A lot expiring exactly now is already expired
    #[test]
    fn expiry_boundary_is_exclusive() {
        let lots = vec![lot(1, "5", "10", 1, 0)];
        assert!(filter_eligible(lots, base_time()).is_empty());
    }

    #[test]
    fn eligible_lots_sorted_by_purchase_date_then_id() {
        let lots = vec![
            lot(7, "1", "1", 1, 30),
            lot(3, "1", "1", 5, 30),
            lot(5, "1", "1", 5, 30),
        ];

        let eligible = filter_eligible(lots, base_time());
        let ids: Vec<i64> = eligible.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![3, 5, 7]);
    }

    /// Taking 4 from a lot of amount 10 / cost 100 charges 4 x (100/10) = 40
    /// and leaves the lot at amount 6 / cost 60
    #[test]
    fn cost_charged_at_pre_deduction_unit_cost() {
        let lots = vec![lot(1, "10", "100", 1, 30)];

        let outcome = plan_fifo(&lots, dec("4")).unwrap();

        assert_eq!(outcome.takes.len(), 1);
        assert_eq!(outcome.takes[0].charged_cost, dec("40"));
        assert_eq!(outcome.takes[0].remaining_amount, dec("6"));
        assert_eq!(outcome.takes[0].remaining_cost, dec("60"));
        assert_eq!(outcome.total_cost, dec("40"));
    }

    /// Draining a lot completely transfers its exact remaining cost, with no
    /// division residue
    #[test]
    fn full_drain_transfers_exact_cost() {
        let lots = vec![lot(1, "3", "100", 2, 30), lot(2, "10", "10", 1, 30)];

        let outcome = plan_fifo(&lots, dec("3")).unwrap();

        assert_eq!(outcome.takes.len(), 1);
        assert_eq!(outcome.takes[0].charged_cost, dec("100"));
        assert_eq!(outcome.takes[0].remaining_cost, Decimal::ZERO);
    }

    /// Exhausted lots are skipped entirely (no zero division, no take)
    #[test]
    fn zero_amount_lots_are_skipped() {
        let lots = vec![lot(1, "0", "0", 3, 30), lot(2, "5", "10", 1, 30)];

        let outcome = plan_fifo(&lots, dec("2")).unwrap();

        assert_eq!(outcome.takes.len(), 1);
        assert_eq!(outcome.takes[0].stock_id, 2);
    }

    #[test]
    fn charged_costs_sum_to_total() {
        let lots = vec![
            lot(1, "2", "8", 3, 30),
            lot(2, "4", "10", 2, 30),
            lot(3, "6", "9", 1, 30),
        ];

        let outcome = plan_fifo(&lots, dec("9")).unwrap();
        let sum: Decimal = outcome.takes.iter().map(|t| t.charged_cost).sum();
        assert_eq!(sum, outcome.total_cost);
    }

    #[test]
    fn fractional_amounts_allocate_exactly() {
        let lots = vec![lot(1, "0.75", "3", 2, 30), lot(2, "1.5", "4.5", 1, 30)];

        let outcome = plan_fifo(&lots, dec("1.25")).unwrap();

        assert_eq!(outcome.takes[0].taken, dec("0.75"));
        assert_eq!(outcome.takes[1].taken, dec("0.5"));
        // Lot 2 charges 0.5 x (4.5 / 1.5) = 1.5
        assert_eq!(outcome.takes[1].charged_cost, dec("1.5"));
        assert_eq!(outcome.total_cost, dec("4.5"));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for lot amounts: 0.01 to 100.00
    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=10000i64).prop_map(|n| Decimal::new(n, 2))
    }

    /// Strategy for lot costs: 0.00 to 500.00
    fn cost_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..=50000i64).prop_map(|n| Decimal::new(n, 2))
    }

    fn lots_strategy() -> impl Strategy<Value = Vec<StockLot>> {
        prop::collection::vec((amount_strategy(), cost_strategy()), 1..8).prop_map(|entries| {
            entries
                .into_iter()
                .enumerate()
                .map(|(i, (amount, cost))| StockLot {
                    id: i as i64 + 1,
                    ingredient_id: 1,
                    name: format!("lot-{}", i + 1),
                    amount,
                    unit: "kg".to_string(),
                    purchase_date: base_time() - Duration::days(30 - i as i64),
                    expiry_date: base_time() + Duration::days(30),
                    cost,
                })
                .collect()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// On success the takes cover the requirement exactly
        #[test]
        fn prop_successful_plan_covers_requirement(
            lots in lots_strategy(),
            numerator in 1i64..=100i64
        ) {
            let total: Decimal = lots.iter().map(|l| l.amount).sum();
            let required = total * Decimal::new(numerator, 2); // 1%..100% of total

            let outcome = plan_fifo(&lots, required).unwrap();
            let taken: Decimal = outcome.takes.iter().map(|t| t.taken).sum();
            prop_assert_eq!(taken, required);
        }

        /// A plan fails exactly when the requirement exceeds the total, and
        /// the shortfall is the uncovered remainder
        #[test]
        fn prop_fails_iff_requirement_exceeds_total(
            lots in lots_strategy(),
            extra in 1i64..=10000i64
        ) {
            let total: Decimal = lots.iter().map(|l| l.amount).sum();
            let excess = Decimal::new(extra, 2);

            let err = plan_fifo(&lots, total + excess).unwrap_err();
            prop_assert_eq!(err.short, excess);

            prop_assert!(plan_fifo(&lots, total).is_ok());
        }

        /// Cost is conserved per lot: charged + remaining equals the
        /// original cost, and nothing goes negative
        #[test]
        fn prop_cost_conserved_per_lot(
            lots in lots_strategy(),
            numerator in 1i64..=100i64
        ) {
            let total: Decimal = lots.iter().map(|l| l.amount).sum();
            let required = total * Decimal::new(numerator, 2);

            let outcome = plan_fifo(&lots, required).unwrap();
            for take in &outcome.takes {
                let original = lots.iter().find(|l| l.id == take.stock_id).unwrap();
                prop_assert_eq!(take.charged_cost + take.remaining_cost, original.cost);
                prop_assert_eq!(take.taken + take.remaining_amount, original.amount);
                prop_assert!(take.remaining_cost >= Decimal::ZERO);
                prop_assert!(take.remaining_amount >= Decimal::ZERO);
            }
        }

        /// The reported total is the sum of the per-lot charges
        #[test]
        fn prop_total_cost_is_sum_of_charges(
            lots in lots_strategy(),
            numerator in 1i64..=100i64
        ) {
            let total: Decimal = lots.iter().map(|l| l.amount).sum();
            let required = total * Decimal::new(numerator, 2);

            let outcome = plan_fifo(&lots, required).unwrap();
            let sum: Decimal = outcome.takes.iter().map(|t| t.charged_cost).sum();
            prop_assert_eq!(sum, outcome.total_cost);
        }

        /// Takes follow the FIFO order of the snapshot and only the last
        /// take may be partial
        #[test]
        fn prop_takes_follow_fifo_order(
            lots in lots_strategy(),
            numerator in 1i64..=100i64
        ) {
            let total: Decimal = lots.iter().map(|l| l.amount).sum();
            let required = total * Decimal::new(numerator, 2);

            let outcome = plan_fifo(&lots, required).unwrap();
            for (i, take) in outcome.takes.iter().enumerate() {
                let original = lots.iter().find(|l| l.id == take.stock_id).unwrap();
                if i + 1 < outcome.takes.len() {
                    // Every take except the last drains its lot
                    prop_assert_eq!(take.taken, original.amount);
                }
            }

            // Take order matches snapshot order
            let snapshot_order: Vec<i64> = lots
                .iter()
                .filter(|l| l.amount > Decimal::ZERO)
                .map(|l| l.id)
                .collect();
            let take_order: Vec<i64> = outcome.takes.iter().map(|t| t.stock_id).collect();
            prop_assert_eq!(&snapshot_order[..take_order.len()], &take_order[..]);
        }
    }
}
