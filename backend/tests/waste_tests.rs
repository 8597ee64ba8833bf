//! Expiry reaper tests
//!
//! Covers the sweep semantics at the domain level:
//! - Only lots at or past their expiry date are reaped
//! - Waste records carry the lot's full remaining amount and unit
//! - A second sweep with no new expirations produces nothing

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::{StockLot, Waste};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 10, 12, 0, 0).unwrap()
}

fn lot(id: i64, amount: &str, expires_in_days: i64) -> StockLot {
    StockLot {
        id,
        ingredient_id: 1,
        name: format!("lot-{}", id),
        amount: dec(amount),
        unit: "kg".to_string(),
        purchase_date: base_time() - Duration::days(10),
        expiry_date: base_time() + Duration::days(expires_in_days),
        cost: dec("10"),
    }
}

/// Mirror of the sweep: convert expired lots into waste records, keep the
/// rest
fn sweep(lots: Vec<StockLot>, now: DateTime<Utc>) -> (Vec<StockLot>, Vec<Waste>) {
    let mut surviving = Vec::new();
    let mut waste = Vec::new();

    for lot in lots {
        if lot.is_expired(now) {
            waste.push(Waste {
                id: waste.len() as i64 + 1,
                stock_id: lot.id,
                waste_amount: lot.amount,
                unit: lot.unit.clone(),
                waste_date: now,
                reason: "Expired".to_string(),
                notes: Some(format!("Expired on {}", lot.expiry_date.to_rfc3339())),
            });
        } else {
            surviving.push(lot);
        }
    }

    (surviving, waste)
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn only_expired_lots_are_reaped() {
        let lots = vec![lot(1, "5", -2), lot(2, "3", 1), lot(3, "4", -1)];

        let (surviving, waste) = sweep(lots, base_time());

        assert_eq!(surviving.len(), 1);
        assert_eq!(surviving[0].id, 2);

        let reaped: Vec<i64> = waste.iter().map(|w| w.stock_id).collect();
        assert_eq!(reaped, vec![1, 3]);
    }

    /// A lot expiring exactly at the sweep instant is reaped
    #[test]
    fn expiry_boundary_is_inclusive() {
        let lots = vec![lot(1, "5", 0)];
        let (surviving, waste) = sweep(lots, base_time());
        assert!(surviving.is_empty());
        assert_eq!(waste.len(), 1);
    }

    /// The waste record carries the lot's remaining amount, its unit, and
    /// the expiry reason
    #[test]
    fn waste_record_mirrors_the_lot() {
        let lots = vec![lot(7, "2.25", -3)];
        let (_, waste) = sweep(lots, base_time());

        assert_eq!(waste.len(), 1);
        assert_eq!(waste[0].stock_id, 7);
        assert_eq!(waste[0].waste_amount, dec("2.25"));
        assert_eq!(waste[0].unit, "kg");
        assert_eq!(waste[0].reason, "Expired");
        assert_eq!(waste[0].waste_date, base_time());
    }

    /// Sweeping twice with no new expirations creates nothing the second
    /// time
    #[test]
    fn second_sweep_is_a_no_op() {
        let lots = vec![lot(1, "5", -2), lot(2, "3", 5)];

        let (surviving, first_waste) = sweep(lots, base_time());
        assert_eq!(first_waste.len(), 1);

        let (surviving, second_waste) = sweep(surviving, base_time());
        assert!(second_waste.is_empty());
        assert_eq!(surviving.len(), 1);
    }

    /// An exhausted lot still gets a waste record when it expires; the
    /// amount is just zero
    #[test]
    fn exhausted_expired_lot_is_still_reaped() {
        let lots = vec![lot(1, "0", -1)];
        let (_, waste) = sweep(lots, base_time());
        assert_eq!(waste.len(), 1);
        assert_eq!(waste[0].waste_amount, Decimal::ZERO);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn lots_strategy() -> impl Strategy<Value = Vec<StockLot>> {
        prop::collection::vec((1i64..=10000i64, -30i64..=30i64), 0..12).prop_map(|entries| {
            entries
                .into_iter()
                .enumerate()
                .map(|(i, (amount, expires_in))| {
                    let mut l = lot(i as i64 + 1, "1", expires_in);
                    l.amount = Decimal::new(amount, 2);
                    l
                })
                .collect()
        })
    }

    proptest! {
        /// Every lot either survives or is recorded as waste, never both
        #[test]
        fn prop_sweep_partitions_lots(lots in lots_strategy()) {
            let count = lots.len();
            let (surviving, waste) = sweep(lots, base_time());

            prop_assert_eq!(surviving.len() + waste.len(), count);
            for survivor in &surviving {
                prop_assert!(!waste.iter().any(|w| w.stock_id == survivor.id));
                prop_assert!(!survivor.is_expired(base_time()));
            }
        }

        /// Wasted amount equals the amount the reaped lots held
        #[test]
        fn prop_wasted_amount_matches_reaped_lots(lots in lots_strategy()) {
            let expired_total: Decimal = lots
                .iter()
                .filter(|l| l.is_expired(base_time()))
                .map(|l| l.amount)
                .sum();

            let (_, waste) = sweep(lots, base_time());
            let wasted_total: Decimal = waste.iter().map(|w| w.waste_amount).sum();

            prop_assert_eq!(wasted_total, expired_total);
        }

        /// Sweeping is idempotent
        #[test]
        fn prop_sweep_idempotent(lots in lots_strategy()) {
            let (surviving, _) = sweep(lots, base_time());
            let (after_second, second_waste) = sweep(surviving.clone(), base_time());

            prop_assert!(second_waste.is_empty());
            prop_assert_eq!(after_second.len(), surviving.len());
        }
    }
}
