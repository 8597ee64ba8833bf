//! Validation utilities for the Larder platform

use rust_decimal::Decimal;

// ============================================================================
// Quantity and money validations
// ============================================================================

/// Validate that an amount (stock quantity, required amount, output quantity)
/// is strictly positive
pub fn validate_positive_amount(amount: Decimal) -> Result<(), &'static str> {
    if amount <= Decimal::ZERO {
        return Err("Amount must be positive");
    }
    Ok(())
}

/// Validate that a cost or price is not negative
pub fn validate_non_negative_cost(cost: Decimal) -> Result<(), &'static str> {
    if cost < Decimal::ZERO {
        return Err("Cost cannot be negative");
    }
    Ok(())
}

// ============================================================================
// Name and text validations
// ============================================================================

/// Validate a required name field
pub fn validate_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("Name cannot be empty");
    }
    Ok(())
}

/// Validate a measurement unit string
pub fn validate_unit(unit: &str) -> Result<(), &'static str> {
    if unit.trim().is_empty() {
        return Err("Unit cannot be empty");
    }
    Ok(())
}

// ============================================================================
// Category tag handling
// ============================================================================
//
// The database keeps ingredient categories in one comma-separated column;
// the API exposes them as a list. Tags are trimmed and empty tags dropped
// on the way in, so the round-trip is stable.

/// Join category tags into the stored comma-separated form
pub fn join_categories(categories: &[String]) -> String {
    categories
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

/// Split the stored comma-separated form back into tags
pub fn split_categories(stored: &str) -> Vec<String> {
    stored
        .split(',')
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .map(|c| c.to_string())
        .collect()
}

/// Validate category tags (no embedded commas, no blank tags)
pub fn validate_categories(categories: &[String]) -> Result<(), &'static str> {
    for c in categories {
        if c.trim().is_empty() {
            return Err("Category tags cannot be blank");
        }
        if c.contains(',') {
            return Err("Category tags cannot contain commas");
        }
    }
    Ok(())
}

// ============================================================================
// Recipe step validations
// ============================================================================

/// Validate step numbers: positive and unique within the recipe
pub fn validate_step_numbers(step_numbers: &[i32]) -> Result<(), &'static str> {
    let mut seen = std::collections::HashSet::new();
    for &n in step_numbers {
        if n < 1 {
            return Err("Step numbers start at 1");
        }
        if !seen.insert(n) {
            return Err("Step numbers must be unique");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn positive_amount_accepts_positive() {
        assert!(validate_positive_amount(dec!(0.001)).is_ok());
        assert!(validate_positive_amount(dec!(42)).is_ok());
    }

    #[test]
    fn positive_amount_rejects_zero_and_negative() {
        assert!(validate_positive_amount(Decimal::ZERO).is_err());
        assert!(validate_positive_amount(dec!(-1)).is_err());
    }

    #[test]
    fn cost_rejects_negative_only() {
        assert!(validate_non_negative_cost(Decimal::ZERO).is_ok());
        assert!(validate_non_negative_cost(dec!(9.99)).is_ok());
        assert!(validate_non_negative_cost(dec!(-0.01)).is_err());
    }

    #[test]
    fn categories_round_trip() {
        let tags = vec!["dairy".to_string(), "chilled".to_string()];
        let stored = join_categories(&tags);
        assert_eq!(stored, "dairy,chilled");
        assert_eq!(split_categories(&stored), tags);
    }

    #[test]
    fn categories_drop_blanks_and_trim() {
        let tags = vec![" dairy ".to_string(), "".to_string()];
        assert_eq!(join_categories(&tags), "dairy");
        assert_eq!(split_categories("a, ,b,"), vec!["a", "b"]);
        assert!(split_categories("").is_empty());
    }

    #[test]
    fn category_validation_rejects_commas() {
        let bad = vec!["a,b".to_string()];
        assert!(validate_categories(&bad).is_err());
    }

    #[test]
    fn step_numbers_must_be_positive_and_unique() {
        assert!(validate_step_numbers(&[1, 2, 3]).is_ok());
        assert!(validate_step_numbers(&[2, 1]).is_ok());
        assert!(validate_step_numbers(&[0]).is_err());
        assert!(validate_step_numbers(&[1, 1]).is_err());
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    /// Strategy for clean category tags (no commas, not blank)
    fn tag_strategy() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_-]{0,15}"
    }

    proptest! {
        /// Clean tags survive the store-and-load round trip unchanged
        #[test]
        fn prop_categories_round_trip(tags in prop::collection::vec(tag_strategy(), 0..8)) {
            prop_assert!(validate_categories(&tags).is_ok());
            let stored = join_categories(&tags);
            prop_assert_eq!(split_categories(&stored), tags);
        }

        /// An amount is either accepted as positive or rejected, matching
        /// its sign exactly
        #[test]
        fn prop_positive_amount_matches_sign(n in -10000i64..=10000i64) {
            let amount = Decimal::new(n, 2);
            prop_assert_eq!(validate_positive_amount(amount).is_ok(), n > 0);
        }
    }
}
