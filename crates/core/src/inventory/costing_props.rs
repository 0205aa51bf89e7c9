//! Property-based tests for stock costing.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::costing::StockPosition;

fn quantity() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|q| Decimal::new(q, 3))
}

fn cost() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64).prop_map(|c| Decimal::new(c, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// An adjustment followed by its inverse restores the quantity.
    #[test]
    fn prop_adjust_then_inverse_restores_quantity(
        start_qty in quantity(),
        start_cost in cost(),
        delta in quantity(),
        unit_cost in cost(),
    ) {
        let start = StockPosition { quantity: start_qty, reserved: Decimal::ZERO, average_cost: start_cost };
        let up = start.apply_delta(delta, Some(unit_cost)).unwrap();
        let back = up.apply_delta(-delta, None).unwrap();
        prop_assert_eq!(back.quantity, start.quantity);

        let down = start.apply_delta(-start_qty, None).unwrap();
        let restored = down.apply_delta(start_qty, Some(start_cost)).unwrap();
        prop_assert_eq!(restored.quantity, start.quantity);
    }

    /// The weighted average stays between the old and the incoming cost.
    #[test]
    fn prop_average_between_costs(
        start_qty in quantity(),
        start_cost in cost(),
        delta in quantity(),
        unit_cost in cost(),
    ) {
        let start = StockPosition { quantity: start_qty, reserved: Decimal::ZERO, average_cost: start_cost };
        let next = start.apply_delta(delta, Some(unit_cost)).unwrap();
        let lo = start_cost.min(unit_cost) - Decimal::new(1, 4);
        let hi = start_cost.max(unit_cost) + Decimal::new(1, 4);
        prop_assert!(next.average_cost >= lo && next.average_cost <= hi);
    }

    /// Quantity never drops below the reserved amount.
    #[test]
    fn prop_never_below_reserved(
        start_qty in quantity(),
        reserve_pct in 0u32..=100,
        delta in quantity(),
    ) {
        let reserved = (start_qty * Decimal::from(reserve_pct) / Decimal::ONE_HUNDRED).round_dp(3);
        let start = StockPosition { quantity: start_qty, reserved, average_cost: Decimal::ONE };
        if let Ok(next) = start.apply_delta(-delta, None) {
            prop_assert!(next.quantity >= next.reserved);
        }
    }
}
