//! Property-based tests for payslip calculation.

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::calculation::PayrollCalculator;
use super::types::{EmployeePay, PayrollSettings};

fn money() -> impl Strategy<Value = Decimal> {
    (0i64..2_000_000i64).prop_map(|c| Decimal::new(c, 2))
}

fn rate() -> impl Strategy<Value = Decimal> {
    (0i64..=3000i64).prop_map(|r| Decimal::new(r, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Net plus deductions always equals gross, and tax is never negative.
    #[test]
    fn prop_net_plus_deductions_is_gross(
        base in money(),
        allowances in money(),
        bonus in money(),
        tax in rate(),
        pension in rate(),
        health in rate(),
        allowance in money(),
    ) {
        let settings = PayrollSettings {
            income_tax_rate: tax,
            tax_free_allowance: allowance,
            pension_rate: pension,
            health_insurance_rate: health,
            ..PayrollSettings::default()
        };
        let pay = EmployeePay {
            employee_id: Uuid::new_v4(),
            base_salary: base,
            allowances,
            bonus,
            other_deductions: Decimal::ZERO,
        };

        let slip = PayrollCalculator::calculate(&settings, &pay).unwrap();
        prop_assert_eq!(slip.net + slip.total_deductions, slip.gross);
        prop_assert!(slip.income_tax >= Decimal::ZERO);
        prop_assert!(slip.taxable_income >= Decimal::ZERO);
        prop_assert!(slip.net >= Decimal::ZERO);
    }
}
