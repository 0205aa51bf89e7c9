//! Property-based tests for invoice payments.
//!
//! `amount_due = total − amount_paid` holds after every accepted payment.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::service::InvoiceService;
use super::types::InvoiceStatus;

fn cents(max: i64) -> impl Strategy<Value = Decimal> {
    (1i64..max).prop_map(|c| Decimal::new(c, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_amount_due_tracks_payments(
        total in cents(10_000_000),
        payments in prop::collection::vec(cents(2_000_000), 1..10),
    ) {
        let mut status = InvoiceStatus::Sent;
        let mut paid = Decimal::ZERO;

        for amount in payments {
            match InvoiceService::apply_payment(status, total, paid, amount) {
                Ok(outcome) => {
                    prop_assert_eq!(outcome.amount_due, total - outcome.amount_paid);
                    prop_assert!(outcome.amount_due >= Decimal::ZERO);
                    prop_assert_eq!(outcome.status == InvoiceStatus::Paid, outcome.amount_due.is_zero());
                    status = outcome.status;
                    paid = outcome.amount_paid;
                }
                Err(_) => {
                    // Rejected payments leave state untouched.
                    prop_assert!(status == InvoiceStatus::Paid || amount > total - paid);
                }
            }
        }
    }
}
