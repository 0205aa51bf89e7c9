//! Property-based tests for leave balances.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::leave::LeaveBalance;

#[derive(Debug, Clone, Copy)]
enum Op {
    Submit(i64),
    Approve,
    Reject,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1i64..10).prop_map(Op::Submit),
        Just(Op::Approve),
        Just(Op::Reject),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Through any sequence of submit/approve/reject, the balance identity holds
    /// and remaining never goes negative.
    #[test]
    fn prop_balance_identity(
        entitled in 0i64..40,
        carried in 0i64..10,
        ops in prop::collection::vec(op(), 0..30),
    ) {
        let mut balance = LeaveBalance::new(Decimal::from(entitled), Decimal::from(carried)).unwrap();
        let mut held: Vec<Decimal> = Vec::new();

        for op in ops {
            match op {
                Op::Submit(days) => {
                    let days = Decimal::from(days);
                    if let Ok(next) = balance.submit(days) {
                        balance = next;
                        held.push(days);
                    }
                }
                Op::Approve => {
                    if let Some(days) = held.pop() {
                        balance = balance.approve(days);
                    }
                }
                Op::Reject => {
                    if let Some(days) = held.pop() {
                        balance = balance.release_pending(days);
                    }
                }
            }

            prop_assert_eq!(
                balance.remaining(),
                balance.entitled - balance.taken - balance.pending + balance.carried_over
            );
            prop_assert!(balance.remaining() >= Decimal::ZERO);
            prop_assert_eq!(balance.pending, held.iter().copied().sum::<Decimal>());
        }
    }
}
