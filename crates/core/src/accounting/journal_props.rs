//! Property-based tests for journal posting.
//!
//! - Posted entries balance within tolerance.
//! - Voiding restores every affected balance to its pre-posting value.

use std::collections::HashMap;

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::journal::JournalService;
use super::types::{AccountInfo, AccountType, FiscalStatus, JournalLineInput, JournalStatus};

/// Strategy to generate a valid positive amount (0.01 to 1,000,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn account_type_strategy() -> impl Strategy<Value = AccountType> {
    prop::sample::select(AccountType::ALL.to_vec())
}

fn apply(balances: &mut HashMap<Uuid, Decimal>, deltas: &[super::types::BalanceDelta]) {
    for d in deltas {
        *balances.entry(d.account_id).or_default() += d.delta;
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Any entry whose debits are split from one total and credited in one line
    /// resolves balanced and is accepted for posting.
    #[test]
    fn prop_split_entry_posts(
        parts in prop::collection::vec(positive_amount(), 1..6),
    ) {
        let total: Decimal = parts.iter().copied().sum();
        let mut lines: Vec<JournalLineInput> = parts
            .iter()
            .map(|&amount| JournalLineInput {
                account_id: Uuid::new_v4(),
                description: None,
                debit: amount,
                credit: Decimal::ZERO,
                currency: None,
                exchange_rate: None,
            })
            .collect();
        lines.push(JournalLineInput {
            account_id: Uuid::new_v4(),
            description: None,
            debit: Decimal::ZERO,
            credit: total,
            currency: None,
            exchange_rate: None,
        });

        let resolved = JournalService::resolve_lines(&lines, "USD", |id| {
            Some(AccountInfo { id, account_type: AccountType::Asset, is_active: true })
        })
        .unwrap();
        let totals = JournalService::calculate_totals(&resolved);

        prop_assert!(totals.is_balanced);
        prop_assert!((totals.total_debit - totals.total_credit).abs() <= Decimal::new(1, 2));
        prop_assert!(
            JournalService::validate_can_post(JournalStatus::Draft, &totals, FiscalStatus::Open).is_ok()
        );
    }

    /// Posting then voiding leaves every balance unchanged.
    #[test]
    fn prop_void_restores_balances(
        entries in prop::collection::vec(
            (0usize..4, account_type_strategy(), positive_amount(), any::<bool>()),
            2..10,
        ),
        opening in prop::collection::vec(positive_amount(), 4),
    ) {
        let accounts: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
        let lines: Vec<_> = entries
            .iter()
            .map(|&(idx, account_type, amount, is_debit)| {
                let (debit, credit) = if is_debit {
                    (amount, Decimal::ZERO)
                } else {
                    (Decimal::ZERO, amount)
                };
                (accounts[idx], account_type, debit, credit)
            })
            .collect();

        let mut balances: HashMap<Uuid, Decimal> =
            accounts.iter().copied().zip(opening.iter().copied()).collect();
        let before = balances.clone();

        apply(&mut balances, &JournalService::posting_deltas(&lines));
        apply(&mut balances, &JournalService::void_deltas(&lines));

        prop_assert_eq!(balances, before);
    }
}
