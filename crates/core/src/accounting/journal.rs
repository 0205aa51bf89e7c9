//! Journal entry validation, posting and voiding.
//!
//! Pure functions: the repository loads accounts and entries, asks this
//! service what to do, and persists the result in one transaction.

use std::collections::HashMap;

use rust_decimal::Decimal;
use uuid::Uuid;

use kontor_shared::types::round_base;

use super::error::AccountingError;
use super::types::{
    AccountInfo, AccountType, BalanceDelta, FiscalStatus, JournalLineInput, JournalStatus,
    JournalTotals, ResolvedLine,
};

/// Journal service for line resolution and state transitions.
pub struct JournalService;

impl JournalService {
    /// Validates and resolves the lines of a draft entry.
    ///
    /// 1. At least 2 lines
    /// 2. Each line carries exactly one positive side, no negatives
    /// 3. Exchange rate (default 1) is positive
    /// 4. Account exists in the organization and is active
    /// 5. Base amounts use Banker's Rounding to 4 decimal places
    ///
    /// Drafts may be unbalanced; balance is checked on posting.
    pub fn resolve_lines<A>(
        lines: &[JournalLineInput],
        base_currency: &str,
        account_lookup: A,
    ) -> Result<Vec<ResolvedLine>, AccountingError>
    where
        A: Fn(Uuid) -> Option<AccountInfo>,
    {
        if lines.len() < 2 {
            return Err(AccountingError::InsufficientLines);
        }

        let mut resolved = Vec::with_capacity(lines.len());
        for (idx, line) in lines.iter().enumerate() {
            let line_no = idx + 1;

            if line.debit < Decimal::ZERO || line.credit < Decimal::ZERO {
                return Err(AccountingError::NegativeAmount(line_no));
            }
            let has_debit = line.debit > Decimal::ZERO;
            let has_credit = line.credit > Decimal::ZERO;
            if has_debit == has_credit {
                return Err(AccountingError::InvalidLineAmount(line_no));
            }

            let exchange_rate = line.exchange_rate.unwrap_or(Decimal::ONE);
            if exchange_rate <= Decimal::ZERO {
                return Err(AccountingError::InvalidExchangeRate(line_no));
            }

            let account = account_lookup(line.account_id)
                .ok_or(AccountingError::AccountNotFound(line.account_id))?;
            if !account.is_active {
                return Err(AccountingError::AccountInactive(account.id));
            }

            resolved.push(ResolvedLine {
                line_number: i32::try_from(line_no).unwrap_or(i32::MAX),
                account_id: line.account_id,
                description: line.description.clone(),
                debit: line.debit,
                credit: line.credit,
                currency: line
                    .currency
                    .clone()
                    .unwrap_or_else(|| base_currency.to_string()),
                exchange_rate,
                base_debit: round_base(line.debit * exchange_rate),
                base_credit: round_base(line.credit * exchange_rate),
            });
        }

        Ok(resolved)
    }

    /// Calculates base-currency totals.
    #[must_use]
    pub fn calculate_totals(lines: &[ResolvedLine]) -> JournalTotals {
        let total_debit: Decimal = lines.iter().map(|l| l.base_debit).sum();
        let total_credit: Decimal = lines.iter().map(|l| l.base_credit).sum();
        JournalTotals::new(total_debit, total_credit)
    }

    /// Validates that an entry can be edited.
    pub fn validate_can_edit(status: JournalStatus) -> Result<(), AccountingError> {
        if status.is_editable() {
            Ok(())
        } else {
            Err(AccountingError::NotDraftForEdit)
        }
    }

    /// Validates that an entry can be deleted. Only drafts can be deleted.
    pub fn validate_can_delete(status: JournalStatus) -> Result<(), AccountingError> {
        if status == JournalStatus::Draft {
            Ok(())
        } else {
            Err(AccountingError::NotDraftForDelete)
        }
    }

    /// Validates a draft → posted transition.
    pub fn validate_can_post(
        status: JournalStatus,
        totals: &JournalTotals,
        period_status: FiscalStatus,
    ) -> Result<(), AccountingError> {
        if status != JournalStatus::Draft {
            return Err(AccountingError::NotDraftForPost);
        }
        if !totals.is_balanced {
            return Err(AccountingError::Unbalanced {
                debit: totals.total_debit,
                credit: totals.total_credit,
            });
        }
        if period_status == FiscalStatus::Closed {
            return Err(AccountingError::PeriodClosed);
        }
        Ok(())
    }

    /// Validates a posted → voided transition.
    pub fn validate_can_void(status: JournalStatus) -> Result<(), AccountingError> {
        if status == JournalStatus::Posted {
            Ok(())
        } else {
            Err(AccountingError::NotPostedForVoid)
        }
    }

    /// Computes per-account balance deltas for posting.
    ///
    /// `lines` pairs each account's type with its base debit and credit.
    /// Deltas are aggregated per account, in first-seen order.
    #[must_use]
    pub fn posting_deltas(lines: &[(Uuid, AccountType, Decimal, Decimal)]) -> Vec<BalanceDelta> {
        let mut order = Vec::new();
        let mut sums: HashMap<Uuid, Decimal> = HashMap::new();

        for &(account_id, account_type, debit, credit) in lines {
            let change = account_type.normal_balance().balance_change(debit, credit);
            sums.entry(account_id)
                .and_modify(|d| *d += change)
                .or_insert_with(|| {
                    order.push(account_id);
                    change
                });
        }

        order
            .into_iter()
            .map(|account_id| BalanceDelta {
                account_id,
                delta: sums.get(&account_id).copied().unwrap_or_default(),
            })
            .collect()
    }

    /// Computes the exact inverse of [`Self::posting_deltas`] for voiding.
    #[must_use]
    pub fn void_deltas(lines: &[(Uuid, AccountType, Decimal, Decimal)]) -> Vec<BalanceDelta> {
        Self::posting_deltas(lines)
            .into_iter()
            .map(|d| BalanceDelta {
                account_id: d.account_id,
                delta: -d.delta,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn info(id: Uuid) -> Option<AccountInfo> {
        Some(AccountInfo {
            id,
            account_type: AccountType::Asset,
            is_active: true,
        })
    }

    fn line(debit: Decimal, credit: Decimal) -> JournalLineInput {
        JournalLineInput {
            account_id: Uuid::new_v4(),
            description: None,
            debit,
            credit,
            currency: None,
            exchange_rate: None,
        }
    }

    #[test]
    fn test_resolve_balanced_lines() {
        let lines = vec![line(dec!(100), dec!(0)), line(dec!(0), dec!(100))];
        let resolved = JournalService::resolve_lines(&lines, "USD", info).unwrap();

        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].line_number, 1);
        assert_eq!(resolved[0].currency, "USD");
        assert_eq!(resolved[0].base_debit, dec!(100));
        assert_eq!(resolved[1].base_credit, dec!(100));

        let totals = JournalService::calculate_totals(&resolved);
        assert!(totals.is_balanced);
    }

    #[test]
    fn test_draft_may_be_unbalanced() {
        let lines = vec![line(dec!(100), dec!(0)), line(dec!(0), dec!(40))];
        let resolved = JournalService::resolve_lines(&lines, "USD", info).unwrap();
        assert!(!JournalService::calculate_totals(&resolved).is_balanced);
    }

    #[test]
    fn test_foreign_currency_base_amount() {
        let mut foreign = line(dec!(100), dec!(0));
        foreign.currency = Some("EUR".to_string());
        foreign.exchange_rate = Some(dec!(1.23456));
        let lines = vec![foreign, line(dec!(0), dec!(123.456))];

        let resolved = JournalService::resolve_lines(&lines, "USD", info).unwrap();
        assert_eq!(resolved[0].base_debit, dec!(123.4560));
        assert_eq!(resolved[0].currency, "EUR");
    }

    #[test]
    fn test_single_line_rejected() {
        let lines = vec![line(dec!(100), dec!(0))];
        assert!(matches!(
            JournalService::resolve_lines(&lines, "USD", info),
            Err(AccountingError::InsufficientLines)
        ));
    }

    #[test]
    fn test_both_sides_rejected() {
        let lines = vec![line(dec!(100), dec!(100)), line(dec!(0), dec!(100))];
        assert!(matches!(
            JournalService::resolve_lines(&lines, "USD", info),
            Err(AccountingError::InvalidLineAmount(1))
        ));

        let lines = vec![line(dec!(100), dec!(0)), line(dec!(0), dec!(0))];
        assert!(matches!(
            JournalService::resolve_lines(&lines, "USD", info),
            Err(AccountingError::InvalidLineAmount(2))
        ));
    }

    #[test]
    fn test_negative_and_rate_rejected() {
        let lines = vec![line(dec!(-5), dec!(0)), line(dec!(0), dec!(5))];
        assert!(matches!(
            JournalService::resolve_lines(&lines, "USD", info),
            Err(AccountingError::NegativeAmount(1))
        ));

        let mut bad_rate = line(dec!(5), dec!(0));
        bad_rate.exchange_rate = Some(Decimal::ZERO);
        let lines = vec![bad_rate, line(dec!(0), dec!(5))];
        assert!(matches!(
            JournalService::resolve_lines(&lines, "USD", info),
            Err(AccountingError::InvalidExchangeRate(1))
        ));
    }

    #[test]
    fn test_unknown_and_inactive_accounts() {
        let lines = vec![line(dec!(5), dec!(0)), line(dec!(0), dec!(5))];
        assert!(matches!(
            JournalService::resolve_lines(&lines, "USD", |_| None),
            Err(AccountingError::AccountNotFound(_))
        ));

        let inactive = |id| {
            Some(AccountInfo {
                id,
                account_type: AccountType::Asset,
                is_active: false,
            })
        };
        assert!(matches!(
            JournalService::resolve_lines(&lines, "USD", inactive),
            Err(AccountingError::AccountInactive(_))
        ));
    }

    #[test]
    fn test_post_transitions() {
        let balanced = JournalTotals::new(dec!(10), dec!(10));
        let unbalanced = JournalTotals::new(dec!(10), dec!(9));

        assert!(
            JournalService::validate_can_post(JournalStatus::Draft, &balanced, FiscalStatus::Open)
                .is_ok()
        );
        assert!(matches!(
            JournalService::validate_can_post(JournalStatus::Posted, &balanced, FiscalStatus::Open),
            Err(AccountingError::NotDraftForPost)
        ));
        assert!(matches!(
            JournalService::validate_can_post(JournalStatus::Draft, &unbalanced, FiscalStatus::Open),
            Err(AccountingError::Unbalanced { .. })
        ));
        assert!(matches!(
            JournalService::validate_can_post(JournalStatus::Draft, &balanced, FiscalStatus::Closed),
            Err(AccountingError::PeriodClosed)
        ));
    }

    #[test]
    fn test_void_and_edit_transitions() {
        assert!(JournalService::validate_can_void(JournalStatus::Posted).is_ok());
        assert!(JournalService::validate_can_void(JournalStatus::Draft).is_err());
        assert!(JournalService::validate_can_void(JournalStatus::Voided).is_err());
        assert!(JournalService::validate_can_edit(JournalStatus::Draft).is_ok());
        assert!(JournalService::validate_can_edit(JournalStatus::Posted).is_err());
        assert!(JournalService::validate_can_delete(JournalStatus::Voided).is_err());
    }

    #[test]
    fn test_posting_deltas_by_normal_side() {
        let cash = Uuid::new_v4();
        let revenue = Uuid::new_v4();
        let lines = vec![
            (cash, AccountType::Asset, dec!(250), Decimal::ZERO),
            (revenue, AccountType::Revenue, Decimal::ZERO, dec!(250)),
        ];

        let deltas = JournalService::posting_deltas(&lines);
        assert_eq!(
            deltas,
            vec![
                BalanceDelta { account_id: cash, delta: dec!(250) },
                BalanceDelta { account_id: revenue, delta: dec!(250) },
            ]
        );

        let voids = JournalService::void_deltas(&lines);
        assert_eq!(voids[0].delta, dec!(-250));
        assert_eq!(voids[1].delta, dec!(-250));
    }

    #[test]
    fn test_posting_deltas_aggregate_same_account() {
        let cash = Uuid::new_v4();
        let lines = vec![
            (cash, AccountType::Asset, dec!(100), Decimal::ZERO),
            (cash, AccountType::Asset, Decimal::ZERO, dec!(30)),
        ];
        let deltas = JournalService::posting_deltas(&lines);
        assert_eq!(deltas.len(), 1);
        assert_eq!(deltas[0].delta, dec!(70));
    }
}
