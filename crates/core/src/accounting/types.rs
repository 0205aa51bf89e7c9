//! Accounting domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Resources owned.
    Asset,
    /// Obligations owed.
    Liability,
    /// Owners' residual interest.
    Equity,
    /// Income earned.
    Revenue,
    /// Costs incurred.
    Expense,
}

/// The side on which an account's balance grows.
///
/// - Asset/Expense: balance += debit - credit (debit-normal)
/// - Liability/Equity/Revenue: balance += credit - debit (credit-normal)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalBalance {
    /// Debit-normal accounts (Asset, Expense).
    Debit,
    /// Credit-normal accounts (Liability, Equity, Revenue).
    Credit,
}

impl NormalBalance {
    /// Calculates the balance change for a debit/credit pair.
    #[must_use]
    pub fn balance_change(self, debit: Decimal, credit: Decimal) -> Decimal {
        match self {
            Self::Debit => debit - credit,
            Self::Credit => credit - debit,
        }
    }
}

impl AccountType {
    /// All account types, in chart-of-accounts order.
    pub const ALL: [Self; 5] = [
        Self::Asset,
        Self::Liability,
        Self::Equity,
        Self::Revenue,
        Self::Expense,
    ];

    /// Returns the normal balance side of this account type.
    #[must_use]
    pub const fn normal_balance(self) -> NormalBalance {
        match self {
            Self::Asset | Self::Expense => NormalBalance::Debit,
            Self::Liability | Self::Equity | Self::Revenue => NormalBalance::Credit,
        }
    }

    /// Returns true for accounts reported on the balance sheet.
    #[must_use]
    pub const fn is_balance_sheet(self) -> bool {
        matches!(self, Self::Asset | Self::Liability | Self::Equity)
    }

    /// Returns the lowercase name used in storage and JSON.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Revenue => "revenue",
            Self::Expense => "expense",
        }
    }
}

/// Journal entry lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalStatus {
    /// Editable, no effect on balances.
    Draft,
    /// Applied to account balances.
    Posted,
    /// Reversed; balances restored.
    Voided,
}

impl JournalStatus {
    /// Returns true if the entry can be modified.
    #[must_use]
    pub fn is_editable(self) -> bool {
        matches!(self, Self::Draft)
    }
}

/// Fiscal year or period status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FiscalStatus {
    /// Posting allowed.
    Open,
    /// No posting allowed.
    Closed,
}

/// Input for a single journal line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalLineInput {
    /// The account to post to.
    pub account_id: Uuid,
    /// Optional line description.
    #[serde(default)]
    pub description: Option<String>,
    /// Debit amount in the line currency.
    #[serde(default)]
    pub debit: Decimal,
    /// Credit amount in the line currency.
    #[serde(default)]
    pub credit: Decimal,
    /// Line currency; defaults to the organization's base currency.
    #[serde(default)]
    pub currency: Option<String>,
    /// Rate to the base currency; defaults to 1.
    #[serde(default)]
    pub exchange_rate: Option<Decimal>,
}

/// A validated journal line with base-currency amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedLine {
    /// 1-based position within the entry.
    pub line_number: i32,
    /// The account to post to.
    pub account_id: Uuid,
    /// Optional line description.
    pub description: Option<String>,
    /// Debit amount in the line currency.
    pub debit: Decimal,
    /// Credit amount in the line currency.
    pub credit: Decimal,
    /// Line currency code.
    pub currency: String,
    /// Rate to the base currency.
    pub exchange_rate: Decimal,
    /// Debit in base currency.
    pub base_debit: Decimal,
    /// Credit in base currency.
    pub base_credit: Decimal,
}

/// Base-currency totals of a journal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalTotals {
    /// Sum of base debits.
    pub total_debit: Decimal,
    /// Sum of base credits.
    pub total_credit: Decimal,
    /// Whether the totals agree within tolerance.
    pub is_balanced: bool,
}

impl JournalTotals {
    /// Creates totals, computing `is_balanced` against the balance tolerance.
    #[must_use]
    pub fn new(total_debit: Decimal, total_credit: Decimal) -> Self {
        Self {
            total_debit,
            total_credit,
            is_balanced: kontor_shared::types::within_tolerance(total_debit, total_credit),
        }
    }
}

/// Information about an account needed for line validation.
#[derive(Debug, Clone, Copy)]
pub struct AccountInfo {
    /// The account ID.
    pub id: Uuid,
    /// The account type.
    pub account_type: AccountType,
    /// Whether the account is active.
    pub is_active: bool,
}

/// Change to apply to one account's running balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceDelta {
    /// The account ID.
    pub account_id: Uuid,
    /// Signed change on the account's normal side.
    pub delta: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(AccountType::Asset, NormalBalance::Debit)]
    #[case(AccountType::Expense, NormalBalance::Debit)]
    #[case(AccountType::Liability, NormalBalance::Credit)]
    #[case(AccountType::Equity, NormalBalance::Credit)]
    #[case(AccountType::Revenue, NormalBalance::Credit)]
    fn test_normal_balance(#[case] account_type: AccountType, #[case] expected: NormalBalance) {
        assert_eq!(account_type.normal_balance(), expected);
    }

    #[test]
    fn test_balance_change() {
        assert_eq!(NormalBalance::Debit.balance_change(dec!(100), dec!(30)), dec!(70));
        assert_eq!(NormalBalance::Credit.balance_change(dec!(100), dec!(30)), dec!(-70));
    }

    #[test]
    fn test_totals_tolerance() {
        assert!(JournalTotals::new(dec!(100.00), dec!(100.01)).is_balanced);
        assert!(!JournalTotals::new(dec!(100.00), dec!(100.02)).is_balanced);
    }

    #[test]
    fn test_account_type_serde() {
        let json = serde_json::to_string(&AccountType::Revenue).unwrap();
        assert_eq!(json, "\"revenue\"");
    }
}
