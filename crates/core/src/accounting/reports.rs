//! Financial report generation over posted journal activity.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::types::{AccountType, JournalTotals};

/// Posted debit/credit totals for one account, as aggregated by the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountActivity {
    /// Account ID.
    pub account_id: Uuid,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Sum of base debits.
    pub total_debit: Decimal,
    /// Sum of base credits.
    pub total_credit: Decimal,
}

impl AccountActivity {
    /// Net balance on the account's normal side.
    #[must_use]
    pub fn balance(&self) -> Decimal {
        self.account_type
            .normal_balance()
            .balance_change(self.total_debit, self.total_credit)
    }
}

/// Account row in a report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportLine {
    /// Account ID.
    pub account_id: Uuid,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Total debit amount.
    pub total_debit: Decimal,
    /// Total credit amount.
    pub total_credit: Decimal,
    /// Net balance on the normal side.
    pub balance: Decimal,
}

impl From<AccountActivity> for ReportLine {
    fn from(a: AccountActivity) -> Self {
        let balance = a.balance();
        Self {
            account_id: a.account_id,
            code: a.code,
            name: a.name,
            account_type: a.account_type,
            total_debit: a.total_debit,
            total_credit: a.total_credit,
            balance,
        }
    }
}

/// Trial balance report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalanceReport {
    /// Start of the reporting window, if bounded.
    pub from: Option<NaiveDate>,
    /// End of the reporting window, if bounded.
    pub to: Option<NaiveDate>,
    /// Account rows, ordered by code.
    pub accounts: Vec<ReportLine>,
    /// Totals.
    pub totals: JournalTotals,
}

/// A group of accounts with a total.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportSection {
    /// Accounts in this section.
    pub accounts: Vec<ReportLine>,
    /// Section total.
    pub total: Decimal,
}

impl ReportSection {
    fn push(&mut self, line: ReportLine) {
        self.total += line.balance;
        self.accounts.push(line);
    }
}

/// Profit and loss report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfitLossReport {
    /// Start of the reporting window, if bounded.
    pub from: Option<NaiveDate>,
    /// End of the reporting window, if bounded.
    pub to: Option<NaiveDate>,
    /// Revenue accounts.
    pub revenue: ReportSection,
    /// Expense accounts.
    pub expenses: ReportSection,
    /// Revenue minus expenses.
    pub net_income: Decimal,
}

/// Balance sheet report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSheetReport {
    /// Report date.
    pub as_of: NaiveDate,
    /// Asset accounts.
    pub assets: ReportSection,
    /// Liability accounts.
    pub liabilities: ReportSection,
    /// Equity accounts.
    pub equity: ReportSection,
    /// Net income not yet closed into equity.
    pub current_earnings: Decimal,
    /// Liabilities + equity + current earnings.
    pub liabilities_and_equity: Decimal,
    /// Whether assets equal liabilities and equity within tolerance.
    pub is_balanced: bool,
}

/// A posted line affecting one account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerActivity {
    /// Journal entry ID.
    pub entry_id: Uuid,
    /// Journal entry number.
    pub entry_number: String,
    /// Entry date.
    pub entry_date: NaiveDate,
    /// Line or entry description.
    pub description: Option<String>,
    /// Base debit.
    pub debit: Decimal,
    /// Base credit.
    pub credit: Decimal,
}

/// Ledger row with running balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerRow {
    /// The posted activity.
    #[serde(flatten)]
    pub activity: LedgerActivity,
    /// Balance after this row.
    pub running_balance: Decimal,
}

/// Account ledger report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountLedger {
    /// Account ID.
    pub account_id: Uuid,
    /// Balance before the first row.
    pub opening_balance: Decimal,
    /// Rows in date order.
    pub rows: Vec<LedgerRow>,
    /// Balance after the last row.
    pub closing_balance: Decimal,
}

/// Service for generating financial reports.
pub struct ReportService;

impl ReportService {
    /// Generates a trial balance. Accounts without activity are omitted.
    #[must_use]
    pub fn trial_balance(
        activity: Vec<AccountActivity>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> TrialBalanceReport {
        let mut accounts: Vec<ReportLine> = activity
            .into_iter()
            .filter(|a| !a.total_debit.is_zero() || !a.total_credit.is_zero())
            .map(ReportLine::from)
            .collect();
        accounts.sort_by(|a, b| a.code.cmp(&b.code));

        let total_debit: Decimal = accounts.iter().map(|a| a.total_debit).sum();
        let total_credit: Decimal = accounts.iter().map(|a| a.total_credit).sum();

        TrialBalanceReport {
            from,
            to,
            accounts,
            totals: JournalTotals::new(total_debit, total_credit),
        }
    }

    /// Generates a profit and loss report from revenue and expense activity.
    #[must_use]
    pub fn profit_loss(
        activity: Vec<AccountActivity>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> ProfitLossReport {
        let mut revenue = ReportSection::default();
        let mut expenses = ReportSection::default();

        for a in Self::sorted(activity) {
            match a.account_type {
                AccountType::Revenue => revenue.push(a.into()),
                AccountType::Expense => expenses.push(a.into()),
                _ => {}
            }
        }

        let net_income = revenue.total - expenses.total;
        ProfitLossReport {
            from,
            to,
            revenue,
            expenses,
            net_income,
        }
    }

    /// Generates a balance sheet. Revenue and expense activity flows into
    /// `current_earnings`.
    #[must_use]
    pub fn balance_sheet(activity: Vec<AccountActivity>, as_of: NaiveDate) -> BalanceSheetReport {
        let mut assets = ReportSection::default();
        let mut liabilities = ReportSection::default();
        let mut equity = ReportSection::default();
        let mut current_earnings = Decimal::ZERO;

        for a in Self::sorted(activity) {
            match a.account_type {
                AccountType::Asset => assets.push(a.into()),
                AccountType::Liability => liabilities.push(a.into()),
                AccountType::Equity => equity.push(a.into()),
                AccountType::Revenue => current_earnings += a.balance(),
                AccountType::Expense => current_earnings -= a.balance(),
            }
        }

        let liabilities_and_equity = liabilities.total + equity.total + current_earnings;
        let is_balanced =
            kontor_shared::types::within_tolerance(assets.total, liabilities_and_equity);

        BalanceSheetReport {
            as_of,
            assets,
            liabilities,
            equity,
            current_earnings,
            liabilities_and_equity,
            is_balanced,
        }
    }

    /// Builds an account ledger with a running balance on the account's
    /// normal side.
    #[must_use]
    pub fn account_ledger(
        account_id: Uuid,
        account_type: AccountType,
        opening_balance: Decimal,
        activity: Vec<LedgerActivity>,
    ) -> AccountLedger {
        let side = account_type.normal_balance();
        let mut running = opening_balance;

        let rows = activity
            .into_iter()
            .map(|activity| {
                running += side.balance_change(activity.debit, activity.credit);
                LedgerRow {
                    activity,
                    running_balance: running,
                }
            })
            .collect();

        AccountLedger {
            account_id,
            opening_balance,
            rows,
            closing_balance: running,
        }
    }

    fn sorted(mut activity: Vec<AccountActivity>) -> Vec<AccountActivity> {
        activity.sort_by(|a, b| a.code.cmp(&b.code));
        activity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn act(code: &str, account_type: AccountType, debit: Decimal, credit: Decimal) -> AccountActivity {
        AccountActivity {
            account_id: Uuid::new_v4(),
            code: code.to_string(),
            name: code.to_string(),
            account_type,
            total_debit: debit,
            total_credit: credit,
        }
    }

    fn sample() -> Vec<AccountActivity> {
        vec![
            act("4000", AccountType::Revenue, dec!(0), dec!(1000)),
            act("1000", AccountType::Asset, dec!(1500), dec!(300)),
            act("2000", AccountType::Liability, dec!(0), dec!(200)),
            act("3000", AccountType::Equity, dec!(0), dec!(500)),
            act("5000", AccountType::Expense, dec!(500), dec!(0)),
            act("1100", AccountType::Asset, dec!(0), dec!(0)),
        ]
    }

    #[test]
    fn test_trial_balance() {
        let report = ReportService::trial_balance(sample(), None, None);

        assert_eq!(report.accounts.len(), 5);
        assert_eq!(report.accounts[0].code, "1000");
        assert_eq!(report.accounts[0].balance, dec!(1200));
        assert_eq!(report.totals.total_debit, dec!(2000));
        assert_eq!(report.totals.total_credit, dec!(2000));
        assert!(report.totals.is_balanced);
    }

    #[test]
    fn test_profit_loss() {
        let report = ReportService::profit_loss(sample(), None, None);
        assert_eq!(report.revenue.total, dec!(1000));
        assert_eq!(report.expenses.total, dec!(500));
        assert_eq!(report.net_income, dec!(500));
        assert_eq!(report.revenue.accounts.len(), 1);
    }

    #[test]
    fn test_balance_sheet_balances_with_earnings() {
        let as_of = NaiveDate::from_ymd_opt(2026, 3, 31).unwrap();
        let report = ReportService::balance_sheet(sample(), as_of);

        assert_eq!(report.assets.total, dec!(1200));
        assert_eq!(report.liabilities.total, dec!(200));
        assert_eq!(report.equity.total, dec!(500));
        assert_eq!(report.current_earnings, dec!(500));
        assert_eq!(report.liabilities_and_equity, dec!(1200));
        assert!(report.is_balanced);
    }

    #[test]
    fn test_account_ledger_running_balance() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let row = |debit, credit| LedgerActivity {
            entry_id: Uuid::new_v4(),
            entry_number: "JE-000001".to_string(),
            entry_date: date,
            description: None,
            debit,
            credit,
        };

        let ledger = ReportService::account_ledger(
            Uuid::new_v4(),
            AccountType::Asset,
            dec!(100),
            vec![row(dec!(50), dec!(0)), row(dec!(0), dec!(30))],
        );

        assert_eq!(ledger.rows[0].running_balance, dec!(150));
        assert_eq!(ledger.rows[1].running_balance, dec!(120));
        assert_eq!(ledger.closing_balance, dec!(120));
    }
}
