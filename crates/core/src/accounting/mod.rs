//! Double-entry bookkeeping logic.
//!
//! This module implements the accounting core:
//! - Account types and their normal balance side
//! - Journal line resolution and totals
//! - Posting and voiding balance deltas
//! - Fiscal calendar generation
//! - Trial balance, profit & loss, balance sheet and account ledger reports

pub mod error;
pub mod fiscal;
pub mod journal;
pub mod reports;
pub mod types;

#[cfg(test)]
mod journal_props;

pub use error::AccountingError;
pub use fiscal::{FiscalCalendar, PeriodPlan};
pub use journal::JournalService;
pub use reports::ReportService;
pub use types::{
    AccountInfo, AccountType, BalanceDelta, FiscalStatus, JournalLineInput, JournalStatus,
    JournalTotals, NormalBalance, ResolvedLine,
};
