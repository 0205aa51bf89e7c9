//! Accounting error types for validation and state errors.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use kontor_shared::AppError;

/// Errors that can occur during accounting operations.
#[derive(Debug, Error)]
pub enum AccountingError {
    // ========== Validation Errors ==========
    /// Journal entry must have at least 2 lines.
    #[error("Journal entry must have at least 2 lines")]
    InsufficientLines,

    /// A line must carry exactly one of debit or credit.
    #[error("Line {0} must have either a debit or a credit amount, not both")]
    InvalidLineAmount(usize),

    /// A line carries a negative amount.
    #[error("Line {0} has a negative amount")]
    NegativeAmount(usize),

    /// Exchange rate must be positive.
    #[error("Line {0} has a non-positive exchange rate")]
    InvalidExchangeRate(usize),

    /// Debits and credits differ by more than the tolerance.
    #[error("Total debits must equal total credits")]
    Unbalanced {
        /// Total debit amount in base currency.
        debit: Decimal,
        /// Total credit amount in base currency.
        credit: Decimal,
    },

    // ========== Account Errors ==========
    /// Account not found in the organization.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// Account is inactive and cannot be used.
    #[error("Account {0} is inactive")]
    AccountInactive(Uuid),

    /// Account code already used in the organization.
    #[error("Account code already exists: {0}")]
    DuplicateAccountCode(String),

    /// Account type cannot be changed.
    #[error("Account type can only be changed while the balance is zero and no journal lines reference it")]
    AccountTypeChangeNotAllowed,

    /// Account is referenced by journal lines.
    #[error("Account has journal lines and cannot be deleted")]
    AccountInUse,

    // ========== Journal State Errors ==========
    /// Only drafts can be posted.
    #[error("Only draft entries can be posted")]
    NotDraftForPost,

    /// Only drafts can be edited.
    #[error("Only draft entries can be edited")]
    NotDraftForEdit,

    /// Only drafts can be deleted.
    #[error("Only draft entries can be deleted")]
    NotDraftForDelete,

    /// Only posted entries can be voided.
    #[error("Only posted entries can be voided")]
    NotPostedForVoid,

    // ========== Fiscal Errors ==========
    /// Fiscal period is closed, no posting allowed.
    #[error("Fiscal period is closed, no posting allowed")]
    PeriodClosed,

    /// Period is already closed.
    #[error("Fiscal period is already closed")]
    PeriodAlreadyClosed,

    /// Only closed periods can be reopened.
    #[error("Only closed periods can be reopened")]
    PeriodNotClosed,

    /// Cannot close a period while an earlier one is open.
    #[error("Cannot close fiscal period: earlier periods must be closed first")]
    EarlierPeriodsOpen,

    /// Cannot reopen a period while a later one is closed.
    #[error("Cannot reopen fiscal period: later periods must be reopened first")]
    LaterPeriodsClosed,

    /// Fiscal year start month outside 1..=12.
    #[error("Fiscal year start month must be between 1 and 12, got {0}")]
    InvalidStartMonth(u32),

    /// Start date after end date.
    #[error("Start date must not be after end date")]
    InvalidDateRange,
}

impl AccountingError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientLines => "INSUFFICIENT_LINES",
            Self::InvalidLineAmount(_) => "INVALID_LINE_AMOUNT",
            Self::NegativeAmount(_) => "NEGATIVE_AMOUNT",
            Self::InvalidExchangeRate(_) => "INVALID_EXCHANGE_RATE",
            Self::Unbalanced { .. } => "UNBALANCED_ENTRY",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::AccountInactive(_) => "ACCOUNT_INACTIVE",
            Self::DuplicateAccountCode(_) => "DUPLICATE_ACCOUNT_CODE",
            Self::AccountTypeChangeNotAllowed => "ACCOUNT_TYPE_CHANGE_NOT_ALLOWED",
            Self::AccountInUse => "ACCOUNT_IN_USE",
            Self::NotDraftForPost => "NOT_DRAFT_FOR_POST",
            Self::NotDraftForEdit => "NOT_DRAFT_FOR_EDIT",
            Self::NotDraftForDelete => "NOT_DRAFT_FOR_DELETE",
            Self::NotPostedForVoid => "NOT_POSTED_FOR_VOID",
            Self::PeriodClosed => "PERIOD_CLOSED",
            Self::PeriodAlreadyClosed => "PERIOD_ALREADY_CLOSED",
            Self::PeriodNotClosed => "PERIOD_NOT_CLOSED",
            Self::EarlierPeriodsOpen => "EARLIER_PERIODS_OPEN",
            Self::LaterPeriodsClosed => "LATER_PERIODS_CLOSED",
            Self::InvalidStartMonth(_) => "INVALID_START_MONTH",
            Self::InvalidDateRange => "INVALID_DATE_RANGE",
        }
    }
}

impl From<AccountingError> for AppError {
    fn from(err: AccountingError) -> Self {
        match err {
            AccountingError::AccountNotFound(id) => Self::not_found("Account", id),
            AccountingError::DuplicateAccountCode(_) => Self::Conflict(err.to_string()),
            AccountingError::InsufficientLines
            | AccountingError::InvalidLineAmount(_)
            | AccountingError::NegativeAmount(_)
            | AccountingError::InvalidExchangeRate(_)
            | AccountingError::InvalidStartMonth(_)
            | AccountingError::InvalidDateRange => Self::Validation(err.to_string()),
            _ => Self::BusinessRule(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = AccountingError::Unbalanced {
            debit: Decimal::new(10000, 2),
            credit: Decimal::new(5000, 2),
        };
        assert_eq!(err.to_string(), "Total debits must equal total credits");
        assert_eq!(
            AccountingError::NotDraftForPost.to_string(),
            "Only draft entries can be posted"
        );
    }

    #[test]
    fn test_app_error_mapping() {
        let app: AppError = AccountingError::NotPostedForVoid.into();
        assert_eq!(app.status_code(), 422);
        assert_eq!(app.to_string(), "Only posted entries can be voided");

        let app: AppError = AccountingError::InsufficientLines.into();
        assert_eq!(app.status_code(), 400);

        let app: AppError = AccountingError::AccountNotFound(Uuid::nil()).into();
        assert_eq!(app.status_code(), 404);

        let app: AppError = AccountingError::DuplicateAccountCode("1000".into()).into();
        assert_eq!(app.status_code(), 409);
    }
}
