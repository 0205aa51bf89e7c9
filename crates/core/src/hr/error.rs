//! Leave error types.

use thiserror::Error;

use kontor_shared::AppError;

/// Errors that can occur during leave operations.
#[derive(Debug, Error)]
pub enum LeaveError {
    /// End date before start date.
    #[error("End date must not be before start date")]
    InvalidDateRange,

    /// Request spans two calendar years.
    #[error("Leave request must fall within a single calendar year")]
    SpansYears,

    /// Range contains only weekend days.
    #[error("Leave request must cover at least one working day")]
    NoWorkingDays,

    /// Not enough remaining days.
    #[error("Insufficient leave balance")]
    InsufficientBalance,

    /// Review action on a non-pending request.
    #[error("Only pending requests can be {0}")]
    NotPending(&'static str),

    /// Cancel rules violated.
    #[error("Only pending requests or approved requests that have not started can be cancelled")]
    CannotCancel,

    /// Negative entitlement or carry-over.
    #[error("{0} cannot be negative")]
    NegativeDays(&'static str),

    /// Leave type code already used.
    #[error("Leave type code already exists: {0}")]
    DuplicateLeaveType(String),
}

impl LeaveError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidDateRange => "INVALID_DATE_RANGE",
            Self::SpansYears => "SPANS_YEARS",
            Self::NoWorkingDays => "NO_WORKING_DAYS",
            Self::InsufficientBalance => "INSUFFICIENT_BALANCE",
            Self::NotPending(_) => "NOT_PENDING",
            Self::CannotCancel => "CANNOT_CANCEL",
            Self::NegativeDays(_) => "NEGATIVE_DAYS",
            Self::DuplicateLeaveType(_) => "DUPLICATE_LEAVE_TYPE",
        }
    }
}

impl From<LeaveError> for AppError {
    fn from(err: LeaveError) -> Self {
        match err {
            LeaveError::DuplicateLeaveType(_) => Self::Conflict(err.to_string()),
            LeaveError::InvalidDateRange
            | LeaveError::SpansYears
            | LeaveError::NoWorkingDays
            | LeaveError::NegativeDays(_) => Self::Validation(err.to_string()),
            _ => Self::BusinessRule(err.to_string()),
        }
    }
}
