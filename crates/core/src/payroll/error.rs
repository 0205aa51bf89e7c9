//! Payroll error types.

use thiserror::Error;

use kontor_shared::AppError;

/// Errors that can occur during payroll operations.
#[derive(Debug, Error)]
pub enum PayrollError {
    /// Period end precedes period start.
    #[error("Period end must not be before period start")]
    InvalidPeriod,

    /// No active employees to pay.
    #[error("No active employees to include in payroll run")]
    NoActiveEmployees,

    /// Approve requires a calculated run.
    #[error("Only calculated payroll runs can be approved")]
    NotCalculatedForApprove,

    /// Approved runs are frozen.
    #[error("Approved payroll runs cannot be recalculated")]
    CannotRecalculate,

    /// Approved runs cannot be deleted.
    #[error("Approved payroll runs cannot be deleted")]
    CannotDeleteApproved,

    /// A percentage setting outside 0-100.
    #[error("{0} must be between 0 and 100")]
    InvalidRate(&'static str),

    /// A negative money amount.
    #[error("{0} cannot be negative")]
    NegativeAmount(&'static str),

    /// Employee number already used.
    #[error("Employee number already exists: {0}")]
    DuplicateEmployeeNumber(String),
}

impl PayrollError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidPeriod => "INVALID_PERIOD",
            Self::NoActiveEmployees => "NO_ACTIVE_EMPLOYEES",
            Self::NotCalculatedForApprove => "NOT_CALCULATED_FOR_APPROVE",
            Self::CannotRecalculate => "CANNOT_RECALCULATE",
            Self::CannotDeleteApproved => "CANNOT_DELETE_APPROVED",
            Self::InvalidRate(_) => "INVALID_RATE",
            Self::NegativeAmount(_) => "NEGATIVE_AMOUNT",
            Self::DuplicateEmployeeNumber(_) => "DUPLICATE_EMPLOYEE_NUMBER",
        }
    }
}

impl From<PayrollError> for AppError {
    fn from(err: PayrollError) -> Self {
        match err {
            PayrollError::DuplicateEmployeeNumber(_) => Self::Conflict(err.to_string()),
            PayrollError::InvalidPeriod
            | PayrollError::InvalidRate(_)
            | PayrollError::NegativeAmount(_) => Self::Validation(err.to_string()),
            _ => Self::BusinessRule(err.to_string()),
        }
    }
}
