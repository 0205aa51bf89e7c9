//! Invoice error types.

use rust_decimal::Decimal;
use thiserror::Error;

use kontor_shared::AppError;

use super::types::InvoiceStatus;

/// Errors that can occur during invoicing operations.
#[derive(Debug, Error)]
pub enum InvoiceError {
    /// Quantity must be positive.
    #[error("Line {0}: quantity must be greater than zero")]
    InvalidQuantity(usize),

    /// Unit price cannot be negative.
    #[error("Line {0}: unit price cannot be negative")]
    NegativePrice(usize),

    /// Discount must be within 0-100.
    #[error("Line {0}: discount percent must be between 0 and 100")]
    InvalidDiscount(usize),

    /// Tax rate cannot be negative.
    #[error("Line {0}: tax rate cannot be negative")]
    InvalidTaxRate(usize),

    /// Due date precedes issue date.
    #[error("Due date must not be before issue date")]
    InvalidDueDate,

    /// Only drafts can be edited.
    #[error("Only draft invoices can be edited")]
    NotDraftForEdit,

    /// Only drafts can be deleted.
    #[error("Only draft invoices can be deleted")]
    NotDraftForDelete,

    /// Only drafts can be sent.
    #[error("Only draft invoices can be sent")]
    NotDraftForSend,

    /// Sending an empty invoice.
    #[error("Invoice must have at least one line")]
    NoLines,

    /// Sending a zero invoice.
    #[error("Invoice total must be greater than zero")]
    ZeroTotal,

    /// Payment recorded in the wrong state.
    #[error("Payments cannot be recorded on {0} invoices")]
    PaymentNotAllowed(InvoiceStatus),

    /// Payment must be positive.
    #[error("Payment amount must be greater than zero")]
    InvalidPaymentAmount,

    /// Payment carries more precision than the currency.
    #[error("Payment amount must have at most 2 decimal places")]
    PaymentPrecision,

    /// Payment exceeds the outstanding balance.
    #[error("Payment amount {amount} exceeds amount due {due}")]
    Overpayment {
        /// Attempted payment.
        amount: Decimal,
        /// Outstanding balance.
        due: Decimal,
    },

    /// Cancel rules violated.
    #[error("Only draft or sent invoices without payments can be cancelled")]
    CannotCancel,
}

impl InvoiceError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidQuantity(_) => "INVALID_QUANTITY",
            Self::NegativePrice(_) => "NEGATIVE_PRICE",
            Self::InvalidDiscount(_) => "INVALID_DISCOUNT",
            Self::InvalidTaxRate(_) => "INVALID_TAX_RATE",
            Self::InvalidDueDate => "INVALID_DUE_DATE",
            Self::NotDraftForEdit => "NOT_DRAFT_FOR_EDIT",
            Self::NotDraftForDelete => "NOT_DRAFT_FOR_DELETE",
            Self::NotDraftForSend => "NOT_DRAFT_FOR_SEND",
            Self::NoLines => "NO_LINES",
            Self::ZeroTotal => "ZERO_TOTAL",
            Self::PaymentNotAllowed(_) => "PAYMENT_NOT_ALLOWED",
            Self::InvalidPaymentAmount => "INVALID_PAYMENT_AMOUNT",
            Self::PaymentPrecision => "PAYMENT_PRECISION",
            Self::Overpayment { .. } => "OVERPAYMENT",
            Self::CannotCancel => "CANNOT_CANCEL",
        }
    }
}

impl From<InvoiceError> for AppError {
    fn from(err: InvoiceError) -> Self {
        match err {
            InvoiceError::InvalidQuantity(_)
            | InvoiceError::NegativePrice(_)
            | InvoiceError::InvalidDiscount(_)
            | InvoiceError::InvalidTaxRate(_)
            | InvoiceError::InvalidDueDate
            | InvoiceError::InvalidPaymentAmount
            | InvoiceError::PaymentPrecision => Self::Validation(err.to_string()),
            _ => Self::BusinessRule(err.to_string()),
        }
    }
}
