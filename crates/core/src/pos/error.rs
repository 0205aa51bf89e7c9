//! Point-of-sale error types.

use rust_decimal::Decimal;
use thiserror::Error;

use kontor_shared::AppError;

use crate::inventory::InventoryError;
use crate::invoicing::InvoiceError;

/// Errors that can occur during point-of-sale operations.
#[derive(Debug, Error)]
pub enum PosError {
    /// Sale without lines.
    #[error("Sale must have at least one line")]
    NoLines,

    /// Cash tendered below the total.
    #[error("Insufficient payment: tendered {tendered}, total {total}")]
    InsufficientPayment {
        /// Amount handed over.
        tendered: Decimal,
        /// Sale total.
        total: Decimal,
    },

    /// Only completed sales can be refunded.
    #[error("Only completed sales can be refunded")]
    NotCompletedForRefund,

    /// Invalid line values.
    #[error(transparent)]
    Line(#[from] InvoiceError),

    /// Stock could not be taken or returned.
    #[error(transparent)]
    Inventory(#[from] InventoryError),
}

impl PosError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NoLines => "NO_LINES",
            Self::InsufficientPayment { .. } => "INSUFFICIENT_PAYMENT",
            Self::NotCompletedForRefund => "NOT_COMPLETED_FOR_REFUND",
            Self::Line(e) => e.error_code(),
            Self::Inventory(e) => e.error_code(),
        }
    }
}

impl From<PosError> for AppError {
    fn from(err: PosError) -> Self {
        match err {
            PosError::Line(e) => e.into(),
            PosError::Inventory(e) => e.into(),
            PosError::NoLines => Self::Validation(err.to_string()),
            PosError::InsufficientPayment { .. } | PosError::NotCompletedForRefund => {
                Self::BusinessRule(err.to_string())
            }
        }
    }
}
