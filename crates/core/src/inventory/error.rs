//! Inventory error types.

use rust_decimal::Decimal;
use thiserror::Error;

use kontor_shared::AppError;

/// Errors that can occur during inventory operations.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// Not enough unreserved stock for a decrement.
    #[error("Insufficient stock: available {available}, requested {requested}")]
    InsufficientStock {
        /// Unreserved quantity on hand.
        available: Decimal,
        /// Quantity requested.
        requested: Decimal,
    },

    /// Quantity must be non-zero (adjustments) or positive (lines, reservations).
    #[error("Quantity must be greater than zero")]
    InvalidQuantity,

    /// Unit cost cannot be negative.
    #[error("Unit cost cannot be negative")]
    NegativeCost,

    /// Release exceeds the reserved quantity.
    #[error("Cannot release {requested}: only {reserved} reserved")]
    ReleaseExceedsReserved {
        /// Reserved quantity.
        reserved: Decimal,
        /// Quantity requested.
        requested: Decimal,
    },

    /// Only drafts can be confirmed.
    #[error("Only draft movements can be confirmed")]
    NotDraftForConfirm,

    /// Only drafts can be cancelled.
    #[error("Only draft movements can be cancelled")]
    NotDraftForCancel,

    /// Movement type needs a source warehouse.
    #[error("Source warehouse is required for this movement type")]
    MissingSource,

    /// Movement type needs a destination warehouse.
    #[error("Destination warehouse is required for this movement type")]
    MissingDestination,

    /// Transfer to the same warehouse.
    #[error("Source and destination warehouses must differ")]
    SameWarehouse,

    /// Movement without lines.
    #[error("Movement must have at least one line")]
    NoLines,

    /// SKU already used in the organization.
    #[error("Product SKU already exists: {0}")]
    DuplicateSku(String),

    /// Warehouse code already used in the organization.
    #[error("Warehouse code already exists: {0}")]
    DuplicateWarehouseCode(String),
}

impl InventoryError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            Self::InvalidQuantity => "INVALID_QUANTITY",
            Self::NegativeCost => "NEGATIVE_COST",
            Self::ReleaseExceedsReserved { .. } => "RELEASE_EXCEEDS_RESERVED",
            Self::NotDraftForConfirm => "NOT_DRAFT_FOR_CONFIRM",
            Self::NotDraftForCancel => "NOT_DRAFT_FOR_CANCEL",
            Self::MissingSource => "MISSING_SOURCE",
            Self::MissingDestination => "MISSING_DESTINATION",
            Self::SameWarehouse => "SAME_WAREHOUSE",
            Self::NoLines => "NO_LINES",
            Self::DuplicateSku(_) => "DUPLICATE_SKU",
            Self::DuplicateWarehouseCode(_) => "DUPLICATE_WAREHOUSE_CODE",
        }
    }
}

impl From<InventoryError> for AppError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::DuplicateSku(_) | InventoryError::DuplicateWarehouseCode(_) => {
                Self::Conflict(err.to_string())
            }
            InventoryError::InvalidQuantity
            | InventoryError::NegativeCost
            | InventoryError::MissingSource
            | InventoryError::MissingDestination
            | InventoryError::SameWarehouse
            | InventoryError::NoLines => Self::Validation(err.to_string()),
            _ => Self::BusinessRule(err.to_string()),
        }
    }
}
