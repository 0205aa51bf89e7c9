//! Manufacturing error types.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use kontor_shared::AppError;

use crate::inventory::InventoryError;

/// Errors that can occur during manufacturing operations.
#[derive(Debug, Error)]
pub enum ManufacturingError {
    /// BOM output must be positive.
    #[error("Output quantity must be greater than zero")]
    InvalidOutputQuantity,

    /// Component quantity must be positive.
    #[error("Component quantity must be greater than zero")]
    InvalidComponentQuantity,

    /// Product listed as its own component.
    #[error("A product cannot be a component of itself")]
    SelfComponent,

    /// BOM without components.
    #[error("Bill of materials must have at least one component")]
    NoComponents,

    /// Order quantity must be positive.
    #[error("Production quantity must be greater than zero")]
    InvalidOrderQuantity,

    /// Only drafts can be completed.
    #[error("Only draft production orders can be completed")]
    NotDraftForComplete,

    /// Only drafts can be cancelled.
    #[error("Only draft production orders can be cancelled")]
    NotDraftForCancel,

    /// Component stock short.
    #[error("Insufficient stock for component {product_id}: available {available}, required {required}")]
    InsufficientComponent {
        /// Component product.
        product_id: Uuid,
        /// Available quantity in the warehouse.
        available: Decimal,
        /// Quantity the order needs.
        required: Decimal,
    },

    /// Stock update failed.
    #[error(transparent)]
    Inventory(#[from] InventoryError),
}

impl ManufacturingError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidOutputQuantity => "INVALID_OUTPUT_QUANTITY",
            Self::InvalidComponentQuantity => "INVALID_COMPONENT_QUANTITY",
            Self::SelfComponent => "SELF_COMPONENT",
            Self::NoComponents => "NO_COMPONENTS",
            Self::InvalidOrderQuantity => "INVALID_ORDER_QUANTITY",
            Self::NotDraftForComplete => "NOT_DRAFT_FOR_COMPLETE",
            Self::NotDraftForCancel => "NOT_DRAFT_FOR_CANCEL",
            Self::InsufficientComponent { .. } => "INSUFFICIENT_COMPONENT",
            Self::Inventory(e) => e.error_code(),
        }
    }
}

impl From<ManufacturingError> for AppError {
    fn from(err: ManufacturingError) -> Self {
        match err {
            ManufacturingError::Inventory(e) => e.into(),
            ManufacturingError::InvalidOutputQuantity
            | ManufacturingError::InvalidComponentQuantity
            | ManufacturingError::SelfComponent
            | ManufacturingError::NoComponents
            | ManufacturingError::InvalidOrderQuantity => Self::Validation(err.to_string()),
            _ => Self::BusinessRule(err.to_string()),
        }
    }
}
