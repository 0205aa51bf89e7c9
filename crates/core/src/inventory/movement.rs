//! Stock movement documents.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::costing::StockPosition;
use super::error::InventoryError;

/// Kind of stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    /// Goods received into a destination warehouse.
    Receipt,
    /// Goods issued out of a source warehouse.
    Issue,
    /// Goods moved from source to destination.
    Transfer,
    /// Stock count correction into a destination warehouse.
    Adjustment,
}

impl MovementType {
    /// Whether lines decrement the source warehouse.
    #[must_use]
    pub const fn uses_source(self) -> bool {
        matches!(self, Self::Issue | Self::Transfer)
    }

    /// Whether lines increment the destination warehouse.
    #[must_use]
    pub const fn uses_destination(self) -> bool {
        matches!(self, Self::Receipt | Self::Transfer | Self::Adjustment)
    }
}

/// Movement lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementStatus {
    /// Editable, no stock effect.
    Draft,
    /// Applied to stock levels.
    Confirmed,
    /// Withdrawn before confirmation.
    Cancelled,
}

/// One product line of a movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementLine {
    /// Product moved.
    pub product_id: Uuid,
    /// Quantity moved (positive).
    pub quantity: Decimal,
    /// Unit cost for incoming stock; defaults per movement type.
    #[serde(default)]
    pub unit_cost: Option<Decimal>,
}

/// Movement validation and stock effects.
pub struct MovementService;

impl MovementService {
    /// Validates a new movement.
    pub fn validate_create(
        movement_type: MovementType,
        source: Option<Uuid>,
        destination: Option<Uuid>,
        lines: &[MovementLine],
    ) -> Result<(), InventoryError> {
        if movement_type.uses_source() && source.is_none() {
            return Err(InventoryError::MissingSource);
        }
        if movement_type.uses_destination() && destination.is_none() {
            return Err(InventoryError::MissingDestination);
        }
        if movement_type == MovementType::Transfer && source == destination {
            return Err(InventoryError::SameWarehouse);
        }
        if lines.is_empty() {
            return Err(InventoryError::NoLines);
        }
        for line in lines {
            if line.quantity <= Decimal::ZERO {
                return Err(InventoryError::InvalidQuantity);
            }
            if line.unit_cost.is_some_and(|c| c < Decimal::ZERO) {
                return Err(InventoryError::NegativeCost);
            }
        }
        Ok(())
    }

    /// Validates a draft → confirmed transition.
    pub fn validate_can_confirm(status: MovementStatus) -> Result<(), InventoryError> {
        if status == MovementStatus::Draft {
            Ok(())
        } else {
            Err(InventoryError::NotDraftForConfirm)
        }
    }

    /// Validates a draft → cancelled transition.
    pub fn validate_can_cancel(status: MovementStatus) -> Result<(), InventoryError> {
        if status == MovementStatus::Draft {
            Ok(())
        } else {
            Err(InventoryError::NotDraftForCancel)
        }
    }

    /// Applies one line to the source and destination positions.
    ///
    /// Positions are `None` for warehouses the movement type does not touch.
    /// Transfers carry the source's average cost unless the line names one.
    pub fn apply_line(
        movement_type: MovementType,
        source: Option<StockPosition>,
        destination: Option<StockPosition>,
        line: &MovementLine,
    ) -> Result<(Option<StockPosition>, Option<StockPosition>), InventoryError> {
        let mut incoming_cost = line.unit_cost;

        let source = match (movement_type.uses_source(), source) {
            (true, Some(pos)) => {
                if movement_type == MovementType::Transfer && incoming_cost.is_none() {
                    incoming_cost = Some(pos.average_cost);
                }
                Some(pos.apply_delta(-line.quantity, None)?)
            }
            (true, None) => return Err(InventoryError::MissingSource),
            (false, _) => None,
        };

        let destination = match (movement_type.uses_destination(), destination) {
            (true, Some(pos)) => Some(pos.apply_delta(line.quantity, incoming_cost)?),
            (true, None) => return Err(InventoryError::MissingDestination),
            (false, _) => None,
        };

        Ok((source, destination))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(quantity: Decimal, unit_cost: Option<Decimal>) -> MovementLine {
        MovementLine {
            product_id: Uuid::new_v4(),
            quantity,
            unit_cost,
        }
    }

    fn pos(quantity: Decimal, average_cost: Decimal) -> StockPosition {
        StockPosition {
            quantity,
            reserved: Decimal::ZERO,
            average_cost,
        }
    }

    #[test]
    fn test_validate_create() {
        let a = Some(Uuid::new_v4());
        let b = Some(Uuid::new_v4());
        let lines = [line(dec!(1), None)];

        assert!(MovementService::validate_create(MovementType::Receipt, None, a, &lines).is_ok());
        assert!(MovementService::validate_create(MovementType::Transfer, a, b, &lines).is_ok());
        assert!(matches!(
            MovementService::validate_create(MovementType::Issue, None, a, &lines),
            Err(InventoryError::MissingSource)
        ));
        assert!(matches!(
            MovementService::validate_create(MovementType::Transfer, a, a, &lines),
            Err(InventoryError::SameWarehouse)
        ));
        assert!(matches!(
            MovementService::validate_create(MovementType::Receipt, None, a, &[]),
            Err(InventoryError::NoLines)
        ));
        assert!(matches!(
            MovementService::validate_create(MovementType::Receipt, None, a, &[line(dec!(0), None)]),
            Err(InventoryError::InvalidQuantity)
        ));
    }

    #[test]
    fn test_confirm_only_draft() {
        assert!(MovementService::validate_can_confirm(MovementStatus::Draft).is_ok());
        let err = MovementService::validate_can_confirm(MovementStatus::Confirmed).unwrap_err();
        assert_eq!(err.to_string(), "Only draft movements can be confirmed");
        assert!(MovementService::validate_can_cancel(MovementStatus::Cancelled).is_err());
    }

    #[test]
    fn test_receipt_line() {
        let (src, dst) = MovementService::apply_line(
            MovementType::Receipt,
            None,
            Some(pos(dec!(10), dec!(2))),
            &line(dec!(10), Some(dec!(4))),
        )
        .unwrap();
        assert!(src.is_none());
        let dst = dst.unwrap();
        assert_eq!(dst.quantity, dec!(20));
        assert_eq!(dst.average_cost, dec!(3));
    }

    #[test]
    fn test_transfer_carries_source_cost() {
        let (src, dst) = MovementService::apply_line(
            MovementType::Transfer,
            Some(pos(dec!(10), dec!(8))),
            Some(StockPosition::default()),
            &line(dec!(4), None),
        )
        .unwrap();
        assert_eq!(src.unwrap().quantity, dec!(6));
        let dst = dst.unwrap();
        assert_eq!(dst.quantity, dec!(4));
        assert_eq!(dst.average_cost, dec!(8));
    }

    #[test]
    fn test_issue_insufficient() {
        let result = MovementService::apply_line(
            MovementType::Issue,
            Some(pos(dec!(2), dec!(8))),
            None,
            &line(dec!(4), None),
        );
        assert!(matches!(result, Err(InventoryError::InsufficientStock { .. })));
    }
}
