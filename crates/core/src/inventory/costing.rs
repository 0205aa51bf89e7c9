//! Weighted-average stock costing.
//!
//! On a positive delta with positive existing quantity:
//! `avg = (old_qty × old_cost + delta × new_cost) / (old_qty + delta)`.
//! When existing quantity is not positive the cost is replaced.
//! Negative deltas leave the average cost unchanged.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use kontor_shared::types::round_base;

use super::error::InventoryError;

/// Stock held for one product in one warehouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StockPosition {
    /// Quantity on hand.
    pub quantity: Decimal,
    /// Quantity set aside for pending orders.
    pub reserved: Decimal,
    /// Weighted-average unit cost.
    pub average_cost: Decimal,
}

impl StockPosition {
    /// Quantity on hand not reserved.
    #[must_use]
    pub fn available(&self) -> Decimal {
        self.quantity - self.reserved
    }

    /// Stock value at average cost.
    #[must_use]
    pub fn value(&self) -> Decimal {
        self.quantity * self.average_cost
    }

    /// Applies a signed quantity change.
    ///
    /// `unit_cost` defaults to the current average cost. A decrement that would
    /// take quantity below zero or below the reserved quantity is rejected.
    pub fn apply_delta(
        &self,
        delta: Decimal,
        unit_cost: Option<Decimal>,
    ) -> Result<Self, InventoryError> {
        if delta.is_zero() {
            return Err(InventoryError::InvalidQuantity);
        }
        let unit_cost = unit_cost.unwrap_or(self.average_cost);
        if unit_cost < Decimal::ZERO {
            return Err(InventoryError::NegativeCost);
        }

        if delta < Decimal::ZERO {
            let requested = -delta;
            if requested > self.available() {
                return Err(InventoryError::InsufficientStock {
                    available: self.available(),
                    requested,
                });
            }
            return Ok(Self {
                quantity: self.quantity + delta,
                ..*self
            });
        }

        let new_quantity = self.quantity + delta;
        let average_cost = if self.quantity > Decimal::ZERO {
            round_base((self.quantity * self.average_cost + delta * unit_cost) / new_quantity)
        } else {
            unit_cost
        };

        Ok(Self {
            quantity: new_quantity,
            reserved: self.reserved,
            average_cost,
        })
    }

    /// Moves `qty` from available to reserved.
    pub fn reserve(&self, qty: Decimal) -> Result<Self, InventoryError> {
        if qty <= Decimal::ZERO {
            return Err(InventoryError::InvalidQuantity);
        }
        if qty > self.available() {
            return Err(InventoryError::InsufficientStock {
                available: self.available(),
                requested: qty,
            });
        }
        Ok(Self {
            reserved: self.reserved + qty,
            ..*self
        })
    }

    /// Moves `qty` from reserved back to available.
    pub fn release(&self, qty: Decimal) -> Result<Self, InventoryError> {
        if qty <= Decimal::ZERO {
            return Err(InventoryError::InvalidQuantity);
        }
        if qty > self.reserved {
            return Err(InventoryError::ReleaseExceedsReserved {
                reserved: self.reserved,
                requested: qty,
            });
        }
        Ok(Self {
            reserved: self.reserved - qty,
            ..*self
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn pos(quantity: Decimal, reserved: Decimal, average_cost: Decimal) -> StockPosition {
        StockPosition {
            quantity,
            reserved,
            average_cost,
        }
    }

    #[test]
    fn test_weighted_average_on_receipt() {
        let next = pos(dec!(10), dec!(0), dec!(5)).apply_delta(dec!(10), Some(dec!(7))).unwrap();
        assert_eq!(next.quantity, dec!(20));
        assert_eq!(next.average_cost, dec!(6));
    }

    #[test]
    fn test_cost_replaced_when_empty() {
        let next = pos(dec!(0), dec!(0), dec!(5)).apply_delta(dec!(4), Some(dec!(9))).unwrap();
        assert_eq!(next.average_cost, dec!(9));
    }

    #[test]
    fn test_issue_keeps_cost() {
        let next = pos(dec!(10), dec!(0), dec!(5)).apply_delta(dec!(-4), None).unwrap();
        assert_eq!(next.quantity, dec!(6));
        assert_eq!(next.average_cost, dec!(5));
    }

    #[test]
    fn test_receipt_defaults_to_current_cost() {
        let next = pos(dec!(10), dec!(0), dec!(5)).apply_delta(dec!(5), None).unwrap();
        assert_eq!(next.average_cost, dec!(5));
    }

    #[test]
    fn test_insufficient_stock() {
        let err = pos(dec!(3), dec!(0), dec!(5)).apply_delta(dec!(-4), None).unwrap_err();
        assert!(err.to_string().starts_with("Insufficient stock"));

        // Reserved stock cannot be issued.
        assert!(matches!(
            pos(dec!(10), dec!(8), dec!(5)).apply_delta(dec!(-3), None),
            Err(InventoryError::InsufficientStock { .. })
        ));
    }

    #[test]
    fn test_reserve_and_release() {
        let start = pos(dec!(10), dec!(0), dec!(5));
        let reserved = start.reserve(dec!(4)).unwrap();
        assert_eq!(reserved.available(), dec!(6));
        assert!(reserved.reserve(dec!(7)).is_err());

        let released = reserved.release(dec!(4)).unwrap();
        assert_eq!(released, start);
        assert!(matches!(
            start.release(dec!(1)),
            Err(InventoryError::ReleaseExceedsReserved { .. })
        ));
    }

    #[test]
    fn test_zero_delta_rejected() {
        assert!(matches!(
            StockPosition::default().apply_delta(Decimal::ZERO, None),
            Err(InventoryError::InvalidQuantity)
        ));
    }
}
