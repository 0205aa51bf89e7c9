//! Inventory costing and stock movements.
//!
//! - `costing` - Weighted-average cost, reservations
//! - `movement` - Receipt/issue/transfer/adjustment documents

pub mod costing;
pub mod error;
pub mod movement;

#[cfg(test)]
mod costing_props;

pub use costing::StockPosition;
pub use error::InventoryError;
pub use movement::{MovementLine, MovementService, MovementStatus, MovementType};
