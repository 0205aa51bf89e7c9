//! Light manufacturing: bills of materials and production orders.

pub mod error;
pub mod production;

pub use error::ManufacturingError;
pub use production::{
    BomLine, ComponentRequirement, ProductionPlan, ProductionService, ProductionStatus,
};
