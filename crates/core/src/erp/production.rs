//! Production costing.
//!
//! Completing an order consumes `line.qty × order.qty / bom.output_quantity`
//! of every component at its average cost, and receives the finished product
//! at `unit_cost = consumed_cost / order.qty`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use kontor_shared::types::round_base;

use super::error::ManufacturingError;
use crate::inventory::StockPosition;

/// Production order lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductionStatus {
    /// Planned.
    Draft,
    /// Components consumed, product received.
    Completed,
    /// Withdrawn.
    Cancelled,
}

/// One component of a bill of materials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BomLine {
    /// Component product.
    pub component_id: Uuid,
    /// Quantity per `output_quantity` of finished product.
    pub quantity: Decimal,
}

/// Quantity of one component an order needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRequirement {
    /// Component product.
    pub component_id: Uuid,
    /// Quantity to consume.
    pub required: Decimal,
}

/// Stock effects of completing an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductionPlan {
    /// New component positions, in requirement order.
    pub components: Vec<(Uuid, StockPosition)>,
    /// Σ required × component average cost.
    pub consumed_cost: Decimal,
    /// Cost per finished unit.
    pub unit_cost: Decimal,
    /// New finished product position.
    pub finished: StockPosition,
}

/// Manufacturing rules.
pub struct ProductionService;

impl ProductionService {
    /// Validates a bill of materials.
    pub fn validate_bom(
        product_id: Uuid,
        output_quantity: Decimal,
        lines: &[BomLine],
    ) -> Result<(), ManufacturingError> {
        if output_quantity <= Decimal::ZERO {
            return Err(ManufacturingError::InvalidOutputQuantity);
        }
        if lines.is_empty() {
            return Err(ManufacturingError::NoComponents);
        }
        for line in lines {
            if line.component_id == product_id {
                return Err(ManufacturingError::SelfComponent);
            }
            if line.quantity <= Decimal::ZERO {
                return Err(ManufacturingError::InvalidComponentQuantity);
            }
        }
        Ok(())
    }

    /// Validates an order quantity.
    pub fn validate_order_quantity(quantity: Decimal) -> Result<(), ManufacturingError> {
        if quantity <= Decimal::ZERO {
            return Err(ManufacturingError::InvalidOrderQuantity);
        }
        Ok(())
    }

    /// Validates a draft → completed transition.
    pub fn validate_can_complete(status: ProductionStatus) -> Result<(), ManufacturingError> {
        if status == ProductionStatus::Draft {
            Ok(())
        } else {
            Err(ManufacturingError::NotDraftForComplete)
        }
    }

    /// Validates a draft → cancelled transition.
    pub fn validate_can_cancel(status: ProductionStatus) -> Result<(), ManufacturingError> {
        if status == ProductionStatus::Draft {
            Ok(())
        } else {
            Err(ManufacturingError::NotDraftForCancel)
        }
    }

    /// Scales BOM lines to an order quantity. Repeated components are merged;
    /// components whose scaled quantity rounds to zero are dropped.
    #[must_use]
    pub fn requirements(
        output_quantity: Decimal,
        lines: &[BomLine],
        order_quantity: Decimal,
    ) -> Vec<ComponentRequirement> {
        let mut reqs: Vec<ComponentRequirement> = Vec::with_capacity(lines.len());
        for l in lines {
            let required = round_base(l.quantity * order_quantity / output_quantity);
            match reqs.iter_mut().find(|r| r.component_id == l.component_id) {
                Some(existing) => existing.required += required,
                None => reqs.push(ComponentRequirement {
                    component_id: l.component_id,
                    required,
                }),
            }
        }
        reqs.retain(|r| r.required > Decimal::ZERO);
        reqs
    }

    /// Plans the stock effects of completing an order.
    ///
    /// `component_positions` looks up each component's stock in the order's
    /// warehouse; missing stock is treated as empty.
    pub fn plan_completion<F>(
        order_quantity: Decimal,
        requirements: &[ComponentRequirement],
        component_positions: F,
        finished: StockPosition,
    ) -> Result<ProductionPlan, ManufacturingError>
    where
        F: Fn(Uuid) -> StockPosition,
    {
        Self::validate_order_quantity(order_quantity)?;

        let mut components = Vec::with_capacity(requirements.len());
        let mut consumed_cost = Decimal::ZERO;

        for req in requirements.iter().filter(|r| r.required > Decimal::ZERO) {
            let position = component_positions(req.component_id);
            if position.available() < req.required {
                return Err(ManufacturingError::InsufficientComponent {
                    product_id: req.component_id,
                    available: position.available(),
                    required: req.required,
                });
            }
            consumed_cost += req.required * position.average_cost;
            components.push((req.component_id, position.apply_delta(-req.required, None)?));
        }

        let consumed_cost = round_base(consumed_cost);
        let unit_cost = round_base(consumed_cost / order_quantity);
        let finished = finished.apply_delta(order_quantity, Some(unit_cost))?;

        Ok(ProductionPlan {
            components,
            consumed_cost,
            unit_cost,
            finished,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn pos(quantity: Decimal, average_cost: Decimal) -> StockPosition {
        StockPosition {
            quantity,
            reserved: Decimal::ZERO,
            average_cost,
        }
    }

    #[test]
    fn test_validate_bom() {
        let product = Uuid::new_v4();
        let line = BomLine {
            component_id: Uuid::new_v4(),
            quantity: dec!(2),
        };
        assert!(ProductionService::validate_bom(product, dec!(1), &[line]).is_ok());
        assert!(matches!(
            ProductionService::validate_bom(product, dec!(0), &[line]),
            Err(ManufacturingError::InvalidOutputQuantity)
        ));
        assert!(matches!(
            ProductionService::validate_bom(product, dec!(1), &[]),
            Err(ManufacturingError::NoComponents)
        ));
        let own = BomLine {
            component_id: product,
            quantity: dec!(1),
        };
        assert!(matches!(
            ProductionService::validate_bom(product, dec!(1), &[own]),
            Err(ManufacturingError::SelfComponent)
        ));
    }

    #[test]
    fn test_requirements_scale_with_output() {
        let wood = Uuid::new_v4();
        let reqs = ProductionService::requirements(
            dec!(4),
            &[BomLine {
                component_id: wood,
                quantity: dec!(10),
            }],
            dec!(6),
        );
        assert_eq!(reqs[0].required, dec!(15));

        let merged = ProductionService::requirements(
            dec!(1),
            &[
                BomLine { component_id: wood, quantity: dec!(1) },
                BomLine { component_id: wood, quantity: dec!(2) },
            ],
            dec!(2),
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].required, dec!(6));
    }

    #[test]
    fn test_plan_completion_costs_finished_goods() {
        let wood = Uuid::new_v4();
        let screws = Uuid::new_v4();
        let stock: HashMap<Uuid, StockPosition> =
            [(wood, pos(dec!(100), dec!(3))), (screws, pos(dec!(1000), dec!(0.10)))]
                .into_iter()
                .collect();
        let reqs = [
            ComponentRequirement { component_id: wood, required: dec!(20) },
            ComponentRequirement { component_id: screws, required: dec!(100) },
        ];

        let plan = ProductionService::plan_completion(
            dec!(5),
            &reqs,
            |id| stock.get(&id).copied().unwrap_or_default(),
            StockPosition::default(),
        )
        .unwrap();

        assert_eq!(plan.consumed_cost, dec!(70));
        assert_eq!(plan.unit_cost, dec!(14));
        assert_eq!(plan.components[0].1.quantity, dec!(80));
        assert_eq!(plan.components[0].1.average_cost, dec!(3));
        assert_eq!(plan.finished.quantity, dec!(5));
        assert_eq!(plan.finished.average_cost, dec!(14));
    }

    #[test]
    fn test_negligible_component_is_not_consumed() {
        let glue = Uuid::new_v4();
        let wood = Uuid::new_v4();
        let reqs = ProductionService::requirements(
            dec!(100),
            &[
                BomLine { component_id: glue, quantity: dec!(0.0001) },
                BomLine { component_id: wood, quantity: dec!(200) },
            ],
            dec!(1),
        );
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].component_id, wood);

        let plan = ProductionService::plan_completion(
            dec!(1),
            &reqs,
            |_| pos(dec!(50), dec!(2)),
            StockPosition::default(),
        )
        .unwrap();
        assert_eq!(plan.components.len(), 1);
        assert_eq!(plan.consumed_cost, dec!(4));
        assert_eq!(plan.finished.average_cost, dec!(4));

        let zero = [ComponentRequirement { component_id: glue, required: dec!(0.0000) }];
        let plan = ProductionService::plan_completion(
            dec!(1),
            &zero,
            |_| pos(dec!(50), dec!(2)),
            StockPosition::default(),
        )
        .unwrap();
        assert!(plan.components.is_empty());
        assert_eq!(plan.unit_cost, Decimal::ZERO);
        assert_eq!(plan.finished.quantity, dec!(1));
    }

    #[test]
    fn test_plan_completion_insufficient_component() {
        let wood = Uuid::new_v4();
        let reqs = [ComponentRequirement { component_id: wood, required: dec!(20) }];
        let err = ProductionService::plan_completion(
            dec!(1),
            &reqs,
            |_| pos(dec!(5), dec!(3)),
            StockPosition::default(),
        )
        .unwrap_err();

        assert!(err.to_string().starts_with("Insufficient stock for component"));
    }

    #[test]
    fn test_transitions() {
        assert!(ProductionService::validate_can_complete(ProductionStatus::Draft).is_ok());
        assert!(ProductionService::validate_can_complete(ProductionStatus::Completed).is_err());
        assert!(ProductionService::validate_can_cancel(ProductionStatus::Cancelled).is_err());
    }
}
