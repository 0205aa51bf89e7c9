//! Manufacturing repository: bills of materials and production orders.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use kontor_core::erp::{BomLine, ProductionService};
use kontor_core::inventory::StockPosition;
use kontor_core::numbering::PRODUCTION_PREFIX;
use kontor_shared::types::{PageRequest, PageResponse};

use crate::entities::{
    bom_lines, boms, production_orders, sea_orm_active_enums::ProductionStatus, stock_levels,
};
use crate::error::{RepoError, RepoResult};

use super::inventory::{find_product, find_warehouse, load_position, save_position};
use super::{fetch_page, next_document_number};

/// Input for creating a bill of materials.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBomInput {
    /// Finished product.
    pub product_id: Uuid,
    /// Name.
    pub name: String,
    /// Finished quantity the component lines produce.
    pub output_quantity: Decimal,
    /// Components.
    pub lines: Vec<BomLine>,
}

/// Bill of materials with its components.
#[derive(Debug, Clone, Serialize)]
pub struct BomWithLines {
    /// Header.
    #[serde(flatten)]
    pub bom: boms::Model,
    /// Components.
    pub lines: Vec<bom_lines::Model>,
}

/// Input for creating a draft production order.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProductionOrderInput {
    /// Bill of materials to produce from.
    pub bom_id: Uuid,
    /// Warehouse components come from and output goes to.
    pub warehouse_id: Uuid,
    /// Finished quantity.
    pub quantity: Decimal,
}

/// Manufacturing repository.
#[derive(Debug, Clone)]
pub struct ManufacturingRepository {
    db: DatabaseConnection,
}

impl ManufacturingRepository {
    /// Creates a new manufacturing repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a bill of materials.
    ///
    /// # Errors
    ///
    /// Returns an error if the BOM is invalid or references unknown products.
    pub async fn create_bom(
        &self,
        organization_id: Uuid,
        input: CreateBomInput,
    ) -> RepoResult<BomWithLines> {
        ProductionService::validate_bom(input.product_id, input.output_quantity, &input.lines)?;

        let txn = self.db.begin().await?;

        find_product(&txn, organization_id, input.product_id).await?;
        for line in &input.lines {
            find_product(&txn, organization_id, line.component_id).await?;
        }

        let now = chrono::Utc::now().into();
        let bom = boms::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(organization_id),
            product_id: Set(input.product_id),
            name: Set(input.name),
            output_quantity: Set(input.output_quantity),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let mut lines = Vec::with_capacity(input.lines.len());
        for line in input.lines {
            let model = bom_lines::ActiveModel {
                id: Set(Uuid::new_v4()),
                organization_id: Set(organization_id),
                bom_id: Set(bom.id),
                component_id: Set(line.component_id),
                quantity: Set(line.quantity),
            }
            .insert(&txn)
            .await?;
            lines.push(model);
        }

        txn.commit().await?;

        info!(bom_id = %bom.id, components = lines.len(), "bill of materials created");
        Ok(BomWithLines { bom, lines })
    }

    /// Lists bills of materials with their components.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_boms(&self, organization_id: Uuid) -> RepoResult<Vec<BomWithLines>> {
        let rows = boms::Entity::find()
            .filter(boms::Column::OrganizationId.eq(organization_id))
            .order_by_asc(boms::Column::Name)
            .find_with_related(bom_lines::Entity)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(bom, lines)| BomWithLines { bom, lines })
            .collect())
    }

    /// Creates a draft production order for the BOM's product.
    ///
    /// # Errors
    ///
    /// Returns an error if the quantity is not positive or the BOM or
    /// warehouse does not exist.
    pub async fn create_order(
        &self,
        organization_id: Uuid,
        created_by: Uuid,
        input: CreateProductionOrderInput,
    ) -> RepoResult<production_orders::Model> {
        ProductionService::validate_order_quantity(input.quantity)?;

        let txn = self.db.begin().await?;

        let bom = find_bom(&txn, organization_id, input.bom_id).await?;
        find_warehouse(&txn, organization_id, input.warehouse_id).await?;

        let order_number = next_document_number::<production_orders::Entity, _>(
            &txn,
            production_orders::Column::OrganizationId,
            production_orders::Column::OrderNumber,
            organization_id,
            PRODUCTION_PREFIX,
        )
        .await?;

        let now = chrono::Utc::now().into();
        let order = production_orders::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(organization_id),
            order_number: Set(order_number),
            bom_id: Set(bom.id),
            product_id: Set(bom.product_id),
            warehouse_id: Set(input.warehouse_id),
            quantity: Set(input.quantity),
            status: Set(ProductionStatus::Draft),
            unit_cost: Set(None),
            created_by: Set(created_by),
            completed_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!(order_id = %order.id, number = %order.order_number, "production order created");
        Ok(order)
    }

    /// Lists production orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_orders(
        &self,
        organization_id: Uuid,
        status: Option<ProductionStatus>,
        page: &PageRequest,
    ) -> RepoResult<PageResponse<production_orders::Model>> {
        let mut query = production_orders::Entity::find()
            .filter(production_orders::Column::OrganizationId.eq(organization_id))
            .order_by_desc(production_orders::Column::OrderNumber);
        if let Some(status) = status {
            query = query.filter(production_orders::Column::Status.eq(status));
        }

        Ok(fetch_page(&self.db, query, page).await?)
    }

    /// Finds a production order.
    ///
    /// # Errors
    ///
    /// Returns an error if the order does not exist or the query fails.
    pub async fn get_order(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> RepoResult<production_orders::Model> {
        find_order(&self.db, organization_id, id, false).await
    }

    /// Completes a draft order: consumes components and receives the
    /// finished product at the consumed cost.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is not a draft or a component is short.
    pub async fn complete_order(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> RepoResult<production_orders::Model> {
        let txn = self.db.begin().await?;

        let order = find_order(&txn, organization_id, id, true).await?;
        ProductionService::validate_can_complete(order.status.into())?;

        let bom = find_bom(&txn, organization_id, order.bom_id).await?;
        let bom_lines: Vec<BomLine> = bom_lines::Entity::find()
            .filter(bom_lines::Column::BomId.eq(bom.id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|l| BomLine {
                component_id: l.component_id,
                quantity: l.quantity,
            })
            .collect();
        let requirements =
            ProductionService::requirements(bom.output_quantity, &bom_lines, order.quantity);

        let mut levels: HashMap<Uuid, (Option<stock_levels::Model>, StockPosition)> =
            HashMap::with_capacity(requirements.len());
        for req in &requirements {
            let loaded =
                load_position(&txn, organization_id, req.component_id, order.warehouse_id).await?;
            levels.insert(req.component_id, loaded);
        }
        let (finished_row, finished) =
            load_position(&txn, organization_id, order.product_id, order.warehouse_id).await?;

        let plan = match ProductionService::plan_completion(
            order.quantity,
            &requirements,
            |component_id| {
                levels
                    .get(&component_id)
                    .map(|(_, position)| *position)
                    .unwrap_or_default()
            },
            finished,
        ) {
            Ok(plan) => plan,
            Err(err) => {
                warn!(order_id = %id, error = %err, "production order completion rejected");
                return Err(err.into());
            }
        };

        for (component_id, position) in plan.components {
            let existing = levels.remove(&component_id).and_then(|(row, _)| row);
            save_position(
                &txn,
                organization_id,
                component_id,
                order.warehouse_id,
                existing,
                position,
            )
            .await?;
        }
        save_position(
            &txn,
            organization_id,
            order.product_id,
            order.warehouse_id,
            finished_row,
            plan.finished,
        )
        .await?;

        let now = chrono::Utc::now().into();
        let mut active: production_orders::ActiveModel = order.into();
        active.status = Set(ProductionStatus::Completed);
        active.unit_cost = Set(Some(plan.unit_cost));
        active.completed_at = Set(Some(now));
        active.updated_at = Set(now);
        let order = active.update(&txn).await?;

        txn.commit().await?;

        info!(
            order_id = %id,
            consumed_cost = %plan.consumed_cost,
            unit_cost = %plan.unit_cost,
            "production order completed"
        );
        Ok(order)
    }

    /// Cancels a draft order.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is not a draft.
    pub async fn cancel_order(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> RepoResult<production_orders::Model> {
        let txn = self.db.begin().await?;

        let order = find_order(&txn, organization_id, id, true).await?;
        ProductionService::validate_can_cancel(order.status.into())?;

        let mut active: production_orders::ActiveModel = order.into();
        active.status = Set(ProductionStatus::Cancelled);
        active.updated_at = Set(chrono::Utc::now().into());
        let order = active.update(&txn).await?;

        txn.commit().await?;

        info!(order_id = %id, "production order cancelled");
        Ok(order)
    }
}

async fn find_bom<C: ConnectionTrait>(
    conn: &C,
    organization_id: Uuid,
    id: Uuid,
) -> RepoResult<boms::Model> {
    boms::Entity::find_by_id(id)
        .filter(boms::Column::OrganizationId.eq(organization_id))
        .one(conn)
        .await?
        .ok_or(RepoError::not_found("Bill of materials", id))
}

async fn find_order<C: ConnectionTrait>(
    conn: &C,
    organization_id: Uuid,
    id: Uuid,
    for_update: bool,
) -> RepoResult<production_orders::Model> {
    let mut query = production_orders::Entity::find_by_id(id)
        .filter(production_orders::Column::OrganizationId.eq(organization_id));
    if for_update {
        query = query.lock_exclusive();
    }
    query
        .one(conn)
        .await?
        .ok_or(RepoError::not_found("Production order", id))
}
