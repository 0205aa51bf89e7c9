//! Inventory repository: products, warehouses, stock levels and movements.
//!
//! Every stock read-modify-write locks the `stock_levels` row for the
//! duration of the caller's transaction.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use kontor_core::inventory::{InventoryError, MovementLine, MovementService, StockPosition};
use kontor_core::numbering::MOVEMENT_PREFIX;
use kontor_shared::types::{PageRequest, PageResponse};

use crate::entities::{
    products, stock_levels, stock_movement_lines, stock_movements,
    sea_orm_active_enums::{MovementStatus, MovementType},
    warehouses,
};
use crate::error::{RepoError, RepoResult};

use super::{fetch_page, next_document_number};

fn default_unit() -> String {
    "unit".to_string()
}

const fn default_true() -> bool {
    true
}

/// Input for creating a product.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProductInput {
    /// Stock keeping unit (unique within organization).
    pub sku: String,
    /// Product name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Unit of measure.
    #[serde(default = "default_unit")]
    pub unit: String,
    /// Default selling price.
    #[serde(default)]
    pub sale_price: Decimal,
    /// Whether the product is active.
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Input for updating a product.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProductInput {
    /// SKU.
    pub sku: Option<String>,
    /// Name.
    pub name: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Unit of measure.
    pub unit: Option<String>,
    /// Selling price.
    pub sale_price: Option<Decimal>,
    /// Active flag.
    pub is_active: Option<bool>,
}

/// Input for creating a warehouse.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateWarehouseInput {
    /// Warehouse code (unique within organization).
    pub code: String,
    /// Name.
    pub name: String,
    /// Address.
    #[serde(default)]
    pub address: Option<String>,
    /// Whether the warehouse is active.
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Input for updating a warehouse.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateWarehouseInput {
    /// Code.
    pub code: Option<String>,
    /// Name.
    pub name: Option<String>,
    /// Address.
    pub address: Option<String>,
    /// Active flag.
    pub is_active: Option<bool>,
}

/// Signed stock adjustment.
#[derive(Debug, Clone, Deserialize)]
pub struct AdjustStockInput {
    /// Product.
    pub product_id: Uuid,
    /// Warehouse.
    pub warehouse_id: Uuid,
    /// Signed quantity change.
    pub quantity: Decimal,
    /// Unit cost of incoming stock; defaults to the current average.
    #[serde(default)]
    pub unit_cost: Option<Decimal>,
}

/// Quantity for reserve and release.
#[derive(Debug, Clone, Deserialize)]
pub struct StockQuantityInput {
    /// Product.
    pub product_id: Uuid,
    /// Warehouse.
    pub warehouse_id: Uuid,
    /// Positive quantity.
    pub quantity: Decimal,
}

/// Filter for stock level listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StockFilter {
    /// Restrict to one product.
    pub product_id: Option<Uuid>,
    /// Restrict to one warehouse.
    pub warehouse_id: Option<Uuid>,
}

/// Stock level with derived figures.
#[derive(Debug, Clone, Serialize)]
pub struct StockLevelView {
    /// Stored level.
    #[serde(flatten)]
    pub level: stock_levels::Model,
    /// Quantity minus reserved.
    pub available: Decimal,
    /// Quantity times average cost.
    pub value: Decimal,
}

impl From<stock_levels::Model> for StockLevelView {
    fn from(level: stock_levels::Model) -> Self {
        let position = position_of(&level);
        Self {
            available: position.available(),
            value: position.value(),
            level,
        }
    }
}

/// Inventory value at average cost.
#[derive(Debug, Clone, Serialize)]
pub struct StockValuation {
    /// Warehouse the valuation covers, or all when absent.
    pub warehouse_id: Option<Uuid>,
    /// Valued stock levels.
    pub items: Vec<StockLevelView>,
    /// Sum of item values.
    pub total_value: Decimal,
}

/// Input for creating a draft movement.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMovementInput {
    /// Movement type.
    pub movement_type: MovementType,
    /// Source warehouse (issue, transfer).
    #[serde(default)]
    pub source_warehouse_id: Option<Uuid>,
    /// Destination warehouse (receipt, transfer, adjustment).
    #[serde(default)]
    pub destination_warehouse_id: Option<Uuid>,
    /// Movement date; defaults to today.
    #[serde(default)]
    pub movement_date: Option<NaiveDate>,
    /// External reference.
    #[serde(default)]
    pub reference: Option<String>,
    /// Notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Lines.
    pub lines: Vec<MovementLine>,
}

/// Movement with its lines.
#[derive(Debug, Clone, Serialize)]
pub struct MovementWithLines {
    /// Movement header.
    #[serde(flatten)]
    pub movement: stock_movements::Model,
    /// Lines.
    pub lines: Vec<stock_movement_lines::Model>,
}

/// Inventory repository.
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    db: DatabaseConnection,
}

impl InventoryRepository {
    /// Creates a new inventory repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    // ------------------------------------------------------------------
    // Products
    // ------------------------------------------------------------------

    /// Creates a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the SKU is taken or the insert fails.
    pub async fn create_product(
        &self,
        organization_id: Uuid,
        input: CreateProductInput,
    ) -> RepoResult<products::Model> {
        self.ensure_sku_free(organization_id, &input.sku, None)
            .await?;

        let now = chrono::Utc::now().into();
        let product = products::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(organization_id),
            sku: Set(input.sku),
            name: Set(input.name),
            description: Set(input.description),
            unit: Set(input.unit),
            sale_price: Set(input.sale_price),
            is_active: Set(input.is_active),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        info!(product_id = %product.id, sku = %product.sku, "product created");
        Ok(product)
    }

    /// Lists products ordered by SKU.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_products(&self, organization_id: Uuid) -> RepoResult<Vec<products::Model>> {
        Ok(products::Entity::find()
            .filter(products::Column::OrganizationId.eq(organization_id))
            .order_by_asc(products::Column::Sku)
            .all(&self.db)
            .await?)
    }

    /// Finds a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the product does not exist or the query fails.
    pub async fn get_product(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> RepoResult<products::Model> {
        find_product(&self.db, organization_id, id).await
    }

    /// Updates a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is missing or the new SKU is taken.
    pub async fn update_product(
        &self,
        organization_id: Uuid,
        id: Uuid,
        input: UpdateProductInput,
    ) -> RepoResult<products::Model> {
        let product = find_product(&self.db, organization_id, id).await?;

        if let Some(sku) = &input.sku
            && *sku != product.sku
        {
            self.ensure_sku_free(organization_id, sku, Some(id)).await?;
        }

        let mut active: products::ActiveModel = product.into();
        if let Some(sku) = input.sku {
            active.sku = Set(sku);
        }
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        if let Some(unit) = input.unit {
            active.unit = Set(unit);
        }
        if let Some(sale_price) = input.sale_price {
            active.sale_price = Set(sale_price);
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(chrono::Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    // ------------------------------------------------------------------
    // Warehouses
    // ------------------------------------------------------------------

    /// Creates a warehouse.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is taken or the insert fails.
    pub async fn create_warehouse(
        &self,
        organization_id: Uuid,
        input: CreateWarehouseInput,
    ) -> RepoResult<warehouses::Model> {
        self.ensure_warehouse_code_free(organization_id, &input.code, None)
            .await?;

        let now = chrono::Utc::now().into();
        let warehouse = warehouses::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(organization_id),
            code: Set(input.code),
            name: Set(input.name),
            address: Set(input.address),
            is_active: Set(input.is_active),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        info!(warehouse_id = %warehouse.id, code = %warehouse.code, "warehouse created");
        Ok(warehouse)
    }

    /// Lists warehouses ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_warehouses(
        &self,
        organization_id: Uuid,
    ) -> RepoResult<Vec<warehouses::Model>> {
        Ok(warehouses::Entity::find()
            .filter(warehouses::Column::OrganizationId.eq(organization_id))
            .order_by_asc(warehouses::Column::Code)
            .all(&self.db)
            .await?)
    }

    /// Finds a warehouse.
    ///
    /// # Errors
    ///
    /// Returns an error if the warehouse does not exist or the query fails.
    pub async fn get_warehouse(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> RepoResult<warehouses::Model> {
        find_warehouse(&self.db, organization_id, id).await
    }

    /// Updates a warehouse.
    ///
    /// # Errors
    ///
    /// Returns an error if the warehouse is missing or the new code is taken.
    pub async fn update_warehouse(
        &self,
        organization_id: Uuid,
        id: Uuid,
        input: UpdateWarehouseInput,
    ) -> RepoResult<warehouses::Model> {
        let warehouse = find_warehouse(&self.db, organization_id, id).await?;

        if let Some(code) = &input.code
            && *code != warehouse.code
        {
            self.ensure_warehouse_code_free(organization_id, code, Some(id))
                .await?;
        }

        let mut active: warehouses::ActiveModel = warehouse.into();
        if let Some(code) = input.code {
            active.code = Set(code);
        }
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(address) = input.address {
            active.address = Set(Some(address));
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(chrono::Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    // ------------------------------------------------------------------
    // Stock levels
    // ------------------------------------------------------------------

    /// Applies a signed quantity change using the weighted-average rule.
    ///
    /// # Errors
    ///
    /// Returns an error if the product or warehouse is unknown, the quantity
    /// is zero, or a decrement exceeds available stock.
    pub async fn adjust_stock(
        &self,
        organization_id: Uuid,
        input: AdjustStockInput,
    ) -> RepoResult<StockLevelView> {
        let txn = self.db.begin().await?;
        find_product(&txn, organization_id, input.product_id).await?;
        find_warehouse(&txn, organization_id, input.warehouse_id).await?;

        let (row, position) =
            load_position(&txn, organization_id, input.product_id, input.warehouse_id).await?;
        let updated = match position.apply_delta(input.quantity, input.unit_cost) {
            Ok(updated) => updated,
            Err(err) => {
                warn!(product_id = %input.product_id, error = %err, "stock adjustment rejected");
                return Err(err.into());
            }
        };
        let level = save_position(
            &txn,
            organization_id,
            input.product_id,
            input.warehouse_id,
            row,
            updated,
        )
        .await?;

        txn.commit().await?;

        info!(
            product_id = %input.product_id,
            warehouse_id = %input.warehouse_id,
            delta = %input.quantity,
            quantity = %level.quantity,
            "stock adjusted"
        );
        Ok(level.into())
    }

    /// Reserves available stock.
    ///
    /// # Errors
    ///
    /// Returns an error if the quantity exceeds available stock.
    pub async fn reserve_stock(
        &self,
        organization_id: Uuid,
        input: StockQuantityInput,
    ) -> RepoResult<StockLevelView> {
        self.change_reservation(organization_id, input, StockPosition::reserve)
            .await
    }

    /// Releases reserved stock.
    ///
    /// # Errors
    ///
    /// Returns an error if the quantity exceeds the reserved amount.
    pub async fn release_stock(
        &self,
        organization_id: Uuid,
        input: StockQuantityInput,
    ) -> RepoResult<StockLevelView> {
        self.change_reservation(organization_id, input, StockPosition::release)
            .await
    }

    async fn change_reservation(
        &self,
        organization_id: Uuid,
        input: StockQuantityInput,
        change: fn(&StockPosition, Decimal) -> Result<StockPosition, InventoryError>,
    ) -> RepoResult<StockLevelView> {
        let txn = self.db.begin().await?;

        let (row, position) =
            load_position(&txn, organization_id, input.product_id, input.warehouse_id).await?;
        let Some(row) = row else {
            return Err(InventoryError::InsufficientStock {
                available: Decimal::ZERO,
                requested: input.quantity,
            }
            .into());
        };
        let updated = change(&position, input.quantity)?;
        let level = save_position(
            &txn,
            organization_id,
            input.product_id,
            input.warehouse_id,
            Some(row),
            updated,
        )
        .await?;

        txn.commit().await?;
        Ok(level.into())
    }

    /// Lists stock levels.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_stock_levels(
        &self,
        organization_id: Uuid,
        filter: StockFilter,
    ) -> RepoResult<Vec<StockLevelView>> {
        let mut query = stock_levels::Entity::find()
            .filter(stock_levels::Column::OrganizationId.eq(organization_id))
            .order_by_asc(stock_levels::Column::WarehouseId)
            .order_by_asc(stock_levels::Column::ProductId);

        if let Some(product_id) = filter.product_id {
            query = query.filter(stock_levels::Column::ProductId.eq(product_id));
        }
        if let Some(warehouse_id) = filter.warehouse_id {
            query = query.filter(stock_levels::Column::WarehouseId.eq(warehouse_id));
        }

        Ok(query
            .all(&self.db)
            .await?
            .into_iter()
            .map(StockLevelView::from)
            .collect())
    }

    /// Values stock at average cost, optionally for one warehouse.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn stock_valuation(
        &self,
        organization_id: Uuid,
        warehouse_id: Option<Uuid>,
    ) -> RepoResult<StockValuation> {
        let items = self
            .list_stock_levels(
                organization_id,
                StockFilter {
                    product_id: None,
                    warehouse_id,
                },
            )
            .await?;
        let total_value = items.iter().map(|i| i.value).sum();

        Ok(StockValuation {
            warehouse_id,
            items,
            total_value,
        })
    }

    // ------------------------------------------------------------------
    // Movements
    // ------------------------------------------------------------------

    /// Creates a draft movement.
    ///
    /// # Errors
    ///
    /// Returns an error if required warehouses are missing, a line is
    /// invalid, or a referenced product or warehouse is unknown.
    pub async fn create_movement(
        &self,
        organization_id: Uuid,
        created_by: Uuid,
        input: CreateMovementInput,
    ) -> RepoResult<MovementWithLines> {
        let movement_type = input.movement_type.into();
        MovementService::validate_create(
            movement_type,
            input.source_warehouse_id,
            input.destination_warehouse_id,
            &input.lines,
        )?;

        let source = input
            .source_warehouse_id
            .filter(|_| movement_type.uses_source());
        let destination = input
            .destination_warehouse_id
            .filter(|_| movement_type.uses_destination());

        let txn = self.db.begin().await?;

        for warehouse_id in source.iter().chain(destination.iter()) {
            find_warehouse(&txn, organization_id, *warehouse_id).await?;
        }
        for line in &input.lines {
            find_product(&txn, organization_id, line.product_id).await?;
        }

        let movement_number = next_document_number::<stock_movements::Entity, _>(
            &txn,
            stock_movements::Column::OrganizationId,
            stock_movements::Column::MovementNumber,
            organization_id,
            MOVEMENT_PREFIX,
        )
        .await?;

        let now = chrono::Utc::now().into();
        let movement = stock_movements::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(organization_id),
            movement_number: Set(movement_number),
            movement_type: Set(input.movement_type),
            source_warehouse_id: Set(source),
            destination_warehouse_id: Set(destination),
            status: Set(MovementStatus::Draft),
            movement_date: Set(input
                .movement_date
                .unwrap_or_else(|| chrono::Utc::now().date_naive())),
            reference: Set(input.reference),
            notes: Set(input.notes),
            created_by: Set(created_by),
            confirmed_by: Set(None),
            confirmed_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let mut lines = Vec::with_capacity(input.lines.len());
        for line in input.lines {
            let model = stock_movement_lines::ActiveModel {
                id: Set(Uuid::new_v4()),
                organization_id: Set(organization_id),
                movement_id: Set(movement.id),
                product_id: Set(line.product_id),
                quantity: Set(line.quantity),
                unit_cost: Set(line.unit_cost),
            }
            .insert(&txn)
            .await?;
            lines.push(model);
        }

        txn.commit().await?;

        info!(
            movement_id = %movement.id,
            movement_number = %movement.movement_number,
            "stock movement drafted"
        );
        Ok(MovementWithLines { movement, lines })
    }

    /// Confirms a draft movement, applying every line to stock.
    ///
    /// # Errors
    ///
    /// Returns an error if the movement is not a draft or any line would
    /// take stock negative. No line is applied in that case.
    pub async fn confirm_movement(
        &self,
        organization_id: Uuid,
        id: Uuid,
        confirmed_by: Uuid,
    ) -> RepoResult<MovementWithLines> {
        let txn = self.db.begin().await?;

        let movement = find_movement(&txn, organization_id, id, true).await?;
        MovementService::validate_can_confirm(movement.status.into())?;

        let movement_type = movement.movement_type.into();
        let lines = load_movement_lines(&txn, id).await?;

        for line in &lines {
            let core_line = MovementLine {
                product_id: line.product_id,
                quantity: line.quantity,
                unit_cost: line.unit_cost,
            };

            let source = match movement.source_warehouse_id {
                Some(warehouse_id) => {
                    Some(load_position(&txn, organization_id, line.product_id, warehouse_id).await?)
                }
                None => None,
            };
            let destination = match movement.destination_warehouse_id {
                Some(warehouse_id) => {
                    Some(load_position(&txn, organization_id, line.product_id, warehouse_id).await?)
                }
                None => None,
            };

            let (new_source, new_destination) = match MovementService::apply_line(
                movement_type,
                source.as_ref().map(|(_, p)| *p),
                destination.as_ref().map(|(_, p)| *p),
                &core_line,
            ) {
                Ok(result) => result,
                Err(err) => {
                    warn!(movement_id = %id, product_id = %line.product_id, error = %err, "movement confirm rejected");
                    return Err(err.into());
                }
            };

            if let (Some(warehouse_id), Some((row, _)), Some(position)) =
                (movement.source_warehouse_id, source, new_source)
            {
                save_position(&txn, organization_id, line.product_id, warehouse_id, row, position)
                    .await?;
            }
            if let (Some(warehouse_id), Some((row, _)), Some(position)) =
                (movement.destination_warehouse_id, destination, new_destination)
            {
                save_position(&txn, organization_id, line.product_id, warehouse_id, row, position)
                    .await?;
            }
        }

        let now = chrono::Utc::now().into();
        let mut active: stock_movements::ActiveModel = movement.into();
        active.status = Set(MovementStatus::Confirmed);
        active.confirmed_by = Set(Some(confirmed_by));
        active.confirmed_at = Set(Some(now));
        active.updated_at = Set(now);
        let movement = active.update(&txn).await?;

        txn.commit().await?;

        info!(
            movement_id = %id,
            movement_number = %movement.movement_number,
            lines = lines.len(),
            "stock movement confirmed"
        );
        Ok(MovementWithLines { movement, lines })
    }

    /// Cancels a draft movement.
    ///
    /// # Errors
    ///
    /// Returns an error if the movement is missing or not a draft.
    pub async fn cancel_movement(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> RepoResult<stock_movements::Model> {
        let movement = find_movement(&self.db, organization_id, id, false).await?;
        MovementService::validate_can_cancel(movement.status.into())?;

        let mut active: stock_movements::ActiveModel = movement.into();
        active.status = Set(MovementStatus::Cancelled);
        active.updated_at = Set(chrono::Utc::now().into());

        let movement = active.update(&self.db).await?;
        info!(movement_id = %id, "stock movement cancelled");
        Ok(movement)
    }

    /// Finds a movement with its lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the movement does not exist or the query fails.
    pub async fn get_movement(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> RepoResult<MovementWithLines> {
        let movement = find_movement(&self.db, organization_id, id, false).await?;
        let lines = load_movement_lines(&self.db, id).await?;
        Ok(MovementWithLines { movement, lines })
    }

    /// Lists movements, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_movements(
        &self,
        organization_id: Uuid,
        status: Option<MovementStatus>,
        page: &PageRequest,
    ) -> RepoResult<PageResponse<stock_movements::Model>> {
        let mut query = stock_movements::Entity::find()
            .filter(stock_movements::Column::OrganizationId.eq(organization_id))
            .order_by_desc(stock_movements::Column::MovementDate)
            .order_by_desc(stock_movements::Column::MovementNumber);
        if let Some(status) = status {
            query = query.filter(stock_movements::Column::Status.eq(status));
        }

        Ok(fetch_page(&self.db, query, page).await?)
    }

    async fn ensure_sku_free(
        &self,
        organization_id: Uuid,
        sku: &str,
        except: Option<Uuid>,
    ) -> RepoResult<()> {
        let mut query = products::Entity::find()
            .filter(products::Column::OrganizationId.eq(organization_id))
            .filter(products::Column::Sku.eq(sku));
        if let Some(id) = except {
            query = query.filter(products::Column::Id.ne(id));
        }
        if query.count(&self.db).await? > 0 {
            return Err(InventoryError::DuplicateSku(sku.to_string()).into());
        }
        Ok(())
    }

    async fn ensure_warehouse_code_free(
        &self,
        organization_id: Uuid,
        code: &str,
        except: Option<Uuid>,
    ) -> RepoResult<()> {
        let mut query = warehouses::Entity::find()
            .filter(warehouses::Column::OrganizationId.eq(organization_id))
            .filter(warehouses::Column::Code.eq(code));
        if let Some(id) = except {
            query = query.filter(warehouses::Column::Id.ne(id));
        }
        if query.count(&self.db).await? > 0 {
            return Err(InventoryError::DuplicateWarehouseCode(code.to_string()).into());
        }
        Ok(())
    }
}

pub(crate) async fn find_product<C: ConnectionTrait>(
    conn: &C,
    organization_id: Uuid,
    id: Uuid,
) -> RepoResult<products::Model> {
    products::Entity::find_by_id(id)
        .filter(products::Column::OrganizationId.eq(organization_id))
        .one(conn)
        .await?
        .ok_or(RepoError::not_found("Product", id))
}

pub(crate) async fn find_warehouse<C: ConnectionTrait>(
    conn: &C,
    organization_id: Uuid,
    id: Uuid,
) -> RepoResult<warehouses::Model> {
    warehouses::Entity::find_by_id(id)
        .filter(warehouses::Column::OrganizationId.eq(organization_id))
        .one(conn)
        .await?
        .ok_or(RepoError::not_found("Warehouse", id))
}

async fn find_movement<C: ConnectionTrait>(
    conn: &C,
    organization_id: Uuid,
    id: Uuid,
    for_update: bool,
) -> RepoResult<stock_movements::Model> {
    let mut query = stock_movements::Entity::find_by_id(id)
        .filter(stock_movements::Column::OrganizationId.eq(organization_id));
    if for_update {
        query = query.lock_exclusive();
    }
    query
        .one(conn)
        .await?
        .ok_or(RepoError::not_found("Stock movement", id))
}

async fn load_movement_lines<C: ConnectionTrait>(
    conn: &C,
    movement_id: Uuid,
) -> RepoResult<Vec<stock_movement_lines::Model>> {
    Ok(stock_movement_lines::Entity::find()
        .filter(stock_movement_lines::Column::MovementId.eq(movement_id))
        .all(conn)
        .await?)
}

fn position_of(level: &stock_levels::Model) -> StockPosition {
    StockPosition {
        quantity: level.quantity,
        reserved: level.reserved,
        average_cost: level.average_cost,
    }
}

/// Locks and reads the stock level of a product in a warehouse.
///
/// A missing row reads as an empty position.
pub(crate) async fn load_position(
    txn: &DatabaseTransaction,
    organization_id: Uuid,
    product_id: Uuid,
    warehouse_id: Uuid,
) -> RepoResult<(Option<stock_levels::Model>, StockPosition)> {
    let row = stock_levels::Entity::find()
        .filter(stock_levels::Column::OrganizationId.eq(organization_id))
        .filter(stock_levels::Column::ProductId.eq(product_id))
        .filter(stock_levels::Column::WarehouseId.eq(warehouse_id))
        .lock_exclusive()
        .one(txn)
        .await?;
    let position = row.as_ref().map(position_of).unwrap_or_default();
    Ok((row, position))
}

/// Writes a position back, inserting the row on first use.
pub(crate) async fn save_position(
    txn: &DatabaseTransaction,
    organization_id: Uuid,
    product_id: Uuid,
    warehouse_id: Uuid,
    existing: Option<stock_levels::Model>,
    position: StockPosition,
) -> RepoResult<stock_levels::Model> {
    let now = chrono::Utc::now().into();
    let level = match existing {
        Some(row) => {
            let mut active: stock_levels::ActiveModel = row.into();
            active.quantity = Set(position.quantity);
            active.reserved = Set(position.reserved);
            active.average_cost = Set(position.average_cost);
            active.updated_at = Set(now);
            active.update(txn).await?
        }
        None => {
            stock_levels::ActiveModel {
                id: Set(Uuid::new_v4()),
                organization_id: Set(organization_id),
                product_id: Set(product_id),
                warehouse_id: Set(warehouse_id),
                quantity: Set(position.quantity),
                reserved: Set(position.reserved),
                average_cost: Set(position.average_cost),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(txn)
            .await?
        }
    };
    Ok(level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_stock_level_view_derives_available_and_value() {
        let now = chrono::Utc::now().into();
        let level = stock_levels::Model {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            warehouse_id: Uuid::new_v4(),
            quantity: dec!(10),
            reserved: dec!(4),
            average_cost: dec!(2.5),
            created_at: now,
            updated_at: now,
        };

        let view = StockLevelView::from(level);
        assert_eq!(view.available, dec!(6));
        assert_eq!(view.value, dec!(25.0));
    }
}
