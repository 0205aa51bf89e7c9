//! Point-of-sale repository: sales, refunds and daily takings.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use kontor_core::invoicing::{LineInput, price_lines};
use kontor_core::numbering::SALE_PREFIX;
use kontor_core::pos::{DailySummary, PosError, SaleRecord, SaleService};
use kontor_shared::types::{PageRequest, PageResponse};

use crate::entities::{
    pos_sale_lines, pos_sales,
    sea_orm_active_enums::{PaymentMethod, SaleStatus},
};
use crate::error::{RepoError, RepoResult};

use super::inventory::{find_product, find_warehouse, load_position, save_position};
use super::{fetch_page, next_document_number};

/// One line of a sale.
#[derive(Debug, Clone, Deserialize)]
pub struct SaleLineInput {
    /// Product sold.
    pub product_id: Uuid,
    /// Quantity.
    pub quantity: Decimal,
    /// Price per unit; defaults to the product's sale price.
    #[serde(default)]
    pub unit_price: Option<Decimal>,
    /// Discount percentage.
    #[serde(default)]
    pub discount_percent: Decimal,
    /// Tax percentage.
    #[serde(default)]
    pub tax_rate: Decimal,
}

/// Input for ringing up a sale.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSaleInput {
    /// Warehouse stock is taken from.
    pub warehouse_id: Uuid,
    /// Customer.
    #[serde(default)]
    pub contact_id: Option<Uuid>,
    /// How the customer paid.
    pub payment_method: PaymentMethod,
    /// Cash handed over; ignored for exact-amount methods.
    #[serde(default)]
    pub amount_tendered: Option<Decimal>,
    /// Lines.
    pub lines: Vec<SaleLineInput>,
}

/// Sale with its lines.
#[derive(Debug, Clone, Serialize)]
pub struct SaleWithLines {
    /// Header.
    #[serde(flatten)]
    pub sale: pos_sales::Model,
    /// Lines.
    pub lines: Vec<pos_sale_lines::Model>,
}

/// Point-of-sale repository.
#[derive(Debug, Clone)]
pub struct PosRepository {
    db: DatabaseConnection,
}

impl PosRepository {
    /// Creates a new point-of-sale repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a completed sale and takes its stock.
    ///
    /// # Errors
    ///
    /// Returns an error if a line is invalid, cash tendered is short or a
    /// product lacks available stock.
    pub async fn create_sale(
        &self,
        organization_id: Uuid,
        sold_by: Uuid,
        input: CreateSaleInput,
    ) -> RepoResult<SaleWithLines> {
        if input.lines.is_empty() {
            return Err(PosError::NoLines.into());
        }

        let txn = self.db.begin().await?;

        find_warehouse(&txn, organization_id, input.warehouse_id).await?;

        let mut pricing = Vec::with_capacity(input.lines.len());
        for line in &input.lines {
            let product = find_product(&txn, organization_id, line.product_id).await?;
            pricing.push(LineInput {
                quantity: line.quantity,
                unit_price: line.unit_price.unwrap_or(product.sale_price),
                discount_percent: line.discount_percent,
                tax_rate: line.tax_rate,
            });
        }
        let (amounts, totals) = price_lines(&pricing).map_err(PosError::from)?;

        let tender = match SaleService::tender(
            input.payment_method.into(),
            totals.total,
            input.amount_tendered,
        ) {
            Ok(tender) => tender,
            Err(err) => {
                warn!(total = %totals.total, error = %err, "sale rejected");
                return Err(err.into());
            }
        };

        let sale_number = next_document_number::<pos_sales::Entity, _>(
            &txn,
            pos_sales::Column::OrganizationId,
            pos_sales::Column::SaleNumber,
            organization_id,
            SALE_PREFIX,
        )
        .await?;

        let now = chrono::Utc::now().into();
        let sale = pos_sales::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(organization_id),
            sale_number: Set(sale_number),
            warehouse_id: Set(input.warehouse_id),
            contact_id: Set(input.contact_id),
            subtotal: Set(totals.subtotal),
            discount_total: Set(totals.discount_total),
            tax_total: Set(totals.tax_total),
            total: Set(totals.total),
            payment_method: Set(input.payment_method),
            amount_tendered: Set(tender.amount_tendered),
            change_due: Set(tender.change_due),
            status: Set(SaleStatus::Completed),
            sold_by: Set(sold_by),
            sold_at: Set(now),
            refunded_at: Set(None),
        }
        .insert(&txn)
        .await?;

        let mut lines = Vec::with_capacity(input.lines.len());
        for ((line, price), amount) in input.lines.iter().zip(&pricing).zip(&amounts) {
            let (existing, position) =
                load_position(&txn, organization_id, line.product_id, input.warehouse_id).await?;
            let updated = match position.apply_delta(-line.quantity, None) {
                Ok(updated) => updated,
                Err(err) => {
                    warn!(product_id = %line.product_id, error = %err, "sale rejected");
                    return Err(PosError::from(err).into());
                }
            };
            save_position(
                &txn,
                organization_id,
                line.product_id,
                input.warehouse_id,
                existing,
                updated,
            )
            .await?;

            let model = pos_sale_lines::ActiveModel {
                id: Set(Uuid::new_v4()),
                organization_id: Set(organization_id),
                sale_id: Set(sale.id),
                product_id: Set(line.product_id),
                quantity: Set(price.quantity),
                unit_price: Set(price.unit_price),
                discount_percent: Set(price.discount_percent),
                tax_rate: Set(price.tax_rate),
                unit_cost: Set(position.average_cost),
                gross: Set(amount.gross),
                discount: Set(amount.discount),
                tax: Set(amount.tax),
                line_total: Set(amount.line_total),
            }
            .insert(&txn)
            .await?;
            lines.push(model);
        }

        txn.commit().await?;

        info!(
            sale_id = %sale.id,
            number = %sale.sale_number,
            total = %sale.total,
            "sale completed"
        );
        Ok(SaleWithLines { sale, lines })
    }

    /// Refunds a completed sale and restocks its lines at their recorded cost.
    ///
    /// # Errors
    ///
    /// Returns an error if the sale is already refunded.
    pub async fn refund_sale(&self, organization_id: Uuid, id: Uuid) -> RepoResult<SaleWithLines> {
        let txn = self.db.begin().await?;

        let sale = pos_sales::Entity::find_by_id(id)
            .filter(pos_sales::Column::OrganizationId.eq(organization_id))
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(RepoError::not_found("Sale", id))?;
        if let Err(err) = SaleService::validate_can_refund(sale.status.into()) {
            warn!(sale_id = %id, error = %err, "refund rejected");
            return Err(err.into());
        }

        let lines = load_lines(&txn, id).await?;
        for line in &lines {
            let (existing, position) =
                load_position(&txn, organization_id, line.product_id, sale.warehouse_id).await?;
            let restocked = position
                .apply_delta(line.quantity, Some(line.unit_cost))
                .map_err(PosError::from)?;
            save_position(
                &txn,
                organization_id,
                line.product_id,
                sale.warehouse_id,
                existing,
                restocked,
            )
            .await?;
        }

        let mut active: pos_sales::ActiveModel = sale.into();
        active.status = Set(SaleStatus::Refunded);
        active.refunded_at = Set(Some(chrono::Utc::now().into()));
        let sale = active.update(&txn).await?;

        txn.commit().await?;

        info!(sale_id = %id, total = %sale.total, "sale refunded");
        Ok(SaleWithLines { sale, lines })
    }

    /// Finds a sale with its lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the sale does not exist or the query fails.
    pub async fn get_sale(&self, organization_id: Uuid, id: Uuid) -> RepoResult<SaleWithLines> {
        let sale = pos_sales::Entity::find_by_id(id)
            .filter(pos_sales::Column::OrganizationId.eq(organization_id))
            .one(&self.db)
            .await?
            .ok_or(RepoError::not_found("Sale", id))?;
        let lines = load_lines(&self.db, id).await?;
        Ok(SaleWithLines { sale, lines })
    }

    /// Lists sales, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_sales(
        &self,
        organization_id: Uuid,
        status: Option<SaleStatus>,
        page: &PageRequest,
    ) -> RepoResult<PageResponse<pos_sales::Model>> {
        let mut query = pos_sales::Entity::find()
            .filter(pos_sales::Column::OrganizationId.eq(organization_id))
            .order_by_desc(pos_sales::Column::SoldAt);
        if let Some(status) = status {
            query = query.filter(pos_sales::Column::Status.eq(status));
        }

        Ok(fetch_page(&self.db, query, page).await?)
    }

    /// Summarizes the sales rung up on a UTC calendar day.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn daily_summary(
        &self,
        organization_id: Uuid,
        date: NaiveDate,
    ) -> RepoResult<DailySummary> {
        let start = date.and_time(NaiveTime::MIN).and_utc();
        let end = start + chrono::Duration::days(1);

        let records: Vec<SaleRecord> = pos_sales::Entity::find()
            .filter(pos_sales::Column::OrganizationId.eq(organization_id))
            .filter(pos_sales::Column::SoldAt.gte(start))
            .filter(pos_sales::Column::SoldAt.lt(end))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|s| SaleRecord {
                total: s.total,
                tax_total: s.tax_total,
                payment_method: s.payment_method.into(),
                status: s.status.into(),
            })
            .collect();

        Ok(SaleService::daily_summary(&records))
    }
}

async fn load_lines<C: ConnectionTrait>(
    conn: &C,
    sale_id: Uuid,
) -> RepoResult<Vec<pos_sale_lines::Model>> {
    Ok(pos_sale_lines::Entity::find()
        .filter(pos_sale_lines::Column::SaleId.eq(sale_id))
        .all(conn)
        .await?)
}
