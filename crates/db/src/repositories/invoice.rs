//! Invoice repository: drafts, sending, payments and overdue sweeps.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait, sea_query::Expr,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use kontor_core::invoicing::{InvoiceService, LineInput, LineTotals, price_lines};
use kontor_core::numbering::INVOICE_PREFIX;
use kontor_shared::types::{PageRequest, PageResponse};

use crate::entities::{
    invoice_lines, invoice_payments, invoices, organizations, products,
    sea_orm_active_enums::InvoiceStatus,
};
use crate::error::{RepoError, RepoResult};

use super::{fetch_page, next_document_number};

/// One invoice line as submitted by the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceLineInput {
    /// Line description.
    pub description: String,
    /// Optional product reference.
    #[serde(default)]
    pub product_id: Option<Uuid>,
    /// Quantity (> 0).
    pub quantity: Decimal,
    /// Price per unit.
    pub unit_price: Decimal,
    /// Discount percentage.
    #[serde(default)]
    pub discount_percent: Decimal,
    /// Tax percentage.
    #[serde(default)]
    pub tax_rate: Decimal,
}

impl InvoiceLineInput {
    fn pricing(&self) -> LineInput {
        LineInput {
            quantity: self.quantity,
            unit_price: self.unit_price,
            discount_percent: self.discount_percent,
            tax_rate: self.tax_rate,
        }
    }
}

/// Input for creating a draft invoice.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateInvoiceInput {
    /// Linked CRM contact.
    #[serde(default)]
    pub contact_id: Option<Uuid>,
    /// Customer name as printed.
    pub customer_name: String,
    /// Customer email.
    #[serde(default)]
    pub customer_email: Option<String>,
    /// Issue date; defaults to today.
    #[serde(default)]
    pub issue_date: Option<NaiveDate>,
    /// Due date.
    pub due_date: NaiveDate,
    /// Currency; defaults to the organization's base currency.
    #[serde(default)]
    pub currency: Option<String>,
    /// Free-form notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Lines.
    #[serde(default)]
    pub lines: Vec<InvoiceLineInput>,
}

/// Input for editing a draft invoice.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateInvoiceInput {
    /// Linked CRM contact.
    pub contact_id: Option<Uuid>,
    /// Customer name.
    pub customer_name: Option<String>,
    /// Customer email.
    pub customer_email: Option<String>,
    /// Issue date.
    pub issue_date: Option<NaiveDate>,
    /// Due date.
    pub due_date: Option<NaiveDate>,
    /// Currency.
    pub currency: Option<String>,
    /// Notes.
    pub notes: Option<String>,
    /// Replacement lines.
    pub lines: Option<Vec<InvoiceLineInput>>,
}

/// Filter options for listing invoices.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvoiceFilter {
    /// Filter by status.
    pub status: Option<InvoiceStatus>,
    /// Filter by linked contact.
    pub contact_id: Option<Uuid>,
    /// Customer name fragment.
    pub customer: Option<String>,
    /// Issued on or after.
    pub from: Option<NaiveDate>,
    /// Issued on or before.
    pub to: Option<NaiveDate>,
}

/// Input for recording a payment.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordPaymentInput {
    /// Amount received.
    pub amount: Decimal,
    /// Payment date; defaults to today.
    #[serde(default)]
    pub payment_date: Option<NaiveDate>,
    /// Payment method label.
    #[serde(default)]
    pub method: Option<String>,
    /// External reference.
    #[serde(default)]
    pub reference: Option<String>,
}

/// Invoice with its lines and payments.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceWithDetails {
    /// Invoice header.
    #[serde(flatten)]
    pub invoice: invoices::Model,
    /// Lines ordered by line number.
    pub lines: Vec<invoice_lines::Model>,
    /// Payments in the order recorded.
    pub payments: Vec<invoice_payments::Model>,
}

/// Invoice repository.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    db: DatabaseConnection,
}

impl InvoiceRepository {
    /// Creates a new invoice repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a draft invoice.
    ///
    /// # Errors
    ///
    /// Returns an error if dates or lines are invalid or the insert fails.
    pub async fn create_invoice(
        &self,
        organization_id: Uuid,
        created_by: Uuid,
        input: CreateInvoiceInput,
    ) -> RepoResult<InvoiceWithDetails> {
        let issue_date = input
            .issue_date
            .unwrap_or_else(|| chrono::Utc::now().date_naive());
        InvoiceService::validate_dates(issue_date, input.due_date)?;
        let pricing: Vec<LineInput> = input.lines.iter().map(InvoiceLineInput::pricing).collect();
        let (amounts, totals) = price_lines(&pricing)?;

        let txn = self.db.begin().await?;

        ensure_products(&txn, organization_id, &input.lines).await?;

        let currency = match input.currency {
            Some(currency) => currency.to_uppercase(),
            None => {
                organizations::Entity::find_by_id(organization_id)
                    .one(&txn)
                    .await?
                    .ok_or(RepoError::not_found("Organization", organization_id))?
                    .base_currency
            }
        };

        let invoice_number = next_document_number::<invoices::Entity, _>(
            &txn,
            invoices::Column::OrganizationId,
            invoices::Column::InvoiceNumber,
            organization_id,
            INVOICE_PREFIX,
        )
        .await?;

        let now = chrono::Utc::now().into();
        let invoice = invoices::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(organization_id),
            invoice_number: Set(invoice_number),
            contact_id: Set(input.contact_id),
            customer_name: Set(input.customer_name),
            customer_email: Set(input.customer_email),
            issue_date: Set(issue_date),
            due_date: Set(input.due_date),
            currency: Set(currency),
            status: Set(InvoiceStatus::Draft),
            subtotal: Set(totals.subtotal),
            discount_total: Set(totals.discount_total),
            tax_total: Set(totals.tax_total),
            total: Set(totals.total),
            amount_paid: Set(Decimal::ZERO),
            amount_due: Set(totals.total),
            notes: Set(input.notes),
            sent_at: Set(None),
            paid_at: Set(None),
            created_by: Set(created_by),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let lines = insert_lines(&txn, organization_id, invoice.id, input.lines, &amounts).await?;

        txn.commit().await?;

        info!(
            invoice_id = %invoice.id,
            invoice_number = %invoice.invoice_number,
            total = %invoice.total,
            "invoice drafted"
        );
        Ok(InvoiceWithDetails {
            invoice,
            lines,
            payments: Vec::new(),
        })
    }

    /// Edits a draft invoice. Replacing lines recomputes all totals.
    ///
    /// # Errors
    ///
    /// Returns an error if the invoice is missing or not a draft, or if the
    /// new dates or lines are invalid.
    pub async fn update_invoice(
        &self,
        organization_id: Uuid,
        id: Uuid,
        input: UpdateInvoiceInput,
    ) -> RepoResult<InvoiceWithDetails> {
        let txn = self.db.begin().await?;

        let invoice = find_invoice(&txn, organization_id, id, true).await?;
        InvoiceService::validate_can_edit(invoice.status.into())?;
        InvoiceService::validate_dates(
            input.issue_date.unwrap_or(invoice.issue_date),
            input.due_date.unwrap_or(invoice.due_date),
        )?;

        let mut active: invoices::ActiveModel = invoice.into();
        if let Some(contact_id) = input.contact_id {
            active.contact_id = Set(Some(contact_id));
        }
        if let Some(name) = input.customer_name {
            active.customer_name = Set(name);
        }
        if let Some(email) = input.customer_email {
            active.customer_email = Set(Some(email));
        }
        if let Some(issue_date) = input.issue_date {
            active.issue_date = Set(issue_date);
        }
        if let Some(due_date) = input.due_date {
            active.due_date = Set(due_date);
        }
        if let Some(currency) = input.currency {
            active.currency = Set(currency.to_uppercase());
        }
        if let Some(notes) = input.notes {
            active.notes = Set(Some(notes));
        }

        let lines = if let Some(lines) = input.lines {
            let pricing: Vec<LineInput> = lines.iter().map(InvoiceLineInput::pricing).collect();
            let (amounts, totals) = price_lines(&pricing)?;
            ensure_products(&txn, organization_id, &lines).await?;

            invoice_lines::Entity::delete_many()
                .filter(invoice_lines::Column::InvoiceId.eq(id))
                .exec(&txn)
                .await?;
            set_totals(&mut active, &totals);
            insert_lines(&txn, organization_id, id, lines, &amounts).await?
        } else {
            load_lines(&txn, id).await?
        };

        active.updated_at = Set(chrono::Utc::now().into());
        let invoice = active.update(&txn).await?;

        txn.commit().await?;
        Ok(InvoiceWithDetails {
            invoice,
            lines,
            payments: Vec::new(),
        })
    }

    /// Deletes a draft invoice.
    ///
    /// # Errors
    ///
    /// Returns an error if the invoice is missing or not a draft.
    pub async fn delete_invoice(&self, organization_id: Uuid, id: Uuid) -> RepoResult<()> {
        let invoice = find_invoice(&self.db, organization_id, id, false).await?;
        InvoiceService::validate_can_delete(invoice.status.into())?;

        invoices::Entity::delete_by_id(id).exec(&self.db).await?;
        info!(invoice_id = %id, "invoice deleted");
        Ok(())
    }

    /// Finds an invoice with lines and payments.
    ///
    /// # Errors
    ///
    /// Returns an error if the invoice does not exist or the query fails.
    pub async fn get_invoice(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> RepoResult<InvoiceWithDetails> {
        let invoice = find_invoice(&self.db, organization_id, id, false).await?;
        let lines = load_lines(&self.db, id).await?;
        let payments = load_payments(&self.db, id).await?;
        Ok(InvoiceWithDetails {
            invoice,
            lines,
            payments,
        })
    }

    /// Lists invoices, newest issue date first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_invoices(
        &self,
        organization_id: Uuid,
        filter: InvoiceFilter,
        page: &PageRequest,
    ) -> RepoResult<PageResponse<invoices::Model>> {
        let mut query = invoices::Entity::find()
            .filter(invoices::Column::OrganizationId.eq(organization_id))
            .order_by_desc(invoices::Column::IssueDate)
            .order_by_desc(invoices::Column::InvoiceNumber);

        if let Some(status) = filter.status {
            query = query.filter(invoices::Column::Status.eq(status));
        }
        if let Some(contact_id) = filter.contact_id {
            query = query.filter(invoices::Column::ContactId.eq(contact_id));
        }
        if let Some(customer) = filter.customer.filter(|c| !c.is_empty()) {
            query = query.filter(invoices::Column::CustomerName.contains(customer));
        }
        if let Some(from) = filter.from {
            query = query.filter(invoices::Column::IssueDate.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(invoices::Column::IssueDate.lte(to));
        }

        Ok(fetch_page(&self.db, query, page).await?)
    }

    /// Moves a draft invoice to sent.
    ///
    /// # Errors
    ///
    /// Returns an error if the invoice is not a draft, has no lines, or has
    /// a zero total.
    pub async fn send_invoice(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> RepoResult<invoices::Model> {
        let invoice = find_invoice(&self.db, organization_id, id, false).await?;
        let line_count = invoice_lines::Entity::find()
            .filter(invoice_lines::Column::InvoiceId.eq(id))
            .count(&self.db)
            .await?;

        if let Err(err) = InvoiceService::validate_can_send(
            invoice.status.into(),
            usize::try_from(line_count).unwrap_or(usize::MAX),
            invoice.total,
        ) {
            warn!(invoice_id = %id, error = %err, "invoice send rejected");
            return Err(err.into());
        }

        let now = chrono::Utc::now().into();
        let mut active: invoices::ActiveModel = invoice.into();
        active.status = Set(InvoiceStatus::Sent);
        active.sent_at = Set(Some(now));
        active.updated_at = Set(now);

        let invoice = active.update(&self.db).await?;
        info!(invoice_id = %id, invoice_number = %invoice.invoice_number, "invoice sent");
        Ok(invoice)
    }

    /// Records a payment and advances the invoice status.
    ///
    /// # Errors
    ///
    /// Returns an error if the invoice does not accept payments or the
    /// amount is not positive or exceeds the amount due.
    pub async fn record_payment(
        &self,
        organization_id: Uuid,
        id: Uuid,
        created_by: Uuid,
        input: RecordPaymentInput,
    ) -> RepoResult<InvoiceWithDetails> {
        let txn = self.db.begin().await?;

        let invoice = find_invoice(&txn, organization_id, id, true).await?;
        let outcome = match InvoiceService::apply_payment(
            invoice.status.into(),
            invoice.total,
            invoice.amount_paid,
            input.amount,
        ) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(invoice_id = %id, error = %err, "payment rejected");
                return Err(err.into());
            }
        };

        let now = chrono::Utc::now().into();
        invoice_payments::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(organization_id),
            invoice_id: Set(id),
            payment_date: Set(input
                .payment_date
                .unwrap_or_else(|| chrono::Utc::now().date_naive())),
            amount: Set(input.amount),
            method: Set(input.method),
            reference: Set(input.reference),
            created_by: Set(created_by),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let mut active: invoices::ActiveModel = invoice.into();
        active.amount_paid = Set(outcome.amount_paid);
        active.amount_due = Set(outcome.amount_due);
        active.status = Set(outcome.status.into());
        if outcome.is_fully_paid() {
            active.paid_at = Set(Some(now));
        }
        active.updated_at = Set(now);
        let invoice = active.update(&txn).await?;

        let lines = load_lines(&txn, id).await?;
        let payments = load_payments(&txn, id).await?;

        txn.commit().await?;

        info!(
            invoice_id = %id,
            amount = %input.amount,
            amount_due = %invoice.amount_due,
            "payment recorded"
        );
        Ok(InvoiceWithDetails {
            invoice,
            lines,
            payments,
        })
    }

    /// Cancels a draft or unpaid sent invoice.
    ///
    /// # Errors
    ///
    /// Returns an error if the invoice is in any other state or has payments.
    pub async fn cancel_invoice(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> RepoResult<invoices::Model> {
        let invoice = find_invoice(&self.db, organization_id, id, false).await?;
        InvoiceService::validate_can_cancel(invoice.status.into(), invoice.amount_paid)?;

        let mut active: invoices::ActiveModel = invoice.into();
        active.status = Set(InvoiceStatus::Cancelled);
        active.updated_at = Set(chrono::Utc::now().into());

        let invoice = active.update(&self.db).await?;
        info!(invoice_id = %id, "invoice cancelled");
        Ok(invoice)
    }

    /// Flags sent and partially paid invoices due before `as_of` as overdue.
    ///
    /// Without an organization the sweep covers every tenant. Returns the
    /// number of invoices changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn mark_overdue(
        &self,
        organization_id: Option<Uuid>,
        as_of: NaiveDate,
    ) -> RepoResult<u64> {
        let mut update = invoices::Entity::update_many()
            .col_expr(
                invoices::Column::Status,
                Expr::val(InvoiceStatus::Overdue.to_value()).as_enum(InvoiceStatus::name()),
            )
            .col_expr(
                invoices::Column::UpdatedAt,
                Expr::value(sea_orm::prelude::DateTimeWithTimeZone::from(chrono::Utc::now())),
            )
            .filter(invoices::Column::Status.is_in(overdue_candidates()))
            .filter(invoices::Column::DueDate.lt(as_of));

        if let Some(organization_id) = organization_id {
            update = update.filter(invoices::Column::OrganizationId.eq(organization_id));
        }

        let result = update.exec(&self.db).await?;
        if result.rows_affected > 0 {
            info!(count = result.rows_affected, as_of = %as_of, "invoices marked overdue");
        }
        Ok(result.rows_affected)
    }
}

/// Statuses that turn overdue once the due date has passed.
fn overdue_candidates() -> Vec<InvoiceStatus> {
    [
        InvoiceStatus::Draft,
        InvoiceStatus::Sent,
        InvoiceStatus::PartiallyPaid,
        InvoiceStatus::Paid,
        InvoiceStatus::Overdue,
        InvoiceStatus::Cancelled,
    ]
    .into_iter()
    .filter(|s| kontor_core::invoicing::InvoiceStatus::from(*s).can_become_overdue())
    .collect()
}

fn set_totals(active: &mut invoices::ActiveModel, totals: &LineTotals) {
    active.subtotal = Set(totals.subtotal);
    active.discount_total = Set(totals.discount_total);
    active.tax_total = Set(totals.tax_total);
    active.total = Set(totals.total);
    active.amount_due = Set(totals.total);
}

async fn find_invoice<C: ConnectionTrait>(
    conn: &C,
    organization_id: Uuid,
    id: Uuid,
    for_update: bool,
) -> RepoResult<invoices::Model> {
    let mut query = invoices::Entity::find_by_id(id)
        .filter(invoices::Column::OrganizationId.eq(organization_id));
    if for_update {
        query = query.lock_exclusive();
    }
    query
        .one(conn)
        .await?
        .ok_or(RepoError::not_found("Invoice", id))
}

async fn load_lines<C: ConnectionTrait>(
    conn: &C,
    invoice_id: Uuid,
) -> RepoResult<Vec<invoice_lines::Model>> {
    Ok(invoice_lines::Entity::find()
        .filter(invoice_lines::Column::InvoiceId.eq(invoice_id))
        .order_by_asc(invoice_lines::Column::LineNumber)
        .all(conn)
        .await?)
}

async fn load_payments<C: ConnectionTrait>(
    conn: &C,
    invoice_id: Uuid,
) -> RepoResult<Vec<invoice_payments::Model>> {
    Ok(invoice_payments::Entity::find()
        .filter(invoice_payments::Column::InvoiceId.eq(invoice_id))
        .order_by_asc(invoice_payments::Column::CreatedAt)
        .all(conn)
        .await?)
}

/// Rejects lines referencing products outside the organization.
async fn ensure_products(
    txn: &DatabaseTransaction,
    organization_id: Uuid,
    lines: &[InvoiceLineInput],
) -> RepoResult<()> {
    for product_id in lines.iter().filter_map(|l| l.product_id) {
        let exists = products::Entity::find_by_id(product_id)
            .filter(products::Column::OrganizationId.eq(organization_id))
            .count(txn)
            .await?
            > 0;
        if !exists {
            return Err(RepoError::not_found("Product", product_id));
        }
    }
    Ok(())
}

async fn insert_lines(
    txn: &DatabaseTransaction,
    organization_id: Uuid,
    invoice_id: Uuid,
    lines: Vec<InvoiceLineInput>,
    amounts: &[kontor_core::invoicing::LineAmounts],
) -> RepoResult<Vec<invoice_lines::Model>> {
    let mut inserted = Vec::with_capacity(lines.len());
    for ((line, amount), line_number) in lines.into_iter().zip(amounts).zip(1_i32..) {
        let model = invoice_lines::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(organization_id),
            invoice_id: Set(invoice_id),
            line_number: Set(line_number),
            description: Set(line.description),
            product_id: Set(line.product_id),
            quantity: Set(line.quantity),
            unit_price: Set(line.unit_price),
            discount_percent: Set(line.discount_percent),
            tax_rate: Set(line.tax_rate),
            gross: Set(amount.gross),
            discount: Set(amount.discount),
            tax: Set(amount.tax),
            line_total: Set(amount.line_total),
        }
        .insert(txn)
        .await?;
        inserted.push(model);
    }
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overdue_candidates_are_open_invoices() {
        let candidates = overdue_candidates();
        assert_eq!(
            candidates,
            vec![InvoiceStatus::Sent, InvoiceStatus::PartiallyPaid]
        );
    }
}
