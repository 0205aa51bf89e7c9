//! Journal entry repository: drafts, posting and voiding.
//!
//! Posting and voiding apply per-account balance deltas computed by
//! [`JournalService`] inside one database transaction, so a rejected
//! operation leaves balances untouched.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
    sea_query::Expr,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use kontor_core::accounting::{
    AccountInfo, AccountingError, BalanceDelta, JournalLineInput, JournalService, JournalTotals,
    ResolvedLine,
};
use kontor_core::numbering::JOURNAL_PREFIX;
use kontor_shared::types::{PageRequest, PageResponse};

use crate::entities::{
    accounts, fiscal_periods, journal_entries, journal_lines, organizations,
    sea_orm_active_enums::JournalStatus,
};
use crate::error::{RepoError, RepoResult};

use super::fiscal::ensure_fiscal_period;
use super::{fetch_page, next_document_number};

/// Input for creating a draft journal entry.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateJournalEntryInput {
    /// Entry date; selects the fiscal period.
    pub entry_date: NaiveDate,
    /// Description.
    pub description: String,
    /// Optional external reference.
    #[serde(default)]
    pub reference: Option<String>,
    /// Lines (at least two).
    pub lines: Vec<JournalLineInput>,
}

/// Input for editing a draft journal entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateJournalEntryInput {
    /// New entry date.
    pub entry_date: Option<NaiveDate>,
    /// New description.
    pub description: Option<String>,
    /// New reference.
    pub reference: Option<String>,
    /// Replacement lines.
    pub lines: Option<Vec<JournalLineInput>>,
}

/// Filter options for listing journal entries.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JournalEntryFilter {
    /// Filter by status.
    pub status: Option<JournalStatus>,
    /// Entries on or after this date.
    pub from: Option<NaiveDate>,
    /// Entries on or before this date.
    pub to: Option<NaiveDate>,
}

/// Journal entry with its lines.
#[derive(Debug, Clone, Serialize)]
pub struct JournalEntryWithLines {
    /// Entry header.
    #[serde(flatten)]
    pub entry: journal_entries::Model,
    /// Lines ordered by line number.
    pub lines: Vec<journal_lines::Model>,
}

/// Journal entry repository.
#[derive(Debug, Clone)]
pub struct JournalRepository {
    db: DatabaseConnection,
}

impl JournalRepository {
    /// Creates a new journal repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a draft entry.
    ///
    /// Lines are validated and converted to base currency; drafts may be
    /// unbalanced. The fiscal period containing the entry date is resolved,
    /// creating the fiscal year on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if a line is invalid, an account is missing or
    /// inactive, or a query fails.
    pub async fn create_entry(
        &self,
        organization_id: Uuid,
        created_by: Uuid,
        input: CreateJournalEntryInput,
    ) -> RepoResult<JournalEntryWithLines> {
        let txn = self.db.begin().await?;

        let resolved = resolve_lines(&txn, organization_id, &input.lines).await?;
        let totals = JournalService::calculate_totals(&resolved);
        let period = ensure_fiscal_period(&txn, organization_id, input.entry_date).await?;
        let entry_number = next_document_number::<journal_entries::Entity, _>(
            &txn,
            journal_entries::Column::OrganizationId,
            journal_entries::Column::EntryNumber,
            organization_id,
            JOURNAL_PREFIX,
        )
        .await?;

        let now = chrono::Utc::now().into();
        let entry = journal_entries::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(organization_id),
            entry_number: Set(entry_number),
            entry_date: Set(input.entry_date),
            description: Set(input.description),
            reference: Set(input.reference),
            status: Set(JournalStatus::Draft),
            fiscal_period_id: Set(period.id),
            total_debit: Set(totals.total_debit),
            total_credit: Set(totals.total_credit),
            created_by: Set(created_by),
            posted_by: Set(None),
            posted_at: Set(None),
            voided_by: Set(None),
            voided_at: Set(None),
            void_reason: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let lines = insert_lines(&txn, organization_id, entry.id, resolved).await?;

        txn.commit().await?;

        info!(
            entry_id = %entry.id,
            entry_number = %entry.entry_number,
            "journal entry drafted"
        );
        Ok(JournalEntryWithLines { entry, lines })
    }

    /// Edits a draft entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry is missing or not a draft, or if the
    /// replacement lines are invalid.
    pub async fn update_entry(
        &self,
        organization_id: Uuid,
        id: Uuid,
        input: UpdateJournalEntryInput,
    ) -> RepoResult<JournalEntryWithLines> {
        let txn = self.db.begin().await?;

        let entry = find_entry(&txn, organization_id, id, true).await?;
        JournalService::validate_can_edit(entry.status.into())?;

        let mut active: journal_entries::ActiveModel = entry.clone().into();

        if let Some(date) = input.entry_date
            && date != entry.entry_date
        {
            let period = ensure_fiscal_period(&txn, organization_id, date).await?;
            active.entry_date = Set(date);
            active.fiscal_period_id = Set(period.id);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(reference) = input.reference {
            active.reference = Set(Some(reference));
        }

        let lines = if let Some(lines) = input.lines {
            let resolved = resolve_lines(&txn, organization_id, &lines).await?;
            let totals = JournalService::calculate_totals(&resolved);
            journal_lines::Entity::delete_many()
                .filter(journal_lines::Column::JournalEntryId.eq(id))
                .exec(&txn)
                .await?;
            active.total_debit = Set(totals.total_debit);
            active.total_credit = Set(totals.total_credit);
            insert_lines(&txn, organization_id, id, resolved).await?
        } else {
            load_lines(&txn, id).await?
        };

        active.updated_at = Set(chrono::Utc::now().into());
        let entry = active.update(&txn).await?;

        txn.commit().await?;
        Ok(JournalEntryWithLines { entry, lines })
    }

    /// Deletes a draft entry and its lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry is missing or not a draft.
    pub async fn delete_entry(&self, organization_id: Uuid, id: Uuid) -> RepoResult<()> {
        let entry = find_entry(&self.db, organization_id, id, false).await?;
        JournalService::validate_can_delete(entry.status.into())?;

        journal_entries::Entity::delete_by_id(id)
            .exec(&self.db)
            .await?;
        info!(entry_id = %id, "journal entry deleted");
        Ok(())
    }

    /// Finds an entry with its lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry does not exist or the query fails.
    pub async fn get_entry(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> RepoResult<JournalEntryWithLines> {
        let entry = find_entry(&self.db, organization_id, id, false).await?;
        let lines = load_lines(&self.db, id).await?;
        Ok(JournalEntryWithLines { entry, lines })
    }

    /// Lists entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_entries(
        &self,
        organization_id: Uuid,
        filter: JournalEntryFilter,
        page: &PageRequest,
    ) -> RepoResult<PageResponse<journal_entries::Model>> {
        let mut query = journal_entries::Entity::find()
            .filter(journal_entries::Column::OrganizationId.eq(organization_id))
            .order_by_desc(journal_entries::Column::EntryDate)
            .order_by_desc(journal_entries::Column::EntryNumber);

        if let Some(status) = filter.status {
            query = query.filter(journal_entries::Column::Status.eq(status));
        }
        if let Some(from) = filter.from {
            query = query.filter(journal_entries::Column::EntryDate.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(journal_entries::Column::EntryDate.lte(to));
        }

        Ok(fetch_page(&self.db, query, page).await?)
    }

    /// Posts a draft entry and updates account balances.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry is not a draft, is unbalanced beyond
    /// the tolerance, or falls in a closed fiscal period.
    pub async fn post_entry(
        &self,
        organization_id: Uuid,
        id: Uuid,
        posted_by: Uuid,
    ) -> RepoResult<JournalEntryWithLines> {
        let txn = self.db.begin().await?;

        let entry = find_entry(&txn, organization_id, id, true).await?;
        let lines = load_lines(&txn, id).await?;

        let period = fiscal_periods::Entity::find_by_id(entry.fiscal_period_id)
            .one(&txn)
            .await?
            .ok_or(RepoError::not_found("Fiscal period", entry.fiscal_period_id))?;

        let totals = JournalTotals::new(
            lines.iter().map(|l| l.base_debit).sum(),
            lines.iter().map(|l| l.base_credit).sum(),
        );

        if let Err(err) =
            JournalService::validate_can_post(entry.status.into(), &totals, period.status.into())
        {
            warn!(entry_id = %id, error = %err, "journal posting rejected");
            return Err(err.into());
        }

        let typed = typed_lines(&txn, organization_id, &lines).await?;
        apply_deltas(&txn, organization_id, &JournalService::posting_deltas(&typed)).await?;

        let now = chrono::Utc::now().into();
        let mut active: journal_entries::ActiveModel = entry.into();
        active.status = Set(JournalStatus::Posted);
        active.total_debit = Set(totals.total_debit);
        active.total_credit = Set(totals.total_credit);
        active.posted_by = Set(Some(posted_by));
        active.posted_at = Set(Some(now));
        active.updated_at = Set(now);
        let entry = active.update(&txn).await?;

        txn.commit().await?;

        info!(
            entry_id = %id,
            entry_number = %entry.entry_number,
            total = %totals.total_debit,
            "journal entry posted"
        );
        Ok(JournalEntryWithLines { entry, lines })
    }

    /// Voids a posted entry, reversing its balance effects exactly.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry is missing or not posted.
    pub async fn void_entry(
        &self,
        organization_id: Uuid,
        id: Uuid,
        voided_by: Uuid,
        reason: Option<String>,
    ) -> RepoResult<JournalEntryWithLines> {
        let txn = self.db.begin().await?;

        let entry = find_entry(&txn, organization_id, id, true).await?;
        JournalService::validate_can_void(entry.status.into())?;

        let lines = load_lines(&txn, id).await?;
        let typed = typed_lines(&txn, organization_id, &lines).await?;
        apply_deltas(&txn, organization_id, &JournalService::void_deltas(&typed)).await?;

        let now = chrono::Utc::now().into();
        let mut active: journal_entries::ActiveModel = entry.into();
        active.status = Set(JournalStatus::Voided);
        active.voided_by = Set(Some(voided_by));
        active.voided_at = Set(Some(now));
        active.void_reason = Set(reason);
        active.updated_at = Set(now);
        let entry = active.update(&txn).await?;

        txn.commit().await?;

        info!(entry_id = %id, entry_number = %entry.entry_number, "journal entry voided");
        Ok(JournalEntryWithLines { entry, lines })
    }
}

async fn find_entry<C: ConnectionTrait>(
    conn: &C,
    organization_id: Uuid,
    id: Uuid,
    for_update: bool,
) -> RepoResult<journal_entries::Model> {
    let mut query = journal_entries::Entity::find_by_id(id)
        .filter(journal_entries::Column::OrganizationId.eq(organization_id));
    if for_update {
        query = query.lock_exclusive();
    }
    query
        .one(conn)
        .await?
        .ok_or(RepoError::not_found("Journal entry", id))
}

async fn load_lines<C: ConnectionTrait>(
    conn: &C,
    entry_id: Uuid,
) -> RepoResult<Vec<journal_lines::Model>> {
    Ok(journal_lines::Entity::find()
        .filter(journal_lines::Column::JournalEntryId.eq(entry_id))
        .order_by_asc(journal_lines::Column::LineNumber)
        .all(conn)
        .await?)
}

async fn load_accounts<C: ConnectionTrait>(
    conn: &C,
    organization_id: Uuid,
    ids: impl IntoIterator<Item = Uuid>,
) -> RepoResult<HashMap<Uuid, accounts::Model>> {
    let ids: Vec<Uuid> = ids.into_iter().collect();
    Ok(accounts::Entity::find()
        .filter(accounts::Column::OrganizationId.eq(organization_id))
        .filter(accounts::Column::Id.is_in(ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|a| (a.id, a))
        .collect())
}

async fn resolve_lines(
    txn: &DatabaseTransaction,
    organization_id: Uuid,
    lines: &[JournalLineInput],
) -> RepoResult<Vec<ResolvedLine>> {
    let org = organizations::Entity::find_by_id(organization_id)
        .one(txn)
        .await?
        .ok_or(RepoError::not_found("Organization", organization_id))?;
    let accounts = load_accounts(txn, organization_id, lines.iter().map(|l| l.account_id)).await?;

    let resolved = JournalService::resolve_lines(lines, &org.base_currency, |id| {
        accounts.get(&id).map(|a| AccountInfo {
            id: a.id,
            account_type: a.account_type.into(),
            is_active: a.is_active,
        })
    })?;
    Ok(resolved)
}

async fn insert_lines(
    txn: &DatabaseTransaction,
    organization_id: Uuid,
    entry_id: Uuid,
    lines: Vec<ResolvedLine>,
) -> RepoResult<Vec<journal_lines::Model>> {
    let now = chrono::Utc::now().into();
    let mut inserted = Vec::with_capacity(lines.len());
    for line in lines {
        let model = journal_lines::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(organization_id),
            journal_entry_id: Set(entry_id),
            line_number: Set(line.line_number),
            account_id: Set(line.account_id),
            description: Set(line.description),
            debit: Set(line.debit),
            credit: Set(line.credit),
            currency: Set(line.currency),
            exchange_rate: Set(line.exchange_rate),
            base_debit: Set(line.base_debit),
            base_credit: Set(line.base_credit),
            created_at: Set(now),
        }
        .insert(txn)
        .await?;
        inserted.push(model);
    }
    Ok(inserted)
}

/// Pairs each line's base amounts with its account type.
async fn typed_lines(
    txn: &DatabaseTransaction,
    organization_id: Uuid,
    lines: &[journal_lines::Model],
) -> RepoResult<Vec<(Uuid, kontor_core::accounting::AccountType, Decimal, Decimal)>> {
    let accounts = load_accounts(txn, organization_id, lines.iter().map(|l| l.account_id)).await?;

    lines
        .iter()
        .map(|l| {
            let account = accounts
                .get(&l.account_id)
                .ok_or(AccountingError::AccountNotFound(l.account_id))?;
            Ok((
                l.account_id,
                account.account_type.into(),
                l.base_debit,
                l.base_credit,
            ))
        })
        .collect()
}

async fn apply_deltas(
    txn: &DatabaseTransaction,
    organization_id: Uuid,
    deltas: &[BalanceDelta],
) -> RepoResult<()> {
    let now: sea_orm::prelude::DateTimeWithTimeZone = chrono::Utc::now().into();
    for delta in deltas.iter().filter(|d| !d.delta.is_zero()) {
        accounts::Entity::update_many()
            .col_expr(
                accounts::Column::Balance,
                Expr::col(accounts::Column::Balance).add(delta.delta),
            )
            .col_expr(accounts::Column::UpdatedAt, Expr::value(now))
            .filter(accounts::Column::Id.eq(delta.account_id))
            .filter(accounts::Column::OrganizationId.eq(organization_id))
            .exec(txn)
            .await?;
    }
    Ok(())
}
