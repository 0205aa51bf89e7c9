//! Report repository: aggregates posted journal activity for financial reports.
//!
//! Only lines belonging to posted entries are counted. Drafts and voided
//! entries never affect a report.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, sea_query::Expr,
};
use serde::Deserialize;
use uuid::Uuid;

use kontor_core::accounting::{
    AccountingError, ReportService,
    reports::{
        AccountActivity, AccountLedger, BalanceSheetReport, LedgerActivity, ProfitLossReport,
        TrialBalanceReport,
    },
};

use crate::entities::{
    accounts, fiscal_periods, journal_entries, journal_lines, sea_orm_active_enums::JournalStatus,
};
use crate::error::{RepoError, RepoResult};

/// Date range selection for period reports.
///
/// A `period_id` takes precedence over explicit dates.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportFilter {
    /// Fiscal period whose dates bound the report.
    pub period_id: Option<Uuid>,
    /// Inclusive start date.
    pub from: Option<NaiveDate>,
    /// Inclusive end date.
    pub to: Option<NaiveDate>,
}

/// Report repository.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    db: DatabaseConnection,
}

impl ReportRepository {
    /// Creates a new report repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Trial balance over posted activity in the selected range.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is invalid or a query fails.
    pub async fn trial_balance(
        &self,
        organization_id: Uuid,
        filter: ReportFilter,
    ) -> RepoResult<TrialBalanceReport> {
        let (from, to) = self.resolve_range(organization_id, &filter).await?;
        let activity = account_activity(&self.db, organization_id, from, to).await?;
        Ok(ReportService::trial_balance(activity, from, to))
    }

    /// Profit and loss over posted activity in the selected range.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is invalid or a query fails.
    pub async fn profit_loss(
        &self,
        organization_id: Uuid,
        filter: ReportFilter,
    ) -> RepoResult<ProfitLossReport> {
        let (from, to) = self.resolve_range(organization_id, &filter).await?;
        let activity = account_activity(&self.db, organization_id, from, to).await?;
        Ok(ReportService::profit_loss(activity, from, to))
    }

    /// Balance sheet as of a date, over all posted activity up to it.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn balance_sheet(
        &self,
        organization_id: Uuid,
        as_of: NaiveDate,
    ) -> RepoResult<BalanceSheetReport> {
        let activity = account_activity(&self.db, organization_id, None, Some(as_of)).await?;
        Ok(ReportService::balance_sheet(activity, as_of))
    }

    /// Ledger of one account with an opening balance from activity before
    /// `from`.
    ///
    /// # Errors
    ///
    /// Returns an error if the account is missing, the range is invalid, or
    /// a query fails.
    pub async fn account_ledger(
        &self,
        organization_id: Uuid,
        account_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> RepoResult<AccountLedger> {
        validate_range(from, to)?;

        let account = accounts::Entity::find_by_id(account_id)
            .filter(accounts::Column::OrganizationId.eq(organization_id))
            .one(&self.db)
            .await?
            .ok_or(RepoError::not_found("Account", account_id))?;
        let account_type = account.account_type.into();

        let opening_balance = match from {
            Some(from) => {
                let before = from.pred_opt().unwrap_or(from);
                let (debit, credit) = account_totals(&self.db, account_id, before).await?;
                AccountActivity {
                    account_id,
                    code: account.code.clone(),
                    name: account.name.clone(),
                    account_type,
                    total_debit: debit,
                    total_credit: credit,
                }
                .balance()
            }
            None => Decimal::ZERO,
        };

        let mut query = journal_lines::Entity::find()
            .find_also_related(journal_entries::Entity)
            .filter(journal_lines::Column::AccountId.eq(account_id))
            .filter(journal_entries::Column::Status.eq(JournalStatus::Posted))
            .order_by_asc(journal_entries::Column::EntryDate)
            .order_by_asc(journal_entries::Column::EntryNumber)
            .order_by_asc(journal_lines::Column::LineNumber);
        if let Some(from) = from {
            query = query.filter(journal_entries::Column::EntryDate.gte(from));
        }
        if let Some(to) = to {
            query = query.filter(journal_entries::Column::EntryDate.lte(to));
        }

        let activity = query
            .all(&self.db)
            .await?
            .into_iter()
            .filter_map(|(line, entry)| {
                entry.map(|entry| LedgerActivity {
                    entry_id: entry.id,
                    entry_number: entry.entry_number,
                    entry_date: entry.entry_date,
                    description: line.description.or(Some(entry.description)),
                    debit: line.base_debit,
                    credit: line.base_credit,
                })
            })
            .collect();

        Ok(ReportService::account_ledger(
            account_id,
            account_type,
            opening_balance,
            activity,
        ))
    }

    async fn resolve_range(
        &self,
        organization_id: Uuid,
        filter: &ReportFilter,
    ) -> RepoResult<(Option<NaiveDate>, Option<NaiveDate>)> {
        if let Some(period_id) = filter.period_id {
            let period = fiscal_periods::Entity::find_by_id(period_id)
                .filter(fiscal_periods::Column::OrganizationId.eq(organization_id))
                .one(&self.db)
                .await?
                .ok_or(RepoError::not_found("Fiscal period", period_id))?;
            return Ok((Some(period.start_date), Some(period.end_date)));
        }

        validate_range(filter.from, filter.to)?;
        Ok((filter.from, filter.to))
    }
}

fn validate_range(from: Option<NaiveDate>, to: Option<NaiveDate>) -> RepoResult<()> {
    if let (Some(from), Some(to)) = (from, to)
        && from > to
    {
        return Err(AccountingError::InvalidDateRange.into());
    }
    Ok(())
}

/// Sums posted base amounts per account and joins them onto the chart.
async fn account_activity<C: ConnectionTrait>(
    conn: &C,
    organization_id: Uuid,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> RepoResult<Vec<AccountActivity>> {
    let mut query = journal_lines::Entity::find()
        .select_only()
        .column(journal_lines::Column::AccountId)
        .column_as(
            Expr::col((journal_lines::Entity, journal_lines::Column::BaseDebit)).sum(),
            "total_debit",
        )
        .column_as(
            Expr::col((journal_lines::Entity, journal_lines::Column::BaseCredit)).sum(),
            "total_credit",
        )
        .join(
            JoinType::InnerJoin,
            journal_lines::Relation::JournalEntries.def(),
        )
        .filter(journal_lines::Column::OrganizationId.eq(organization_id))
        .filter(journal_entries::Column::Status.eq(JournalStatus::Posted))
        .group_by(journal_lines::Column::AccountId);

    if let Some(from) = from {
        query = query.filter(journal_entries::Column::EntryDate.gte(from));
    }
    if let Some(to) = to {
        query = query.filter(journal_entries::Column::EntryDate.lte(to));
    }

    let totals: HashMap<Uuid, (Decimal, Decimal)> = query
        .into_tuple::<(Uuid, Option<Decimal>, Option<Decimal>)>()
        .all(conn)
        .await?
        .into_iter()
        .map(|(id, debit, credit)| (id, (debit.unwrap_or_default(), credit.unwrap_or_default())))
        .collect();

    let chart = accounts::Entity::find()
        .filter(accounts::Column::OrganizationId.eq(organization_id))
        .order_by_asc(accounts::Column::Code)
        .all(conn)
        .await?;

    Ok(chart
        .into_iter()
        .map(|a| {
            let (total_debit, total_credit) = totals.get(&a.id).copied().unwrap_or_default();
            AccountActivity {
                account_id: a.id,
                code: a.code,
                name: a.name,
                account_type: a.account_type.into(),
                total_debit,
                total_credit,
            }
        })
        .collect())
}

/// Posted base totals for one account up to and including `through`.
async fn account_totals<C: ConnectionTrait>(
    conn: &C,
    account_id: Uuid,
    through: NaiveDate,
) -> RepoResult<(Decimal, Decimal)> {
    let row = journal_lines::Entity::find()
        .select_only()
        .column_as(
            Expr::col((journal_lines::Entity, journal_lines::Column::BaseDebit)).sum(),
            "total_debit",
        )
        .column_as(
            Expr::col((journal_lines::Entity, journal_lines::Column::BaseCredit)).sum(),
            "total_credit",
        )
        .join(
            JoinType::InnerJoin,
            journal_lines::Relation::JournalEntries.def(),
        )
        .filter(journal_lines::Column::AccountId.eq(account_id))
        .filter(journal_entries::Column::Status.eq(JournalStatus::Posted))
        .filter(journal_entries::Column::EntryDate.lte(through))
        .into_tuple::<(Option<Decimal>, Option<Decimal>)>()
        .one(conn)
        .await?;

    Ok(row.map_or((Decimal::ZERO, Decimal::ZERO), |(d, c)| {
        (d.unwrap_or_default(), c.unwrap_or_default())
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_range_rejects_inverted_dates() {
        let from = NaiveDate::from_ymd_opt(2026, 3, 1);
        let to = NaiveDate::from_ymd_opt(2026, 2, 1);
        assert!(validate_range(from, to).is_err());
        assert!(validate_range(to, from).is_ok());
        assert!(validate_range(None, to).is_ok());
    }
}
