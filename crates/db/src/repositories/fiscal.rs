//! Fiscal year and period repository for database operations.

use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use kontor_core::accounting::{AccountingError, FiscalCalendar, FiscalStatus as CoreFiscalStatus};

use crate::entities::{
    fiscal_periods, fiscal_years, organizations, sea_orm_active_enums::FiscalStatus,
};
use crate::error::{RepoError, RepoResult};

/// Fiscal year with nested periods.
#[derive(Debug, Clone, Serialize)]
pub struct FiscalYearWithPeriods {
    /// The fiscal year record.
    #[serde(flatten)]
    pub fiscal_year: fiscal_years::Model,
    /// The fiscal periods within this year.
    pub periods: Vec<fiscal_periods::Model>,
}

/// Fiscal year and period repository.
#[derive(Debug, Clone)]
pub struct FiscalRepository {
    db: DatabaseConnection,
}

impl FiscalRepository {
    /// Creates a new fiscal repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists fiscal years with nested periods for an organization.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_fiscal_years(
        &self,
        organization_id: Uuid,
    ) -> RepoResult<Vec<FiscalYearWithPeriods>> {
        let years = fiscal_years::Entity::find()
            .filter(fiscal_years::Column::OrganizationId.eq(organization_id))
            .order_by_desc(fiscal_years::Column::StartDate)
            .all(&self.db)
            .await?;

        let mut results = Vec::with_capacity(years.len());
        for fiscal_year in years {
            let periods = fiscal_periods::Entity::find()
                .filter(fiscal_periods::Column::FiscalYearId.eq(fiscal_year.id))
                .order_by_asc(fiscal_periods::Column::PeriodNumber)
                .all(&self.db)
                .await?;
            results.push(FiscalYearWithPeriods {
                fiscal_year,
                periods,
            });
        }

        Ok(results)
    }

    /// Closes a fiscal period. Earlier periods of the same year must be
    /// closed first.
    ///
    /// # Errors
    ///
    /// Returns an error if the period is missing, already closed, or an
    /// earlier period is still open.
    pub async fn close_period(
        &self,
        organization_id: Uuid,
        period_id: Uuid,
        closed_by: Uuid,
    ) -> RepoResult<fiscal_periods::Model> {
        let (period, siblings) = self.load_with_siblings(organization_id, period_id).await?;

        if let Err(err) =
            FiscalCalendar::validate_close(period.period_number, period.status.into(), &siblings)
        {
            warn!(period_id = %period_id, error = %err, "fiscal period close rejected");
            return Err(err.into());
        }

        let now = chrono::Utc::now().into();
        let mut active: fiscal_periods::ActiveModel = period.into();
        active.status = Set(FiscalStatus::Closed);
        active.closed_by = Set(Some(closed_by));
        active.closed_at = Set(Some(now));
        active.updated_at = Set(now);

        let updated = active.update(&self.db).await?;
        info!(period_id = %period_id, "fiscal period closed");
        Ok(updated)
    }

    /// Reopens a closed fiscal period. Later periods must still be open.
    ///
    /// # Errors
    ///
    /// Returns an error if the period is missing, not closed, or a later
    /// period is closed.
    pub async fn reopen_period(
        &self,
        organization_id: Uuid,
        period_id: Uuid,
    ) -> RepoResult<fiscal_periods::Model> {
        let (period, siblings) = self.load_with_siblings(organization_id, period_id).await?;

        FiscalCalendar::validate_reopen(period.period_number, period.status.into(), &siblings)?;

        let mut active: fiscal_periods::ActiveModel = period.into();
        active.status = Set(FiscalStatus::Open);
        active.closed_by = Set(None);
        active.closed_at = Set(None);
        active.updated_at = Set(chrono::Utc::now().into());

        let updated = active.update(&self.db).await?;
        info!(period_id = %period_id, "fiscal period reopened");
        Ok(updated)
    }

    /// Finds a fiscal period by ID within an organization.
    ///
    /// # Errors
    ///
    /// Returns an error if the period does not exist or the query fails.
    pub async fn get_period(
        &self,
        organization_id: Uuid,
        period_id: Uuid,
    ) -> RepoResult<fiscal_periods::Model> {
        fiscal_periods::Entity::find_by_id(period_id)
            .filter(fiscal_periods::Column::OrganizationId.eq(organization_id))
            .one(&self.db)
            .await?
            .ok_or(RepoError::not_found("Fiscal period", period_id))
    }

    async fn load_with_siblings(
        &self,
        organization_id: Uuid,
        period_id: Uuid,
    ) -> RepoResult<(fiscal_periods::Model, Vec<(i16, CoreFiscalStatus)>)> {
        let period = self.get_period(organization_id, period_id).await?;

        let siblings = fiscal_periods::Entity::find()
            .filter(fiscal_periods::Column::FiscalYearId.eq(period.fiscal_year_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|p| (p.period_number, p.status.into()))
            .collect();

        Ok((period, siblings))
    }
}

/// Returns the fiscal period containing `date`, creating the fiscal year
/// and its monthly periods on first use.
///
/// The year starts on the first day of the organization's
/// `fiscal_year_start_month`. Runs on any connection so callers can use it
/// inside their own transaction.
///
/// # Errors
///
/// Returns an error if the organization is missing or a query fails.
pub async fn ensure_fiscal_period<C>(
    conn: &C,
    organization_id: Uuid,
    date: NaiveDate,
) -> RepoResult<fiscal_periods::Model>
where
    C: ConnectionTrait,
{
    let existing = fiscal_periods::Entity::find()
        .filter(fiscal_periods::Column::OrganizationId.eq(organization_id))
        .filter(fiscal_periods::Column::StartDate.lte(date))
        .filter(fiscal_periods::Column::EndDate.gte(date))
        .one(conn)
        .await?;

    if let Some(period) = existing {
        return Ok(period);
    }

    let org = organizations::Entity::find_by_id(organization_id)
        .one(conn)
        .await?
        .ok_or(RepoError::not_found("Organization", organization_id))?;

    let start_month = u32::try_from(org.fiscal_year_start_month)
        .map_err(|_| AccountingError::InvalidStartMonth(0))?;
    let (start, end) = FiscalCalendar::year_bounds(date, start_month)?;
    let plans = FiscalCalendar::monthly_periods(start, end)?;

    let now = chrono::Utc::now().into();
    let fiscal_year_id = Uuid::new_v4();

    fiscal_years::ActiveModel {
        id: Set(fiscal_year_id),
        organization_id: Set(organization_id),
        name: Set(FiscalCalendar::year_name(start, end)),
        start_date: Set(start),
        end_date: Set(end),
        status: Set(FiscalStatus::Open),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await?;

    let mut containing = None;
    for plan in plans {
        let period = fiscal_periods::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(organization_id),
            fiscal_year_id: Set(fiscal_year_id),
            name: Set(plan.name),
            period_number: Set(plan.period_number),
            start_date: Set(plan.start_date),
            end_date: Set(plan.end_date),
            status: Set(FiscalStatus::Open),
            closed_by: Set(None),
            closed_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(conn)
        .await?;

        if period.start_date <= date && date <= period.end_date {
            containing = Some(period);
        }
    }

    info!(
        organization_id = %organization_id,
        start = %start,
        end = %end,
        "fiscal year created"
    );

    containing.ok_or_else(|| AccountingError::InvalidDateRange.into())
}
