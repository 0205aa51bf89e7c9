//! Leave repository: leave types, balances and requests.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use kontor_core::hr::{LeaveBalance, LeaveError, LeavePolicy};

use crate::entities::{
    employees, leave_balances, leave_requests, leave_types, sea_orm_active_enums::LeaveStatus,
};
use crate::error::{RepoError, RepoResult};

const fn default_true() -> bool {
    true
}

/// Input for creating a leave type.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLeaveTypeInput {
    /// Code (unique within organization).
    pub code: String,
    /// Name.
    pub name: String,
    /// Days granted per year by default.
    pub default_days: Decimal,
    /// Whether the leave is paid.
    #[serde(default = "default_true")]
    pub is_paid: bool,
    /// Maximum days carried into the next year.
    #[serde(default)]
    pub max_carry_over: Decimal,
}

/// Input for allocating a yearly balance.
#[derive(Debug, Clone, Deserialize)]
pub struct AllocateBalanceInput {
    /// Employee.
    pub employee_id: Uuid,
    /// Leave type.
    pub leave_type_id: Uuid,
    /// Calendar year.
    pub year: i32,
    /// Days granted; defaults to the type's default days.
    #[serde(default)]
    pub entitled: Option<Decimal>,
    /// Days brought forward.
    #[serde(default)]
    pub carried_over: Option<Decimal>,
}

/// Filter for balance listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeaveBalanceFilter {
    /// Restrict to one employee.
    pub employee_id: Option<Uuid>,
    /// Restrict to one year.
    pub year: Option<i32>,
}

/// Balance with its remaining days.
#[derive(Debug, Clone, Serialize)]
pub struct LeaveBalanceView {
    /// Stored balance.
    #[serde(flatten)]
    pub balance: leave_balances::Model,
    /// Entitled minus taken minus pending plus carried over.
    pub remaining: Decimal,
}

impl From<leave_balances::Model> for LeaveBalanceView {
    fn from(balance: leave_balances::Model) -> Self {
        Self {
            remaining: arithmetic(&balance).remaining(),
            balance,
        }
    }
}

/// Input for submitting a leave request.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitLeaveInput {
    /// Employee.
    pub employee_id: Uuid,
    /// Leave type.
    pub leave_type_id: Uuid,
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave.
    pub end_date: NaiveDate,
    /// Reason.
    #[serde(default)]
    pub reason: Option<String>,
}

/// Filter for request listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeaveRequestFilter {
    /// Restrict to one employee.
    pub employee_id: Option<Uuid>,
    /// Restrict to one status.
    pub status: Option<LeaveStatus>,
}

/// Leave repository.
#[derive(Debug, Clone)]
pub struct LeaveRepository {
    db: DatabaseConnection,
}

impl LeaveRepository {
    /// Creates a new leave repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a leave type.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is taken or a day count is negative.
    pub async fn create_leave_type(
        &self,
        organization_id: Uuid,
        input: CreateLeaveTypeInput,
    ) -> RepoResult<leave_types::Model> {
        if input.default_days < Decimal::ZERO {
            return Err(LeaveError::NegativeDays("Default days").into());
        }
        if input.max_carry_over < Decimal::ZERO {
            return Err(LeaveError::NegativeDays("Maximum carry-over").into());
        }

        let taken = leave_types::Entity::find()
            .filter(leave_types::Column::OrganizationId.eq(organization_id))
            .filter(leave_types::Column::Code.eq(&input.code))
            .count(&self.db)
            .await?
            > 0;
        if taken {
            return Err(LeaveError::DuplicateLeaveType(input.code).into());
        }

        let now = chrono::Utc::now().into();
        let leave_type = leave_types::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(organization_id),
            code: Set(input.code),
            name: Set(input.name),
            default_days: Set(input.default_days),
            is_paid: Set(input.is_paid),
            max_carry_over: Set(input.max_carry_over),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        info!(leave_type_id = %leave_type.id, code = %leave_type.code, "leave type created");
        Ok(leave_type)
    }

    /// Lists leave types ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_leave_types(
        &self,
        organization_id: Uuid,
    ) -> RepoResult<Vec<leave_types::Model>> {
        Ok(leave_types::Entity::find()
            .filter(leave_types::Column::OrganizationId.eq(organization_id))
            .order_by_asc(leave_types::Column::Code)
            .all(&self.db)
            .await?)
    }

    /// Creates or re-grants a yearly balance. Taken and pending days are
    /// kept when the balance already exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the employee or type is unknown or a day count
    /// is negative.
    pub async fn allocate_balance(
        &self,
        organization_id: Uuid,
        input: AllocateBalanceInput,
    ) -> RepoResult<LeaveBalanceView> {
        let txn = self.db.begin().await?;

        find_employee(&txn, organization_id, input.employee_id).await?;
        let leave_type = find_leave_type(&txn, organization_id, input.leave_type_id).await?;
        let fresh = LeaveBalance::new(
            input.entitled.unwrap_or(leave_type.default_days),
            input.carried_over.unwrap_or_default(),
        )?;

        let existing = lock_balance(
            &txn,
            organization_id,
            input.employee_id,
            input.leave_type_id,
            input.year,
        )
        .await?;

        let balance = match existing {
            Some(row) => {
                let mut active: leave_balances::ActiveModel = row.into();
                active.entitled = Set(fresh.entitled);
                active.carried_over = Set(fresh.carried_over);
                active.updated_at = Set(chrono::Utc::now().into());
                active.update(&txn).await?
            }
            None => {
                insert_balance(
                    &txn,
                    organization_id,
                    input.employee_id,
                    input.leave_type_id,
                    input.year,
                    fresh,
                )
                .await?
            }
        };

        txn.commit().await?;

        info!(
            employee_id = %input.employee_id,
            leave_type_id = %input.leave_type_id,
            year = input.year,
            entitled = %balance.entitled,
            "leave balance allocated"
        );
        Ok(balance.into())
    }

    /// Lists balances with remaining days.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_balances(
        &self,
        organization_id: Uuid,
        filter: LeaveBalanceFilter,
    ) -> RepoResult<Vec<LeaveBalanceView>> {
        let mut query = leave_balances::Entity::find()
            .filter(leave_balances::Column::OrganizationId.eq(organization_id))
            .order_by_asc(leave_balances::Column::Year)
            .order_by_asc(leave_balances::Column::EmployeeId);
        if let Some(employee_id) = filter.employee_id {
            query = query.filter(leave_balances::Column::EmployeeId.eq(employee_id));
        }
        if let Some(year) = filter.year {
            query = query.filter(leave_balances::Column::Year.eq(year));
        }

        Ok(query
            .all(&self.db)
            .await?
            .into_iter()
            .map(LeaveBalanceView::from)
            .collect())
    }

    /// Submits a request, holding its weekdays as pending.
    ///
    /// A missing balance for the request's year is created from the leave
    /// type's default days.
    ///
    /// # Errors
    ///
    /// Returns an error if the dates are invalid, span two years, cover no
    /// weekday, or exceed the remaining balance.
    pub async fn submit_request(
        &self,
        organization_id: Uuid,
        input: SubmitLeaveInput,
    ) -> RepoResult<leave_requests::Model> {
        let days = LeavePolicy::validate_request(input.start_date, input.end_date)?;
        let year = input.start_date.year();

        let txn = self.db.begin().await?;

        find_employee(&txn, organization_id, input.employee_id).await?;
        let leave_type = find_leave_type(&txn, organization_id, input.leave_type_id).await?;

        let row = match lock_balance(
            &txn,
            organization_id,
            input.employee_id,
            input.leave_type_id,
            year,
        )
        .await?
        {
            Some(row) => row,
            None => {
                insert_balance(
                    &txn,
                    organization_id,
                    input.employee_id,
                    input.leave_type_id,
                    year,
                    LeaveBalance::new(leave_type.default_days, Decimal::ZERO)?,
                )
                .await?
            }
        };

        let updated = match arithmetic(&row).submit(days) {
            Ok(updated) => updated,
            Err(err) => {
                warn!(employee_id = %input.employee_id, days = %days, "leave request rejected");
                return Err(err.into());
            }
        };
        save_balance(&txn, row, updated).await?;

        let now = chrono::Utc::now().into();
        let request = leave_requests::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(organization_id),
            employee_id: Set(input.employee_id),
            leave_type_id: Set(input.leave_type_id),
            start_date: Set(input.start_date),
            end_date: Set(input.end_date),
            days: Set(days),
            reason: Set(input.reason),
            status: Set(LeaveStatus::Pending),
            reviewed_by: Set(None),
            reviewed_at: Set(None),
            review_note: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!(request_id = %request.id, days = %days, "leave request submitted");
        Ok(request)
    }

    /// Lists requests, latest start date first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_requests(
        &self,
        organization_id: Uuid,
        filter: LeaveRequestFilter,
    ) -> RepoResult<Vec<leave_requests::Model>> {
        let mut query = leave_requests::Entity::find()
            .filter(leave_requests::Column::OrganizationId.eq(organization_id))
            .order_by_desc(leave_requests::Column::StartDate);
        if let Some(employee_id) = filter.employee_id {
            query = query.filter(leave_requests::Column::EmployeeId.eq(employee_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(leave_requests::Column::Status.eq(status));
        }
        Ok(query.all(&self.db).await?)
    }

    /// Approves a pending request, moving its days from pending to taken.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is not pending.
    pub async fn approve_request(
        &self,
        organization_id: Uuid,
        id: Uuid,
        reviewed_by: Uuid,
        note: Option<String>,
    ) -> RepoResult<leave_requests::Model> {
        self.review(organization_id, id, reviewed_by, note, LeaveStatus::Approved)
            .await
    }

    /// Rejects a pending request, releasing its days.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is not pending.
    pub async fn reject_request(
        &self,
        organization_id: Uuid,
        id: Uuid,
        reviewed_by: Uuid,
        note: Option<String>,
    ) -> RepoResult<leave_requests::Model> {
        self.review(organization_id, id, reviewed_by, note, LeaveStatus::Rejected)
            .await
    }

    async fn review(
        &self,
        organization_id: Uuid,
        id: Uuid,
        reviewed_by: Uuid,
        note: Option<String>,
        outcome: LeaveStatus,
    ) -> RepoResult<leave_requests::Model> {
        let action = if outcome == LeaveStatus::Approved {
            "approved"
        } else {
            "rejected"
        };

        let txn = self.db.begin().await?;

        let request = find_request(&txn, organization_id, id).await?;
        LeavePolicy::validate_review(request.status.into(), action)?;

        let row = request_balance(&txn, &request).await?;
        let current = arithmetic(&row);
        let updated = if outcome == LeaveStatus::Approved {
            current.approve(request.days)
        } else {
            current.release_pending(request.days)
        };
        save_balance(&txn, row, updated).await?;

        let now = chrono::Utc::now().into();
        let mut active: leave_requests::ActiveModel = request.into();
        active.status = Set(outcome);
        active.reviewed_by = Set(Some(reviewed_by));
        active.reviewed_at = Set(Some(now));
        active.review_note = Set(note);
        active.updated_at = Set(now);
        let request = active.update(&txn).await?;

        txn.commit().await?;

        info!(request_id = %id, action, "leave request reviewed");
        Ok(request)
    }

    /// Cancels a pending request, or an approved one that has not started.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is in any other state.
    pub async fn cancel_request(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> RepoResult<leave_requests::Model> {
        let txn = self.db.begin().await?;

        let request = find_request(&txn, organization_id, id).await?;
        let status = request.status;
        LeavePolicy::validate_cancel(
            status.into(),
            request.start_date,
            chrono::Utc::now().date_naive(),
        )?;

        let row = request_balance(&txn, &request).await?;
        let current = arithmetic(&row);
        let updated = if status == LeaveStatus::Pending {
            current.release_pending(request.days)
        } else {
            current.restore_taken(request.days)
        };
        save_balance(&txn, row, updated).await?;

        let mut active: leave_requests::ActiveModel = request.into();
        active.status = Set(LeaveStatus::Cancelled);
        active.updated_at = Set(chrono::Utc::now().into());
        let request = active.update(&txn).await?;

        txn.commit().await?;

        info!(request_id = %id, "leave request cancelled");
        Ok(request)
    }

    /// Carries unused days of every `year` balance into `year + 1`, capped by
    /// each type's maximum. Re-running replaces the earlier carry-over.
    /// Returns the number of balances carried.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn carry_over(&self, organization_id: Uuid, year: i32) -> RepoResult<u64> {
        let txn = self.db.begin().await?;

        let balances = leave_balances::Entity::find()
            .filter(leave_balances::Column::OrganizationId.eq(organization_id))
            .filter(leave_balances::Column::Year.eq(year))
            .find_also_related(leave_types::Entity)
            .all(&txn)
            .await?;

        let mut carried = 0_u64;
        for (balance, leave_type) in balances {
            let Some(leave_type) = leave_type else {
                continue;
            };
            let amount =
                LeavePolicy::carry_over_amount(&arithmetic(&balance), leave_type.max_carry_over);

            let next = lock_balance(
                &txn,
                organization_id,
                balance.employee_id,
                balance.leave_type_id,
                year + 1,
            )
            .await?;

            match next {
                Some(row) => {
                    let mut active: leave_balances::ActiveModel = row.into();
                    active.carried_over = Set(amount);
                    active.updated_at = Set(chrono::Utc::now().into());
                    active.update(&txn).await?;
                }
                None => {
                    insert_balance(
                        &txn,
                        organization_id,
                        balance.employee_id,
                        balance.leave_type_id,
                        year + 1,
                        LeaveBalance::new(leave_type.default_days, amount)?,
                    )
                    .await?;
                }
            }
            carried += 1;
        }

        txn.commit().await?;

        info!(organization_id = %organization_id, year, carried, "leave carried over");
        Ok(carried)
    }
}

fn arithmetic(row: &leave_balances::Model) -> LeaveBalance {
    LeaveBalance {
        entitled: row.entitled,
        taken: row.taken,
        pending: row.pending,
        carried_over: row.carried_over,
    }
}

async fn find_employee<C: ConnectionTrait>(
    conn: &C,
    organization_id: Uuid,
    id: Uuid,
) -> RepoResult<employees::Model> {
    employees::Entity::find_by_id(id)
        .filter(employees::Column::OrganizationId.eq(organization_id))
        .one(conn)
        .await?
        .ok_or(RepoError::not_found("Employee", id))
}

async fn find_leave_type<C: ConnectionTrait>(
    conn: &C,
    organization_id: Uuid,
    id: Uuid,
) -> RepoResult<leave_types::Model> {
    leave_types::Entity::find_by_id(id)
        .filter(leave_types::Column::OrganizationId.eq(organization_id))
        .one(conn)
        .await?
        .ok_or(RepoError::not_found("Leave type", id))
}

async fn find_request(
    txn: &DatabaseTransaction,
    organization_id: Uuid,
    id: Uuid,
) -> RepoResult<leave_requests::Model> {
    leave_requests::Entity::find_by_id(id)
        .filter(leave_requests::Column::OrganizationId.eq(organization_id))
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or(RepoError::not_found("Leave request", id))
}

async fn lock_balance(
    txn: &DatabaseTransaction,
    organization_id: Uuid,
    employee_id: Uuid,
    leave_type_id: Uuid,
    year: i32,
) -> RepoResult<Option<leave_balances::Model>> {
    Ok(leave_balances::Entity::find()
        .filter(leave_balances::Column::OrganizationId.eq(organization_id))
        .filter(leave_balances::Column::EmployeeId.eq(employee_id))
        .filter(leave_balances::Column::LeaveTypeId.eq(leave_type_id))
        .filter(leave_balances::Column::Year.eq(year))
        .lock_exclusive()
        .one(txn)
        .await?)
}

/// Balance a request draws on: its employee, type and start year.
async fn request_balance(
    txn: &DatabaseTransaction,
    request: &leave_requests::Model,
) -> RepoResult<leave_balances::Model> {
    lock_balance(
        txn,
        request.organization_id,
        request.employee_id,
        request.leave_type_id,
        request.start_date.year(),
    )
    .await?
    .ok_or(RepoError::not_found("Leave balance", request.id))
}

async fn insert_balance(
    txn: &DatabaseTransaction,
    organization_id: Uuid,
    employee_id: Uuid,
    leave_type_id: Uuid,
    year: i32,
    balance: LeaveBalance,
) -> RepoResult<leave_balances::Model> {
    let now = chrono::Utc::now().into();
    Ok(leave_balances::ActiveModel {
        id: Set(Uuid::new_v4()),
        organization_id: Set(organization_id),
        employee_id: Set(employee_id),
        leave_type_id: Set(leave_type_id),
        year: Set(year),
        entitled: Set(balance.entitled),
        taken: Set(balance.taken),
        pending: Set(balance.pending),
        carried_over: Set(balance.carried_over),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(txn)
    .await?)
}

async fn save_balance(
    txn: &DatabaseTransaction,
    row: leave_balances::Model,
    balance: LeaveBalance,
) -> RepoResult<leave_balances::Model> {
    let mut active: leave_balances::ActiveModel = row.into();
    active.taken = Set(balance.taken);
    active.pending = Set(balance.pending);
    active.updated_at = Set(chrono::Utc::now().into());
    Ok(active.update(txn).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_balance_view_reports_remaining() {
        let now = chrono::Utc::now().into();
        let row = leave_balances::Model {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            leave_type_id: Uuid::new_v4(),
            year: 2026,
            entitled: dec!(20),
            taken: dec!(5),
            pending: dec!(2),
            carried_over: dec!(3),
            created_at: now,
            updated_at: now,
        };

        assert_eq!(LeaveBalanceView::from(row).remaining, dec!(16));
    }
}
