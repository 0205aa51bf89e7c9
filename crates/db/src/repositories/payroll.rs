//! Payroll repository: employees, settings, runs and payslips.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use kontor_core::payroll::{EmployeePay, PayrollCalculator, PayrollError, PayrollSettings};
use kontor_shared::types::{PageRequest, PageResponse};

use crate::entities::{
    employees, payroll_runs, payroll_settings, payslips,
    sea_orm_active_enums::{EmployeeStatus, PayrollStatus},
};
use crate::error::{RepoError, RepoResult};

use super::fetch_page;

const fn default_active() -> EmployeeStatus {
    EmployeeStatus::Active
}

/// Input for creating an employee.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEmployeeInput {
    /// Employee number (unique within organization).
    pub employee_number: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Email.
    #[serde(default)]
    pub email: Option<String>,
    /// Department.
    #[serde(default)]
    pub department: Option<String>,
    /// Position.
    #[serde(default)]
    pub position: Option<String>,
    /// Hire date.
    pub hire_date: NaiveDate,
    /// Monthly base salary.
    pub base_salary: Decimal,
    /// Monthly allowances.
    #[serde(default)]
    pub allowances: Decimal,
    /// Employment status.
    #[serde(default = "default_active")]
    pub status: EmployeeStatus,
}

/// Input for updating an employee.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEmployeeInput {
    /// First name.
    pub first_name: Option<String>,
    /// Last name.
    pub last_name: Option<String>,
    /// Email.
    pub email: Option<String>,
    /// Department.
    pub department: Option<String>,
    /// Position.
    pub position: Option<String>,
    /// Monthly base salary.
    pub base_salary: Option<Decimal>,
    /// Monthly allowances.
    pub allowances: Option<Decimal>,
    /// Employment status.
    pub status: Option<EmployeeStatus>,
}

/// Input for creating a payroll run.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePayrollRunInput {
    /// Display name.
    pub name: String,
    /// First day of the pay period.
    pub period_start: NaiveDate,
    /// Last day of the pay period.
    pub period_end: NaiveDate,
    /// Payment date; defaults to the period end.
    #[serde(default)]
    pub pay_date: Option<NaiveDate>,
}

/// One-off amounts for an employee in a run.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct EmployeeAdjustment {
    /// Employee.
    pub employee_id: Uuid,
    /// Bonus added to gross.
    #[serde(default)]
    pub bonus: Decimal,
    /// Deduction taken after tax.
    #[serde(default)]
    pub other_deductions: Decimal,
}

/// Payroll run with its payslips.
#[derive(Debug, Clone, Serialize)]
pub struct PayrollRunWithPayslips {
    /// Run header.
    #[serde(flatten)]
    pub run: payroll_runs::Model,
    /// Payslips.
    pub payslips: Vec<payslips::Model>,
}

/// Payroll repository.
#[derive(Debug, Clone)]
pub struct PayrollRepository {
    db: DatabaseConnection,
}

impl PayrollRepository {
    /// Creates a new payroll repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an employee.
    ///
    /// # Errors
    ///
    /// Returns an error if the employee number is taken, amounts are
    /// negative, or the insert fails.
    pub async fn create_employee(
        &self,
        organization_id: Uuid,
        input: CreateEmployeeInput,
    ) -> RepoResult<employees::Model> {
        ensure_non_negative("base_salary", input.base_salary)?;
        ensure_non_negative("allowances", input.allowances)?;

        let taken = employees::Entity::find()
            .filter(employees::Column::OrganizationId.eq(organization_id))
            .filter(employees::Column::EmployeeNumber.eq(&input.employee_number))
            .count(&self.db)
            .await?
            > 0;
        if taken {
            return Err(PayrollError::DuplicateEmployeeNumber(input.employee_number).into());
        }

        let now = chrono::Utc::now().into();
        let employee = employees::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(organization_id),
            employee_number: Set(input.employee_number),
            first_name: Set(input.first_name),
            last_name: Set(input.last_name),
            email: Set(input.email),
            department: Set(input.department),
            position: Set(input.position),
            hire_date: Set(input.hire_date),
            base_salary: Set(input.base_salary),
            allowances: Set(input.allowances),
            status: Set(input.status),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        info!(employee_id = %employee.id, number = %employee.employee_number, "employee created");
        Ok(employee)
    }

    /// Lists employees ordered by employee number.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_employees(
        &self,
        organization_id: Uuid,
        status: Option<EmployeeStatus>,
    ) -> RepoResult<Vec<employees::Model>> {
        let mut query = employees::Entity::find()
            .filter(employees::Column::OrganizationId.eq(organization_id))
            .order_by_asc(employees::Column::EmployeeNumber);
        if let Some(status) = status {
            query = query.filter(employees::Column::Status.eq(status));
        }
        Ok(query.all(&self.db).await?)
    }

    /// Finds an employee.
    ///
    /// # Errors
    ///
    /// Returns an error if the employee does not exist or the query fails.
    pub async fn get_employee(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> RepoResult<employees::Model> {
        find_employee(&self.db, organization_id, id).await
    }

    /// Updates an employee.
    ///
    /// # Errors
    ///
    /// Returns an error if the employee is missing or amounts are negative.
    pub async fn update_employee(
        &self,
        organization_id: Uuid,
        id: Uuid,
        input: UpdateEmployeeInput,
    ) -> RepoResult<employees::Model> {
        let employee = find_employee(&self.db, organization_id, id).await?;

        let mut active: employees::ActiveModel = employee.into();
        if let Some(first_name) = input.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = input.last_name {
            active.last_name = Set(last_name);
        }
        if let Some(email) = input.email {
            active.email = Set(Some(email));
        }
        if let Some(department) = input.department {
            active.department = Set(Some(department));
        }
        if let Some(position) = input.position {
            active.position = Set(Some(position));
        }
        if let Some(base_salary) = input.base_salary {
            ensure_non_negative("base_salary", base_salary)?;
            active.base_salary = Set(base_salary);
        }
        if let Some(allowances) = input.allowances {
            ensure_non_negative("allowances", allowances)?;
            active.allowances = Set(allowances);
        }
        if let Some(status) = input.status {
            active.status = Set(status);
        }
        active.updated_at = Set(chrono::Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Returns the organization's payroll settings, or the defaults when
    /// none are stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get_settings(&self, organization_id: Uuid) -> RepoResult<PayrollSettings> {
        load_settings(&self.db, organization_id).await
    }

    /// Stores the organization's payroll settings.
    ///
    /// # Errors
    ///
    /// Returns an error if a rate is outside 0-100 or the write fails.
    pub async fn update_settings(
        &self,
        organization_id: Uuid,
        settings: PayrollSettings,
    ) -> RepoResult<PayrollSettings> {
        settings.validate()?;

        let now = chrono::Utc::now().into();
        let existing = payroll_settings::Entity::find_by_id(organization_id)
            .one(&self.db)
            .await?;

        let is_new = existing.is_none();
        let mut active = existing.map_or_else(
            || payroll_settings::ActiveModel {
                organization_id: Set(organization_id),
                created_at: Set(now),
                ..Default::default()
            },
            Into::into,
        );
        active.income_tax_rate = Set(settings.income_tax_rate);
        active.tax_free_allowance = Set(settings.tax_free_allowance);
        active.pension_rate = Set(settings.pension_rate);
        active.health_insurance_rate = Set(settings.health_insurance_rate);
        active.employer_pension_rate = Set(settings.employer_pension_rate);
        active.employer_health_rate = Set(settings.employer_health_rate);
        active.updated_at = Set(now);
        if is_new {
            active.insert(&self.db).await?;
        } else {
            active.update(&self.db).await?;
        }

        info!(organization_id = %organization_id, "payroll settings updated");
        Ok(settings)
    }

    /// Creates a draft payroll run.
    ///
    /// # Errors
    ///
    /// Returns an error if the period ends before it starts.
    pub async fn create_run(
        &self,
        organization_id: Uuid,
        created_by: Uuid,
        input: CreatePayrollRunInput,
    ) -> RepoResult<payroll_runs::Model> {
        PayrollCalculator::validate_period(input.period_start, input.period_end)?;

        let now = chrono::Utc::now().into();
        let run = payroll_runs::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(organization_id),
            name: Set(input.name),
            period_start: Set(input.period_start),
            period_end: Set(input.period_end),
            pay_date: Set(input.pay_date.unwrap_or(input.period_end)),
            status: Set(PayrollStatus::Draft),
            employee_count: Set(0),
            total_gross: Set(Decimal::ZERO),
            total_deductions: Set(Decimal::ZERO),
            total_net: Set(Decimal::ZERO),
            total_employer_contributions: Set(Decimal::ZERO),
            snapshot: Set(None),
            created_by: Set(created_by),
            approved_by: Set(None),
            approved_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        info!(run_id = %run.id, name = %run.name, "payroll run created");
        Ok(run)
    }

    /// Computes payslips for every active employee, replacing any earlier
    /// calculation.
    ///
    /// # Errors
    ///
    /// Returns an error if the run is approved, there are no active
    /// employees, or an adjustment is negative.
    pub async fn calculate_run(
        &self,
        organization_id: Uuid,
        id: Uuid,
        adjustments: Vec<EmployeeAdjustment>,
    ) -> RepoResult<PayrollRunWithPayslips> {
        let txn = self.db.begin().await?;

        let run = find_run(&txn, organization_id, id, true).await?;
        PayrollCalculator::validate_can_calculate(run.status.into())?;

        let settings = load_settings(&txn, organization_id).await?;
        let adjustments: HashMap<Uuid, EmployeeAdjustment> =
            adjustments.into_iter().map(|a| (a.employee_id, a)).collect();

        let pay: Vec<EmployeePay> = employees::Entity::find()
            .filter(employees::Column::OrganizationId.eq(organization_id))
            .filter(employees::Column::Status.eq(EmployeeStatus::Active))
            .order_by_asc(employees::Column::EmployeeNumber)
            .all(&txn)
            .await?
            .into_iter()
            .map(|e| {
                let adjustment = adjustments.get(&e.id);
                EmployeePay {
                    employee_id: e.id,
                    base_salary: e.base_salary,
                    allowances: e.allowances,
                    bonus: adjustment.map_or(Decimal::ZERO, |a| a.bonus),
                    other_deductions: adjustment.map_or(Decimal::ZERO, |a| a.other_deductions),
                }
            })
            .collect();

        let (amounts, totals) = match PayrollCalculator::calculate_run(&settings, &pay) {
            Ok(result) => result,
            Err(err) => {
                warn!(run_id = %id, error = %err, "payroll calculation rejected");
                return Err(err.into());
            }
        };

        payslips::Entity::delete_many()
            .filter(payslips::Column::PayrollRunId.eq(id))
            .exec(&txn)
            .await?;

        let mut slips = Vec::with_capacity(amounts.len());
        for a in amounts {
            let slip = payslips::ActiveModel {
                id: Set(Uuid::new_v4()),
                organization_id: Set(organization_id),
                payroll_run_id: Set(id),
                employee_id: Set(a.employee_id),
                base_salary: Set(a.base_salary),
                allowances: Set(a.allowances),
                bonus: Set(a.bonus),
                gross: Set(a.gross),
                pension: Set(a.pension),
                health_insurance: Set(a.health_insurance),
                taxable_income: Set(a.taxable_income),
                income_tax: Set(a.income_tax),
                other_deductions: Set(a.other_deductions),
                total_deductions: Set(a.total_deductions),
                net: Set(a.net),
                employer_pension: Set(a.employer_pension),
                employer_health: Set(a.employer_health),
                employer_total: Set(a.employer_total),
            }
            .insert(&txn)
            .await?;
            slips.push(slip);
        }

        let mut active: payroll_runs::ActiveModel = run.into();
        active.status = Set(PayrollStatus::Calculated);
        active.employee_count = Set(totals.employee_count);
        active.total_gross = Set(totals.total_gross);
        active.total_deductions = Set(totals.total_deductions);
        active.total_net = Set(totals.total_net);
        active.total_employer_contributions = Set(totals.total_employer_contributions);
        active.updated_at = Set(chrono::Utc::now().into());
        let run = active.update(&txn).await?;

        txn.commit().await?;

        info!(
            run_id = %id,
            employees = totals.employee_count,
            total_net = %totals.total_net,
            "payroll run calculated"
        );
        Ok(PayrollRunWithPayslips {
            run,
            payslips: slips,
        })
    }

    /// Approves a calculated run and stores a snapshot of its payslips.
    ///
    /// # Errors
    ///
    /// Returns an error if the run is not calculated.
    pub async fn approve_run(
        &self,
        organization_id: Uuid,
        id: Uuid,
        approved_by: Uuid,
    ) -> RepoResult<PayrollRunWithPayslips> {
        let txn = self.db.begin().await?;

        let run = find_run(&txn, organization_id, id, true).await?;
        PayrollCalculator::validate_can_approve(run.status.into())?;

        let slips = load_payslips(&txn, id).await?;
        let snapshot =
            serde_json::to_value(&slips).map_err(|e| DbErr::Custom(e.to_string()))?;

        let now = chrono::Utc::now().into();
        let mut active: payroll_runs::ActiveModel = run.into();
        active.status = Set(PayrollStatus::Approved);
        active.approved_by = Set(Some(approved_by));
        active.approved_at = Set(Some(now));
        active.snapshot = Set(Some(snapshot));
        active.updated_at = Set(now);
        let run = active.update(&txn).await?;

        txn.commit().await?;

        info!(run_id = %id, "payroll run approved");
        Ok(PayrollRunWithPayslips {
            run,
            payslips: slips,
        })
    }

    /// Deletes a run that is not approved.
    ///
    /// # Errors
    ///
    /// Returns an error if the run is missing or approved.
    pub async fn delete_run(&self, organization_id: Uuid, id: Uuid) -> RepoResult<()> {
        let run = find_run(&self.db, organization_id, id, false).await?;
        PayrollCalculator::validate_can_delete(run.status.into())?;

        payroll_runs::Entity::delete_by_id(id).exec(&self.db).await?;
        info!(run_id = %id, "payroll run deleted");
        Ok(())
    }

    /// Finds a run with its payslips.
    ///
    /// # Errors
    ///
    /// Returns an error if the run does not exist or the query fails.
    pub async fn get_run(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> RepoResult<PayrollRunWithPayslips> {
        let run = find_run(&self.db, organization_id, id, false).await?;
        let payslips = load_payslips(&self.db, id).await?;
        Ok(PayrollRunWithPayslips { run, payslips })
    }

    /// Lists runs, latest period first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_runs(
        &self,
        organization_id: Uuid,
        page: &PageRequest,
    ) -> RepoResult<PageResponse<payroll_runs::Model>> {
        let query = payroll_runs::Entity::find()
            .filter(payroll_runs::Column::OrganizationId.eq(organization_id))
            .order_by_desc(payroll_runs::Column::PeriodStart)
            .order_by_desc(payroll_runs::Column::CreatedAt);
        Ok(fetch_page(&self.db, query, page).await?)
    }

    /// Lists the payslips of a run.
    ///
    /// # Errors
    ///
    /// Returns an error if the run does not exist or the query fails.
    pub async fn list_payslips(
        &self,
        organization_id: Uuid,
        run_id: Uuid,
    ) -> RepoResult<Vec<payslips::Model>> {
        find_run(&self.db, organization_id, run_id, false).await?;
        load_payslips(&self.db, run_id).await
    }
}

fn ensure_non_negative(field: &'static str, amount: Decimal) -> RepoResult<()> {
    if amount < Decimal::ZERO {
        return Err(PayrollError::NegativeAmount(field).into());
    }
    Ok(())
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

async fn find_run<C: ConnectionTrait>(
    conn: &C,
    organization_id: Uuid,
    id: Uuid,
    for_update: bool,
) -> RepoResult<payroll_runs::Model> {
    let mut query = payroll_runs::Entity::find_by_id(id)
        .filter(payroll_runs::Column::OrganizationId.eq(organization_id));
    if for_update {
        query = query.lock_exclusive();
    }
    query
        .one(conn)
        .await?
        .ok_or(RepoError::not_found("Payroll run", id))
}

async fn load_payslips<C: ConnectionTrait>(
    conn: &C,
    run_id: Uuid,
) -> RepoResult<Vec<payslips::Model>> {
    Ok(payslips::Entity::find()
        .filter(payslips::Column::PayrollRunId.eq(run_id))
        .all(conn)
        .await?)
}

async fn load_settings<C: ConnectionTrait>(
    conn: &C,
    organization_id: Uuid,
) -> RepoResult<PayrollSettings> {
    let stored = payroll_settings::Entity::find_by_id(organization_id)
        .one(conn)
        .await?;

    Ok(stored.map_or_else(PayrollSettings::default, |s| PayrollSettings {
        income_tax_rate: s.income_tax_rate,
        tax_free_allowance: s.tax_free_allowance,
        pension_rate: s.pension_rate,
        health_insurance_rate: s.health_insurance_rate,
        employer_pension_rate: s.employer_pension_rate,
        employer_health_rate: s.employer_health_rate,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_negative_amounts_rejected() {
        assert!(ensure_non_negative("bonus", dec!(-1)).is_err());
        assert!(ensure_non_negative("bonus", Decimal::ZERO).is_ok());
    }
}
