//! `SeaORM` Entity for payslips table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "payslips")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub payroll_run_id: Uuid,
    pub employee_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub base_salary: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub allowances: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub bonus: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub gross: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub pension: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub health_insurance: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub taxable_income: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub income_tax: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub other_deductions: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub total_deductions: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub net: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub employer_pension: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub employer_health: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub employer_total: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::payroll_runs::Entity",
        from = "Column::PayrollRunId",
        to = "super::payroll_runs::Column::Id"
    )]
    PayrollRuns,
    #[sea_orm(
        belongs_to = "super::employees::Entity",
        from = "Column::EmployeeId",
        to = "super::employees::Column::Id"
    )]
    Employees,
}

impl Related<super::payroll_runs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PayrollRuns.def()
    }
}

impl Related<super::employees::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employees.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
