//! `SeaORM` Entity for payroll_settings table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "payroll_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub organization_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((7, 4)))")]
    pub income_tax_rate: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub tax_free_allowance: Decimal,
    #[sea_orm(column_type = "Decimal(Some((7, 4)))")]
    pub pension_rate: Decimal,
    #[sea_orm(column_type = "Decimal(Some((7, 4)))")]
    pub health_insurance_rate: Decimal,
    #[sea_orm(column_type = "Decimal(Some((7, 4)))")]
    pub employer_pension_rate: Decimal,
    #[sea_orm(column_type = "Decimal(Some((7, 4)))")]
    pub employer_health_rate: Decimal,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
