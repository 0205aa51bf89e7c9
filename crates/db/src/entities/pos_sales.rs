//! `SeaORM` Entity for pos_sales table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{PaymentMethod, SaleStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "pos_sales")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub sale_number: String,
    pub warehouse_id: Uuid,
    pub contact_id: Option<Uuid>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub subtotal: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub discount_total: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub tax_total: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub total: Decimal,
    pub payment_method: PaymentMethod,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub amount_tendered: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub change_due: Decimal,
    pub status: SaleStatus,
    pub sold_by: Uuid,
    pub sold_at: DateTimeWithTimeZone,
    pub refunded_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::pos_sale_lines::Entity")]
    PosSaleLines,
}

impl Related<super::pos_sale_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PosSaleLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
