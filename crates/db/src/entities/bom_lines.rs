//! `SeaORM` Entity for bom_lines table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "bom_lines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub bom_id: Uuid,
    pub component_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub quantity: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::boms::Entity",
        from = "Column::BomId",
        to = "super::boms::Column::Id"
    )]
    Boms,
}

impl Related<super::boms::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Boms.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
