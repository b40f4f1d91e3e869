//! Indirect cost (training, downtime, support) of a TCO record.

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "tco_indirect_costs")]
#[schema(as = TcoIndirectCost)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tco_id: Uuid,
    pub label: String,
    pub value: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tco::Entity",
        from = "Column::TcoId",
        to = "super::tco::Column::Id",
        on_delete = "Cascade"
    )]
    Tco,
}

impl Related<super::tco::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tco.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
