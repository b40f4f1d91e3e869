use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum Destination {
    #[sea_orm(string_value = "Discard")]
    Discard,
    #[sea_orm(string_value = "Warranty")]
    Warranty,
    #[sea_orm(string_value = "Stock")]
    Stock,
    #[sea_orm(string_value = "InternalUse")]
    InternalUse,
}

/// A toner returned by a client, weighed on arrival. Derived columns are
/// computed once at write time from the toner's data.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "returned_units")]
#[schema(as = ReturnedUnit)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub client_code: i32,
    pub toner_id: Uuid,
    pub unit_id: Uuid,
    pub returned_weight: Decimal,
    pub destination: Destination,
    pub remaining_weight: Decimal,
    pub remaining_pages: i64,
    pub usable_percentage: Decimal,
    pub recovered_value: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::toner::Entity",
        from = "Column::TonerId",
        to = "super::toner::Column::Id"
    )]
    Toner,
    #[sea_orm(
        belongs_to = "super::unit::Entity",
        from = "Column::UnitId",
        to = "super::unit::Column::Id"
    )]
    Unit,
}

impl Related<super::toner::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Toner.def()
    }
}

impl Related<super::unit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Unit.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
