use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A site or branch that receives toners.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "units")]
#[schema(as = Unit)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::returned_unit::Entity")]
    ReturnedUnits,
}

impl Related<super::returned_unit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReturnedUnits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
