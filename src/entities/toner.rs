use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelBehavior, Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum TonerColor {
    #[sea_orm(string_value = "Black")]
    Black,
    #[sea_orm(string_value = "Cyan")]
    Cyan,
    #[sea_orm(string_value = "Magenta")]
    Magenta,
    #[sea_orm(string_value = "Yellow")]
    Yellow,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum TonerKind {
    #[sea_orm(string_value = "Compatible")]
    Compatible,
    #[sea_orm(string_value = "Original")]
    Original,
}

/// A toner cartridge model. `price_per_page` and `net_weight` are derived
/// from the other columns on every write.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "toners")]
#[schema(as = Toner)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub model: String,
    pub gross_weight: Decimal,
    pub empty_weight: Decimal,
    pub compatible_printers: String,
    pub color: TonerColor,
    pub print_coverage: Decimal,
    pub page_yield: i32,
    pub kind: TonerKind,
    pub unit_price: Decimal,
    pub price_per_page: Decimal,
    pub net_weight: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
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

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        let now = Utc::now();
        if insert {
            active_model.created_at = Set(now);
        }
        active_model.updated_at = Set(Some(now));
        Ok(active_model)
    }
}
